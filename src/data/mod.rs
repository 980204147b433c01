mod parse;
mod records;
mod scenario;
mod source;

use anyhow::{Context, Result};

use parse::{parse_links, parse_pois};
#[cfg(test)]
pub(crate) use records::fixtures;
pub use records::{
    GeoBounds, GeoPoint, LinkRecord, PoiRecord, derive_pois, link_taxonomies, numeric_extent,
};
pub use scenario::{LANDING_FILE, NETWORK_FILE, NETWORK_PREPROCESS_CMD, Scenario};
pub use source::{DataSource, Fetch};
#[cfg(test)]
pub(crate) use source::testing;

/// Both halves of a simulation scenario.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScenarioData {
    pub closed: Vec<PoiRecord>,
    pub impact: Vec<PoiRecord>,
}

pub fn load_links(source: &dyn Fetch, file: &str) -> Result<Vec<LinkRecord>> {
    let raw = source
        .fetch(file)
        .with_context(|| format!("failed to load {file}"))?;
    let parsed = parse_links(&raw).with_context(|| format!("failed to parse {file}"))?;
    if parsed.skipped > 0 {
        tracing::warn!(file, skipped = parsed.skipped, "dropped links without ids or positions");
    }
    tracing::info!(file, links = parsed.records.len(), "loaded link dataset");
    Ok(parsed.records)
}

pub fn load_pois(source: &dyn Fetch, file: &str) -> Result<Vec<PoiRecord>> {
    let raw = source
        .fetch(file)
        .with_context(|| format!("failed to load {file}"))?;
    let parsed = parse_pois(&raw).with_context(|| format!("failed to parse {file}"))?;
    if parsed.skipped > 0 {
        tracing::warn!(file, skipped = parsed.skipped, "dropped POIs without ids or positions");
    }
    tracing::info!(file, pois = parsed.records.len(), "loaded POI dataset");
    Ok(parsed.records)
}

pub fn load_scenario(source: &dyn Fetch, scenario: Scenario) -> Result<ScenarioData> {
    let closed = load_pois(source, scenario.closed_file())?;
    let impact = load_pois(source, scenario.impact_file())?;
    Ok(ScenarioData { closed, impact })
}
