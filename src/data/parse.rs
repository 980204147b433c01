use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::records::{GeoPoint, LinkRecord, PoiRecord};

#[derive(Clone, Debug, Default, Deserialize)]
struct RawLink {
    #[serde(default)]
    poi_a: Option<Value>,
    #[serde(default)]
    poi_b: Option<Value>,
    #[serde(default, rename = "sourcePosition")]
    source_position: Option<Value>,
    #[serde(default, rename = "targetPosition")]
    target_position: Option<Value>,
    #[serde(default)]
    dep: Option<Value>,
    #[serde(default)]
    distance: Option<Value>,
    #[serde(default)]
    cat_a: Option<Value>,
    #[serde(default)]
    cat_b: Option<Value>,
    #[serde(default)]
    taxonomy_a: Option<Value>,
    #[serde(default)]
    taxonomy_b: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawPoi {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    position: Option<Value>,
    #[serde(default)]
    category: Option<Value>,
    #[serde(default)]
    taxonomy: Option<Value>,
    #[serde(default)]
    impact: Option<Value>,
}

/// Records that passed validation plus how many entries were dropped for
/// missing an id or a position.
#[derive(Clone, Debug, PartialEq)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

pub fn parse_links(raw: &str) -> Result<Parsed<LinkRecord>> {
    parse_array(raw, |value| {
        let link = RawLink::deserialize(value).ok()?;
        Some(LinkRecord {
            poi_a: id_value(link.poi_a.as_ref())?,
            poi_b: id_value(link.poi_b.as_ref())?,
            source: position_value(link.source_position.as_ref())?,
            target: position_value(link.target_position.as_ref())?,
            strength: number_value(link.dep.as_ref()),
            distance_km: number_value(link.distance.as_ref()),
            category_a: label_value(link.cat_a.as_ref()),
            category_b: label_value(link.cat_b.as_ref()),
            taxonomy_a: label_value(link.taxonomy_a.as_ref()),
            taxonomy_b: label_value(link.taxonomy_b.as_ref()),
        })
    })
}

pub fn parse_pois(raw: &str) -> Result<Parsed<PoiRecord>> {
    parse_array(raw, |value| {
        let poi = RawPoi::deserialize(value).ok()?;
        Some(PoiRecord {
            id: id_value(poi.id.as_ref())?,
            position: position_value(poi.position.as_ref())?,
            category: label_value(poi.category.as_ref()),
            taxonomy: label_value(poi.taxonomy.as_ref()),
            impact: number_value(poi.impact.as_ref()),
        })
    })
}

fn parse_array<T>(raw: &str, convert: impl Fn(&Value) -> Option<T>) -> Result<Parsed<T>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in dataset")?;

    let Some(entries) = parsed.as_array() else {
        tracing::warn!("dataset body is not a JSON array; treating it as empty");
        return Ok(Parsed {
            records: Vec::new(),
            skipped: 0,
        });
    };

    let mut records = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;
    for entry in entries {
        match convert(entry) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    Ok(Parsed { records, skipped })
}

/// Numbers and numeric strings are accepted; everything else is unknown.
fn number_value(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn id_value(value: Option<&Value>) -> Option<String> {
    let id = match value? {
        Value::String(text) => text.trim().to_owned(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

fn label_value(value: Option<&Value>) -> Option<String> {
    let label = match value? {
        Value::String(text) => text.trim().to_owned(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    (!label.is_empty()).then_some(label)
}

fn position_value(value: Option<&Value>) -> Option<GeoPoint> {
    let coordinates = value?.as_array()?;
    let lon = number_value(coordinates.first())?;
    let lat = number_value(coordinates.get(1))?;
    Some(GeoPoint::new(lon, lat))
}
