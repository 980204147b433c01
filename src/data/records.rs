use std::collections::{BTreeSet, HashSet};

/// Fallback key for simulation POIs without a taxonomy label.
pub const UNCATEGORIZED: &str = "(Uncategorized)";

/// Lowest impact a simulation can report; anything below is treated as -100 %.
pub const IMPACT_FLOOR: f64 = -100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Axis-aligned lon/lat box, inclusive on every edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    pub min: GeoPoint,
    pub max: GeoPoint,
}

impl GeoBounds {
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lon >= self.min.lon
            && point.lon <= self.max.lon
            && point.lat >= self.min.lat
            && point.lat <= self.max.lat
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkRecord {
    pub poi_a: String,
    pub poi_b: String,
    pub source: GeoPoint,
    pub target: GeoPoint,
    pub strength: Option<f64>,
    pub distance_km: Option<f64>,
    pub category_a: Option<String>,
    pub category_b: Option<String>,
    pub taxonomy_a: Option<String>,
    pub taxonomy_b: Option<String>,
}

impl LinkRecord {
    pub fn touches(&self, poi_id: &str) -> bool {
        self.poi_a == poi_id || self.poi_b == poi_id
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PoiRecord {
    pub id: String,
    pub position: GeoPoint,
    pub category: Option<String>,
    pub taxonomy: Option<String>,
    pub impact: Option<f64>,
}

impl PoiRecord {
    pub fn clamped_impact(&self) -> Option<f64> {
        self.impact.map(|value| value.max(IMPACT_FLOOR))
    }

    pub fn taxonomy_key(&self) -> &str {
        self.taxonomy.as_deref().unwrap_or(UNCATEGORIZED)
    }
}

/// Unique endpoints of a link list, in first-seen order. The first position
/// seen for an id wins.
pub fn derive_pois(links: &[LinkRecord]) -> Vec<PoiRecord> {
    let mut seen = HashSet::new();
    let mut pois = Vec::new();

    for link in links {
        let endpoints = [
            (&link.poi_a, link.source, &link.category_a, &link.taxonomy_a),
            (&link.poi_b, link.target, &link.category_b, &link.taxonomy_b),
        ];
        for (id, position, category, taxonomy) in endpoints {
            if seen.insert(id.as_str()) {
                pois.push(PoiRecord {
                    id: id.clone(),
                    position,
                    category: category.clone(),
                    taxonomy: taxonomy.clone(),
                    impact: None,
                });
            }
        }
    }

    pois
}

/// Min and max over the known values; `None` when nothing is known.
pub fn numeric_extent(values: impl IntoIterator<Item = Option<f64>>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .flatten()
        .filter(|value| value.is_finite())
        .fold(None, |extent, value| match extent {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
}

/// Sorted union of origin and destination taxonomies.
pub fn link_taxonomies(links: &[LinkRecord]) -> Vec<String> {
    let set = links
        .iter()
        .flat_map(|link| [link.taxonomy_a.as_deref(), link.taxonomy_b.as_deref()])
        .flatten()
        .collect::<BTreeSet<_>>();

    let mut names = set.into_iter().map(str::to_owned).collect::<Vec<_>>();
    names.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    names
}
