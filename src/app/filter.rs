use std::collections::{BTreeMap, BTreeSet};

use crate::data::{GeoBounds, LinkRecord, PoiRecord, numeric_extent};

use super::quantile::QuantileScale;

pub(super) const STRENGTH_BINS: usize = 5;
pub(super) const IMPACT_BINS: usize = 6;

/// Distance extent used before any link reports a distance.
const DEFAULT_DISTANCE_KM: (f64, f64) = (0.0, 30.0);

/// Inclusive range of one-based strength bins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct BinRange {
    pub(super) lo: usize,
    pub(super) hi: usize,
}

impl BinRange {
    pub(super) const FULL: Self = Self {
        lo: 1,
        hi: STRENGTH_BINS,
    };

    pub(super) fn new(lo: usize, hi: usize) -> Self {
        let lo = lo.clamp(1, STRENGTH_BINS);
        let hi = hi.clamp(lo, STRENGTH_BINS);
        Self { lo, hi }
    }

    pub(super) fn contains(self, rank: usize) -> bool {
        rank >= self.lo && rank <= self.hi
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(super) struct NetworkFilter {
    pub(super) strength: BinRange,
    pub(super) distance_km: Option<(f64, f64)>,
    pub(super) origin_taxonomies: BTreeSet<String>,
    pub(super) destination_taxonomies: BTreeSet<String>,
    pub(super) focus: Option<String>,
}

impl Default for NetworkFilter {
    fn default() -> Self {
        Self {
            strength: BinRange::FULL,
            distance_km: None,
            origin_taxonomies: BTreeSet::new(),
            destination_taxonomies: BTreeSet::new(),
            focus: None,
        }
    }
}

impl NetworkFilter {
    pub(super) fn defaults_for(links: &[LinkRecord]) -> Self {
        Self {
            distance_km: Some(distance_extent(links)),
            ..Self::default()
        }
    }
}

/// Distance slider extent: known minimum to the known maximum rounded up.
pub(super) fn distance_extent(links: &[LinkRecord]) -> (f64, f64) {
    let known = numeric_extent(links.iter().map(|link| link.distance_km));
    match known {
        Some((min, max)) => (min, max.ceil()),
        None => DEFAULT_DISTANCE_KM,
    }
}

/// Indices of links passing every active network predicate, in dataset order.
pub(super) fn filter_links(
    links: &[LinkRecord],
    scale: &QuantileScale,
    filter: &NetworkFilter,
) -> Vec<usize> {
    if links.is_empty() {
        return Vec::new();
    }

    links
        .iter()
        .enumerate()
        .filter(|(_, link)| filter.strength.contains(scale.rank(link.strength)))
        .filter(|(_, link)| in_range(link.distance_km, filter.distance_km))
        .filter(|(_, link)| {
            taxonomy_selected(&filter.origin_taxonomies, link.taxonomy_a.as_deref())
        })
        .filter(|(_, link)| {
            taxonomy_selected(&filter.destination_taxonomies, link.taxonomy_b.as_deref())
        })
        .filter(|(_, link)| {
            filter
                .focus
                .as_deref()
                .is_none_or(|focus| link.touches(focus))
        })
        .map(|(index, _)| index)
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(super) struct SimulationFilter {
    pub(super) impact_range: Option<(f64, f64)>,
    pub(super) taxonomies: BTreeSet<String>,
}

impl SimulationFilter {
    pub(super) fn defaults_for(impact_pois: &[PoiRecord]) -> Self {
        Self {
            impact_range: impact_extent(impact_pois),
            taxonomies: BTreeSet::new(),
        }
    }

    pub(super) fn toggle_taxonomy(&mut self, name: &str) {
        if !self.taxonomies.remove(name) {
            self.taxonomies.insert(name.to_owned());
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct TaxonomyCount {
    pub(super) name: String,
    pub(super) count: usize,
}

pub(super) fn impact_extent(pois: &[PoiRecord]) -> Option<(f64, f64)> {
    numeric_extent(pois.iter().map(PoiRecord::clamped_impact))
}

/// Taxonomy-only subset. Color boundaries come from this sample so narrowing
/// the impact range keeps the colors of the remaining points.
pub(super) fn quantile_sample(pois: &[PoiRecord], taxonomies: &BTreeSet<String>) -> Vec<usize> {
    pois.iter()
        .enumerate()
        .filter(|(_, poi)| taxonomy_selected(taxonomies, Some(poi.taxonomy_key())))
        .map(|(index, _)| index)
        .collect()
}

pub(super) fn impact_scale(pois: &[PoiRecord], sample: &[usize]) -> QuantileScale {
    QuantileScale::from_samples(
        sample
            .iter()
            .filter_map(|&index| pois.get(index))
            .filter_map(PoiRecord::clamped_impact),
        IMPACT_BINS,
    )
}

/// Indices of impact POIs inside the impact range and the taxonomy selection.
pub(super) fn filter_impact_pois(pois: &[PoiRecord], filter: &SimulationFilter) -> Vec<usize> {
    if pois.is_empty() {
        return Vec::new();
    }

    pois.iter()
        .enumerate()
        .filter(|(_, poi)| in_range(poi.clamped_impact(), filter.impact_range))
        .filter(|(_, poi)| taxonomy_selected(&filter.taxonomies, Some(poi.taxonomy_key())))
        .map(|(index, _)| index)
        .collect()
}

/// Per-taxonomy counts over POIs inside the impact range and, when given, the
/// viewport. Largest first.
pub(super) fn taxonomy_counts(
    pois: &[PoiRecord],
    impact_range: Option<(f64, f64)>,
    viewport: Option<GeoBounds>,
) -> Vec<TaxonomyCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for poi in pois
        .iter()
        .filter(|poi| in_range(poi.clamped_impact(), impact_range))
        .filter(|poi| viewport.is_none_or(|bounds| bounds.contains(poi.position)))
    {
        *counts.entry(poi.taxonomy_key()).or_default() += 1;
    }

    let mut counts = counts
        .into_iter()
        .map(|(name, count)| TaxonomyCount {
            name: name.to_owned(),
            count,
        })
        .collect::<Vec<_>>();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    counts
}

/// Unknown values pass; so does everything when the range is inactive.
fn in_range(value: Option<f64>, range: Option<(f64, f64)>) -> bool {
    match (value, range) {
        (Some(value), Some((lo, hi))) => value >= lo && value <= hi,
        _ => true,
    }
}

/// An empty selection shows everything.
fn taxonomy_selected(selection: &BTreeSet<String>, taxonomy: Option<&str>) -> bool {
    selection.is_empty() || taxonomy.is_some_and(|name| selection.contains(name))
}

#[cfg(test)]
mod tests {
    use crate::data::fixtures::{impact_poi, link};
    use crate::data::GeoPoint;

    use super::*;

    fn scale_for(links: &[LinkRecord]) -> QuantileScale {
        QuantileScale::from_samples(links.iter().filter_map(|link| link.strength), STRENGTH_BINS)
    }

    #[test]
    fn default_filter_keeps_every_link() {
        let links = vec![link("a", "b", 1.0, 2.0), link("b", "c", 5.0, 4.0), link("c", "a", 9.0, 8.5)];
        let filter = NetworkFilter::defaults_for(&links);

        assert_eq!(filter.distance_km, Some((2.0, 9.0)));
        assert_eq!(filter_links(&links, &scale_for(&links), &filter), [0, 1, 2]);
    }

    #[test]
    fn top_strength_bin_keeps_only_the_strongest_link() {
        let links = vec![link("a", "b", 1.0, 2.0), link("b", "c", 5.0, 4.0), link("c", "a", 9.0, 8.5)];
        let filter = NetworkFilter {
            strength: BinRange::new(5, 5),
            ..NetworkFilter::defaults_for(&links)
        };

        assert_eq!(filter_links(&links, &scale_for(&links), &filter), [2]);
    }

    #[test]
    fn unknown_distance_passes_the_distance_range() {
        let mut unknown = link("a", "b", 1.0, 0.0);
        unknown.distance_km = None;
        let links = vec![unknown, link("b", "c", 1.0, 25.0)];
        let filter = NetworkFilter {
            distance_km: Some((0.0, 10.0)),
            ..NetworkFilter::default()
        };

        assert_eq!(filter_links(&links, &scale_for(&links), &filter), [0]);
    }

    #[test]
    fn taxonomy_selection_empty_means_all() {
        let mut arts = link("a", "b", 1.0, 1.0);
        arts.taxonomy_a = Some("Arts".to_owned());
        let mut untagged = link("c", "d", 1.0, 1.0);
        untagged.taxonomy_a = None;
        let links = vec![link("e", "f", 1.0, 1.0), arts, untagged];
        let scale = scale_for(&links);

        let all = NetworkFilter::default();
        assert_eq!(filter_links(&links, &scale, &all), [0, 1, 2]);

        let only_arts = NetworkFilter {
            origin_taxonomies: BTreeSet::from(["Arts".to_owned()]),
            ..NetworkFilter::default()
        };
        assert_eq!(filter_links(&links, &scale, &only_arts), [1]);
    }

    #[test]
    fn destination_taxonomy_filters_the_target_end() {
        let mut arts = link("a", "b", 1.0, 1.0);
        arts.taxonomy_b = Some("Arts".to_owned());
        let links = vec![arts, link("c", "d", 1.0, 1.0)];
        let filter = NetworkFilter {
            destination_taxonomies: BTreeSet::from(["Retail".to_owned()]),
            ..NetworkFilter::default()
        };

        assert_eq!(filter_links(&links, &scale_for(&links), &filter), [1]);
    }

    #[test]
    fn focus_keeps_links_touching_the_entity() {
        let links = vec![link("a", "b", 1.0, 1.0), link("c", "d", 1.0, 1.0), link("d", "a", 1.0, 1.0)];
        let filter = NetworkFilter {
            focus: Some("a".to_owned()),
            ..NetworkFilter::default()
        };

        assert_eq!(filter_links(&links, &scale_for(&links), &filter), [0, 2]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let links = vec![link("a", "b", 1.0, 3.0), link("b", "c", 2.0, 12.0), link("c", "a", 3.0, 1.0)];
        let scale = scale_for(&links);
        let filter = NetworkFilter {
            strength: BinRange::new(2, 5),
            distance_km: Some((0.0, 5.0)),
            ..NetworkFilter::default()
        };

        assert_eq!(filter_links(&links, &scale, &filter), filter_links(&links, &scale, &filter));
    }

    #[test]
    fn empty_dataset_short_circuits() {
        let scale = QuantileScale::default();
        assert!(filter_links(&[], &scale, &NetworkFilter::default()).is_empty());
        assert!(filter_impact_pois(&[], &SimulationFilter::default()).is_empty());
    }

    #[test]
    fn bin_range_is_clamped_and_ordered() {
        assert_eq!(BinRange::new(0, 9), BinRange::FULL);
        assert_eq!(BinRange::new(4, 2), BinRange { lo: 4, hi: 4 });
    }

    #[test]
    fn impact_range_and_taxonomy_compose() {
        let pois = vec![
            impact_poi("a", Some(-80.0), Some("Food")),
            impact_poi("b", Some(-10.0), Some("Food")),
            impact_poi("c", None, Some("Food")),
            impact_poi("d", Some(-50.0), None),
        ];
        let mut filter = SimulationFilter {
            impact_range: Some((-60.0, 0.0)),
            ..SimulationFilter::default()
        };
        assert_eq!(filter_impact_pois(&pois, &filter), [1, 2, 3]);

        filter.toggle_taxonomy("(Uncategorized)");
        assert_eq!(filter_impact_pois(&pois, &filter), [3]);

        filter.toggle_taxonomy("(Uncategorized)");
        assert!(filter.taxonomies.is_empty());
    }

    #[test]
    fn impact_colors_ignore_the_range_filter() {
        let pois = (0..12)
            .map(|index| impact_poi(&index.to_string(), Some(-(index as f64) * 8.0), Some("Food")))
            .collect::<Vec<_>>();
        let wide = SimulationFilter::defaults_for(&pois);
        let narrow = SimulationFilter {
            impact_range: Some((-40.0, 0.0)),
            ..wide.clone()
        };

        let wide_scale = impact_scale(&pois, &quantile_sample(&pois, &wide.taxonomies));
        let narrow_scale = impact_scale(&pois, &quantile_sample(&pois, &narrow.taxonomies));
        assert_eq!(wide_scale, narrow_scale);
    }

    #[test]
    fn impact_extent_applies_the_floor() {
        let pois = vec![impact_poi("a", Some(-250.0), None), impact_poi("b", Some(-3.0), None)];
        assert_eq!(impact_extent(&pois), Some((-100.0, -3.0)));
    }

    #[test]
    fn taxonomy_counts_respect_range_and_viewport() {
        let mut outside = impact_poi("far", Some(-5.0), Some("Food"));
        outside.position = GeoPoint::new(-60.0, 40.0);
        let pois = vec![
            impact_poi("a", Some(-5.0), Some("Food")),
            impact_poi("b", Some(-5.0), Some("Food")),
            impact_poi("c", Some(-5.0), Some("Arts")),
            impact_poi("d", Some(-90.0), Some("Arts")),
            outside,
        ];
        let viewport = GeoBounds {
            min: GeoPoint::new(-72.0, 42.0),
            max: GeoPoint::new(-70.0, 43.0),
        };

        let counts = taxonomy_counts(&pois, Some((-50.0, 0.0)), Some(viewport));
        assert_eq!(
            counts,
            [
                TaxonomyCount { name: "Food".to_owned(), count: 2 },
                TaxonomyCount { name: "Arts".to_owned(), count: 1 },
            ]
        );
    }
}
