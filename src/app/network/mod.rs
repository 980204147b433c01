use std::sync::Arc;
use std::time::Instant;

use eframe::egui::{Color32, Stroke, Ui};

use crate::data::{
    Fetch, LinkRecord, NETWORK_FILE, NETWORK_PREPROCESS_CMD, PoiRecord, derive_pois,
    link_taxonomies, load_links,
};
use crate::util::{UNKNOWN, format_km};

use super::camera::BOSTON_CENTER;
use super::filter::{NetworkFilter, STRENGTH_BINS, distance_extent, filter_links};
use super::layers::{Layer, LayerSet, LinePrimitive, LineLayer, Pick, PointLayer, PointPrimitive};
use super::load::{LoadReceiver, LoadState, load_error_message, poll_load, spawn_load};
use super::quantile::QuantileScale;
use super::render_utils::{DEPENDENCY_ALPHA, DEPENDENCY_PALETTE, MAP_BACKGROUND, ramp_color};
use super::scale::{NETWORK_POI_PIXELS, link_width_px, network_poi_radius_m};
use super::surface::{EguiMapSurface, MapSurface};
use super::throttle::ZoomThrottle;
use super::ui::panels::{Status, status_banner};

mod sidebar;

const POI_FILL: Color32 = Color32::WHITE;
const POI_OUTLINE: Color32 = Color32::from_rgba_premultiplied(200, 200, 200, 200);
const SELECTED_FILL: Color32 = Color32::from_rgb(255, 255, 200);
const SELECTED_OUTLINE: Color32 = Color32::from_rgb(255, 230, 150);

/// Loaded link dataset plus everything derived from it once per load.
pub(super) struct NetworkData {
    links: Vec<LinkRecord>,
    pois: Vec<PoiRecord>,
    taxonomies: Vec<String>,
    strength_scale: QuantileScale,
    distance_extent: (f64, f64),
}

impl NetworkData {
    fn new(links: Vec<LinkRecord>) -> Self {
        let strength_scale =
            QuantileScale::from_samples(links.iter().filter_map(|link| link.strength), STRENGTH_BINS);
        Self {
            pois: derive_pois(&links),
            taxonomies: link_taxonomies(&links),
            distance_extent: distance_extent(&links),
            strength_scale,
            links,
        }
    }
}

/// Dependency-map controller: owns the link dataset, the network filter and
/// the focus selection, and feeds a map surface.
pub(super) struct NetworkView<S = EguiMapSurface> {
    fetcher: Arc<dyn Fetch>,
    surface: S,
    state: LoadState<NetworkData>,
    pending: Option<LoadReceiver<Vec<LinkRecord>>>,
    filter: NetworkFilter,
    throttle: ZoomThrottle,
    visible: Vec<usize>,
    layers_dirty: bool,
    origin_search: String,
    destination_search: String,
}

impl NetworkView {
    pub(super) fn new(fetcher: Arc<dyn Fetch>, zoom: f64) -> Self {
        Self::with_surface(fetcher, EguiMapSurface::new(BOSTON_CENTER, zoom, MAP_BACKGROUND))
    }

    /// Draws the map and routes its input. Returns the newly committed zoom,
    /// if the user changed it.
    pub(super) fn show_map(&mut self, ui: &mut Ui) -> Option<f64> {
        self.sync_layers();
        let frame = self.surface.show(ui);

        if let Some(pick) = frame.clicked {
            self.click(pick);
        }

        let now = Instant::now();
        let mut committed = None;
        if frame.camera_changed || frame.gesture_ended || self.throttle.pending_for(now).is_some() {
            committed = self.observe_zoom(now, frame.gesture_ended);
            if let Some(wait) = self.throttle.pending_for(now) {
                ui.ctx().request_repaint_after(wait);
            }
        }

        if let Some(text) = frame.hovered.and_then(|pick| self.tooltip(pick)) {
            frame.response.on_hover_text_at_pointer(text);
        }

        self.show_status(ui);
        if self.layers_dirty {
            ui.ctx().request_repaint();
        }
        committed
    }

    fn show_status(&self, ui: &Ui) {
        let status = match &self.state {
            LoadState::Loading => Status::Loading("Loading network…"),
            LoadState::Error(error) => Status::Error(error),
            LoadState::Ready(data) if data.links.is_empty() => Status::Empty("No links in the dataset."),
            _ => return,
        };
        status_banner(ui.ctx(), "network_status", &status);
    }
}

impl<S: MapSurface> NetworkView<S> {
    pub(super) fn with_surface(fetcher: Arc<dyn Fetch>, surface: S) -> Self {
        let zoom = surface.zoom();
        Self {
            fetcher,
            surface,
            state: LoadState::Idle,
            pending: None,
            filter: NetworkFilter::default(),
            throttle: ZoomThrottle::new(zoom),
            visible: Vec::new(),
            layers_dirty: true,
            origin_search: String::new(),
            destination_search: String::new(),
        }
    }

    pub(super) fn ensure_loaded(&mut self) {
        if !matches!(self.state, LoadState::Idle) {
            return;
        }

        let fetcher = Arc::clone(&self.fetcher);
        self.pending = Some(spawn_load(move || load_links(fetcher.as_ref(), NETWORK_FILE)));
        self.state = LoadState::Loading;
        tracing::info!(file = NETWORK_FILE, "fetching network dataset");
    }

    /// Picks up a finished fetch. Returns true when the state changed.
    pub(super) fn poll(&mut self) -> bool {
        let Some(rx) = self.pending.as_ref() else {
            return false;
        };
        let Some(result) = poll_load(rx) else {
            return false;
        };
        self.pending = None;

        match result {
            Ok(links) => {
                let data = NetworkData::new(links);
                self.filter = NetworkFilter::defaults_for(&data.links);
                self.state = LoadState::Ready(data);
                self.refilter();
            }
            Err(error) => {
                tracing::warn!(%error, "network dataset failed to load");
                self.state = LoadState::Error(load_error_message(&error, NETWORK_PREPROCESS_CMD));
                self.visible.clear();
                self.layers_dirty = true;
            }
        }
        true
    }

    pub(super) fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Filters only make sense once at least one link has loaded.
    pub(super) fn filters_visible(&self) -> bool {
        self.state.ready().is_some_and(|data| !data.links.is_empty())
    }

    #[cfg(test)]
    pub(super) fn filter(&self) -> &NetworkFilter {
        &self.filter
    }

    pub(super) fn set_filter(&mut self, filter: NetworkFilter) {
        if filter != self.filter {
            self.filter = filter;
            self.refilter();
        }
    }

    #[cfg(test)]
    pub(super) fn visible_links(&self) -> &[usize] {
        &self.visible
    }

    /// A click on a POI toggles focus on it; any other click clears focus.
    pub(super) fn click(&mut self, pick: Option<Pick>) {
        let focus = match (pick, self.state.ready()) {
            (Some(Pick::Poi(index)), Some(data)) => data
                .pois
                .get(index)
                .map(|poi| poi.id.clone())
                .filter(|id| self.filter.focus.as_ref() != Some(id)),
            _ => None,
        };

        if focus != self.filter.focus {
            tracing::debug!(focus = ?focus, "network focus changed");
            self.filter.focus = focus;
            self.refilter();
        }
    }

    #[cfg(test)]
    pub(super) fn committed_zoom(&self) -> f64 {
        self.throttle.committed()
    }

    pub(super) fn observe_zoom(&mut self, now: Instant, gesture_ended: bool) -> Option<f64> {
        let committed = self
            .throttle
            .observe(now, self.surface.zoom(), gesture_ended);
        if committed.is_some() {
            self.layers_dirty = true;
        }
        committed
    }

    pub(super) fn adopt_zoom(&mut self, zoom: f64) {
        if zoom == self.throttle.committed() && zoom == self.surface.zoom() {
            return;
        }
        self.surface.set_zoom(zoom);
        self.throttle.reset(zoom);
        self.layers_dirty = true;
    }

    /// Hands fresh layers to the surface when any input changed.
    pub(super) fn sync_layers(&mut self) {
        if !self.layers_dirty {
            return;
        }
        self.surface.set_layers(self.build_layers());
        self.layers_dirty = false;
    }

    pub(super) fn build_layers(&self) -> LayerSet {
        let mut layers = LayerSet::default();
        let Some(data) = self.state.ready() else {
            return layers;
        };
        let zoom = self.throttle.committed();

        if !self.visible.is_empty() {
            let lines = self
                .visible
                .iter()
                .filter_map(|&index| data.links.get(index).map(|link| (index, link)))
                .map(|(index, link)| LinePrimitive {
                    source: link.source,
                    target: link.target,
                    color: ramp_color(
                        &DEPENDENCY_PALETTE,
                        data.strength_scale.bin(link.strength),
                        STRENGTH_BINS,
                        DEPENDENCY_ALPHA,
                    ),
                    pick: Some(Pick::Link(index)),
                })
                .collect();
            layers.push(Layer::Lines(LineLayer {
                id: "poi-links",
                width_px: link_width_px(zoom) as f32,
                arc: false,
                lines,
            }));
        }

        if !data.pois.is_empty() {
            let focus = self.filter.focus.as_deref();
            let points = data
                .pois
                .iter()
                .enumerate()
                .map(|(index, poi)| {
                    let selected = focus == Some(poi.id.as_str());
                    let (fill, outline) = if selected {
                        (SELECTED_FILL, Stroke::new(2.0, SELECTED_OUTLINE))
                    } else {
                        (POI_FILL, Stroke::new(1.0, POI_OUTLINE))
                    };
                    PointPrimitive {
                        position: poi.position,
                        radius_m: network_poi_radius_m(zoom, selected),
                        fill,
                        outline,
                        pick: Some(Pick::Poi(index)),
                    }
                })
                .collect();
            layers.push(Layer::Points(PointLayer {
                id: "pois",
                clamp: NETWORK_POI_PIXELS,
                points,
            }));
        }

        layers
    }

    pub(super) fn tooltip(&self, pick: Pick) -> Option<String> {
        let data = self.state.ready()?;
        match pick {
            Pick::Link(index) => {
                let link = data.links.get(index)?;
                Some(format!(
                    "{} → {}\nStrength: Q{}\nDistance: {} km",
                    link.category_a.as_deref().unwrap_or(UNKNOWN),
                    link.category_b.as_deref().unwrap_or(UNKNOWN),
                    data.strength_scale.rank(link.strength),
                    format_km(link.distance_km),
                ))
            }
            Pick::Poi(index) => {
                let poi = data.pois.get(index)?;
                Some(format!(
                    "{}\nClick to show only links to/from this POI",
                    poi.category.as_deref().unwrap_or(UNKNOWN)
                ))
            }
            Pick::ImpactPoi(_) | Pick::ClosedPoi(_) => None,
        }
    }

    fn refilter(&mut self) {
        self.visible = match self.state.ready() {
            Some(data) => filter_links(&data.links, &data.strength_scale, &self.filter),
            None => Vec::new(),
        };
        self.layers_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use crate::data::testing::MemoryFetch;

    use super::super::filter::BinRange;
    use super::super::surface::RecordingSurface;
    use super::*;

    const THREE_LINKS: &str = r#"[
        {"poi_a": "a", "poi_b": "b", "sourcePosition": [-71.06, 42.36], "targetPosition": [-71.10, 42.35],
         "dep": 1.0, "distance": 1.2, "cat_a": "Cafe", "cat_b": "Gym", "taxonomy_a": "Food", "taxonomy_b": "Sports"},
        {"poi_a": "b", "poi_b": "c", "sourcePosition": [-71.10, 42.35], "targetPosition": [-71.08, 42.37],
         "dep": 5.0, "distance": 3.4, "cat_a": "Gym", "cat_b": "Library", "taxonomy_a": "Sports", "taxonomy_b": "Civic"},
        {"poi_a": "c", "poi_b": "d", "sourcePosition": [-71.08, 42.37], "targetPosition": [-71.02, 42.33],
         "dep": 9.0, "cat_a": "Library", "cat_b": "Park", "taxonomy_a": "Civic", "taxonomy_b": "Outdoors"}
    ]"#;

    fn loaded_view(body: &str) -> NetworkView<RecordingSurface> {
        let fetcher = Arc::new(MemoryFetch::default().with_file(NETWORK_FILE, body));
        let mut view = NetworkView::with_surface(fetcher, RecordingSurface::new(10.0));
        view.ensure_loaded();
        settle(&mut view);
        view
    }

    fn settle(view: &mut NetworkView<RecordingSurface>) {
        for _ in 0..500 {
            if view.poll() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("network load never settled");
    }

    fn poi_index(view: &NetworkView<RecordingSurface>, id: &str) -> usize {
        let data = view.state.ready().expect("network loaded");
        data.pois
            .iter()
            .position(|poi| poi.id == id)
            .expect("poi exists")
    }

    #[test]
    fn top_strength_bin_keeps_only_the_strongest_link() {
        let mut view = loaded_view(THREE_LINKS);
        assert_eq!(view.visible_links(), &[0, 1, 2]);

        let filter = NetworkFilter {
            strength: BinRange::new(5, 5),
            ..view.filter().clone()
        };
        view.set_filter(filter);
        assert_eq!(view.visible_links(), &[2]);
    }

    #[test]
    fn distance_defaults_span_the_known_extent() {
        let view = loaded_view(THREE_LINKS);
        assert_eq!(view.filter().distance_km, Some((1.2, 4.0)));
    }

    #[test]
    fn clicking_a_poi_toggles_focus() {
        let mut view = loaded_view(THREE_LINKS);
        let b = poi_index(&view, "b");

        view.click(Some(Pick::Poi(b)));
        assert_eq!(view.filter().focus.as_deref(), Some("b"));
        assert_eq!(view.visible_links(), &[0, 1]);

        view.click(Some(Pick::Poi(b)));
        assert_eq!(view.filter().focus, None);
        assert_eq!(view.visible_links().len(), 3);

        let a = poi_index(&view, "a");
        let c = poi_index(&view, "c");
        view.click(Some(Pick::Poi(a)));
        view.click(Some(Pick::Poi(c)));
        assert_eq!(view.filter().focus.as_deref(), Some("c"));
        assert!(view.visible_links().contains(&1));
        assert!(!view.visible_links().contains(&0));
    }

    #[test]
    fn clicking_a_link_or_empty_map_clears_focus() {
        let mut view = loaded_view(THREE_LINKS);
        let c = poi_index(&view, "c");

        view.click(Some(Pick::Poi(c)));
        view.click(Some(Pick::Link(0)));
        assert_eq!(view.filter().focus, None);

        view.click(Some(Pick::Poi(c)));
        view.click(None);
        assert_eq!(view.filter().focus, None);
    }

    #[test]
    fn layers_follow_the_filtered_subset() {
        let mut view = loaded_view(THREE_LINKS);
        view.sync_layers();
        assert_eq!(view.surface.uploads, 1);
        assert_eq!(view.surface.layers.get("poi-links").map(Layer::len), Some(3));
        assert_eq!(view.surface.layers.get("pois").map(Layer::len), Some(4));

        view.sync_layers();
        assert_eq!(view.surface.uploads, 1);

        let d = poi_index(&view, "d");
        view.click(Some(Pick::Poi(d)));
        view.sync_layers();
        assert_eq!(view.surface.uploads, 2);
        assert_eq!(view.surface.layers.get("poi-links").map(Layer::len), Some(1));
    }

    #[test]
    fn selected_poi_is_drawn_larger() {
        let mut view = loaded_view(THREE_LINKS);
        let a = poi_index(&view, "a");
        view.click(Some(Pick::Poi(a)));

        let layers = view.build_layers();
        let Some(Layer::Points(points)) = layers.get("pois") else {
            panic!("poi layer missing");
        };
        assert!(points.points[a].radius_m > points.points[(a + 1) % 4].radius_m);
        assert_eq!(points.points[a].fill, SELECTED_FILL);
    }

    #[test]
    fn tooltips_describe_links_and_pois() {
        let view = loaded_view(THREE_LINKS);
        assert_eq!(
            view.tooltip(Pick::Link(2)).as_deref(),
            Some("Library → Park\nStrength: Q5\nDistance: — km")
        );
        assert_eq!(
            view.tooltip(Pick::Link(0)).as_deref(),
            Some("Cafe → Gym\nStrength: Q1\nDistance: 1.20 km")
        );

        let a = poi_index(&view, "a");
        assert!(view
            .tooltip(Pick::Poi(a))
            .is_some_and(|text| text.starts_with("Cafe\n")));
    }

    #[test]
    fn zoom_commits_are_throttled_until_the_gesture_ends() {
        let mut view = loaded_view(THREE_LINKS);
        view.sync_layers();
        let start = Instant::now();

        view.surface.zoom = 10.5;
        assert_eq!(view.observe_zoom(start, false), None);
        view.surface.zoom = 11.0;
        assert_eq!(view.observe_zoom(start, true), Some(11.0));
        assert_eq!(view.committed_zoom(), 11.0);

        view.sync_layers();
        assert_eq!(view.surface.uploads, 2);
    }

    #[test]
    fn adopted_zoom_moves_the_surface() {
        let mut view = loaded_view(THREE_LINKS);
        view.adopt_zoom(13.0);
        assert_eq!(view.surface.zoom, 13.0);
        assert_eq!(view.committed_zoom(), 13.0);
    }

    #[test]
    fn missing_dataset_names_the_preprocess_command() {
        let fetcher = Arc::new(MemoryFetch::default());
        let mut view = NetworkView::with_surface(fetcher, RecordingSurface::new(10.0));
        view.ensure_loaded();
        settle(&mut view);

        let LoadState::Error(message) = &view.state else {
            panic!("expected an error state");
        };
        assert!(message.contains("HTTP 404"));
        assert!(message.ends_with("Run: Rscript scripts/preprocess_network.R (see README for details)."));
        assert!(view.build_layers().layers.is_empty());
    }

    #[test]
    fn empty_dataset_is_not_an_error() {
        let view = loaded_view("[]");
        assert!(matches!(view.state, LoadState::Ready(_)));
        assert!(view.visible_links().is_empty());
        assert!(view.build_layers().layers.is_empty());
        assert!(!view.filters_visible());
        assert!(loaded_view(THREE_LINKS).filters_visible());
    }
}
