use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use eframe::egui::{Color32, Stroke, Ui};

use crate::data::{Fetch, GeoBounds, PoiRecord, Scenario, ScenarioData, load_scenario};
use crate::util::{UNKNOWN, format_percent};

use super::camera::BOSTON_CENTER;
use super::filter::{
    SimulationFilter, TaxonomyCount, filter_impact_pois, impact_extent, impact_scale,
    quantile_sample, taxonomy_counts,
};
use super::layers::{Layer, LayerSet, Pick, PointLayer, PointPrimitive};
use super::load::{LoadReceiver, LoadState, load_error_message, poll_load, spawn_load};
use super::quantile::QuantileScale;
use super::render_utils::{CLOSED_FILL, IMPACT_ALPHA, IMPACT_PALETTE, MAP_BACKGROUND, palette_color};
use super::scale::{CLOSED_POI_PIXELS, IMPACT_POI_PIXELS, closed_poi_radius_m, impact_poi_radius_m};
use super::surface::{EguiMapSurface, MapSurface};
use super::ui::panels::{Status, status_banner};

mod sidebar;

const IMPACT_OUTLINE: Color32 = Color32::from_rgba_premultiplied(120, 120, 120, 120);
const CLOSED_OUTLINE: Color32 = Color32::from_rgba_premultiplied(200, 200, 200, 200);

/// One scenario's records as displayed, with lookups derived on commit.
pub(super) struct SimulationData {
    records: Arc<ScenarioData>,
    closed_ids: HashSet<String>,
    impact_extent: Option<(f64, f64)>,
}

impl SimulationData {
    fn new(records: Arc<ScenarioData>) -> Self {
        Self {
            closed_ids: records.closed.iter().map(|poi| poi.id.clone()).collect(),
            impact_extent: impact_extent(&records.impact),
            records,
        }
    }

    fn is_empty(&self) -> bool {
        self.records.closed.is_empty() && self.records.impact.is_empty()
    }
}

/// Shock-cascade controller: scenario selection and caching, impact and
/// taxonomy filters, and the two point layers.
pub(super) struct SimulationView<S = EguiMapSurface> {
    fetcher: Arc<dyn Fetch>,
    surface: S,
    scenario: Scenario,
    cache: HashMap<Scenario, Arc<ScenarioData>>,
    pending: HashMap<Scenario, LoadReceiver<ScenarioData>>,
    state: LoadState<SimulationData>,
    filter: SimulationFilter,
    zoom: f64,
    bounds: Option<GeoBounds>,
    color_scale: QuantileScale,
    visible: Vec<usize>,
    counts: Vec<TaxonomyCount>,
    layers_dirty: bool,
    taxonomy_search: String,
}

impl SimulationView {
    pub(super) fn new(fetcher: Arc<dyn Fetch>, zoom: f64) -> Self {
        Self::with_surface(fetcher, EguiMapSurface::new(BOSTON_CENTER, zoom, MAP_BACKGROUND))
    }

    /// Draws the map. Zoom and viewport are committed when a gesture ends;
    /// returns the committed zoom when it changed.
    pub(super) fn show_map(&mut self, ui: &mut Ui) -> Option<f64> {
        self.sync_layers();
        let frame = self.surface.show(ui);

        let committed = if frame.gesture_ended || self.bounds.is_none() {
            self.commit_view()
        } else {
            None
        };

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
            LoadState::Loading => Status::Loading("Loading simulation…"),
            LoadState::Error(error) => Status::Error(error),
            LoadState::Ready(data) if data.is_empty() => {
                Status::Empty("No places in this scenario.")
            }
            _ => return,
        };
        status_banner(ui.ctx(), "simulation_status", &status);
    }
}

impl<S: MapSurface> SimulationView<S> {
    pub(super) fn with_surface(fetcher: Arc<dyn Fetch>, surface: S) -> Self {
        let zoom = surface.zoom();
        Self {
            fetcher,
            surface,
            scenario: Scenario::Airports,
            cache: HashMap::new(),
            pending: HashMap::new(),
            state: LoadState::Idle,
            filter: SimulationFilter::default(),
            zoom,
            bounds: None,
            color_scale: QuantileScale::default(),
            visible: Vec::new(),
            counts: Vec::new(),
            layers_dirty: true,
            taxonomy_search: String::new(),
        }
    }

    pub(super) fn ensure_loaded(&mut self) {
        if matches!(self.state, LoadState::Idle) {
            self.activate(self.scenario);
        }
    }

    #[cfg(test)]
    pub(super) fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// Switches the displayed scenario. Cached data is shown immediately;
    /// otherwise a fetch starts unless one is already in flight.
    pub(super) fn select_scenario(&mut self, scenario: Scenario) {
        if scenario == self.scenario && !matches!(self.state, LoadState::Idle) {
            return;
        }
        tracing::info!(scenario = scenario.id(), "switching scenario");
        self.activate(scenario);
    }

    fn activate(&mut self, scenario: Scenario) {
        self.scenario = scenario;
        self.filter = SimulationFilter::default();
        self.taxonomy_search.clear();

        if let Some(records) = self.cache.get(&scenario) {
            self.commit(Arc::clone(records));
            return;
        }

        self.state = LoadState::Loading;
        self.refresh();
        if !self.pending.contains_key(&scenario) {
            let fetcher = Arc::clone(&self.fetcher);
            let rx = spawn_load(move || load_scenario(fetcher.as_ref(), scenario));
            self.pending.insert(scenario, rx);
            tracing::info!(scenario = scenario.id(), "fetching scenario datasets");
        }
    }

    fn commit(&mut self, records: Arc<ScenarioData>) {
        let data = SimulationData::new(records);
        self.filter = SimulationFilter::defaults_for(&data.records.impact);
        self.state = LoadState::Ready(data);
        self.refresh();
    }

    /// Collects finished fetches. Every success is cached under its own
    /// scenario; only the active scenario's result is displayed.
    pub(super) fn poll(&mut self) -> bool {
        let finished = self
            .pending
            .iter()
            .filter_map(|(scenario, rx)| poll_load(rx).map(|result| (*scenario, result)))
            .collect::<Vec<_>>();

        let mut changed = false;
        for (scenario, result) in finished {
            self.pending.remove(&scenario);
            let active = scenario == self.scenario;

            match result {
                Ok(records) => {
                    let records = Arc::new(records);
                    self.cache.insert(scenario, Arc::clone(&records));
                    if active {
                        self.commit(records);
                        changed = true;
                    } else {
                        tracing::debug!(scenario = scenario.id(), "cached response for inactive scenario");
                    }
                }
                Err(error) => {
                    tracing::warn!(scenario = scenario.id(), %error, "scenario failed to load");
                    if active {
                        self.state =
                            LoadState::Error(load_error_message(&error, scenario.preprocess_cmd()));
                        self.refresh();
                        changed = true;
                    }
                }
            }
        }
        changed
    }

    pub(super) fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Filters are hidden until the active scenario has places to show.
    pub(super) fn filters_visible(&self) -> bool {
        self.state.ready().is_some_and(|data| !data.is_empty())
    }

    #[cfg(test)]
    pub(super) fn filter(&self) -> &SimulationFilter {
        &self.filter
    }

    pub(super) fn set_filter(&mut self, filter: SimulationFilter) {
        if filter != self.filter {
            self.filter = filter;
            self.refresh();
        }
    }

    #[cfg(test)]
    pub(super) fn visible_pois(&self) -> &[usize] {
        &self.visible
    }

    #[cfg(test)]
    pub(super) fn taxonomy_counts(&self) -> &[TaxonomyCount] {
        &self.counts
    }

    pub(super) fn commit_view(&mut self) -> Option<f64> {
        let zoom = self.surface.zoom();
        self.bounds = Some(self.surface.bounds());
        let changed = zoom != self.zoom;
        self.zoom = zoom;
        self.refresh();
        changed.then_some(zoom)
    }

    pub(super) fn adopt_zoom(&mut self, zoom: f64) {
        if zoom == self.zoom && zoom == self.surface.zoom() {
            return;
        }
        self.surface.set_zoom(zoom);
        self.zoom = zoom;
        self.bounds = Some(self.surface.bounds());
        self.refresh();
    }

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

        if !self.visible.is_empty() && !self.color_scale.is_empty() {
            let radius_m = impact_poi_radius_m(self.zoom);
            let points = self
                .visible
                .iter()
                .filter_map(|&index| data.records.impact.get(index).map(|poi| (index, poi)))
                .map(|(index, poi)| PointPrimitive {
                    position: poi.position,
                    radius_m,
                    fill: palette_color(
                        &IMPACT_PALETTE,
                        self.color_scale.bin(poi.clamped_impact()),
                        IMPACT_ALPHA,
                    ),
                    outline: Stroke::new(1.0, IMPACT_OUTLINE),
                    pick: Some(Pick::ImpactPoi(index)),
                })
                .collect();
            layers.push(Layer::Points(PointLayer {
                id: "impact-pois",
                clamp: IMPACT_POI_PIXELS,
                points,
            }));
        }

        if !data.records.closed.is_empty() {
            let radius_m = closed_poi_radius_m(self.zoom);
            let points = data
                .records
                .closed
                .iter()
                .enumerate()
                .map(|(index, poi)| PointPrimitive {
                    position: poi.position,
                    radius_m,
                    fill: CLOSED_FILL,
                    outline: Stroke::new(2.0, CLOSED_OUTLINE),
                    pick: Some(Pick::ClosedPoi(index)),
                })
                .collect();
            layers.push(Layer::Points(PointLayer {
                id: "closed-pois",
                clamp: CLOSED_POI_PIXELS,
                points,
            }));
        }

        layers
    }

    pub(super) fn tooltip(&self, pick: Pick) -> Option<String> {
        let data = self.state.ready()?;
        let poi = match pick {
            Pick::ClosedPoi(index) => data.records.closed.get(index)?,
            Pick::ImpactPoi(index) => data.records.impact.get(index)?,
            Pick::Link(_) | Pick::Poi(_) => return None,
        };

        if matches!(pick, Pick::ClosedPoi(_)) || data.closed_ids.contains(&poi.id) {
            return Some(self.closed_tooltip(poi));
        }
        Some(format!(
            "{}\nImpact: {}",
            poi.category.as_deref().unwrap_or(UNKNOWN),
            format_percent(poi.clamped_impact())
        ))
    }

    fn closed_tooltip(&self, poi: &PoiRecord) -> String {
        match self.scenario {
            Scenario::Colleges => "College\n- 50% visits".to_owned(),
            Scenario::Airports => {
                format!("Closed\n{}", poi.category.as_deref().unwrap_or(UNKNOWN))
            }
        }
    }

    /// Recomputes colors, the visible subset and the taxonomy counts.
    fn refresh(&mut self) {
        match self.state.ready() {
            Some(data) => {
                let impact = &data.records.impact;
                let sample = quantile_sample(impact, &self.filter.taxonomies);
                self.color_scale = impact_scale(impact, &sample);
                self.visible = filter_impact_pois(impact, &self.filter);
                self.counts = taxonomy_counts(impact, self.filter.impact_range, self.bounds);
            }
            None => {
                self.color_scale = QuantileScale::default();
                self.visible.clear();
                self.counts.clear();
            }
        }
        self.layers_dirty = true;
    }
}
