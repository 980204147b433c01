use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui::{self, Align2, Color32, Id, RichText, Stroke, Ui, vec2};

use crate::data::{Fetch, GeoPoint, LANDING_FILE, LinkRecord, derive_pois, load_links};
use crate::util::smoothstep;

use super::filter::STRENGTH_BINS;
use super::layers::{Layer, LayerSet, LinePrimitive, LineLayer, PointLayer, PointPrimitive};
use super::load::{LoadReceiver, poll_load, spawn_load};
use super::quantile::QuantileScale;
use super::render_utils::{
    ACCENT, DEPENDENCY_PALETTE, LANDING_BACKGROUND, LANDING_DEPENDENCY_ALPHA, ramp_color,
};
use super::scale::{LANDING_POI_PIXELS, landing_arc_width_px, landing_poi_radius_m};
use super::surface::{EguiMapSurface, MapSurface};

const LANDING_CENTER: GeoPoint = GeoPoint::new(-71.11, 42.36);
const START_ZOOM: f64 = 11.0;
const END_ZOOM: f64 = 13.0;
const FLIGHT: Duration = Duration::from_secs(20);
const FRAME_INTERVAL: Duration = Duration::from_millis(42);

const POI_FILL: Color32 = Color32::WHITE;

const INTRO_PARAGRAPHS: [&str; 2] = [
    "Places in a city lean on each other through the people they share. \
     Mobility data reveals which businesses and amenities depend on which, \
     including ties that are easy to miss but carry real economic weight.",
    "Mapping these dependencies shows how a shock in one place, a closure \
     or a drop in demand, can travel across neighborhoods. Explore the \
     network and its cascades.",
];

/// Camera zoom of the intro flight, eased from the start to the end zoom.
pub(super) fn landing_zoom(elapsed: Duration) -> f64 {
    let t = elapsed.as_secs_f64() / FLIGHT.as_secs_f64();
    START_ZOOM + (END_ZOOM - START_ZOOM) * smoothstep(t)
}

/// Arcs for every link plus one dot per distinct endpoint, sized for the
/// start of the flight.
pub(super) fn landing_layers(links: &[LinkRecord]) -> LayerSet {
    let mut layers = LayerSet::default();
    if links.is_empty() {
        return layers;
    }

    let scale =
        QuantileScale::from_samples(links.iter().filter_map(|link| link.strength), STRENGTH_BINS);
    let lines = links
        .iter()
        .map(|link| LinePrimitive {
            source: link.source,
            target: link.target,
            color: ramp_color(
                &DEPENDENCY_PALETTE,
                scale.bin(link.strength),
                scale.bins(),
                LANDING_DEPENDENCY_ALPHA,
            ),
            pick: None,
        })
        .collect();
    layers.push(Layer::Lines(LineLayer {
        id: "landing-arcs",
        width_px: landing_arc_width_px(START_ZOOM) as f32,
        arc: true,
        lines,
    }));

    let points = derive_pois(links)
        .into_iter()
        .map(|poi| PointPrimitive {
            position: poi.position,
            radius_m: landing_poi_radius_m(START_ZOOM),
            fill: POI_FILL,
            outline: Stroke::NONE,
            pick: None,
        })
        .collect();
    layers.push(Layer::Points(PointLayer {
        id: "landing-pois",
        clamp: LANDING_POI_PIXELS,
        points,
    }));
    layers
}

/// Start page: a slowly zooming, non-interactive preview of the network
/// behind the intro text.
pub(super) struct LandingView {
    fetcher: Arc<dyn Fetch>,
    surface: EguiMapSurface,
    pending: Option<LoadReceiver<Vec<LinkRecord>>>,
    requested: bool,
    started: Option<Instant>,
}

impl LandingView {
    pub(super) fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            fetcher,
            surface: EguiMapSurface::passive(LANDING_CENTER, START_ZOOM, LANDING_BACKGROUND),
            pending: None,
            requested: false,
            started: None,
        }
    }

    fn ensure_loaded(&mut self) {
        if self.requested {
            return;
        }
        self.requested = true;
        let fetcher = Arc::clone(&self.fetcher);
        self.pending = Some(spawn_load(move || load_links(fetcher.as_ref(), LANDING_FILE)));
    }

    fn poll(&mut self) {
        let Some(result) = self.pending.as_ref().and_then(poll_load) else {
            return;
        };
        self.pending = None;

        match result {
            Ok(links) => self.surface.set_layers(landing_layers(&links)),
            // The preview is decoration; a missing file leaves the background empty.
            Err(error) => tracing::warn!(%error, "landing preview unavailable"),
        }
    }

    /// Restarts the intro flight, e.g. when returning from a story.
    pub(super) fn restart(&mut self) {
        self.started = None;
        self.surface.set_zoom(START_ZOOM);
    }

    /// Draws the page. Returns true when the user asks to start exploring.
    pub(super) fn show(&mut self, ui: &mut Ui) -> bool {
        self.ensure_loaded();
        self.poll();

        let started = *self.started.get_or_insert_with(Instant::now);
        let elapsed = started.elapsed();
        self.surface.set_zoom(landing_zoom(elapsed));
        if elapsed < FLIGHT || self.pending.is_some() {
            ui.ctx().request_repaint_after(FRAME_INTERVAL);
        }

        self.surface.show(ui);
        intro_card(ui.ctx())
    }
}

fn intro_card(ctx: &egui::Context) -> bool {
    let mut start = false;
    egui::Area::new(Id::new("landing_intro"))
        .anchor(Align2::LEFT_CENTER, vec2(48.0, 0.0))
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(Color32::from_black_alpha(170))
                .corner_radius(12.0)
                .inner_margin(24.0)
                .show(ui, |ui| {
                    ui.set_max_width(440.0);
                    ui.label(
                        RichText::new("Invisible Urban Dependencies")
                            .size(30.0)
                            .strong()
                            .color(Color32::WHITE),
                    );
                    ui.label(
                        RichText::new("How human behavior shapes economic resilience in cities")
                            .size(17.0)
                            .color(Color32::from_gray(220)),
                    );
                    for paragraph in INTRO_PARAGRAPHS {
                        ui.add_space(8.0);
                        ui.label(paragraph);
                    }
                    ui.add_space(14.0);
                    let button = egui::Button::new(
                        RichText::new("Start exploring →").size(16.0).color(Color32::WHITE),
                    )
                    .fill(ACCENT)
                    .corner_radius(8.0);
                    start = ui.add(button).clicked();
                    ui.add_space(14.0);
                    ui.label(
                        RichText::new("A story map by SUNLab at Northeastern University, in collaboration with NYU")
                            .small()
                            .weak(),
                    );
                });
        });
    start
}

#[cfg(test)]
mod tests {
    use crate::data::fixtures::link;

    use super::*;

    #[test]
    fn flight_eases_between_the_end_zooms() {
        assert_eq!(landing_zoom(Duration::ZERO), START_ZOOM);
        assert_eq!(landing_zoom(FLIGHT / 2), 12.0);
        assert_eq!(landing_zoom(FLIGHT), END_ZOOM);
        assert_eq!(landing_zoom(FLIGHT * 3), END_ZOOM);
        assert!(landing_zoom(Duration::from_secs(1)) - START_ZOOM < 0.02);
    }

    #[test]
    fn preview_has_arcs_and_distinct_endpoints() {
        let links = vec![link("a", "b", 1.0, 1.0), link("b", "c", 9.0, 2.0)];
        let layers = landing_layers(&links);

        let Some(Layer::Lines(arcs)) = layers.get("landing-arcs") else {
            panic!("missing arc layer");
        };
        assert!(arcs.arc);
        assert_eq!(arcs.lines.len(), 2);
        assert_ne!(arcs.lines[0].color, arcs.lines[1].color);
        assert!(arcs.lines.iter().all(|line| line.pick.is_none()));

        let Some(Layer::Points(pois)) = layers.get("landing-pois") else {
            panic!("missing POI layer");
        };
        assert_eq!(pois.points.len(), 3);
        assert!(pois.points.iter().all(|point| point.fill == Color32::WHITE));
    }

    #[test]
    fn intro_text_wraps_as_single_lines() {
        for paragraph in INTRO_PARAGRAPHS {
            assert!(!paragraph.contains('\n'));
            assert!(!paragraph.contains("  "));
        }
    }

    #[test]
    fn empty_dataset_draws_nothing() {
        assert_eq!(landing_layers(&[]).layers.len(), 0);
    }
}
