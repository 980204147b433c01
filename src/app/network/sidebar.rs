use eframe::egui::{Align, Color32, Layout, RichText, Ui};

use crate::util::{UNKNOWN, format_count};

use super::super::filter::STRENGTH_BINS;
use super::super::render_utils::{DEPENDENCY_PALETTE, ramp_color};
use super::super::surface::MapSurface;
use super::super::ui::panels::{gradient_legend, section_label};
use super::super::ui::range::{
    min_gap_for, range_slider, slider_to_strength, strength_to_slider,
};
use super::super::ui::taxonomy::{apply_action, taxonomy_checklist};
use super::NetworkView;

const DISTANCE_STEP_KM: f64 = 0.1;

fn strength_rail() -> Vec<Color32> {
    (0..STRENGTH_BINS)
        .map(|bin| ramp_color(&DEPENDENCY_PALETTE, bin, STRENGTH_BINS, 255))
        .collect()
}

impl<S: MapSurface> NetworkView<S> {
    pub(in crate::app) fn draw_sidebar(&mut self, ui: &mut Ui) {
        ui.heading("Filters");
        ui.add_space(6.0);

        let Some(data) = self.state.ready().filter(|_| self.filters_visible()) else {
            ui.label(RichText::new("Filters appear once the network has loaded.").weak());
            return;
        };
        let mut filter = self.filter.clone();
        let rail = strength_rail();

        section_label(ui, "Strength");
        let mut strength = strength_to_slider(filter.strength);
        if range_slider(
            ui,
            "network_strength",
            &mut strength,
            (0.0, STRENGTH_BINS as f64),
            1.0,
            1.0,
            &rail,
        ) {
            filter.strength = slider_to_strength(strength);
        }
        ui.horizontal(|ui| {
            ui.label(RichText::new("low").small().weak());
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(RichText::new("high").small().weak());
            });
        });
        ui.add_space(8.0);

        section_label(ui, "Distance");
        let extent = data.distance_extent;
        let mut distance = filter.distance_km.unwrap_or(extent);
        if range_slider(
            ui,
            "network_distance",
            &mut distance,
            extent,
            DISTANCE_STEP_KM,
            min_gap_for(extent, DISTANCE_STEP_KM),
            &[],
        ) {
            filter.distance_km = Some(distance);
        }
        ui.label(RichText::new(format!("{:.1} km – {:.1} km", distance.0, distance.1)).small());
        ui.add_space(8.0);

        section_label(ui, "Place taxonomy");
        if let Some(action) = taxonomy_checklist(
            ui,
            "Origin",
            &data.taxonomies,
            &filter.origin_taxonomies,
            &mut self.origin_search,
        ) {
            apply_action(&mut filter.origin_taxonomies, action);
        }
        if let Some(action) = taxonomy_checklist(
            ui,
            "Destination",
            &data.taxonomies,
            &filter.destination_taxonomies,
            &mut self.destination_search,
        ) {
            apply_action(&mut filter.destination_taxonomies, action);
        }

        if let Some(focus) = filter.focus.as_deref() {
            ui.separator();
            let category = data
                .pois
                .iter()
                .find(|poi| poi.id == focus)
                .and_then(|poi| poi.category.as_deref())
                .unwrap_or(UNKNOWN);
            ui.label(format!("Only links to/from: {category}"));
            if ui.button("Show all links").clicked() {
                filter.focus = None;
            }
        }

        ui.separator();
        ui.label(
            RichText::new(format!(
                "{} of {} links shown",
                format_count(self.visible.len()),
                format_count(data.links.len())
            ))
            .small()
            .weak(),
        );
        ui.add_space(10.0);
        gradient_legend(ui, "Strength", &rail, "Low", "High");

        self.set_filter(filter);
    }
}
