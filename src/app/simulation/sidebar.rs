use eframe::egui::{self, Align, Color32, Layout, RichText, Stroke, Ui};

use crate::data::Scenario;

use super::super::render_utils::{IMPACT_PALETTE, palette_color};
use super::super::surface::MapSurface;
use super::super::ui::panels::{gradient_legend, section_label};
use super::super::ui::range::{
    IMPACT_SLIDER_STEP, Thumb, enforce_min_gap, impact_to_slider, range_slider, slider_to_impact,
};
use super::super::ui::taxonomy::{TaxonomyAction, taxonomy_count_list};
use super::SimulationView;

fn impact_rail() -> Vec<Color32> {
    (0..IMPACT_PALETTE.len())
        .map(|index| palette_color(&IMPACT_PALETTE, index, 255))
        .collect()
}

/// Maps dragged slider positions back to an ordered impact range.
fn impact_range_from_slider(position: (f64, f64), extent: (f64, f64)) -> (f64, f64) {
    let (low, high) = enforce_min_gap(position, (0.0, 1.0), IMPACT_SLIDER_STEP, Thumb::High);
    let low = slider_to_impact(low, extent);
    let high = slider_to_impact(high, extent);
    (low.min(high), low.max(high))
}

impl<S: MapSurface> SimulationView<S> {
    pub(in crate::app) fn draw_sidebar(&mut self, ui: &mut Ui) {
        ui.heading("Filters");
        ui.add_space(6.0);

        section_label(ui, "Scenario");
        let mut requested = None;
        ui.horizontal(|ui| {
            for scenario in Scenario::ALL {
                let active = scenario == self.scenario;
                let button = egui::Button::new(scenario.label())
                    .corner_radius(999.0)
                    .selected(active)
                    .stroke(Stroke::new(
                        1.0,
                        Color32::from_white_alpha(if active { 230 } else { 76 }),
                    ));
                if ui.add(button).clicked() {
                    requested = Some(scenario);
                }
            }
        });
        ui.label(RichText::new(self.scenario.note()).small().weak());
        if let Some(scenario) = requested {
            self.select_scenario(scenario);
        }
        ui.add_space(8.0);

        let Some(data) = self.state.ready().filter(|_| self.filters_visible()) else {
            if self.is_loading() {
                ui.spinner();
            }
            return;
        };
        let mut filter = self.filter.clone();

        if let (Some(extent), Some(range)) = (data.impact_extent, filter.impact_range) {
            section_label(ui, "Impact");
            let mut position = (impact_to_slider(range.0, extent), impact_to_slider(range.1, extent));
            if range_slider(
                ui,
                "simulation_impact",
                &mut position,
                (0.0, 1.0),
                IMPACT_SLIDER_STEP,
                IMPACT_SLIDER_STEP,
                &[],
            ) {
                filter.impact_range = Some(impact_range_from_slider(position, extent));
            }
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("{:.1}%", extent.0)).small().weak());
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(RichText::new(format!("{:.1}%", extent.1)).small().weak());
                });
            });
            ui.add_space(8.0);
        }

        section_label(ui, "Place taxonomy");
        ui.label(
            RichText::new("Select the POI taxonomy you'd like to visualise")
                .small()
                .weak(),
        );
        let options = self
            .counts
            .iter()
            .map(|count| (count.name.clone(), count.count))
            .collect::<Vec<_>>();
        match taxonomy_count_list(ui, &options, &filter.taxonomies, &mut self.taxonomy_search) {
            Some(TaxonomyAction::Toggle(name)) => filter.toggle_taxonomy(&name),
            Some(TaxonomyAction::Clear) => filter.taxonomies.clear(),
            None => {}
        }

        ui.add_space(10.0);
        gradient_legend(ui, "Impact", &impact_rail(), "High", "Low");

        self.set_filter(filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_positions_map_to_an_ordered_range() {
        let extent = (-100.0, 0.0);
        assert_eq!(impact_range_from_slider((0.0, 1.0), extent), (-100.0, 0.0));

        let (low, high) = impact_range_from_slider((0.5, 0.5), extent);
        assert!(low < high);
        assert!(high <= 0.0);
    }

    #[test]
    fn rail_matches_the_impact_palette() {
        let rail = impact_rail();
        assert_eq!(rail.len(), 6);
        assert_eq!(rail[0], Color32::from_rgb(127, 0, 0));
    }
}
