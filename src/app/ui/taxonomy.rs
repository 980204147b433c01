use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::util::format_count;

const LIST_MAX_HEIGHT: f32 = 220.0;
const SELECTED_BAR: Color32 = Color32::from_rgb(34, 197, 94);

#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) enum TaxonomyAction {
    Toggle(String),
    Clear,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Options matching the search box, in their original order. A blank query
/// matches everything.
pub(in crate::app) fn matching_options<'a>(names: impl IntoIterator<Item = &'a str>, query: &str) -> Vec<&'a str> {
    let query = query.trim();
    if query.is_empty() {
        return names.into_iter().collect();
    }

    let matcher = SkimMatcherV2::default();
    names
        .into_iter()
        .filter(|name| fuzzy_match_score(&matcher, name, query).is_some())
        .collect()
}

/// Short description of a selection: `All`, the single name, or a count.
pub(in crate::app) fn selection_summary(selected: &BTreeSet<String>) -> String {
    match selected.len() {
        0 => "All".to_owned(),
        1 => selected.iter().next().cloned().unwrap_or_default(),
        count => format!("{count} selected"),
    }
}

fn search_box(ui: &mut Ui, search: &mut String) {
    ui.add(
        egui::TextEdit::singleline(search)
            .hint_text("Search taxonomies")
            .desired_width(f32::INFINITY),
    );
}

/// Collapsible checkbox list, as used for origin and destination taxonomies.
pub(in crate::app) fn taxonomy_checklist(
    ui: &mut Ui,
    label: &str,
    options: &[String],
    selected: &BTreeSet<String>,
    search: &mut String,
) -> Option<TaxonomyAction> {
    let mut action = None;
    egui::CollapsingHeader::new(format!("{label}: {}", selection_summary(selected)))
        .id_salt(label)
        .show(ui, |ui| {
            search_box(ui, search);
            if !selected.is_empty() && ui.small_button("Clear").clicked() {
                action = Some(TaxonomyAction::Clear);
            }

            egui::ScrollArea::vertical()
                .id_salt((label, "options"))
                .max_height(LIST_MAX_HEIGHT)
                .show(ui, |ui| {
                    for name in matching_options(options.iter().map(String::as_str), search) {
                        let mut checked = selected.contains(name);
                        if ui.checkbox(&mut checked, name).changed() {
                            action = Some(TaxonomyAction::Toggle(name.to_owned()));
                        }
                    }
                });
        });
    action
}

/// Taxonomy rows with counts and a proportional bar; clicking a row toggles
/// it.
pub(in crate::app) fn taxonomy_count_list(
    ui: &mut Ui,
    options: &[(String, usize)],
    selected: &BTreeSet<String>,
    search: &mut String,
) -> Option<TaxonomyAction> {
    let mut action = None;
    search_box(ui, search);

    ui.horizontal(|ui| {
        let summary = if selected.is_empty() {
            "Showing all taxonomies".to_owned()
        } else {
            format!("{} selected", selected.len())
        };
        ui.label(RichText::new(summary).small().weak());
        if !selected.is_empty() && ui.small_button("Clear").clicked() {
            action = Some(TaxonomyAction::Clear);
        }
    });

    let max_count = options.iter().map(|(_, count)| *count).max().unwrap_or(0).max(1);
    let visible = matching_options(options.iter().map(|(name, _)| name.as_str()), search);
    egui::ScrollArea::vertical()
        .id_salt("taxonomy_counts")
        .max_height(LIST_MAX_HEIGHT * 1.5)
        .show(ui, |ui| {
            for (name, count) in options.iter().filter(|(name, _)| visible.contains(&name.as_str())) {
                let is_selected = selected.contains(name);
                let row = ui
                    .vertical(|ui| {
                        ui.horizontal(|ui| {
                            let text = RichText::new(name).small();
                            ui.label(if is_selected { text.strong() } else { text });
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                ui.label(RichText::new(format_count(*count)).small().weak());
                            });
                        });
                        let (bar, _) = ui.allocate_exact_size(
                            vec2(ui.available_width(), 6.0),
                            egui::Sense::hover(),
                        );
                        ui.painter().rect_filled(bar, 2.0, Color32::from_white_alpha(38));
                        let mut fill = bar;
                        fill.set_width(bar.width() * (*count as f32 / max_count as f32));
                        let color = if is_selected {
                            SELECTED_BAR
                        } else {
                            Color32::from_white_alpha(90)
                        };
                        ui.painter().rect_filled(fill, 2.0, color);
                    })
                    .response
                    .interact(egui::Sense::click());
                if row.clicked() {
                    action = Some(TaxonomyAction::Toggle(name.clone()));
                }
            }
        });
    action
}

pub(in crate::app) fn apply_action(selected: &mut BTreeSet<String>, action: TaxonomyAction) {
    match action {
        TaxonomyAction::Toggle(name) => {
            if !selected.remove(&name) {
                selected.insert(name);
            }
        }
        TaxonomyAction::Clear => selected.clear(),
    }
}
