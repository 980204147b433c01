use eframe::egui::{
    self, Align, Align2, Color32, Context, Id, Layout, Pos2, Rect, RichText, Sense, Ui, vec2,
};

use super::super::Story;
use super::super::render_utils::{ACCENT, NAV_ACTIVE};

const ERROR_TEXT: Color32 = Color32::from_rgb(255, 138, 128);
const BANNER_OFFSET_Y: f32 = 72.0;
const BANNER_MAX_WIDTH: f32 = 520.0;
const LEGEND_HEIGHT: f32 = 10.0;
const MODAL_WIDTH: f32 = 560.0;

const PAPER_CITATION: &str = "Behavior-based dependency networks between places shape urban \
    economic resilience. Yabe, T., Garcia-Bulle, B., Frank, M., Pentland, A., & Moro, E. \
    Nature Human Behavior 9, 496–506 (2025).";
const PAPER_URL: &str = "https://doi.org/10.1038/s41562-024-02072-7";
const LAB_URL: &str = "https://socialurban.net";
const RESEARCH_TEAM: [&str; 5] = [
    "Esteban Moro",
    "Takahiro Yabe",
    "Bernardo García",
    "Morgan Frank",
    "Sandy Pentland",
];

pub(in crate::app) enum Status<'a> {
    Loading(&'a str),
    Error(&'a str),
    Empty(&'a str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum InfoTab {
    Methods,
    Research,
    About,
}

impl InfoTab {
    const ALL: [Self; 3] = [Self::Methods, Self::Research, Self::About];

    fn label(self) -> &'static str {
        match self {
            Self::Methods => "Methods",
            Self::Research => "Research",
            Self::About => "About",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum NavAction {
    Home,
    Story(Story),
    Info(InfoTab),
}

/// Floating banner over the top of the map for load progress, failures and
/// empty datasets.
pub(in crate::app) fn status_banner(ctx: &Context, id: &str, status: &Status) {
    egui::Area::new(Id::new(id))
        .anchor(Align2::CENTER_TOP, vec2(0.0, BANNER_OFFSET_Y))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_max_width(BANNER_MAX_WIDTH);
                match status {
                    Status::Loading(text) => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(*text);
                        });
                    }
                    Status::Error(text) => {
                        ui.label(RichText::new(*text).color(ERROR_TEXT));
                    }
                    Status::Empty(text) => {
                        ui.label(RichText::new(*text).weak());
                    }
                }
            });
        });
}

pub(in crate::app) fn section_label(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).strong());
    ui.add_space(2.0);
}

/// Titled color bar with labels under both ends.
pub(in crate::app) fn gradient_legend(
    ui: &mut Ui,
    title: &str,
    colors: &[Color32],
    left_label: &str,
    right_label: &str,
) {
    section_label(ui, title);
    let (rect, _) = ui.allocate_exact_size(vec2(ui.available_width(), LEGEND_HEIGHT), Sense::hover());
    if !colors.is_empty() {
        let segment = rect.width() / colors.len() as f32;
        for (index, color) in colors.iter().enumerate() {
            let left = rect.left() + segment * index as f32;
            let cell = Rect::from_min_max(
                Pos2::new(left, rect.top()),
                Pos2::new(left + segment, rect.bottom()),
            );
            ui.painter().rect_filled(cell, 0.0, *color);
        }
    }
    ui.horizontal(|ui| {
        ui.label(RichText::new(left_label).small().weak());
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.label(RichText::new(right_label).small().weak());
        });
    });
}

fn nav_button(ui: &mut Ui, text: &str, active: bool) -> bool {
    let text = if active {
        RichText::new(text).strong().color(NAV_ACTIVE)
    } else {
        RichText::new(text)
    };
    ui.add(egui::Button::new(text).frame(false)).clicked()
}

pub(in crate::app) fn top_bar(ctx: &Context, active: Story, open_info: Option<InfoTab>) -> Option<NavAction> {
    let mut action = None;
    egui::TopBottomPanel::top("top_bar")
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .add(egui::Button::new(RichText::new("⌂").heading()).frame(false))
                    .on_hover_text("Back to the start page")
                    .clicked()
                {
                    action = Some(NavAction::Home);
                }
                ui.separator();
                for story in Story::ALL {
                    if nav_button(ui, story.title(), story == active) {
                        action = Some(NavAction::Story(story));
                    }
                }
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    for tab in InfoTab::ALL.into_iter().rev() {
                        if nav_button(ui, tab.label(), open_info == Some(tab)) {
                            action = Some(NavAction::Info(tab));
                        }
                    }
                });
            });
        });
    action
}

/// Shows the informational window. Returns false once the user closes it.
pub(in crate::app) fn info_modal(ctx: &Context, tab: InfoTab, story: Story) -> bool {
    let mut open = true;
    egui::Window::new(tab.label())
        .id(Id::new("info_modal"))
        .collapsible(false)
        .resizable(false)
        .default_width(MODAL_WIDTH)
        .anchor(Align2::CENTER_CENTER, vec2(0.0, 0.0))
        .open(&mut open)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().max_height(480.0).show(ui, |ui| match tab {
                InfoTab::Methods => methods_content(ui, story),
                InfoTab::Research => research_content(ui),
                InfoTab::About => about_content(ui),
            });
        });
    open
}

fn modal_heading(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).heading().color(ACCENT));
    ui.add_space(6.0);
}

fn methods_content(ui: &mut Ui, story: Story) {
    match story {
        Story::Network => {
            modal_heading(ui, "Mapping Place-to-Place Dependencies");
            ui.label(
                "Each link joins two places whose visitors overlap far more than chance \
                 would predict. Dependency strength comes from anonymised mobility traces: \
                 how often a visit to one place is tied to a visit to the other.",
            );
            ui.add_space(6.0);
            ui.label(
                "Links are colored by strength quintile. Use the filters to narrow the \
                 map by strength, distance and the kind of place at either end, or click \
                 a place to keep only its own links.",
            );
        }
        Story::Simulation => {
            modal_heading(ui, "How economic shocks propagate");
            ui.label(
                "A scenario closes a set of places, or cuts their attendance, and follows \
                 the lost visits through the dependency network to the places that rely \
                 on them.",
            );
            ui.add_space(6.0);
            ui.label(
                "Closed places are drawn in blue. Every other place is colored by its \
                 estimated change in visits; darker red means a larger loss.",
            );
            ui.add_space(6.0);
            ui.label(
                "Seeing where a shock travels helps cities prepare essential services and \
                 local businesses for disruption.",
            );
        }
    }
}

fn research_content(ui: &mut Ui) {
    modal_heading(ui, "Research");
    ui.label("This story map is based on the following paper:");
    ui.add_space(6.0);
    ui.label(RichText::new(PAPER_CITATION).italics());
    ui.hyperlink_to(PAPER_URL, PAPER_URL);
}

fn about_content(ui: &mut Ui) {
    modal_heading(ui, "About");
    ui.horizontal_wrapped(|ui| {
        ui.label("Built by");
        ui.hyperlink_to("SUNLab", LAB_URL);
        ui.label("at the Network Science Institute, Northeastern University, with NYU Tandon, MIT and the University of Pittsburgh.");
    });
    ui.add_space(8.0);
    ui.label(RichText::new("Research Team").strong());
    for member in RESEARCH_TEAM {
        ui.label(member);
    }
}
