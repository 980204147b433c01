use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Context};

use crate::data::Fetch;

mod camera;
mod filter;
mod landing;
mod layers;
mod load;
mod network;
mod quantile;
mod render_utils;
mod scale;
mod simulation;
mod surface;
mod throttle;
mod ui;

use landing::LandingView;
use network::NetworkView;
use simulation::SimulationView;
use ui::panels::{InfoTab, NavAction, info_modal, top_bar};

const SIDEBAR_WIDTH: f32 = 320.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Story {
    /// Place-to-place dependency network.
    Network,
    /// Closure scenarios and their impact.
    Simulation,
}

impl Story {
    const ALL: [Self; 2] = [Self::Network, Self::Simulation];

    fn title(self) -> &'static str {
        match self {
            Self::Network => "Dependency map",
            Self::Simulation => "Shock cascades",
        }
    }
}

pub struct AppOptions {
    pub zoom: f64,
    pub skip_landing: bool,
    pub story: Story,
}

enum Screen {
    Landing,
    Story,
}

pub struct StoryMapApp {
    screen: Screen,
    story: Story,
    landing: LandingView,
    network: NetworkView,
    simulation: SimulationView,
    /// Last zoom committed by whichever map was visible.
    shared_zoom: f64,
    info: Option<InfoTab>,
    methods_shown: HashSet<Story>,
}

impl StoryMapApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, fetcher: Arc<dyn Fetch>, options: AppOptions) -> Self {
        let mut app = Self {
            screen: Screen::Landing,
            story: options.story,
            landing: LandingView::new(Arc::clone(&fetcher)),
            network: NetworkView::new(Arc::clone(&fetcher), options.zoom),
            simulation: SimulationView::new(fetcher, options.zoom),
            shared_zoom: options.zoom,
            info: None,
            methods_shown: HashSet::new(),
        };
        if options.skip_landing {
            app.enter_story(options.story);
        }
        app
    }

    fn enter_story(&mut self, story: Story) {
        self.screen = Screen::Story;
        self.story = story;
        match story {
            Story::Network => self.network.adopt_zoom(self.shared_zoom),
            Story::Simulation => self.simulation.adopt_zoom(self.shared_zoom),
        }
        if self.methods_shown.insert(story) {
            self.info = Some(InfoTab::Methods);
        }
        tracing::info!(story = story.title(), "showing story");
    }

    fn handle_nav(&mut self, action: NavAction) {
        match action {
            NavAction::Home => {
                self.screen = Screen::Landing;
                self.info = None;
                self.landing.restart();
            }
            NavAction::Story(story) if story != self.story => self.enter_story(story),
            NavAction::Story(_) => {}
            NavAction::Info(tab) => {
                self.info = if self.info == Some(tab) { None } else { Some(tab) };
            }
        }
    }

    fn show_story(&mut self, ctx: &Context) {
        if let Some(action) = top_bar(ctx, self.story, self.info) {
            self.handle_nav(action);
            if matches!(self.screen, Screen::Landing) {
                return;
            }
        }

        match self.story {
            Story::Network => self.network.ensure_loaded(),
            Story::Simulation => self.simulation.ensure_loaded(),
        }
        let changed = self.network.poll() | self.simulation.poll();
        if changed || self.network.is_loading() || self.simulation.is_loading() {
            ctx.request_repaint();
        }

        egui::SidePanel::right("filters")
            .resizable(true)
            .default_width(SIDEBAR_WIDTH)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| match self.story {
                    Story::Network => self.network.draw_sidebar(ui),
                    Story::Simulation => self.simulation.draw_sidebar(ui),
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let committed = match self.story {
                    Story::Network => self.network.show_map(ui),
                    Story::Simulation => self.simulation.show_map(ui),
                };
                if let Some(zoom) = committed {
                    self.shared_zoom = zoom;
                }
            });

        if let Some(tab) = self.info {
            if !info_modal(ctx, tab, self.story) {
                self.info = None;
            }
        }
    }
}

impl eframe::App for StoryMapApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        match self.screen {
            Screen::Landing => {
                let mut start = false;
                egui::CentralPanel::default()
                    .frame(egui::Frame::NONE)
                    .show(ctx, |ui| start = self.landing.show(ui));
                if start {
                    self.enter_story(self.story);
                }
            }
            Screen::Story => self.show_story(ctx),
        }
    }
}
