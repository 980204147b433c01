mod app;
mod data;
mod util;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::{AppOptions, Story, StoryMapApp};
use data::DataSource;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL or local directory holding the preprocessed JSON datasets.
    #[arg(long, default_value = "public")]
    data: String,
    /// Initial zoom shared by both story maps.
    #[arg(long, default_value_t = 10.0)]
    zoom: f64,
    /// Open the story directly instead of the start page.
    #[arg(long)]
    skip_landing: bool,
    #[arg(long, value_enum, default_value_t = Story::Network)]
    story: Story,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let source = match DataSource::from_arg(&args.data) {
        Ok(source) => source,
        Err(error) => {
            tracing::error!("unusable data location {}: {error:#}", args.data);
            std::process::exit(2);
        }
    };
    tracing::info!(data = %source.describe(), "reading datasets");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };
    let app_options = AppOptions {
        zoom: args.zoom,
        skip_landing: args.skip_landing,
        story: args.story,
    };

    eframe::run_native(
        "Boston dependency story map",
        options,
        Box::new(move |cc| Ok(Box::new(StoryMapApp::new(cc, Arc::new(source), app_options)))),
    )
}
