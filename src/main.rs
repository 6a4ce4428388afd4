mod app;
mod influencers;
mod util;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Interactive bubble chart of influencers sized by follower count.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Dataset path or URL (`.csv` or `.json`).
    #[arg(long, default_value = "dataset/insta.csv")]
    data: String,

    /// Decorative map drawn behind the bubbles (SVG or raster).
    #[arg(long, default_value = "svg/map.svg")]
    backdrop: String,

    /// Seed for the layout simulation.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 20.0)]
    min_radius: f32,

    #[arg(long, default_value_t = 65.0)]
    max_radius: f32,

    #[arg(long, default_value_t = 1440.0)]
    width: f32,

    #[arg(long, default_value_t = 920.0)]
    height: f32,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = app::ChartConfig {
        data: args.data,
        backdrop: args.backdrop,
        seed: args.seed,
        radius_range: (args.min_radius, args.max_radius),
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height]),
        ..Default::default()
    };

    eframe::run_native(
        "insta-bubbles",
        options,
        Box::new(move |cc| Ok(Box::new(app::BubbleApp::new(cc, config)))),
    )
}
