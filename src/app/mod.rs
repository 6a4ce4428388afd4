use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, Rect, Vec2};
use tracing::{error, info, warn};

use crate::influencers::{Dataset, load_dataset};

mod graph;
mod images;
mod physics;
mod render_utils;
mod scale;
mod state;
mod sync;
mod ui;

#[cfg(test)]
mod tests;

use images::AssetStore;
use physics::Simulation;
use scale::RadiusScale;
use state::ChartState;
use sync::BubbleSet;

/// Startup options for the chart window.
#[derive(Clone, Debug)]
pub struct ChartConfig {
    pub data: String,
    pub backdrop: String,
    pub seed: Option<u64>,
    pub radius_range: (f32, f32),
}

pub struct BubbleApp {
    config: ChartConfig,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Dataset, String>>,
    },
    Ready(Box<ViewModel>),
    Failed,
}

struct ViewModel {
    dataset: Dataset,
    countries: Vec<String>,
    scale: RadiusScale,
    chart: ChartState,
    bubbles: BubbleSet,
    simulation: Option<Simulation>,
    seed: Option<u64>,
    viewport: Option<Vec2>,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    assets: AssetStore,
    hovered: Option<u32>,
    tooltip: Option<TooltipAnchor>,
    shown_card: Option<ShownCard>,
    card_rect: Option<Rect>,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<HashSet<u32>>,
}

/// Last hovered bubble, kept so the tooltip can fade out after the pointer
/// leaves it.
#[derive(Clone, Copy)]
struct TooltipAnchor {
    rank: u32,
    pointer: Pos2,
}

/// Card contents currently on screen, kept while the card fades out.
#[derive(Clone, Copy)]
struct ShownCard {
    rank: u32,
    anchor: Pos2,
}

impl BubbleApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: ChartConfig) -> Self {
        let rx = Self::spawn_load(cc.egui_ctx.clone(), config.data.clone());
        Self {
            config,
            state: AppState::Loading { rx },
        }
    }

    fn spawn_load(ctx: Context, source: String) -> Receiver<Result<Dataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_dataset(&source).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
            ctx.request_repaint();
        });

        rx
    }
}

impl eframe::App for BubbleApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(dataset)) => {
                        if dataset.is_empty() {
                            warn!(source = %dataset.source, "dataset has no rows");
                        }
                        info!(
                            source = %dataset.source,
                            records = dataset.len(),
                            "chart ready"
                        );
                        let mut model = ViewModel::new(dataset, &self.config);
                        model.start_assets(ctx, self.config.backdrop.clone());
                        transition = Some(AppState::Ready(Box::new(model)));
                    }
                    Ok(Err(message)) => {
                        error!(source = %self.config.data, "error loading data: {message}");
                        transition = Some(AppState::Failed);
                    }
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        error!(source = %self.config.data, "dataset load worker disconnected");
                        transition = Some(AppState::Failed);
                    }
                }

                egui::CentralPanel::default().show(ctx, |_ui| {});
            }
            AppState::Failed => {
                egui::CentralPanel::default().show(ctx, |_ui| {});
            }
            AppState::Ready(model) => model.show(ctx),
        }

        if let Some(next_state) = transition {
            self.state = next_state;
            ctx.request_repaint();
        }
    }
}
