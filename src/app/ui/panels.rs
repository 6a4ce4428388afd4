use eframe::egui::{self, Align, Context, Layout, Pos2, Rect, Vec2};
use tracing::debug;

use crate::influencers::Dataset;

use super::super::images::AssetStore;
use super::super::physics::Simulation;
use super::super::scale::RadiusScale;
use super::super::state::{ChartEvent, ChartState, derive_visible};
use super::super::sync::BubbleSet;
use super::super::{ChartConfig, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(dataset: Dataset, config: &ChartConfig) -> Self {
        let scale = RadiusScale::for_dataset(&dataset, config.radius_range);
        debug!(domain = ?scale.domain(), range = ?config.radius_range, "radius scale built");

        Self {
            countries: dataset.countries(),
            dataset,
            scale,
            chart: ChartState::default(),
            bubbles: BubbleSet::default(),
            simulation: None,
            seed: config.seed,
            viewport: None,
            search: String::new(),
            search_match_cache: None,
            assets: AssetStore::default(),
            hovered: None,
            tooltip: None,
            shown_card: None,
            card_rect: None,
        }
    }

    pub(in crate::app) fn start_assets(&mut self, ctx: &Context, backdrop: String) {
        self.assets = AssetStore::spawn(ctx, backdrop, &self.dataset);
    }

    /// Creates the layout once the chart size is known and restarts it when
    /// the size changes afterwards.
    pub(in crate::app) fn ensure_layout(&mut self, viewport: Vec2, now: f64) {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return;
        }

        if self.simulation.is_none() {
            let visible = derive_visible(&self.dataset.records, &self.chart.filter);
            self.bubbles.reconcile(&visible, &self.scale, now);
            self.simulation = Some(Simulation::new(
                viewport,
                &self.bubbles.node_inits(),
                self.seed,
            ));
        } else if self.viewport != Some(viewport)
            && let Some(simulation) = self.simulation.as_mut()
        {
            debug!(width = viewport.x, height = viewport.y, "chart resized");
            simulation.resize(viewport);
        }
        self.viewport = Some(viewport);
    }

    /// Runs the reducer, then brings bubbles and layout in line with the new
    /// visible set when the filter changed.
    pub(in crate::app) fn dispatch(&mut self, event: &ChartEvent, now: f64) {
        let next = self.chart.apply(event);
        let filter_changed = next.filter != self.chart.filter;
        self.chart = next;

        if filter_changed {
            self.sync_visible(now);
        }
    }

    pub(in crate::app) fn sync_visible(&mut self, now: f64) {
        let visible = derive_visible(&self.dataset.records, &self.chart.filter);
        let report = self.bubbles.reconcile(&visible, &self.scale, now);

        if !report.is_noop()
            && let Some(simulation) = self.simulation.as_mut()
        {
            simulation.sync_nodes(&self.bubbles.node_inits());
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        self.assets.poll(ctx);
        let now = ctx.input(|input| input.time);

        egui::TopBottomPanel::top("header")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("insta-bubbles");
                    ui.separator();
                    ui.label(format!("source: {}", self.dataset.source));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "showing {} of {}",
                            self.bubbles.len(),
                            self.dataset.len()
                        ));
                    });
                });
            });

        let mut events = egui::SidePanel::left("filters")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| self.draw_filters(ui))
            .inner;

        let chart = egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_chart(ui))
            .inner;
        events.extend(chart.events);

        self.draw_card(ctx);

        let (primary_clicked, pointer) = ctx.input(|input| {
            (input.pointer.primary_clicked(), input.pointer.interact_pos())
        });
        if closes_card(
            primary_clicked,
            pointer,
            self.card_rect,
            chart.bubble_clicked,
            self.chart.card.is_open(),
        ) {
            events.push(ChartEvent::ClickedOutsideCard);
        }

        if !events.is_empty() {
            for event in &events {
                debug!(?event, "chart event");
                self.dispatch(event, now);
            }
            ctx.request_repaint();
        }
    }
}

/// A primary click closes an open card unless a bubble consumed it or it
/// landed on the card.
fn closes_card(
    primary_clicked: bool,
    pointer: Option<Pos2>,
    card_rect: Option<Rect>,
    bubble_clicked: bool,
    card_open: bool,
) -> bool {
    primary_clicked
        && card_open
        && !bubble_clicked
        && pointer.is_some_and(|pointer| !card_rect.is_some_and(|rect| rect.contains(pointer)))
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    fn card() -> Option<Rect> {
        Some(Rect::from_min_size(pos2(100.0, 100.0), egui::vec2(200.0, 250.0)))
    }

    #[test]
    fn bubble_click_never_counts_as_outside() {
        assert!(!closes_card(true, Some(pos2(20.0, 20.0)), card(), true, true));
    }

    #[test]
    fn click_on_card_keeps_it_open() {
        assert!(!closes_card(true, Some(pos2(150.0, 200.0)), card(), false, true));
    }

    #[test]
    fn click_elsewhere_closes_open_card() {
        assert!(closes_card(true, Some(pos2(20.0, 20.0)), card(), false, true));
        assert!(closes_card(true, Some(pos2(20.0, 20.0)), None, false, true));
    }

    #[test]
    fn nothing_to_close_without_open_card_or_click() {
        assert!(!closes_card(true, Some(pos2(20.0, 20.0)), None, false, false));
        assert!(!closes_card(false, Some(pos2(20.0, 20.0)), card(), false, true));
        assert!(!closes_card(true, None, card(), false, true));
    }
}
