use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Color32, Id, Pos2, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::render_utils::{
    BUBBLE_STROKE, blend_color, circle_visible, draw_background, draw_bubble, with_opacity,
};
use super::super::state::ChartEvent;
use super::super::{SearchMatchCache, ViewModel};

const HOVER_GROWTH: f32 = 0.3;
const HOVER_SECS: f32 = 0.3;
const SEARCH_HIGHLIGHT: Color32 = Color32::from_rgb(103, 196, 255);
const SEARCH_DIM_OPACITY: f32 = 0.4;

/// A bubble as painted this frame, in screen coordinates.
#[derive(Clone, Copy, Debug)]
pub(super) struct DrawnBubble {
    pub(super) rank: u32,
    pub(super) center: Pos2,
    pub(super) radius: f32,
}

/// What the chart area produced this frame.
#[derive(Default)]
pub(in crate::app) struct ChartOutput {
    pub(in crate::app) events: Vec<ChartEvent>,
    /// A circle consumed the primary click.
    pub(in crate::app) bubble_clicked: bool,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    pub(in crate::app) fn search_matches(&mut self) -> Option<Arc<HashSet<u32>>> {
        let search_query = self.search.trim();
        if search_query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == search_query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .dataset
            .records
            .iter()
            .filter(|record| {
                fuzzy_match_score(&matcher, &record.channel_name, search_query).is_some()
            })
            .map(|record| record.rank)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: search_query.to_owned(),
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    fn layout_bubbles(&self, ui: &Ui, origin: Pos2, now: f64) -> (Vec<DrawnBubble>, bool) {
        let Some(simulation) = self.simulation.as_ref() else {
            return (Vec::new(), false);
        };

        let mut entering = false;
        let drawn = simulation
            .nodes()
            .iter()
            .filter_map(|node| {
                let bubble = self.bubbles.get(node.rank)?;
                let entrance = bubble.entrance_scale(now);
                entering |= entrance < 1.0;

                let hover_mix = ui.ctx().animate_bool_with_time(
                    Id::new(("bubble-hover", node.rank)),
                    self.hovered == Some(node.rank),
                    HOVER_SECS,
                );
                Some(DrawnBubble {
                    rank: node.rank,
                    center: origin + node.position,
                    radius: bubble.radius * entrance * (1.0 + HOVER_GROWTH * hover_mix),
                })
            })
            .collect();

        (drawn, entering)
    }

    pub(in crate::app) fn draw_chart(&mut self, ui: &mut Ui) -> ChartOutput {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
        let painter = ui.painter_at(rect);
        let now = ui.input(|input| input.time);

        self.ensure_layout(rect.size(), now);
        if let Some(simulation) = self.simulation.as_mut()
            && simulation.tick()
        {
            ui.ctx().request_repaint();
        }

        draw_background(
            &painter,
            rect,
            self.assets.backdrop().map(|texture| texture.id()),
        );

        let search_matches = self.search_matches();
        let (drawn, entering) = self.layout_bubbles(ui, rect.min, now);
        if entering {
            ui.ctx().request_repaint();
        }

        let pointer = response.hover_pos();
        let hovered = pointer.and_then(|pointer| Self::hovered_bubble(&drawn, pointer));
        self.update_hover(ui, hovered, pointer);

        for bubble in &drawn {
            if !circle_visible(rect, bubble.center, bubble.radius) {
                continue;
            }

            let is_match = search_matches
                .as_ref()
                .map(|matches| matches.contains(&bubble.rank));
            let opacity = match is_match {
                Some(false) => SEARCH_DIM_OPACITY,
                _ => 1.0,
            };

            draw_bubble(
                &painter,
                bubble.center,
                bubble.radius,
                self.assets.portrait(bubble.rank).map(|texture| texture.id()),
                opacity,
            );

            if is_match == Some(true) {
                painter.circle_stroke(
                    bubble.center,
                    bubble.radius + 2.5,
                    Stroke::new(2.0, blend_color(BUBBLE_STROKE, SEARCH_HIGHLIGHT, 0.8)),
                );
            }
        }

        self.draw_tooltip(ui.ctx());
        self.draw_legend(ui.ctx(), rect);

        let mut output = ChartOutput::default();
        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(rank) = hovered
            && let Some(pointer) = response.interact_pointer_pos()
        {
            output.bubble_clicked = true;
            output.events.push(ChartEvent::BubbleClicked {
                rank,
                anchor: pointer + vec2(10.0, 10.0),
            });
        }
        output
    }

    fn draw_tooltip(&mut self, ctx: &egui::Context) {
        const FADE_IN_SECS: f32 = 0.2;
        const FADE_OUT_SECS: f32 = 0.5;
        const TOOLTIP_OPACITY: f32 = 0.9;

        let showing = self.hovered.is_some();
        let opacity = ctx.animate_value_with_time(
            Id::new("bubble-tooltip"),
            if showing { 1.0 } else { 0.0 },
            if showing { FADE_IN_SECS } else { FADE_OUT_SECS },
        );

        let Some(anchor) = self.tooltip else {
            return;
        };
        if opacity <= 0.0 && !showing {
            self.tooltip = None;
            return;
        }
        let Some(record) = self.dataset.get(anchor.rank) else {
            return;
        };

        egui::Area::new(Id::new("bubble-tooltip-area"))
            .order(egui::Order::Tooltip)
            .interactable(false)
            .fixed_pos(anchor.pointer + vec2(5.0, -28.0))
            .show(ctx, |ui| {
                ui.set_opacity(opacity * TOOLTIP_OPACITY);
                egui::Frame::popup(ui.style())
                    .fill(with_opacity(Color32::WHITE, 0.95))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(&record.channel_name)
                                .strong()
                                .color(Color32::BLACK),
                        );
                    });
            });
    }
}
