use eframe::egui::load::SizedTexture;
use eframe::egui::{self, Context, Id, RichText, Ui, vec2};

use crate::util::{format_millions, format_number};

use super::super::state::DetailCard;
use super::super::{ShownCard, ViewModel};

const CARD_FADE_SECS: f32 = 0.3;
const CARD_IMAGE_SIZE: [f32; 2] = [150.0, 130.0];

fn card_row(ui: &mut Ui, label: &str, value: String) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(label).strong());
        ui.label(value);
    });
}

impl ViewModel {
    /// Detail card next to the click that opened it. It stays on screen while
    /// fading out but no longer takes input.
    pub(in crate::app) fn draw_card(&mut self, ctx: &Context) {
        let open = match self.chart.card {
            DetailCard::Open { rank, anchor } => {
                self.shown_card = Some(ShownCard { rank, anchor });
                true
            }
            DetailCard::Closed => false,
        };
        let opacity = ctx.animate_bool_with_time(Id::new("detail-card"), open, CARD_FADE_SECS);

        let Some(shown) = self.shown_card else {
            self.card_rect = None;
            return;
        };
        if !open && opacity <= 0.0 {
            self.shown_card = None;
            self.card_rect = None;
            return;
        }
        let Some(record) = self.dataset.get(shown.rank) else {
            self.card_rect = None;
            return;
        };
        let portrait = self.assets.portrait(shown.rank);

        let area = egui::Area::new(Id::new("detail-card-area"))
            .order(egui::Order::Foreground)
            .interactable(open)
            .fixed_pos(shown.anchor)
            .show(ctx, |ui| {
                ui.set_opacity(opacity);
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(260.0);
                    if let Some(texture) = portrait {
                        ui.vertical_centered(|ui| {
                            ui.add(
                                egui::Image::from_texture(SizedTexture::from_handle(texture))
                                    .fit_to_exact_size(vec2(CARD_IMAGE_SIZE[0], CARD_IMAGE_SIZE[1])),
                            );
                        });
                    }
                    ui.vertical_centered(|ui| {
                        ui.heading(&record.channel_name);
                    });
                    ui.add_space(4.0);

                    card_row(ui, "Country:", record.country.clone());
                    card_row(ui, "Influence Score:", format_number(record.influence_score));
                    card_row(ui, "Followers:", format_millions(record.followers));
                    card_row(
                        ui,
                        "60-Day Eng Rate:",
                        format!("{}%", format_number(record.engagement_rate)),
                    );
                    card_row(ui, "Average Likes:", format_number(record.avg_likes));
                    card_row(ui, "Posts:", format_number(record.post_count));
                });
            });

        self.card_rect = open.then_some(area.response.rect);
    }
}
