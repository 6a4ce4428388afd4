use eframe::egui::{self, Align2, Color32, Context, Id, Rect, Sense, vec2};

use super::super::ViewModel;

const LEGEND_ITEMS: [(Color32, &str); 6] = [
    (
        Color32::from_rgb(0x54, 0x31, 0x23),
        "Each circle comprises of influencer image",
    ),
    (
        Color32::from_rgb(0xff, 0xcc, 0x00),
        "Circle size represents follower count",
    ),
    (
        Color32::from_rgb(0x00, 0x7b, 0xff),
        "Hover to see influencer's instagram handle",
    ),
    (
        Color32::from_rgb(0xff, 0x57, 0x33),
        "Click to open detailed card",
    ),
    (
        Color32::from_rgb(0x66, 0x43, 0x66),
        "Click outside to close the card",
    ),
    (
        Color32::from_rgb(0x35, 0x67, 0x43),
        "Filter to view influencers by Country",
    ),
];

impl ViewModel {
    pub(in crate::app) fn draw_legend(&self, ctx: &Context, chart_rect: Rect) {
        egui::Area::new(Id::new("legend"))
            .order(egui::Order::Middle)
            .interactable(false)
            .pivot(Align2::RIGHT_TOP)
            .fixed_pos(chart_rect.right_top() + vec2(-12.0, 12.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    for (color, description) in LEGEND_ITEMS {
                        ui.horizontal(|ui| {
                            let (swatch, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
                            ui.painter().rect_filled(swatch, 2.0, color);
                            ui.label(description);
                        });
                    }
                });
            });
    }
}
