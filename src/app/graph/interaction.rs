use eframe::egui::{self, Pos2, Ui};

use super::super::{TooltipAnchor, ViewModel};
use super::view::DrawnBubble;

impl ViewModel {
    /// Closest circle under the pointer. NaN radii never match.
    pub(super) fn hovered_bubble(drawn: &[DrawnBubble], pointer: Pos2) -> Option<u32> {
        drawn
            .iter()
            .filter_map(|bubble| {
                let distance = bubble.center.distance(pointer);
                if distance <= bubble.radius {
                    Some((bubble.rank, distance))
                } else {
                    None
                }
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(rank, _)| rank)
    }

    pub(super) fn update_hover(&mut self, ui: &Ui, hovered: Option<u32>, pointer: Option<Pos2>) {
        self.hovered = hovered;

        if let Some(rank) = hovered
            && let Some(pointer) = pointer
        {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            self.tooltip = Some(TooltipAnchor { rank, pointer });
        }
    }
}
