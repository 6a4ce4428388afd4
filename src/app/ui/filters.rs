use eframe::egui::{self, RichText, Ui};

use super::super::ViewModel;
use super::super::state::ChartEvent;

impl ViewModel {
    pub(in crate::app) fn draw_filters(&mut self, ui: &mut Ui) -> Vec<ChartEvent> {
        let mut events = Vec::new();

        ui.add_space(6.0);
        ui.label(RichText::new("Influencers by Country").strong());
        ui.add_space(4.0);
        ui.vertical_centered(|ui| {
            if ui.button("Clear Filters").clicked() {
                events.push(ChartEvent::ClearFilters);
            }
        });

        ui.separator();
        ui.label("Search channel");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Fuzzy match on channel name");
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("country_filter_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for country in &self.countries {
                    let mut checked = self.chart.filter.contains(country);
                    if ui.checkbox(&mut checked, country.as_str()).changed() {
                        events.push(ChartEvent::ToggleCountry(country.clone()));
                    }
                }
            });

        events
    }
}
