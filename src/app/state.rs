use std::collections::BTreeSet;

use eframe::egui::Pos2;

use crate::influencers::InfluencerRecord;

/// Countries ticked in the filter panel. Empty means every record is shown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(in crate::app) struct CountryFilter {
    selected: BTreeSet<String>,
}

impl CountryFilter {
    pub(in crate::app) fn toggle(&mut self, country: &str) {
        if !self.selected.remove(country) {
            self.selected.insert(country.to_owned());
        }
    }

    pub(in crate::app) fn clear(&mut self) {
        self.selected.clear();
    }

    pub(in crate::app) fn contains(&self, country: &str) -> bool {
        self.selected.contains(country)
    }

    pub(in crate::app) fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub(in crate::app) fn admits(&self, record: &InfluencerRecord) -> bool {
        self.is_empty() || self.contains(&record.country)
    }
}

pub(in crate::app) fn derive_visible<'a>(
    records: &'a [InfluencerRecord],
    filter: &CountryFilter,
) -> Vec<&'a InfluencerRecord> {
    records.iter().filter(|record| filter.admits(record)).collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(in crate::app) enum DetailCard {
    #[default]
    Closed,
    Open {
        rank: u32,
        anchor: Pos2,
    },
}

impl DetailCard {
    pub(in crate::app) fn is_open(self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum ChartEvent {
    ToggleCountry(String),
    ClearFilters,
    BubbleClicked { rank: u32, anchor: Pos2 },
    ClickedOutsideCard,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(in crate::app) struct ChartState {
    pub(in crate::app) filter: CountryFilter,
    pub(in crate::app) card: DetailCard,
}

impl ChartState {
    /// Pure transition. Clicking any bubble while a card is open closes the
    /// card, whichever bubble it was.
    pub(in crate::app) fn apply(&self, event: &ChartEvent) -> Self {
        let mut next = self.clone();
        match event {
            ChartEvent::ToggleCountry(country) => next.filter.toggle(country),
            ChartEvent::ClearFilters => next.filter.clear(),
            ChartEvent::BubbleClicked { rank, anchor } => {
                next.card = if self.card.is_open() {
                    DetailCard::Closed
                } else {
                    DetailCard::Open {
                        rank: *rank,
                        anchor: *anchor,
                    }
                };
            }
            ChartEvent::ClickedOutsideCard => next.card = DetailCard::Closed,
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    fn record(rank: u32, country: &str) -> InfluencerRecord {
        InfluencerRecord {
            rank,
            channel_name: format!("channel_{rank}"),
            country: country.to_owned(),
            followers: 1.0e6,
            influence_score: 80.0,
            engagement_rate: 1.0,
            avg_likes: 1.0e4,
            post_count: 100.0,
            image_url: String::new(),
        }
    }

    fn ranks(records: &[&InfluencerRecord]) -> Vec<u32> {
        records.iter().map(|record| record.rank).collect()
    }

    #[test]
    fn empty_filter_shows_everything() {
        let all = vec![record(1, "US"), record(2, "India"), record(3, "US")];
        let visible = derive_visible(&all, &CountryFilter::default());
        assert_eq!(ranks(&visible), vec![1, 2, 3]);
    }

    #[test]
    fn filter_keeps_only_selected_countries() {
        let all = vec![record(1, "US"), record(2, "India"), record(3, "US")];
        let mut filter = CountryFilter::default();
        filter.toggle("US");

        let visible = derive_visible(&all, &filter);
        assert_eq!(ranks(&visible), vec![1, 3]);

        let owned = visible.into_iter().cloned().collect::<Vec<_>>();
        let again = derive_visible(&owned, &filter);
        assert_eq!(ranks(&again), vec![1, 3]);
    }

    #[test]
    fn toggling_twice_removes_country() {
        let mut filter = CountryFilter::default();
        filter.toggle("Brazil");
        assert!(filter.contains("Brazil"));
        filter.toggle("Brazil");
        assert!(filter.is_empty());
    }

    #[test]
    fn clear_filters_restores_initial_state() {
        let initial = ChartState::default();
        let state = initial
            .apply(&ChartEvent::ToggleCountry("US".to_owned()))
            .apply(&ChartEvent::ToggleCountry("India".to_owned()))
            .apply(&ChartEvent::ClearFilters);
        assert_eq!(state, initial);
    }

    #[test]
    fn clicking_any_bubble_closes_open_card() {
        let open = ChartState::default().apply(&ChartEvent::BubbleClicked {
            rank: 1,
            anchor: pos2(40.0, 50.0),
        });
        assert_eq!(
            open.card,
            DetailCard::Open {
                rank: 1,
                anchor: pos2(40.0, 50.0)
            }
        );

        let closed = open.apply(&ChartEvent::BubbleClicked {
            rank: 2,
            anchor: pos2(10.0, 10.0),
        });
        assert_eq!(closed.card, DetailCard::Closed);
    }

    #[test]
    fn clicking_outside_closes_card() {
        let open = ChartState::default().apply(&ChartEvent::BubbleClicked {
            rank: 4,
            anchor: pos2(0.0, 0.0),
        });
        let closed = open.apply(&ChartEvent::ClickedOutsideCard);
        assert!(!closed.card.is_open());
        assert_eq!(closed.apply(&ChartEvent::ClickedOutsideCard), closed);
    }

    #[test]
    fn filter_and_card_are_independent() {
        let state = ChartState::default()
            .apply(&ChartEvent::BubbleClicked {
                rank: 9,
                anchor: pos2(1.0, 2.0),
            })
            .apply(&ChartEvent::ToggleCountry("US".to_owned()));
        assert!(state.card.is_open());
        assert!(state.filter.contains("US"));
    }
}
