use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::influencers::InfluencerRecord;

use super::physics::NodeInit;
use super::scale::RadiusScale;

const ENTER_DURATION_SECS: f64 = 0.5;
const ENTER_STAGGER_SECS: f64 = 0.04;

/// An on-screen circle for one visible record.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct Bubble {
    pub(in crate::app) rank: u32,
    pub(in crate::app) radius: f32,
    /// When the scale-in animation starts, in egui input time.
    pub(in crate::app) enter_at: f64,
}

impl Bubble {
    /// Scale factor of the entrance animation, 0 before it starts and 1 once
    /// it finishes.
    pub(in crate::app) fn entrance_scale(&self, now: f64) -> f32 {
        let t = ((now - self.enter_at) / ENTER_DURATION_SECS).clamp(0.0, 1.0) as f32;
        ease_cubic_out(t)
    }
}

pub(in crate::app) fn ease_cubic_out(t: f32) -> f32 {
    let inverse = 1.0 - t;
    1.0 - inverse * inverse * inverse
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(in crate::app) struct SyncReport {
    pub(in crate::app) entered: Vec<u32>,
    pub(in crate::app) exited: Vec<u32>,
    pub(in crate::app) kept: usize,
}

impl SyncReport {
    pub(in crate::app) fn is_noop(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

/// Retained bubbles keyed by rank, reconciled against the visible records.
#[derive(Clone, Debug, Default)]
pub(in crate::app) struct BubbleSet {
    bubbles: BTreeMap<u32, Bubble>,
}

impl BubbleSet {
    pub(in crate::app) fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub(in crate::app) fn get(&self, rank: u32) -> Option<&Bubble> {
        self.bubbles.get(&rank)
    }

    #[cfg(test)]
    pub(in crate::app) fn iter(&self) -> impl Iterator<Item = &Bubble> {
        self.bubbles.values()
    }

    /// Enter creates bubbles for newly visible ranks, exit drops bubbles whose
    /// rank is gone, and update leaves survivors untouched.
    pub(in crate::app) fn reconcile(
        &mut self,
        visible: &[&InfluencerRecord],
        scale: &RadiusScale,
        now: f64,
    ) -> SyncReport {
        let visible_ranks = visible
            .iter()
            .map(|record| record.rank)
            .collect::<HashSet<_>>();

        let exited = self
            .bubbles
            .keys()
            .copied()
            .filter(|rank| !visible_ranks.contains(rank))
            .collect::<Vec<_>>();
        for rank in &exited {
            self.bubbles.remove(rank);
        }

        let mut entered = Vec::new();
        let mut kept = 0usize;
        for record in visible {
            if self.bubbles.contains_key(&record.rank) {
                kept += 1;
                continue;
            }

            let enter_at = now + entered.len() as f64 * ENTER_STAGGER_SECS;
            self.bubbles.insert(
                record.rank,
                Bubble {
                    rank: record.rank,
                    radius: scale.radius(record.followers),
                    enter_at,
                },
            );
            entered.push(record.rank);
        }

        let report = SyncReport {
            entered,
            exited,
            kept,
        };
        if !report.is_noop() {
            debug!(
                entered = report.entered.len(),
                exited = report.exited.len(),
                kept = report.kept,
                "bubbles reconciled"
            );
        }
        report
    }

    /// Layout input for the current bubbles, in rank order.
    pub(in crate::app) fn node_inits(&self) -> Vec<NodeInit> {
        self.bubbles
            .values()
            .map(|bubble| NodeInit {
                rank: bubble.rank,
                radius: bubble.radius,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rank: u32, followers: f64) -> InfluencerRecord {
        InfluencerRecord {
            rank,
            channel_name: format!("channel_{rank}"),
            country: "US".to_owned(),
            followers,
            influence_score: 70.0,
            engagement_rate: 2.0,
            avg_likes: 1.0,
            post_count: 1.0,
            image_url: String::new(),
        }
    }

    #[test]
    fn enter_update_exit_by_rank() {
        let scale = RadiusScale::new((1.0e6, 4.0e6), (20.0, 65.0));
        let records = vec![record(1, 1.0e6), record(2, 4.0e6), record(3, 2.0e6)];
        let mut bubbles = BubbleSet::default();

        let first = bubbles.reconcile(&[&records[0], &records[1]], &scale, 10.0);
        assert_eq!(first.entered, vec![1, 2]);
        assert!(first.exited.is_empty());
        assert_eq!(bubbles.len(), 2);

        let before = bubbles.get(2).cloned().expect("rank 2 entered");
        let second = bubbles.reconcile(&[&records[1], &records[2]], &scale, 20.0);
        assert_eq!(second.entered, vec![3]);
        assert_eq!(second.exited, vec![1]);
        assert_eq!(second.kept, 1);
        assert_eq!(bubbles.get(2), Some(&before));
        assert!(bubbles.get(1).is_none());

        let third = bubbles.reconcile(&[&records[1], &records[2]], &scale, 30.0);
        assert!(third.is_noop());
    }

    #[test]
    fn entering_bubbles_are_sized_and_staggered() {
        let scale = RadiusScale::new((1.0e6, 4.0e6), (20.0, 65.0));
        let records = vec![record(5, 1.0e6), record(6, 4.0e6)];
        let mut bubbles = BubbleSet::default();
        bubbles.reconcile(&[&records[0], &records[1]], &scale, 1.0);

        let small = bubbles.get(5).expect("rank 5");
        let large = bubbles.get(6).expect("rank 6");
        assert!((small.radius - 20.0).abs() < 1e-3);
        assert!((large.radius - 65.0).abs() < 1e-3);
        assert!((large.enter_at - small.enter_at - ENTER_STAGGER_SECS).abs() < 1e-9);

        assert_eq!(small.entrance_scale(0.5), 0.0);
        assert_eq!(small.entrance_scale(5.0), 1.0);
        assert!(small.entrance_scale(1.25) > 0.5);

        let inits = bubbles.node_inits();
        assert_eq!(inits.iter().map(|init| init.rank).collect::<Vec<_>>(), vec![5, 6]);
    }
}
