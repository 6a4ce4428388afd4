use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq)]
pub struct InfluencerRecord {
    pub rank: u32,
    pub channel_name: String,
    pub country: String,
    pub followers: f64,
    pub influence_score: f64,
    pub engagement_rate: f64,
    pub avg_likes: f64,
    pub post_count: f64,
    pub image_url: String,
}

#[derive(Clone, Debug)]
pub struct Dataset {
    pub source: String,
    pub records: Vec<InfluencerRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, rank: u32) -> Option<&InfluencerRecord> {
        self.records.iter().find(|record| record.rank == rank)
    }

    /// Distinct countries in ascending order, as listed in the filter panel.
    pub fn countries(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record.country.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Smallest and largest follower counts, skipping NaN entries. `None` when
    /// no record has a usable count.
    pub fn follower_extent(&self) -> Option<(f64, f64)> {
        self.records
            .iter()
            .map(|record| record.followers)
            .filter(|followers| !followers.is_nan())
            .fold(None, |extent, followers| match extent {
                None => Some((followers, followers)),
                Some((min, max)) => Some((min.min(followers), max.max(followers))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rank: u32, country: &str, followers: f64) -> InfluencerRecord {
        InfluencerRecord {
            rank,
            channel_name: format!("channel_{rank}"),
            country: country.to_owned(),
            followers,
            influence_score: 90.0,
            engagement_rate: 1.0,
            avg_likes: 0.0,
            post_count: 0.0,
            image_url: String::new(),
        }
    }

    #[test]
    fn extent_skips_nan_followers() {
        let dataset = Dataset {
            source: "memory".to_owned(),
            records: vec![
                record(1, "Spain", 3.0e6),
                record(2, "Brazil", f64::NAN),
                record(3, "Spain", 1.5e6),
            ],
        };

        assert_eq!(dataset.follower_extent(), Some((1.5e6, 3.0e6)));
        assert_eq!(dataset.countries(), vec!["Brazil", "Spain"]);
        assert_eq!(dataset.get(3).map(|r| r.followers), Some(1.5e6));
    }

    #[test]
    fn extent_of_all_nan_is_none() {
        let dataset = Dataset {
            source: "memory".to_owned(),
            records: vec![record(1, "Spain", f64::NAN)],
        };
        assert_eq!(dataset.follower_extent(), None);
    }
}
