use crate::influencers::Dataset;

/// Square-root scale from follower count to circle radius, so circle area
/// tracks follower count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct RadiusScale {
    domain: (f64, f64),
    range: (f32, f32),
}

fn signed_sqrt(value: f64) -> f64 {
    if value < 0.0 {
        -(-value).sqrt()
    } else {
        value.sqrt()
    }
}

impl RadiusScale {
    pub(in crate::app) const DEFAULT_RANGE: (f32, f32) = (20.0, 65.0);

    pub(in crate::app) fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    /// Uses the global follower extent. A dataset without any usable count
    /// yields a NaN domain, which in turn yields NaN radii.
    pub(in crate::app) fn for_dataset(dataset: &Dataset, range: (f32, f32)) -> Self {
        let domain = dataset
            .follower_extent()
            .unwrap_or((f64::NAN, f64::NAN));
        Self::new(domain, range)
    }

    pub(in crate::app) fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub(in crate::app) fn radius(&self, followers: f64) -> f32 {
        let low = signed_sqrt(self.domain.0);
        let high = signed_sqrt(self.domain.1);
        let span = high - low;

        let t = if span.is_nan() {
            f64::NAN
        } else if span == 0.0 {
            0.5
        } else {
            (signed_sqrt(followers) - low) / span
        };

        let (start, end) = (f64::from(self.range.0), f64::from(self.range.1));
        (start + (end - start) * t) as f32
    }
}
