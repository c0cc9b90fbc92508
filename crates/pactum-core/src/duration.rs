use serde::{Deserialize, Serialize};

/// Normalized reading of a free-text duration.
///
/// `has_extra_days` is only meaningful when `months` is present: it marks a
/// quantity strictly between `months` and `months + 1` whole months
/// ("two years and one day").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationParse {
    pub months: Option<u32>,
    #[serde(default)]
    pub has_extra_days: bool,
    #[serde(default)]
    pub reasoning: String,
}

impl DurationParse {
    pub fn unparsed(reasoning: impl Into<String>) -> Self {
        Self {
            months: None,
            has_extra_days: false,
            reasoning: reasoning.into(),
        }
    }

    /// True when the duration is longer than `limit` whole months.
    ///
    /// Exactly `limit` months only exceeds when extra days remain.
    pub fn exceeds(&self, limit: u32) -> bool {
        exceeds_limit(self.months, self.has_extra_days, limit)
    }
}

pub fn exceeds_limit(months: Option<u32>, has_extra_days: bool, limit: u32) -> bool {
    match months {
        Some(m) => m > limit || (m == limit && has_extra_days),
        None => false,
    }
}
