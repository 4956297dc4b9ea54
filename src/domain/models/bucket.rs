//! Quality bucket domain model.
//!
//! Buckets are the ordered quality tiers a speaker is classified into.
//! Ordering runs from worst to best correction quality; promotions move
//! toward `NoTouch`, demotions toward `HighTouch`.

use serde::{Deserialize, Serialize};

/// Quality tier for a speaker's transcribed output.
///
/// Ordered worst-to-best: `HighTouch < MediumTouch < LowTouch < NoTouch`.
/// Only adjacent transitions are valid within a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Every draft needs heavy correction
    HighTouch,
    /// Default tier for new speakers
    MediumTouch,
    /// Occasional corrections only
    LowTouch,
    /// Output is publishable as-is
    NoTouch,
}

impl Default for Bucket {
    fn default() -> Self {
        Self::MediumTouch
    }
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighTouch => "high_touch",
            Self::MediumTouch => "medium_touch",
            Self::LowTouch => "low_touch",
            Self::NoTouch => "no_touch",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "high_touch" => Some(Self::HighTouch),
            "medium_touch" => Some(Self::MediumTouch),
            "low_touch" => Some(Self::LowTouch),
            "no_touch" => Some(Self::NoTouch),
            _ => None,
        }
    }

    /// The immediate next-better bucket, or `None` at `NoTouch`.
    pub fn next_better(&self) -> Option<Self> {
        match self {
            Self::HighTouch => Some(Self::MediumTouch),
            Self::MediumTouch => Some(Self::LowTouch),
            Self::LowTouch => Some(Self::NoTouch),
            Self::NoTouch => None,
        }
    }

    /// The immediate next-worse bucket, or `None` at `HighTouch`.
    pub fn next_worse(&self) -> Option<Self> {
        match self {
            Self::HighTouch => None,
            Self::MediumTouch => Some(Self::HighTouch),
            Self::LowTouch => Some(Self::MediumTouch),
            Self::NoTouch => Some(Self::LowTouch),
        }
    }

    /// Whether `other` is reachable from `self` in one evaluation.
    pub fn is_adjacent(&self, other: Self) -> bool {
        self.next_better() == Some(other) || self.next_worse() == Some(other)
    }

    /// All buckets in worst-to-best order.
    pub fn all() -> [Self; 4] {
        [Self::HighTouch, Self::MediumTouch, Self::LowTouch, Self::NoTouch]
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
