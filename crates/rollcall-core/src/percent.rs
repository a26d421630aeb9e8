//! # Percentages
//!
//! Attendance percentages as integer hundredths of a percent, so 66.67% is
//! stored as `6667`. Keeps every calculation exact and reproducible.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hundredths in one whole percent.
const SCALE: u64 = 100;

/// Hundredths in 100%.
pub const FULL: u16 = 10_000;

/// A percentage between 0% and 100%, in hundredths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(u16);

impl Percentage {
    pub const ZERO: Self = Self(0);
    pub const HUNDRED: Self = Self(FULL);

    /// Build from raw hundredths, clamped to 100%.
    #[must_use]
    pub fn from_hundredths(hundredths: u16) -> Self {
        Self(hundredths.min(FULL))
    }

    /// A whole-number percentage such as a settings cap.
    #[must_use]
    pub fn from_whole(percent: u8) -> Self {
        Self::from_hundredths(u16::from(percent).saturating_mul(SCALE as u16))
    }

    /// `part / total` as a percentage, rounded half up. Zero when `total` is 0.
    #[must_use]
    pub fn from_ratio(part: u64, total: u64) -> Self {
        if total == 0 {
            return Self::ZERO;
        }
        let part = part.min(total);
        let scaled = part
            .saturating_mul(u64::from(FULL))
            .saturating_add(total / 2)
            / total;
        Self::from_hundredths(scaled as u16)
    }

    /// Mean of the given percentages, rounded half up. Zero for no values.
    pub fn average<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let (sum, count) = values
            .into_iter()
            .fold((0u64, 0u64), |(sum, count), p| {
                (sum.saturating_add(u64::from(p.0)), count.saturating_add(1))
            });
        if count == 0 {
            return Self::ZERO;
        }
        Self::from_hundredths((sum.saturating_add(count / 2) / count) as u16)
    }

    /// What is left to reach 100%.
    #[must_use]
    pub fn complement(self) -> Self {
        Self(FULL.saturating_sub(self.0))
    }

    #[must_use]
    pub fn hundredths(self) -> u16 {
        self.0
    }

    /// Whole percent, rounded down.
    #[must_use]
    pub fn whole(self) -> u8 {
        (u64::from(self.0) / SCALE) as u8
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = u64::from(self.0) / SCALE;
        let fraction = u64::from(self.0) % SCALE;
        write!(f, "{whole}.{fraction:02}%")
    }
}
