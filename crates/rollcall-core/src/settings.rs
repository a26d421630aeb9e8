//! # Display Settings
//!
//! Per-user preferences for how attendance is shown: the three caps that
//! split percentages into four bands, and a colourblind-safe palette.

use crate::error::RollcallError;
use crate::percent::Percentage;
use serde::{Deserialize, Serialize};
use std::num::IntErrorKind;

/// Caps used until a user saves their own.
pub const DEFAULT_RANGE_CAPS: [u8; 3] = [25, 50, 75];

pub const RANGES_REQUIRED: &str = "Attendance ranges must have a value";
pub const RANGES_WHOLE: &str = "Attendance ranges must be whole numbers";
pub const RANGE_1_POSITIVE: &str = "Attendance range 1 must be greater than 0";
pub const RANGE_2_ABOVE_1: &str = "Attendance range 2 must be greater than range 1";
pub const RANGE_3_ABOVE_2: &str = "Attendance range 3 must be greater than range 2";
pub const RANGE_3_BELOW_100: &str = "Attendance range 3 must be less than 100";

// =============================================================================
// COLOURS
// =============================================================================

/// Chart colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Colour {
    Red,
    OrangeLight,
    GreenLight,
    Green,
    Orange,
    Yellow,
    BlueLight,
    Blue,
}

impl Colour {
    /// Hex value used when rendering.
    #[must_use]
    pub fn hex(self) -> &'static str {
        match self {
            Self::Red => "#e74c3c",
            Self::OrangeLight => "#f5b041",
            Self::GreenLight => "#82e0aa",
            Self::Green => "#27ae60",
            Self::Orange => "#e67e22",
            Self::Yellow => "#f4d03f",
            Self::BlueLight => "#85c1e9",
            Self::Blue => "#3498db",
        }
    }
}

// =============================================================================
// BANDS
// =============================================================================

/// Which of the four attendance ranges a percentage falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Band {
    /// Below the first cap.
    First,
    /// From the first cap up to the second.
    Second,
    /// From the second cap up to the third.
    Third,
    /// The third cap and above.
    Fourth,
}

impl Band {
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
            Self::Fourth => 3,
        }
    }
}

// =============================================================================
// USER SETTINGS
// =============================================================================

/// Display settings for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub colourblind: bool,
    pub range_caps: [u8; 3],
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            colourblind: false,
            range_caps: DEFAULT_RANGE_CAPS,
        }
    }
}

impl UserSettings {
    /// Band for a percentage under these caps.
    #[must_use]
    pub fn band(&self, percent: Percentage) -> Band {
        let [first, second, third] = self.range_caps.map(Percentage::from_whole);
        if percent < first {
            Band::First
        } else if percent < second {
            Band::Second
        } else if percent < third {
            Band::Third
        } else {
            Band::Fourth
        }
    }

    /// Colour for a percentage, from the four-tone palette.
    #[must_use]
    pub fn band_colour(&self, percent: Percentage) -> Colour {
        self.four_tone()[self.band(percent).index()]
    }

    /// Absent and attended colours, in that order.
    #[must_use]
    pub fn two_tone(&self) -> [Colour; 2] {
        if self.colourblind {
            [Colour::Orange, Colour::Blue]
        } else {
            [Colour::Red, Colour::Green]
        }
    }

    /// One colour per band, lowest first.
    #[must_use]
    pub fn four_tone(&self) -> [Colour; 4] {
        if self.colourblind {
            [Colour::Orange, Colour::Yellow, Colour::BlueLight, Colour::Blue]
        } else {
            [Colour::Red, Colour::OrangeLight, Colour::GreenLight, Colour::Green]
        }
    }

    /// Replace the caps from raw form input.
    ///
    /// On failure the current caps are kept and the first broken rule is
    /// returned as [`RollcallError::Form`].
    pub fn update_ranges(&mut self, raw: [&str; 3]) -> Result<(), RollcallError> {
        self.range_caps = parse_ranges(raw)?;
        Ok(())
    }
}

/// A whole number of any size. Values past `i64` saturate, so they fail the
/// range checks instead of reading as non-numbers.
fn whole(value: &str) -> Option<i64> {
    match value.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

fn parse_ranges(raw: [&str; 3]) -> Result<[u8; 3], RollcallError> {
    let form = |message: &str| RollcallError::Form(message.to_string());

    if raw.iter().any(|value| value.trim().is_empty()) {
        return Err(form(RANGES_REQUIRED));
    }

    let mut parsed = [0i64; 3];
    for (slot, value) in parsed.iter_mut().zip(raw) {
        *slot = whole(value).ok_or_else(|| form(RANGES_WHOLE))?;
    }

    let [first, second, third] = parsed;
    if first <= 0 {
        return Err(form(RANGE_1_POSITIVE));
    }
    if second <= first {
        return Err(form(RANGE_2_ABOVE_1));
    }
    if third <= second {
        return Err(form(RANGE_3_ABOVE_2));
    }
    if third >= 100 {
        return Err(form(RANGE_3_BELOW_100));
    }

    // all three are now within 1..=99
    Ok(parsed.map(|cap| cap as u8))
}
