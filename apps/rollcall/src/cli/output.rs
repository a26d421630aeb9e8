//! Text and JSON output.

use super::CliError;
use rollcall_core::Percentage;
use rollcall_core::settings::UserSettings;
use serde::Serialize;

/// Print `value` as JSON, or the text rendering otherwise.
pub(crate) fn emit<T, F>(json: bool, value: &T, text: F) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

/// "66.67% (band 3, #82e0aa)" under the viewer's ranges and palette.
pub(crate) fn banded(settings: &UserSettings, percent: Percentage) -> String {
    let band = settings.band(percent);
    format!(
        "{percent} (band {}, {})",
        band.index().saturating_add(1),
        settings.band_colour(percent).hex()
    )
}

/// "Attended 33.33% / Absent 66.67%" with the two-tone palette.
pub(crate) fn split_line(settings: &UserSettings, attended: Percentage) -> String {
    let [absent_colour, attended_colour] = settings.two_tone();
    format!(
        "Attended {attended} ({}) / Absent {} ({})",
        attended_colour.hex(),
        attended.complement(),
        absent_colour.hex()
    )
}
