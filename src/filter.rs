//! Shift window filter: restricts the solved set to shifts overlapping
//! `[startDate, endDate)`.

use chrono::{DateTime, Utc};

use crate::domain::Shift;

/// Shifts that overlap the window, in their original order. A shift that
/// merely touches a boundary (`shift.end == window.start` or
/// `shift.start == window.end`) does not overlap it.
pub fn shifts_in_window<'a>(
    shifts: &'a [Shift],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<&'a Shift> {
    shifts
        .iter()
        .filter(|s| s.start_time < window_end && s.end_time > window_start)
        .collect()
}
