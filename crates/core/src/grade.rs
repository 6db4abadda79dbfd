//! Grade-percentage calculation.

/// Compute the stored percentage grade for an assignment.
///
/// The ratio earned/possible is rounded half-up to 4 decimal places and then
/// scaled by 100, so 45/50 stores as 90.0 and 1/3 as 33.33.
///
/// Callers validate `possible > 0` and `0 <= earned <= possible` before any
/// write; this function assumes those hold.
pub fn percentage_grade(points_earned: f64, points_possible: f64) -> f64 {
    let ratio = points_earned / points_possible;
    // f64::round is half-away-from-zero, which on this non-negative domain
    // is exactly half-up.
    (ratio * 10_000.0).round() / 10_000.0 * 100.0
}
