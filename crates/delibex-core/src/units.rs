//! Measurement conversions for WordprocessingML.
//!
//! The document format measures page geometry in twentieths of a point
//! ("twips") and font sizes in half-points. The model keeps user-facing
//! values in points and centimetres and converts at the format boundary.

/// Twips per point.
pub const TWIPS_PER_POINT: f64 = 20.0;

/// Twips per centimetre (1 cm = 567 twips, the value Word rounds to).
pub const TWIPS_PER_CM: f64 = 567.0;

/// Convert centimetres to twips, rounded to the nearest unit.
#[inline]
#[must_use]
pub fn cm_to_twips(cm: f64) -> u32 {
    (cm * TWIPS_PER_CM).round() as u32
}

/// Convert points to twips, rounded to the nearest unit.
#[inline]
#[must_use]
pub fn pt_to_twips(pt: f64) -> u32 {
    (pt * TWIPS_PER_POINT).round() as u32
}

/// Convert twips back to points.
#[inline]
#[must_use]
pub fn twips_to_pt(twips: u32) -> f64 {
    f64::from(twips) / TWIPS_PER_POINT
}

/// Convert a font size in points to half-points (`w:sz` units).
///
/// Rounds so fractional sizes like 7.5 pt survive the trip (15 half-points).
#[inline]
#[must_use]
pub fn pt_to_half_points(pt: f64) -> u32 {
    (pt * 2.0).round() as u32
}

/// Convert half-points (`w:sz` units) to points.
#[inline]
#[must_use]
pub fn half_points_to_pt(half_points: u32) -> f64 {
    f64::from(half_points) / 2.0
}
