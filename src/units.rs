//! Conversions between millimeters, display units (dip, 96 per inch) and
//! printer dots (203 dpi, 8 dots per mm).

use crate::{DIP_PER_MM, DOTS_PER_MM};

/// Dots per dip. Encoder and decoder both go through this factor.
pub const DOTS_PER_DIP: f64 = DOTS_PER_MM / DIP_PER_MM;

pub fn mm_to_dip(mm: f64) -> f64 {
    mm * DIP_PER_MM
}

pub fn dip_to_mm(dip: f64) -> f64 {
    dip / DIP_PER_MM
}

pub fn dip_to_dots(dip: f64) -> f64 {
    dip * DOTS_PER_DIP
}

pub fn dots_to_dip(dots: f64) -> f64 {
    dots / DOTS_PER_DIP
}

/// Page extents and margins are truncated to whole dots.
pub fn mm_to_dots(mm: f64) -> i64 {
    (mm * DOTS_PER_MM) as i64
}

/// Round half to even, the rounding used for item origins and QR units.
pub fn round_dots(dots: f64) -> i64 {
    dots.round_ties_even() as i64
}

/// Printable area of a sheet in dip: `(margin, width, height)`.
///
/// Width and height exclude the margin on both sides and never go negative.
pub fn printable_area(paper_width_mm: f64, paper_height_mm: f64, margin_mm: f64) -> (f64, f64, f64) {
    let margin = mm_to_dip(margin_mm);
    let width = (mm_to_dip(paper_width_mm) - margin * 2.0).max(0.0);
    let height = (mm_to_dip(paper_height_mm) - margin * 2.0).max(0.0);
    (margin, width, height)
}
