//! Milling parameters: spindle speed, table feed, chip thickness

use super::validators::{require_finite, validate_milling};
use super::{estimated_time, rotation_speed, HandbookError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tool diameter (mm) at and above which the larger chip floor applies
pub const CHIP_FLOOR_THRESHOLD: f64 = 3.0;
/// Minimum chip thickness per mm of diameter per tooth, D >= 3 mm
pub const CHIP_FLOOR_COEFF: f64 = 0.007;
/// Same for micro tools, D < 3 mm
pub const CHIP_FLOOR_COEFF_SMALL: f64 = 0.0035;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MillingInput {
    pub diameter: f64,       // mm
    pub feed_per_tooth: f64, // mm/tooth
    pub tooth_count: u32,
    pub depth_of_cut: f64, // mm, radial engagement
    pub length: f64,       // mm
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MillingResult {
    pub rotation_speed: f64,     // rpm
    pub feed_speed: f64,         // mm/min
    pub chip_thickness: f64,     // mm
    pub chip_thickness_min: f64, // mm
    pub estimated_time: f64,     // min
    /// Chip thinner than the floor: the edge rubs instead of cutting
    pub thin_chip_warning: bool,
}

/// Mean chip thickness for a radial engagement `ae` on a tool of diameter `d`:
/// h = 2 fz sqrt((ae/d)(1 - ae/d))
pub fn chip_thickness(feed_per_tooth: f64, depth_of_cut: f64, diameter: f64) -> f64 {
    let ratio = depth_of_cut / diameter;
    2.0 * feed_per_tooth * (ratio * (1.0 - ratio)).sqrt()
}

/// Smallest chip the tooling guideline accepts
pub fn chip_thickness_min(diameter: f64, tooth_count: u32) -> f64 {
    let coeff = if diameter >= CHIP_FLOOR_THRESHOLD {
        CHIP_FLOOR_COEFF
    } else {
        CHIP_FLOOR_COEFF_SMALL
    };
    coeff * (diameter / tooth_count as f64)
}

/// Compute milling parameters for a reference cutting speed in m/min
pub fn calculate(cutting_speed: f64, input: &MillingInput) -> Result<MillingResult, HandbookError> {
    validate_milling(cutting_speed, input)?;

    let rotation_speed = rotation_speed(cutting_speed, input.diameter);
    let feed_speed = rotation_speed * input.feed_per_tooth * input.tooth_count as f64;
    let chip_thickness = chip_thickness(input.feed_per_tooth, input.depth_of_cut, input.diameter);
    let chip_thickness_min = chip_thickness_min(input.diameter, input.tooth_count);
    let estimated_time = estimated_time(input.length, feed_speed);
    require_finite(&[
        ("spindle speed", rotation_speed),
        ("feed speed", feed_speed),
        ("chip thickness", chip_thickness),
        ("minimum chip thickness", chip_thickness_min),
        ("estimated time", estimated_time),
    ])?;

    let result = MillingResult {
        rotation_speed,
        feed_speed,
        chip_thickness,
        chip_thickness_min,
        estimated_time,
        thin_chip_warning: chip_thickness < chip_thickness_min,
    };

    debug!(?input, ?result, "milling parameters");
    Ok(result)
}
