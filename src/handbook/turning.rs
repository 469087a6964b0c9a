//! Turning parameters and the feed limit for a target surface finish

use super::validators::{require_finite, validate_turning};
use super::{estimated_time, rotation_speed, HandbookError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Empirical factor of fmax = k * sqrt(Ra * r)
pub const ROUGHNESS_FEED_FACTOR: f64 = 0.18;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurningInput {
    pub diameter: f64,            // mm
    pub feed_per_rev: f64,        // mm/rev
    pub length: f64,              // mm
    pub target_roughness_ra: f64, // um
    pub nose_radius: f64,         // mm
    /// Chip breaker land of the insert, mm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_length: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurningResult {
    pub rotation_speed: f64,       // rpm
    pub feed_speed: f64,           // mm/rev
    pub max_recommended_feed: f64, // mm/rev
    pub estimated_time: f64,
    /// Feed too coarse for the requested Ra
    pub excess_feed_warning: bool,
    /// Feed does not reach past the land, the chip breaker stays idle
    pub chip_breaker_warning: bool,
}

/// Largest feed per revolution that still reaches roughness `ra` with nose radius `r`
pub fn max_recommended_feed(target_roughness_ra: f64, nose_radius: f64) -> f64 {
    ROUGHNESS_FEED_FACTOR * (target_roughness_ra * nose_radius).sqrt()
}

pub fn calculate(cutting_speed: f64, input: &TurningInput) -> Result<TurningResult, HandbookError> {
    validate_turning(cutting_speed, input)?;

    let feed_speed = input.feed_per_rev;
    let max_recommended_feed = max_recommended_feed(input.target_roughness_ra, input.nose_radius);
    let rotation_speed = rotation_speed(cutting_speed, input.diameter);
    let estimated_time = estimated_time(input.length, feed_speed);
    require_finite(&[
        ("spindle speed", rotation_speed),
        ("max recommended feed", max_recommended_feed),
        ("estimated time", estimated_time),
    ])?;

    let result = TurningResult {
        rotation_speed,
        feed_speed,
        max_recommended_feed,
        estimated_time,
        excess_feed_warning: input.feed_per_rev > max_recommended_feed,
        chip_breaker_warning: input
            .land_length
            .is_some_and(|land| input.feed_per_rev <= land),
    };

    debug!(?input, ?result, "turning parameters");
    Ok(result)
}
