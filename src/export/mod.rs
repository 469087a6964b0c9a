//! Flat export records, one CSV row per calculation
//!
//! Column names and order are part of the file format. Add new columns at the
//! end only.

use crate::handbook::{CuttingSpeedMode, MillingPlan, TurningPlan};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV writer flush failed: {0}")]
    Flush(#[from] std::io::Error),
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MillingRecord {
    #[serde(rename = "Material")]
    pub material: String,
    #[serde(rename = "Mode")]
    pub mode: CuttingSpeedMode,
    #[serde(rename = "Vc (m/min)")]
    pub cutting_speed: f64,
    #[serde(rename = "Diameter (mm)")]
    pub diameter: f64,
    #[serde(rename = "Feed per tooth (mm)")]
    pub feed_per_tooth: f64,
    #[serde(rename = "Teeth")]
    pub tooth_count: u32,
    #[serde(rename = "Depth of cut (mm)")]
    pub depth_of_cut: f64,
    #[serde(rename = "Length (mm)")]
    pub length: f64,
    #[serde(rename = "N (rpm)")]
    pub rotation_speed: f64,
    #[serde(rename = "Vf (mm/min)")]
    pub feed_speed: f64,
    #[serde(rename = "h (mm)")]
    pub chip_thickness: f64,
    #[serde(rename = "hmin (mm)")]
    pub chip_thickness_min: f64,
    #[serde(rename = "Time (min)")]
    pub estimated_time: f64,
    #[serde(rename = "Thin chip warning")]
    pub thin_chip_warning: bool,
}

impl From<&MillingPlan> for MillingRecord {
    fn from(plan: &MillingPlan) -> Self {
        let (input, result) = (&plan.input, &plan.result);
        Self {
            material: plan.material.clone(),
            mode: plan.mode,
            cutting_speed: plan.cutting_speed,
            diameter: input.diameter,
            feed_per_tooth: input.feed_per_tooth,
            tooth_count: input.tooth_count,
            depth_of_cut: input.depth_of_cut,
            length: input.length,
            rotation_speed: round_to(result.rotation_speed, 0),
            feed_speed: round_to(result.feed_speed, 1),
            chip_thickness: round_to(result.chip_thickness, 3),
            chip_thickness_min: round_to(result.chip_thickness_min, 3),
            estimated_time: round_to(result.estimated_time, 2),
            thin_chip_warning: result.thin_chip_warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurningRecord {
    #[serde(rename = "Material")]
    pub material: String,
    #[serde(rename = "Mode")]
    pub mode: CuttingSpeedMode,
    #[serde(rename = "Vc (m/min)")]
    pub cutting_speed: f64,
    #[serde(rename = "Diameter (mm)")]
    pub diameter: f64,
    #[serde(rename = "Feed per rev (mm)")]
    pub feed_per_rev: f64,
    #[serde(rename = "Length (mm)")]
    pub length: f64,
    #[serde(rename = "Ra (um)")]
    pub target_roughness_ra: f64,
    #[serde(rename = "Nose radius (mm)")]
    pub nose_radius: f64,
    #[serde(rename = "N (rpm)")]
    pub rotation_speed: f64,
    #[serde(rename = "fmax (mm/rev)")]
    pub max_recommended_feed: f64,
    #[serde(rename = "Time (min)")]
    pub estimated_time: f64,
    #[serde(rename = "Excess feed warning")]
    pub excess_feed_warning: bool,
    /// Empty when no land length was given
    #[serde(rename = "Land length (mm)")]
    pub land_length: Option<f64>,
    #[serde(rename = "Chip breaker warning")]
    pub chip_breaker_warning: bool,
}

impl From<&TurningPlan> for TurningRecord {
    fn from(plan: &TurningPlan) -> Self {
        let (input, result) = (&plan.input, &plan.result);
        Self {
            material: plan.material.clone(),
            mode: plan.mode,
            cutting_speed: plan.cutting_speed,
            diameter: input.diameter,
            feed_per_rev: input.feed_per_rev,
            length: input.length,
            target_roughness_ra: input.target_roughness_ra,
            nose_radius: input.nose_radius,
            rotation_speed: round_to(result.rotation_speed, 0),
            max_recommended_feed: round_to(result.max_recommended_feed, 3),
            estimated_time: round_to(result.estimated_time, 2),
            excess_feed_warning: result.excess_feed_warning,
            land_length: input.land_length,
            chip_breaker_warning: result.chip_breaker_warning,
        }
    }
}

/// Write records with a header row
pub fn write_records<W: Write, T: Serialize>(writer: W, records: &[T]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read back records written by [`write_records`]
pub fn read_records<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>, ExportError> {
    let mut reader = csv::Reader::from_reader(reader);
    let records = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(records)
}

pub fn write_path<T: Serialize>(path: &Path, records: &[T]) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    write_records(file, records)?;
    debug!(path = %path.display(), rows = records.len(), "results exported");
    Ok(())
}

pub fn read_path<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ExportError> {
    let file = File::open(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_records(file)
}
