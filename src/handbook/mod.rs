//! The Handbook - cutting data reference and parameter engine
//!
//! Turns a material's reference cutting speed (Vc, m/min) plus tool and
//! process geometry into machine setpoints:
//! - Spindle speed: N = 1000 Vc / (pi D)
//! - Milling table feed, mean chip thickness and its tooling floor
//! - Turning feed limit for a target roughness Ra
//!
//! Every calculation is a pure function of its inputs. Warnings are flags on
//! a successful result; they never turn it into an error.

use crate::table::TableError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;
use thiserror::Error;

pub mod catalog;
pub mod milling;
pub mod turning;
pub mod validators;

pub use catalog::{normalize, MaterialCatalog, MaterialRecord};
pub use milling::{MillingInput, MillingResult};
pub use turning::{TurningInput, TurningResult};

/// Which of the two catalog speeds to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CuttingSpeedMode {
    #[serde(rename = "mean", alias = "MEAN", alias = "average")]
    #[default]
    Mean,
    #[serde(rename = "min", alias = "MIN", alias = "minimum")]
    Min,
}

impl std::fmt::Display for CuttingSpeedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CuttingSpeedMode::Mean => write!(f, "mean"),
            CuttingSpeedMode::Min => write!(f, "min"),
        }
    }
}

impl FromStr for CuttingSpeedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mean" | "average" => Ok(CuttingSpeedMode::Mean),
            "min" | "minimum" => Ok(CuttingSpeedMode::Min),
            other => Err(format!(
                "unknown cutting speed mode {other:?} (expected mean or min)"
            )),
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogLoadError {
    #[error("catalog is missing required column {0:?}")]
    MissingColumn(&'static str),

    #[error("catalog row {row}, column {column:?}: {message} (got {value:?})")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
        message: String,
    },

    #[error(transparent)]
    Source(#[from] TableError),
}

#[derive(Error, Debug)]
pub enum HandbookError {
    #[error(transparent)]
    CatalogLoad(#[from] CatalogLoadError),

    #[error("material not found: {0}")]
    MaterialNotFound(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Spindle speed in rpm for a surface speed in m/min and a diameter in mm
pub fn rotation_speed(cutting_speed: f64, diameter: f64) -> f64 {
    1000.0 * cutting_speed / (PI * diameter)
}

/// `length / feed`, or 0 when there is no feed
pub fn estimated_time(length: f64, feed_speed: f64) -> f64 {
    if feed_speed > 0.0 {
        length / feed_speed
    } else {
        0.0
    }
}

/// A milling calculation with everything that went into it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MillingPlan {
    /// Catalog key
    pub material: String,
    /// Catalog spelling, for display
    pub label: String,
    pub mode: CuttingSpeedMode,
    pub cutting_speed: f64,
    pub input: MillingInput,
    pub result: MillingResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurningPlan {
    pub material: String,
    pub label: String,
    pub mode: CuttingSpeedMode,
    pub cutting_speed: f64,
    pub input: TurningInput,
    pub result: TurningResult,
}

/// Resolves materials against a borrowed catalog and runs the calculators
#[derive(Debug, Clone)]
pub struct Advisor<'a> {
    catalog: &'a MaterialCatalog,
    class_tag: Option<String>,
}

impl<'a> Advisor<'a> {
    pub fn new(catalog: &'a MaterialCatalog) -> Self {
        Self {
            catalog,
            class_tag: None,
        }
    }

    /// Only accept materials of this class
    pub fn with_class(mut self, class_tag: impl Into<String>) -> Self {
        self.class_tag = Some(class_tag.into());
        self
    }

    /// Catalog record, honouring the class restriction
    pub fn material(&self, material: &str) -> Result<&'a MaterialRecord, HandbookError> {
        match &self.class_tag {
            Some(class_tag) => self.catalog.get_in_class(class_tag, material),
            None => self.catalog.get(material),
        }
        .ok_or_else(|| HandbookError::MaterialNotFound(match &self.class_tag {
            Some(class_tag) => format!("{} (class {})", material.trim(), class_tag.trim()),
            None => material.trim().to_string(),
        }))
    }

    pub fn milling(
        &self,
        material: &str,
        mode: CuttingSpeedMode,
        input: &MillingInput,
    ) -> Result<MillingPlan, HandbookError> {
        let record = self.material(material)?;
        let cutting_speed = record.cutting_speed(mode);
        let result = milling::calculate(cutting_speed, input)?;

        Ok(MillingPlan {
            material: record.name.clone(),
            label: record.label.clone(),
            mode,
            cutting_speed,
            input: *input,
            result,
        })
    }

    pub fn turning(
        &self,
        material: &str,
        mode: CuttingSpeedMode,
        input: &TurningInput,
    ) -> Result<TurningPlan, HandbookError> {
        let record = self.material(material)?;
        let cutting_speed = record.cutting_speed(mode);
        let result = turning::calculate(cutting_speed, input)?;

        Ok(TurningPlan {
            material: record.name.clone(),
            label: record.label.clone(),
            mode,
            cutting_speed,
            input: *input,
            result,
        })
    }
}
