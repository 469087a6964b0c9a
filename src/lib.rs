//! cutspeed - cutting speed and feed calculator for milling and turning
//!
//! Load a [`MaterialCatalog`] once, then ask an [`Advisor`] for milling or
//! turning plans:
//!
//! ```no_run
//! use cutspeed::{Advisor, CuttingSpeedMode, MaterialCatalog, MillingInput};
//!
//! let catalog = MaterialCatalog::load_path("data/cutting_data.csv")?;
//! let plan = Advisor::new(&catalog).milling(
//!     "Steel C45",
//!     CuttingSpeedMode::Mean,
//!     &MillingInput {
//!         diameter: 10.0,
//!         feed_per_tooth: 0.05,
//!         tooth_count: 4,
//!         depth_of_cut: 2.0,
//!         length: 100.0,
//!     },
//! )?;
//! println!("{:.0} rpm", plan.result.rotation_speed);
//! # Ok::<(), cutspeed::HandbookError>(())
//! ```

pub mod config;
pub mod export;
pub mod handbook;
pub mod logging;
pub mod report;
pub mod table;

pub use handbook::{
    Advisor, CatalogLoadError, CuttingSpeedMode, HandbookError, MaterialCatalog, MaterialRecord,
    MillingInput, MillingPlan, MillingResult, TurningInput, TurningPlan, TurningResult,
};
