//! Human-readable result tables
//!
//! Rounding happens here and only here; plans keep full precision.

use crate::handbook::{MillingPlan, TurningPlan};
use std::fmt;

/// Advisory attached to a result. Never blocks it.
#[derive(Debug, Clone, PartialEq)]
pub struct Advisory {
    pub code: &'static str,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub rows: Vec<(&'static str, String)>,
    pub advisories: Vec<Advisory>,
}

impl Report {
    fn new(title: String) -> Self {
        Self {
            title,
            rows: Vec::new(),
            advisories: Vec::new(),
        }
    }

    fn row(&mut self, label: &'static str, value: String) {
        self.rows.push((label, value));
    }

    pub fn has_advisories(&self) -> bool {
        !self.advisories.is_empty()
    }
}

pub fn milling_report(plan: &MillingPlan) -> Report {
    let r = &plan.result;
    let mut report = Report::new(format!(
        "Milling {} - Vc {} m/min ({})",
        plan.label, plan.cutting_speed, plan.mode
    ));

    report.row("Rotation speed (N)", format!("{:.0} rpm", r.rotation_speed));
    report.row("Feed speed (Vf)", format!("{:.1} mm/min", r.feed_speed));
    report.row("Chip thickness (h)", format!("{:.3} mm", r.chip_thickness));
    report.row("Minimum chip (hmin)", format!("{:.3} mm", r.chip_thickness_min));
    report.row("Estimated time", format!("{:.2} min", r.estimated_time));

    if r.thin_chip_warning {
        report.advisories.push(Advisory {
            code: "THIN_CHIP",
            message: format!(
                "Chip {:.4} mm is below the {:.4} mm minimum: risk of rubbing and early tool wear",
                r.chip_thickness, r.chip_thickness_min
            ),
            suggestion: Some("Increase feed per tooth or radial engagement".to_string()),
        });
    }

    report
}

pub fn turning_report(plan: &TurningPlan) -> Report {
    let r = &plan.result;
    let mut report = Report::new(format!(
        "Turning {} - Vc {} m/min ({})",
        plan.label, plan.cutting_speed, plan.mode
    ));

    report.row("Rotation speed (N)", format!("{:.0} rpm", r.rotation_speed));
    report.row("Feed (f)", format!("{:.2} mm/rev", r.feed_speed));
    report.row("Max recommended feed (fmax)", format!("{:.3} mm/rev", r.max_recommended_feed));
    report.row("Estimated time", format!("{:.2} min", r.estimated_time));

    if r.excess_feed_warning {
        report.advisories.push(Advisory {
            code: "EXCESS_FEED",
            message: format!(
                "Feed {} mm/rev exceeds {:.3} mm/rev for Ra {} um",
                plan.input.feed_per_rev, r.max_recommended_feed, plan.input.target_roughness_ra
            ),
            suggestion: Some("Lower the feed or use a larger nose radius".to_string()),
        });
    }

    if r.chip_breaker_warning {
        report.advisories.push(Advisory {
            code: "CHIP_BREAKER_IDLE",
            message: format!(
                "Feed {} mm/rev does not clear the chip breaker land",
                plan.input.feed_per_rev
            ),
            suggestion: Some("Feed per revolution should exceed the land length".to_string()),
        });
    }

    report
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        let width = self.rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        for (label, value) in &self.rows {
            writeln!(f, "  {label:<width$}  {value}")?;
        }
        for advisory in &self.advisories {
            writeln!(f, "WARNING [{}] {}", advisory.code, advisory.message)?;
            if let Some(suggestion) = &advisory.suggestion {
                writeln!(f, "  -> {suggestion}")?;
            }
        }
        Ok(())
    }
}
