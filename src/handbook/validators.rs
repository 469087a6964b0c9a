//! Input validation. The calculators call these before any arithmetic, and
//! check the derived values with [`require_finite`] afterwards.

use super::{HandbookError, MillingInput, TurningInput};

fn require_positive(field: &str, value: f64, unit: &str) -> Result<(), HandbookError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(HandbookError::InvalidGeometry(format!(
            "{field} must be a positive number of {unit}, got {value}"
        )))
    }
}

/// Every derived value must be a real number. Inputs that pass the bounds
/// can still overflow, e.g. a subnormal diameter makes N infinite.
pub fn require_finite(values: &[(&str, f64)]) -> Result<(), HandbookError> {
    match values.iter().find(|(_, value)| !value.is_finite()) {
        Some((field, value)) => Err(HandbookError::InvalidGeometry(format!(
            "{field} is not a finite number ({value}), check the input magnitudes"
        ))),
        None => Ok(()),
    }
}

/// Check a milling setup against the bounds the chip-thickness formula needs
pub fn validate_milling(cutting_speed: f64, input: &MillingInput) -> Result<(), HandbookError> {
    require_positive("cutting speed", cutting_speed, "m/min")?;
    require_positive("tool diameter", input.diameter, "mm")?;
    require_positive("feed per tooth", input.feed_per_tooth, "mm")?;
    require_positive("depth of cut", input.depth_of_cut, "mm")?;
    require_positive("machining length", input.length, "mm")?;

    if input.tooth_count == 0 {
        return Err(HandbookError::InvalidGeometry(
            "tooth count must be at least 1".to_string(),
        ));
    }

    // sqrt((ae/D)(1 - ae/D)) is only real for ae <= D
    if input.depth_of_cut > input.diameter {
        return Err(HandbookError::InvalidGeometry(format!(
            "depth of cut {} mm exceeds tool diameter {} mm",
            input.depth_of_cut, input.diameter
        )));
    }

    Ok(())
}

pub fn validate_turning(cutting_speed: f64, input: &TurningInput) -> Result<(), HandbookError> {
    require_positive("cutting speed", cutting_speed, "m/min")?;
    require_positive("workpiece diameter", input.diameter, "mm")?;
    require_positive("feed per revolution", input.feed_per_rev, "mm")?;
    require_positive("machining length", input.length, "mm")?;
    require_positive("target roughness Ra", input.target_roughness_ra, "um")?;
    require_positive("nose radius", input.nose_radius, "mm")?;
    if let Some(land) = input.land_length {
        require_positive("chip breaker land length", land, "mm")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn milling() -> MillingInput {
        MillingInput {
            diameter: 10.0,
            feed_per_tooth: 0.05,
            tooth_count: 4,
            depth_of_cut: 2.0,
            length: 100.0,
        }
    }

    fn turning() -> TurningInput {
        TurningInput {
            diameter: 50.0,
            feed_per_rev: 0.2,
            length: 100.0,
            target_roughness_ra: 1.6,
            nose_radius: 0.4,
            land_length: None,
        }
    }

    fn message(err: HandbookError) -> String {
        match err {
            HandbookError::InvalidGeometry(msg) => msg,
            other => panic!("expected InvalidGeometry, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_inputs_pass() {
        assert!(validate_milling(120.0, &milling()).is_ok());
        assert!(validate_turning(100.0, &turning()).is_ok());
    }

    #[test]
    fn test_depth_equal_to_diameter_is_allowed() {
        let input = MillingInput {
            depth_of_cut: 10.0,
            ..milling()
        };
        assert!(validate_milling(120.0, &input).is_ok());
    }

    #[test]
    fn test_depth_over_diameter() {
        let input = MillingInput {
            depth_of_cut: 10.5,
            ..milling()
        };
        let msg = message(validate_milling(120.0, &input).unwrap_err());
        assert!(msg.contains("exceeds tool diameter"), "{msg}");
    }

    #[test]
    fn test_zero_teeth() {
        let input = MillingInput {
            tooth_count: 0,
            ..milling()
        };
        assert!(message(validate_milling(120.0, &input).unwrap_err()).contains("tooth count"));
    }

    #[test]
    fn test_non_finite_and_negative_values() {
        let nan = MillingInput {
            feed_per_tooth: f64::NAN,
            ..milling()
        };
        assert!(message(validate_milling(120.0, &nan).unwrap_err()).contains("feed per tooth"));

        let negative = TurningInput {
            nose_radius: -0.4,
            ..turning()
        };
        assert!(message(validate_turning(100.0, &negative).unwrap_err()).contains("nose radius"));

        assert!(validate_turning(f64::INFINITY, &turning()).is_err());
        assert!(validate_milling(0.0, &milling()).is_err());
    }

    #[test]
    fn test_require_finite() {
        assert!(require_finite(&[("N", 3820.0), ("Vf", 763.9)]).is_ok());

        let msg = message(require_finite(&[("N", f64::INFINITY), ("Vf", f64::NAN)]).unwrap_err());
        assert!(msg.starts_with("N is not a finite number (inf)"), "{msg}");
    }

    #[test]
    fn test_land_length_checked_when_present() {
        let input = TurningInput {
            land_length: Some(0.0),
            ..turning()
        };
        assert!(message(validate_turning(100.0, &input).unwrap_err()).contains("land length"));
    }
}
