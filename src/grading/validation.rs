use super::config::GradingConfig;
use super::formula::{MAX_GRADE, MIN_GRADE};

/// Validate grading configuration at startup.
/// Returns all validation errors at once (not just the first).
///
/// A non-positive `max_score` is allowed: it produces an empty table.
pub fn validate_grading(config: &GradingConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let finite_fields = [
        ("max_score", config.max_score),
        ("multiplier", config.multiplier),
        ("base", config.base),
    ];
    for (name, value) in finite_fields {
        if let Some(v) = value {
            if !v.is_finite() {
                errors.push(format!("grading.{}: must be a finite number, got {}", name, v));
            }
        }
    }

    if let Some(step) = config.step {
        if !step.is_finite() || step <= 0.0 {
            errors.push(format!("grading.step: must be a positive number, got {}", step));
        }
    }

    if let Some(threshold) = config.pass_threshold {
        if !(MIN_GRADE..=MAX_GRADE).contains(&threshold) {
            errors.push(format!(
                "grading.pass_threshold: must be between {} and {}, got {}",
                MIN_GRADE, MAX_GRADE, threshold
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> GradingConfig {
        GradingConfig {
            max_score: None,
            multiplier: None,
            base: None,
            step: None,
            pass_threshold: None,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_grading(&GradingConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_config() {
        assert!(validate_grading(&empty()).is_ok());
    }

    #[test]
    fn test_zero_max_score_allowed() {
        let config = GradingConfig {
            max_score: Some(0.0),
            ..empty()
        };
        assert!(validate_grading(&config).is_ok());
    }

    #[test]
    fn test_zero_step() {
        let config = GradingConfig {
            step: Some(0.0),
            ..empty()
        };
        let errors = validate_grading(&config).unwrap_err();
        assert!(errors[0].contains("grading.step"));
    }

    #[test]
    fn test_infinite_max_score() {
        let config = GradingConfig {
            max_score: Some(f64::INFINITY),
            ..empty()
        };
        let errors = validate_grading(&config).unwrap_err();
        assert!(errors[0].contains("grading.max_score"));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = GradingConfig {
            pass_threshold: Some(11.0),
            ..empty()
        };
        let errors = validate_grading(&config).unwrap_err();
        assert!(errors[0].contains("pass_threshold"));
    }

    #[test]
    fn test_collects_all_errors() {
        let config = GradingConfig {
            max_score: None,
            multiplier: Some(f64::NAN), // Error 1
            base: None,
            step: Some(-1.0),           // Error 2
            pass_threshold: Some(0.0),  // Error 3
        };
        let errors = validate_grading(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
