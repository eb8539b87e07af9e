// Unit tests for business rules

use super::*;

#[test]
fn test_range_rules_accepts_valid_range() {
    let duration = RangeRules::check(5.0, 15.0, Some(80.0)).unwrap();
    assert_eq!(duration, 10.0);

    // Unknown source duration is not enforced
    assert!(RangeRules::check(100.0, 120.0, None).is_ok());

    // Ending exactly at the source end is allowed
    assert!(RangeRules::check(70.0, 80.0, Some(80.0)).is_ok());
}

#[test]
fn test_range_rules_rejects_inverted_and_empty_ranges() {
    assert!(matches!(
        RangeRules::check(10.0, 5.0, Some(80.0)),
        Err(DomainError::Range(_))
    ));
    assert!(matches!(
        RangeRules::check(10.0, 10.0, None),
        Err(DomainError::Range(_))
    ));
}

#[test]
fn test_range_rules_rejects_out_of_bounds() {
    assert!(matches!(
        RangeRules::check(-0.5, 5.0, None),
        Err(DomainError::Range(_))
    ));
    assert!(matches!(
        RangeRules::check(70.0, 80.5, Some(80.0)),
        Err(DomainError::Range(_))
    ));
    assert!(matches!(
        RangeRules::check(0.0, f64::INFINITY, None),
        Err(DomainError::Range(_))
    ));
}

#[test]
fn test_range_rules_property_grid() {
    let duration = 80.0;
    for start in [0.0, 1.5, 10.0, 42.25, 79.0] {
        for end in [0.0, 1.0, 1.5, 10.0, 42.0, 80.0, 80.01, 120.0] {
            let result = RangeRules::check(start, end, Some(duration));
            if end <= start || end > duration {
                assert!(matches!(result, Err(DomainError::Range(_))), "{} {}", start, end);
            } else {
                assert!(result.is_ok(), "{} {}", start, end);
            }
        }
    }
}

#[test]
fn test_accuracy_validator_default_tolerance() {
    let validator = AccuracyValidator::default();
    assert_eq!(validator.tolerance(), DEFAULT_TOLERANCE);
    assert!(validator.validate(10.0, 10.02));
    assert!(validator.validate(10.0, 9.96));
    assert!(!validator.validate(10.0, 10.08));
}

#[test]
fn test_accuracy_validator_boundary() {
    // 50ms exactly is accepted despite binary rounding
    assert!(validate(10.0, 10.05, 0.05));
    assert!(validate(5.08, 35.33 - 30.25, 0.05));
    assert!(validate(10.2, 15.7 - 5.5, 0.05));
    assert!(!validate(10.0, 10.051, 0.05));
    assert!(!validate(10.0, f64::NAN, 0.05));
}

#[test]
fn test_accuracy_report() {
    let report = AccuracyValidator::default().check(10.0, 10.02);
    assert!(report.within_tolerance);
    assert!((report.difference_ms - 20.0).abs() < 1e-6);
    assert_eq!(report.tolerance_ms, 50.0);
}

#[test]
fn test_accuracy_validator_rejects_bad_tolerance() {
    assert!(AccuracyValidator::new(0.0).is_err());
    assert!(AccuracyValidator::new(-0.01).is_err());
    assert!(AccuracyValidator::new(0.1).is_ok());
}
