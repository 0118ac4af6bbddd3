//! Validation System - Bounded Fields and Plate Rules
//!
//! Rules produce structured violations.
//! Nothing here runs implicitly; callers opt in with `validate`.

use serde::{Deserialize, Serialize};

use crate::error::{PlateError, Result};
use crate::plate::Plate;
use crate::widgets::{Address, Widget};

/// Inclusive numeric bounds of a device field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: i64,
    pub max: i64,
}

impl ValueRange {
    pub const UINT8: Self = Self::new(0, 255);
    pub const UINT16: Self = Self::new(0, 65535);
    pub const INT8: Self = Self::new(-128, 128);
    pub const INT16: Self = Self::new(-32767, 32767);
    pub const ANGLE: Self = Self::new(0, 360);
    pub const ON_OFF: Self = Self::new(0, 1);

    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn check(&self, field: &'static str, value: i64) -> Result<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(PlateError::OutOfRange {
                field,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedField {
    pub field: &'static str,
    pub value: i64,
    pub range: ValueRange,
}

/// The set bounded fields of one widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundedFields {
    fields: Vec<BoundedField>,
}

impl BoundedFields {
    /// Records `value` when it is set; unset fields are never checked.
    pub fn add<T: Into<i64>>(&mut self, field: &'static str, value: Option<T>, range: ValueRange) {
        if let Some(value) = value {
            self.fields.push(BoundedField {
                field,
                value: value.into(),
                range,
            });
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundedField> {
        self.fields.iter()
    }

    pub fn check(&self) -> Result<()> {
        for f in &self.fields {
            f.range.check(f.field, f.value)?;
        }
        Ok(())
    }

    pub fn out_of_range(&self) -> impl Iterator<Item = &BoundedField> {
        self.fields.iter().filter(|f| !f.range.contains(f.value))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub plate: String,
    pub widget: Option<Address>,
    pub field: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == ViolationSeverity::Error)
    }

    /// Folds another report in, e.g. one per plate.
    pub fn merge(&mut self, other: ValidationReport) {
        self.violations.extend(other.violations);
        self.valid = !self.has_errors();
    }

    pub fn summary(&self) -> String {
        self.violations
            .iter()
            .map(|v| match v.widget {
                Some(addr) => format!("{}/{}: {}", v.plate, addr, v.message),
                None => format!("{}: {}", v.plate, v.message),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            valid: true,
            violations: vec![],
        }
    }
}

/// Validation rule trait - produces violations for one widget
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, widget: &Widget, plate: &Plate) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

pub struct RangeRule;

impl ValidationRule for RangeRule {
    fn name(&self) -> &'static str {
        "range"
    }

    fn validate(&self, widget: &Widget, plate: &Plate) -> Vec<ValidationViolation> {
        widget
            .bounded_fields()
            .out_of_range()
            .map(|f| ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                plate: plate.name.clone(),
                widget: widget.address(),
                field: Some(f.field.to_string()),
                message: format!(
                    "{} {} = {} must be in range [{}, {}]",
                    widget.tag(),
                    f.field,
                    f.value,
                    f.range.min,
                    f.range.max
                ),
            })
            .collect()
    }
}

/// A `parentid` must name a widget added earlier to the same plate.
pub struct ParentRule;

impl ValidationRule for ParentRule {
    fn name(&self) -> &'static str {
        "parent"
    }

    fn validate(&self, widget: &Widget, plate: &Plate) -> Vec<ValidationViolation> {
        let Some(parent) = widget.fields.parentid else {
            return vec![];
        };

        let resolved = plate
            .widget(parent)
            .zip(widget.id())
            .map_or(false, |(p, id)| p.id().map_or(false, |pid| pid < id));

        if resolved {
            vec![]
        } else {
            vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                plate: plate.name.clone(),
                widget: widget.address(),
                field: Some("parentid".to_string()),
                message: format!("parent {} is not an earlier widget on this plate", parent),
            }]
        }
    }
}

/// Validator orchestrates rules over every widget of a plate
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![Box::new(RangeRule), Box::new(ParentRule)],
        }
    }

    pub fn validate(&self, plate: &Plate) -> ValidationReport {
        let mut violations = vec![];

        for widget in plate.widgets() {
            for rule in &self.rules {
                violations.extend(rule.validate(widget, plate));
            }
        }

        let valid = !violations
            .iter()
            .any(|v| v.severity == ViolationSeverity::Error);
        ValidationReport { valid, violations }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds_inclusive() {
        assert!(ValueRange::ON_OFF.check("val", 0).is_ok());
        assert!(ValueRange::ON_OFF.check("val", 1).is_ok());
        assert!(ValueRange::ON_OFF.check("val", 2).is_err());
        assert!(ValueRange::INT16.check("x", -32768).is_err());
    }

    #[test]
    fn test_unset_fields_not_recorded() {
        let mut bounds = BoundedFields::default();
        bounds.add::<i32>("val", None, ValueRange::ON_OFF);
        bounds.add("max", Some(400), ValueRange::ANGLE);
        assert_eq!(bounds.iter().count(), 1);
        assert!(bounds.check().is_err());
        assert_eq!(bounds.out_of_range().next().unwrap().field, "max");
    }

    #[test]
    fn test_report_merge() {
        let mut report = ValidationReport::default();
        report.merge(ValidationReport {
            valid: false,
            violations: vec![ValidationViolation {
                rule: "range".into(),
                severity: ViolationSeverity::Error,
                plate: "p".into(),
                widget: None,
                field: None,
                message: "bad".into(),
            }],
        });
        assert!(!report.valid);
        assert_eq!(report.summary(), "p: bad");
    }
}
