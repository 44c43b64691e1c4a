//! Parameter sets: validation, declared input ranges and JSON partial updates.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Rejected parameter input. The current parameter set is left untouched.
#[derive(Debug, Error)]
pub enum ParamError {
    /// The patch could not be parsed, or named a field the scenario does not have.
    #[error("invalid parameter json: {0}")]
    Json(#[from] serde_json::Error),

    /// Partial updates must be JSON objects keyed by field name.
    #[error("parameter patch must be a JSON object")]
    NotAnObject,

    /// NaN and infinities never enter a parameter set.
    #[error("parameter `{name}` must be finite (got {value})")]
    NotFinite { name: &'static str, value: f64 },

    /// No scenario is registered under this identifier.
    #[error("unknown scenario `{0}`")]
    UnknownScenario(String),
}

/// Declared input range of one numeric parameter, as offered by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub unit: &'static str,
}

impl ParamSpec {
    pub const fn new(
        name: &'static str,
        label: &'static str,
        min: f64,
        max: f64,
        step: f64,
        unit: &'static str,
    ) -> Self {
        Self { name, label, min, max, step, unit }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// The immutable-per-tick parameter record of a scenario.
pub trait ParamSet: Clone + Default + Serialize + DeserializeOwned {
    /// Every numeric field with its current value.
    fn fields(&self) -> Vec<(&'static str, f64)>;

    /// Declared ranges for the user-editable fields.
    fn specs() -> &'static [ParamSpec];

    fn validate(&self) -> Result<(), ParamError> {
        for (name, value) in self.fields() {
            if !value.is_finite() {
                return Err(ParamError::NotFinite { name, value });
            }
        }
        Ok(())
    }
}

/// Merge a JSON object over `current` and decode the result.
///
/// Nested objects merge field by field; anything else replaces the old value.
/// Unknown fields and type mismatches are rejected by the parameter type.
pub fn merge_patch<P: ParamSet>(current: &P, patch: &Value) -> Result<P, ParamError> {
    if !patch.is_object() {
        return Err(ParamError::NotAnObject);
    }
    let mut merged = serde_json::to_value(current)?;
    merge_into(&mut merged, patch);
    let next: P = serde_json::from_value(merged)?;
    next.validate()?;
    Ok(next)
}

fn merge_into(dst: &mut Value, src: &Value) {
    match (dst, src) {
        (Value::Object(dst), Value::Object(src)) => {
            for (key, value) in src {
                match dst.get_mut(key) {
                    Some(slot) => merge_into(slot, value),
                    None => {
                        dst.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (dst, src) => *dst = src.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Sample {
        speed: f64,
        mass: f64,
        anchor: Anchor,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Anchor {
        x: f64,
        y: f64,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self { speed: 3.0, mass: 1.0, anchor: Anchor { x: 0.0, y: 0.0 } }
        }
    }

    const SPECS: [ParamSpec; 1] = [ParamSpec::new("speed", "Speed", 0.0, 10.0, 0.5, "m/s")];

    impl ParamSet for Sample {
        fn fields(&self) -> Vec<(&'static str, f64)> {
            vec![
                ("speed", self.speed),
                ("mass", self.mass),
                ("anchor.x", self.anchor.x),
                ("anchor.y", self.anchor.y),
            ]
        }

        fn specs() -> &'static [ParamSpec] {
            &SPECS
        }
    }

    #[test]
    fn partial_patch_keeps_other_fields() {
        let next = merge_patch(&Sample::default(), &json!({ "speed": 7.5 })).unwrap();
        assert_eq!(next.speed, 7.5);
        assert_eq!(next.mass, 1.0);
    }

    #[test]
    fn nested_patch_merges_fields() {
        let next = merge_patch(&Sample::default(), &json!({ "anchor": { "y": 4.0 } })).unwrap();
        assert_eq!(next.anchor, Anchor { x: 0.0, y: 4.0 });
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = merge_patch(&Sample::default(), &json!({ "colour": 1.0 })).unwrap_err();
        assert!(matches!(err, ParamError::Json(_)));
    }

    #[test]
    fn non_object_patch_is_rejected() {
        let err = merge_patch(&Sample::default(), &json!([1, 2])).unwrap_err();
        assert!(matches!(err, ParamError::NotAnObject));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let err = merge_patch(&Sample::default(), &json!({ "mass": "heavy" })).unwrap_err();
        assert!(matches!(err, ParamError::Json(_)));
    }

    #[test]
    fn validate_flags_non_finite() {
        let sample = Sample { mass: f64::NAN, ..Sample::default() };
        let err = sample.validate().unwrap_err();
        assert!(matches!(err, ParamError::NotFinite { name: "mass", .. }));
    }

    #[test]
    fn spec_range_is_inclusive() {
        assert!(SPECS[0].contains(0.0));
        assert!(SPECS[0].contains(10.0));
        assert!(!SPECS[0].contains(10.5));
    }
}
