// Closed value unions for instructor parameters and learner metrics.
//
// Both serialize untagged, so on the wire they are plain JSON scalars,
// arrays, or objects.

use serde::{Deserialize, Serialize};

/// A value an instructor supplies for one activity parameter.
///
/// Untagged deserialization tries the variants in declaration order, so
/// `true` becomes `Bool`, `12` becomes `Int`, `"x"` becomes `Text`, and
/// anything else (floats, arrays, objects, null) lands in `Json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Json(serde_json::Value),
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(v: serde_json::Value) -> Self {
        ParamValue::Json(v)
    }
}

/// A single metric value reported for one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Number(f64),
    Bool(bool),
    Text(String),
    TextList(Vec<String>),
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Int(v)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Number(v)
    }
}

impl From<bool> for MetricValue {
    fn from(v: bool) -> Self {
        MetricValue::Bool(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

impl From<Vec<&str>> for MetricValue {
    fn from(v: Vec<&str>) -> Self {
        MetricValue::TextList(v.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_value_picks_narrowest_variant() {
        let v: ParamValue = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(v, ParamValue::Bool(true));
        let v: ParamValue = serde_json::from_value(json!(12)).unwrap();
        assert_eq!(v, ParamValue::Int(12));
        let v: ParamValue = serde_json::from_value(json!("Sopa")).unwrap();
        assert_eq!(v, ParamValue::Text("Sopa".into()));
        let v: ParamValue = serde_json::from_value(json!({"idioma_alvo": ["dog"]})).unwrap();
        assert!(matches!(v, ParamValue::Json(_)));
    }

    #[test]
    fn test_param_value_float_falls_through_to_json() {
        let v: ParamValue = serde_json::from_value(json!(1.5)).unwrap();
        assert_eq!(v, ParamValue::Json(json!(1.5)));
    }

    #[test]
    fn test_metric_value_serializes_as_plain_json() {
        assert_eq!(serde_json::to_value(MetricValue::from(5_i64)).unwrap(), json!(5));
        assert_eq!(serde_json::to_value(MetricValue::from(42.5_f64)).unwrap(), json!(42.5));
        assert_eq!(
            serde_json::to_value(MetricValue::from(vec!["c(2,1)", "a(2,2)"])).unwrap(),
            json!(["c(2,1)", "a(2,2)"])
        );
    }

    #[test]
    fn test_metric_value_keeps_integers_and_floats_apart() {
        let v: MetricValue = serde_json::from_value(json!(80.0)).unwrap();
        assert_eq!(v, MetricValue::Number(80.0));
        let v: MetricValue = serde_json::from_value(json!(80)).unwrap();
        assert_eq!(v, MetricValue::Int(80));
    }
}
