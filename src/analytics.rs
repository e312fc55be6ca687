// Per-learner analytics: the store interface and the sample-backed store
// the provider runs with until the game reports real telemetry.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{self, AnalyticsCatalog, MetricKind};
use crate::error::ProviderError;
use crate::value::MetricValue;

/// One metric observation for one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAnalyticsRecord {
    #[serde(rename = "inveniraStdID")]
    pub student_id: i64,
    pub metric: String,
    pub value: MetricValue,
    pub timestamp: DateTime<Utc>,
}

impl StudentAnalyticsRecord {
    pub fn new(student_id: i64, metric: &str, value: impl Into<MetricValue>) -> Self {
        Self {
            student_id,
            metric: metric.to_string(),
            value: value.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub name: String,
    pub value: MetricValue,
}

impl MetricRecord {
    fn new(name: &str, value: impl Into<MetricValue>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

/// Everything reported for one learner, in the shape Inven!RA consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAnalytics {
    #[serde(rename = "inveniraStdID")]
    pub student_id: i64,
    #[serde(rename = "quantAnalytics")]
    pub quantitative: Vec<MetricRecord>,
    #[serde(rename = "qualAnalytics")]
    pub qualitative: Vec<MetricRecord>,
}

/// Source of learner analytics for an activity.
pub trait AnalyticsStore: Send + Sync {
    /// Record one observation against an activity.
    fn append(&self, activity_id: &str, record: StudentAnalyticsRecord)
        -> Result<(), ProviderError>;

    /// All learner bundles for an activity. Never fails for unknown ids.
    fn query(&self, activity_id: &str) -> Vec<StudentAnalytics>;
}

/// Fixed bundles for two learners, returned while no telemetry exists.
pub fn sample_bundles() -> Vec<StudentAnalytics> {
    vec![
        StudentAnalytics {
            student_id: 1001,
            quantitative: vec![
                MetricRecord::new("tentativas_total", 5_i64),
                MetricRecord::new("tentativas_corretas", 4_i64),
                MetricRecord::new("tentativas_erradas", 1_i64),
                MetricRecord::new("tempo_medio_por_acerto_s", 42.5),
                MetricRecord::new("percentual_acertos", 80.0),
                MetricRecord::new("percentual_erros", 20.0),
            ],
            qualitative: vec![
                MetricRecord::new("ultima_palavra_encontrada", "house"),
                MetricRecord::new(
                    "sequencia_cliques",
                    vec!["h(1,1)", "o(1,2)", "u(1,3)", "s(1,4)", "e(1,5)"],
                ),
            ],
        },
        StudentAnalytics {
            student_id: 1002,
            quantitative: vec![
                MetricRecord::new("tentativas_total", 3_i64),
                MetricRecord::new("tentativas_corretas", 1_i64),
                MetricRecord::new("tentativas_erradas", 2_i64),
                MetricRecord::new("tempo_medio_por_acerto_s", 60.0),
                MetricRecord::new("percentual_acertos", 33.3),
                MetricRecord::new("percentual_erros", 66.7),
            ],
            qualitative: vec![
                MetricRecord::new("ultima_palavra_encontrada", "cat"),
                MetricRecord::new("sequencia_cliques", vec!["c(2,1)", "a(2,2)", "t(2,3)"]),
            ],
        },
    ]
}

/// In-memory store that falls back to [`sample_bundles`] for any activity
/// with no recorded observations.
pub struct SampleAnalyticsStore {
    catalog: &'static AnalyticsCatalog,
    events: Mutex<HashMap<String, Vec<StudentAnalyticsRecord>>>,
}

impl SampleAnalyticsStore {
    pub fn new() -> Self {
        Self {
            catalog: catalog::analytics(),
            events: Mutex::new(HashMap::new()),
        }
    }

    /// Fold observations into bundles: one per learner, ordered by learner
    /// id, latest value per metric, metrics in catalog order.
    fn bundle(&self, records: &[StudentAnalyticsRecord]) -> Vec<StudentAnalytics> {
        let mut latest: BTreeMap<i64, HashMap<&str, &StudentAnalyticsRecord>> = BTreeMap::new();
        for record in records {
            let slot = latest
                .entry(record.student_id)
                .or_default()
                .entry(record.metric.as_str())
                .or_insert(record);
            if record.timestamp >= slot.timestamp {
                *slot = record;
            }
        }

        latest
            .into_iter()
            .map(|(student_id, metrics)| {
                let pick = |kind: MetricKind| -> Vec<MetricRecord> {
                    let defs = match kind {
                        MetricKind::Qualitative => &self.catalog.qualitative,
                        MetricKind::Quantitative => &self.catalog.quantitative,
                    };
                    defs.iter()
                        .filter_map(|def| {
                            metrics.get(def.name.as_str()).map(|r| MetricRecord {
                                name: def.name.clone(),
                                value: r.value.clone(),
                            })
                        })
                        .collect()
                };
                StudentAnalytics {
                    student_id,
                    quantitative: pick(MetricKind::Quantitative),
                    qualitative: pick(MetricKind::Qualitative),
                }
            })
            .collect()
    }
}

impl Default for SampleAnalyticsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsStore for SampleAnalyticsStore {
    fn append(
        &self,
        activity_id: &str,
        record: StudentAnalyticsRecord,
    ) -> Result<(), ProviderError> {
        let (_, def) = self
            .catalog
            .lookup(&record.metric)
            .ok_or_else(|| ProviderError::UnknownMetric(record.metric.clone()))?;
        if !def.kind.accepts(&record.value) {
            return Err(ProviderError::MetricTypeMismatch {
                metric: record.metric,
                expected: def.kind,
            });
        }

        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        events
            .entry(activity_id.to_string())
            .or_default()
            .push(record);
        Ok(())
    }

    fn query(&self, activity_id: &str) -> Vec<StudentAnalytics> {
        let events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        match events.get(activity_id) {
            Some(records) if !records.is_empty() => self.bundle(records),
            _ => sample_bundles(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_unknown_activity_gets_samples() {
        let store = SampleAnalyticsStore::new();
        let bundles = store.query("never-deployed");
        assert_eq!(bundles, sample_bundles());
        assert_eq!(bundles.len(), 2);
    }

    #[test]
    fn test_sample_metrics_cover_the_catalog() {
        let declared: Vec<&str> = catalog::analytics().metric_names().collect();
        for bundle in sample_bundles() {
            let mut reported: Vec<&str> = bundle
                .qualitative
                .iter()
                .chain(bundle.quantitative.iter())
                .map(|m| m.name.as_str())
                .collect();
            reported.sort_unstable();
            let mut expected = declared.clone();
            expected.sort_unstable();
            assert_eq!(reported, expected);
        }
    }

    #[test]
    fn test_sample_values_match_declared_types() {
        let catalog = catalog::analytics();
        for bundle in sample_bundles() {
            for m in bundle.qualitative.iter().chain(bundle.quantitative.iter()) {
                let (_, def) = catalog.lookup(&m.name).unwrap();
                assert!(def.kind.accepts(&m.value), "{}", m.name);
            }
        }
    }

    #[test]
    fn test_append_rejects_unknown_metric() {
        let store = SampleAnalyticsStore::new();
        let err = store
            .append("a1", StudentAnalyticsRecord::new(7, "pontuacao", 10_i64))
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownMetric(name) if name == "pontuacao"));
    }

    #[test]
    fn test_append_rejects_wrong_value_shape() {
        let store = SampleAnalyticsStore::new();
        let err = store
            .append("a1", StudentAnalyticsRecord::new(7, "tentativas_total", "cinco"))
            .unwrap_err();
        assert!(matches!(err, ProviderError::MetricTypeMismatch { .. }));
        assert_eq!(store.query("a1"), sample_bundles());
    }

    #[test]
    fn test_recorded_observations_replace_samples() {
        let store = SampleAnalyticsStore::new();
        store
            .append("a1", StudentAnalyticsRecord::new(9, "tentativas_total", 2_i64))
            .unwrap();
        store
            .append("a1", StudentAnalyticsRecord::new(3, "ultima_palavra_encontrada", "dog"))
            .unwrap();
        store
            .append("a1", StudentAnalyticsRecord::new(3, "percentual_acertos", 50.0))
            .unwrap();
        store
            .append("a1", StudentAnalyticsRecord::new(3, "tentativas_total", 4_i64))
            .unwrap();

        let bundles = store.query("a1");
        assert_eq!(bundles.len(), 2);

        assert_eq!(bundles[0].student_id, 3);
        let quant: Vec<&str> = bundles[0].quantitative.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(quant, vec!["tentativas_total", "percentual_acertos"]);
        assert_eq!(bundles[0].qualitative[0].value, MetricValue::from("dog"));

        assert_eq!(bundles[1].student_id, 9);
        assert!(bundles[1].qualitative.is_empty());

        // Other activities are unaffected.
        assert_eq!(store.query("a2"), sample_bundles());
    }

    #[test]
    fn test_latest_observation_wins() {
        let store = SampleAnalyticsStore::new();
        let mut newer = StudentAnalyticsRecord::new(1, "tentativas_total", 8_i64);
        let mut older = StudentAnalyticsRecord::new(1, "tentativas_total", 6_i64);
        older.timestamp = newer.timestamp - Duration::seconds(30);
        newer.timestamp = older.timestamp + Duration::seconds(60);

        store.append("a1", newer).unwrap();
        store.append("a1", older).unwrap();

        let bundles = store.query("a1");
        assert_eq!(bundles[0].quantitative[0].value, MetricValue::Int(8));
    }
}
