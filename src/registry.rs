// In-memory record of deployed activities.
//
// Entries live for the lifetime of the process. Deploying the same activity
// id twice overwrites the earlier entry.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics;
use crate::value::ParamValue;

/// What the orchestrator sends when it deploys an activity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeployRequest {
    #[serde(rename = "activityID", alias = "activity_id")]
    pub activity_id: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
    pub course_id: Option<String>,
    pub teacher_id: Option<String>,
}

impl DeployRequest {
    pub fn new(activity_id: impl Into<String>) -> Self {
        Self {
            activity_id: activity_id.into(),
            ..Default::default()
        }
    }
}

/// A deployed activity, as stored and as returned from `/deploy`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeployedActivity {
    #[serde(rename = "activityID")]
    pub activity_id: String,
    #[serde(rename = "instanceID")]
    pub instance_id: String,
    pub user_url: String,
    pub created_at: DateTime<Utc>,
    pub parameters: BTreeMap<String, ParamValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
}

/// Instance id for an activity. Deterministic, so re-deploys collide.
pub fn instance_id(activity_id: &str) -> String {
    format!("{activity_id}-inst-001")
}

/// Learner-facing URL for an activity. The id is embedded verbatim.
pub fn launch_url(base_url: &str, activity_id: &str) -> String {
    format!("{base_url}/play?activityID={activity_id}")
}

/// Thread-safe deployment registry keyed by activity id.
#[derive(Debug, Clone)]
pub struct DeploymentRegistry {
    base_url: Arc<str>,
    inner: Arc<Mutex<HashMap<String, DeployedActivity>>>,
}

impl DeploymentRegistry {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: Arc::from(base_url.trim_end_matches('/')),
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register (or re-register) an activity and return the stored entry.
    ///
    /// A re-deploy never moves `created_at` backwards, even if the wall
    /// clock does.
    pub fn deploy(&self, request: DeployRequest) -> DeployedActivity {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        let mut created_at = Utc::now();
        if let Some(previous) = map.get(&request.activity_id) {
            created_at = created_at.max(previous.created_at);
        }

        let entry = DeployedActivity {
            instance_id: instance_id(&request.activity_id),
            user_url: launch_url(&self.base_url, &request.activity_id),
            created_at,
            parameters: request.parameters,
            course_id: request.course_id,
            teacher_id: request.teacher_id,
            activity_id: request.activity_id,
        };

        if map.insert(entry.activity_id.clone(), entry.clone()).is_none() {
            metrics::DEPLOYED_ACTIVITIES.inc();
        }
        metrics::DEPLOYMENTS_TOTAL.inc();
        entry
    }

    pub fn get(&self, activity_id: &str) -> Option<DeployedActivity> {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.get(activity_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
