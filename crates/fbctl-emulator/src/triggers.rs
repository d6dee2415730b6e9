//! Trigger definitions handed to the functions emulator

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Region used when a trigger does not name one
pub const DEFAULT_REGION: &str = "us-central1";

/// Runtime platform of an emulated function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Gcfv1,
    Gcfv2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTrigger {
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_filters: Option<Value>,
}

/// One function as the emulator sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmulatedTrigger {
    pub name: String,
    pub entry_point: String,
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_memory_mb: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_trigger: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_trigger: Option<EventTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_queue_trigger: Option<Value>,
}

impl EmulatedTrigger {
    /// A bare trigger with only a name; entry point defaults to the name
    pub fn new(name: impl Into<String>, platform: Platform) -> Self {
        let name = name.into();
        Self {
            entry_point: name.clone(),
            name,
            platform,
            region: None,
            timeout_seconds: None,
            available_memory_mb: None,
            https_trigger: None,
            event_trigger: None,
            schedule: None,
            task_queue_trigger: None,
        }
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Unique id within the emulator: `{region}-{name}`
    pub fn id(&self) -> String {
        format!("{}-{}", self.region(), self.name)
    }

    pub fn is_background(&self) -> bool {
        self.event_trigger.is_some()
    }
}

/// Service owning an event type, e.g. `firestore.googleapis.com`
pub fn service_from_event_type(event_type: &str) -> Option<&'static str> {
    const SERVICES: &[(&str, &str)] = &[
        ("firestore", "firestore.googleapis.com"),
        ("database", "firebaseio.com"),
        ("pubsub", "pubsub.googleapis.com"),
        ("storage", "storage.googleapis.com"),
        ("analytics", "app-measurement.com"),
        ("auth", "firebaseauth.googleapis.com"),
        ("testlab", "testing.googleapis.com"),
        ("remoteconfig", "firebaseremoteconfig.googleapis.com"),
    ];
    SERVICES
        .iter()
        .find(|(needle, _)| event_type.contains(needle))
        .map(|(_, service)| *service)
}
