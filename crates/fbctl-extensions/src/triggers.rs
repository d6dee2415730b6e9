//! Conversion of `extension.yaml` function resources into emulator triggers

use crate::error::{ExtensionsError, Result};
use crate::types::{
    Resource, FUNCTIONS_RESOURCE_TYPE, FUNCTIONS_V2_RESOURCE_TYPE,
    SCHEDULED_FUNCTION_RESOURCE_TYPE,
};
use fbctl_emulator::triggers::{service_from_event_type, Platform};
use fbctl_emulator::{EmulatedTrigger, EventTrigger};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// System param holding the deploy location of every function
pub const LOCATION_SYSTEM_PARAM: &str = "firebaseextensions.v1beta.function/location";

const SCHEDULE_EVENT_TYPE: &str = "google.pubsub.topic.publish";

/// Build the emulator trigger for one function resource
pub fn function_resource_to_trigger(
    resource: &Resource,
    system_params: &BTreeMap<String, String>,
) -> Result<EmulatedTrigger> {
    let empty = Value::Object(Map::new());
    let props = resource.properties.as_ref().unwrap_or(&empty);

    let mut trigger = match resource.resource_type.as_str() {
        FUNCTIONS_RESOURCE_TYPE | SCHEDULED_FUNCTION_RESOURCE_TYPE => v1_trigger(resource, props),
        FUNCTIONS_V2_RESOURCE_TYPE => v2_trigger(resource, props),
        other => {
            return Err(ExtensionsError::invalid_spec(format!(
                "Unexpected resource type {}",
                other
            )))
        }
    };

    if trigger.region.is_none() {
        trigger.region = system_params.get(LOCATION_SYSTEM_PARAM).cloned();
    }
    Ok(trigger)
}

fn str_prop(props: &Value, key: &str) -> Option<String> {
    props.get(key).and_then(Value::as_str).map(str::to_string)
}

fn missing_trigger(name: &str) {
    warn!(
        "Function '{}' is missing a trigger in extension.yaml. Please add one, as triggers defined in code are ignored.",
        name
    );
}

fn v1_trigger(resource: &Resource, props: &Value) -> EmulatedTrigger {
    let mut trigger = EmulatedTrigger::new(&resource.name, Platform::Gcfv1);
    trigger.region = str_prop(props, "location");
    trigger.timeout_seconds = str_prop(props, "timeout").and_then(|t| seconds_from_duration(&t));
    trigger.available_memory_mb = props.get("availableMemoryMb").and_then(leading_number);

    if let Some(https) = props.get("httpsTrigger") {
        trigger.https_trigger = Some(https.clone());
    }

    if let Some(event) = props.get("eventTrigger") {
        let event_type = str_prop(event, "eventType").unwrap_or_default();
        trigger.event_trigger = Some(EventTrigger {
            service: service_from_event_type(&event_type).map(str::to_string),
            resource: str_prop(event, "resource"),
            event_type,
            event_filters: None,
        });
    } else if let Some(schedule) = props.get("scheduleTrigger") {
        trigger.event_trigger = Some(EventTrigger {
            event_type: SCHEDULE_EVENT_TYPE.to_string(),
            resource: Some(String::new()),
            service: None,
            event_filters: None,
        });
        trigger.schedule = Some(schedule.clone());
    } else if let Some(queue) = props.get("taskQueueTrigger") {
        trigger.task_queue_trigger = Some(queue.clone());
    } else if trigger.https_trigger.is_none() {
        missing_trigger(&resource.name);
    }
    trigger
}

fn v2_trigger(resource: &Resource, props: &Value) -> EmulatedTrigger {
    let mut trigger = EmulatedTrigger::new(&resource.name, Platform::Gcfv2);
    trigger.region = str_prop(props, "location");

    if let Some(service) = props.get("serviceConfig") {
        trigger.timeout_seconds = service.get("timeoutSeconds").and_then(leading_number);
        trigger.available_memory_mb = service.get("availableMemory").and_then(leading_number);
    }

    match props.get("eventTrigger") {
        Some(event) => {
            let event_type = str_prop(event, "eventType").unwrap_or_default();
            let filters: Map<String, Value> = event
                .get("eventFilters")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter(|f| f.get("operator").is_none())
                .filter_map(|f| {
                    let attribute = f.get("attribute")?.as_str()?;
                    Some((attribute.to_string(), f.get("value")?.clone()))
                })
                .collect();
            trigger.event_trigger = Some(EventTrigger {
                service: service_from_event_type(&event_type).map(str::to_string),
                resource: None,
                event_type,
                event_filters: (!filters.is_empty()).then_some(Value::Object(filters)),
            });
        }
        None => missing_trigger(&resource.name),
    }
    trigger
}

/// `"60s"` -> 60
fn seconds_from_duration(duration: &str) -> Option<u64> {
    duration.trim_end_matches('s').parse::<f64>().ok().map(|s| s as u64)
}

/// Numbers given either as numbers or as strings with a unit suffix (`"512Mi"`)
fn leading_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        }
        _ => None,
    }
}
