//! Interactive shell over a running functions emulator
//!
//! The shell resolves triggers by name and turns `call(name, data)` into a
//! background event delivered through the emulator.

use crate::error::{EmulatorError, Result};
use crate::triggers::EmulatedTrigger;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// The parts of a functions emulator the shell relies on
pub trait FunctionsEmulator {
    fn trigger_definitions(&self) -> Vec<EmulatedTrigger>;

    fn project_id(&self) -> &str;

    /// Local URL serving an HTTPS function
    fn http_function_url(&self, trigger: &EmulatedTrigger) -> String;

    /// Deliver an event to a background function
    fn send_request(&self, trigger: &EmulatedTrigger, body: Value) -> Result<()>;
}

/// Extra event fields for [`FunctionsShell::call`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct CallOptions {
    /// Resource name, or an object carrying a `name`
    pub resource: Option<Value>,
    pub params: Option<Value>,
    pub auth: Option<Value>,
}

/// Event payload delivered to background functions
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellEvent {
    pub event_id: String,
    pub timestamp: String,
    pub event_type: String,
    pub resource: Option<Value>,
    pub params: Option<Value>,
    pub auth: Option<Value>,
    pub data: Value,
}

pub struct FunctionsShell<E: FunctionsEmulator> {
    emulator: E,
    triggers: Vec<EmulatedTrigger>,
    emulated_functions: Vec<String>,
    urls: BTreeMap<String, String>,
}

impl<E: FunctionsEmulator> FunctionsShell<E> {
    pub fn new(emulator: E) -> Self {
        let triggers = emulator.trigger_definitions();
        let emulated_functions = triggers.iter().map(EmulatedTrigger::id).collect();

        let urls = triggers
            .iter()
            .filter(|t| t.https_trigger.is_some())
            .map(|t| (t.id(), emulator.http_function_url(t)))
            .collect();

        let shell = Self {
            emulator,
            triggers,
            emulated_functions,
            urls,
        };
        debug!("functions: {}", shell.loaded_message());
        shell
    }

    /// Banner the front end shows once the shell is ready
    pub fn loaded_message(&self) -> String {
        format!("Loaded functions: {}", self.entry_points().join(", "))
    }

    /// Ids of every loaded function
    pub fn emulated_functions(&self) -> &[String] {
        &self.emulated_functions
    }

    /// Entry points, in load order
    pub fn entry_points(&self) -> Vec<&str> {
        self.triggers.iter().map(|t| t.entry_point.as_str()).collect()
    }

    /// Local URL of an HTTPS function by trigger id
    pub fn url(&self, id: &str) -> Option<&str> {
        self.urls.get(id).map(String::as_str)
    }

    pub fn get_trigger(&self, name: &str) -> Result<&EmulatedTrigger> {
        self.triggers
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| EmulatorError::TriggerNotFound(name.to_string()))
    }

    /// Invoke a background function with `data`
    pub fn call(&self, name: &str, data: Value, opts: CallOptions) -> Result<ShellEvent> {
        let trigger = self.get_trigger(name)?;
        debug!("shell:{}: trigger={:?}", name, trigger);
        debug!("shell:{}: opts={:?}, data={}", name, opts, data);

        let event_trigger = trigger
            .event_trigger
            .as_ref()
            .ok_or_else(|| EmulatorError::NotBackgroundFunction(name.to_string()))?;

        let resource = match opts.resource {
            Some(Value::Object(map)) if map.get("name").is_some_and(|n| !n.is_null()) => {
                map.get("name").cloned()
            }
            other => other,
        };

        let event = ShellEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event_type: event_trigger.event_type.clone(),
            resource,
            params: opts.params,
            auth: opts.auth,
            data,
        };

        let body = serde_json::to_value(&event)
            .map_err(|e| EmulatorError::invalid(format!("Failed to encode event: {}", e)))?;
        self.emulator.send_request(trigger, body)?;
        Ok(event)
    }
}
