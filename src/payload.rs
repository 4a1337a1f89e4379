use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version of the report wire format understood by the notify endpoint.
pub const PAYLOAD_VERSION: &str = "2";

/// Identity of this reporting library, distinct from the application
/// embedding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notifier {
    pub name: String,
    pub version: String,
    pub url: String,
}

impl Default for Notifier {
    fn default() -> Self {
        Self {
            name: "Bugsnag Rust".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            url: "https://github.com/bugsnag/bugsnag-rust".to_owned(),
        }
    }
}

/// A single frame of an [`Exception`] stack trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    pub file: String,
    pub line_number: i32,
    pub column_number: i32,
    pub method: String,
    pub in_project: bool,
}

impl StackFrame {
    /// The notify endpoint rejects reports that carry no stack trace at
    /// all, so reports built from a bare error class and message get this
    /// fixed frame.
    pub fn placeholder() -> Self {
        Self {
            file: "somefile".to_owned(),
            line_number: 123,
            method: "somemethod".to_owned(),
            ..Self::default()
        }
    }
}

/// One error being reported, with the frames that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exception {
    pub error_class: String,
    pub message: String,
    /// Always serialized, even when empty.
    pub stacktrace: Vec<StackFrame>,
}

impl Exception {
    pub fn new(error_class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_class: error_class.into(),
            message: message.into(),
            stacktrace: Vec::new(),
        }
    }
}

/// The user the error happened to. When attached to an event all fields
/// are written, empty or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.name.is_empty() && self.email.is_empty()
    }
}

/// The application the error happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub version: String,
    pub release_stage: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            version: String::new(),
            release_stage: "production".to_owned(),
        }
    }
}

impl App {
    pub fn is_empty(&self) -> bool {
        self.version.is_empty() && self.release_stage.is_empty()
    }
}

/// The machine the error happened on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub os_version: String,
    pub hostname: String,
}

impl Device {
    pub fn is_empty(&self) -> bool {
        self.os_version.is_empty() && self.hostname.is_empty()
    }
}

/// Report severity as understood by the notify endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

/// Two-level diagnostic mapping attached to an event: group name to a
/// mapping of key to string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetaData(pub BTreeMap<String, BTreeMap<String, String>>);

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        group: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.0
            .entry(group.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// True when no group holds any entry. Groups that exist but are
    /// themselves empty do not count.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }
}

/// One reported error occurrence. Optional fields are decided when the
/// event is built; serialization simply drops the `None`s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub payload_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<Exception>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouping_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<App>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<MetaData>,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            payload_version: PAYLOAD_VERSION.to_owned(),
            exceptions: Vec::new(),
            context: None,
            grouping_hash: None,
            severity: None,
            user: None,
            app: None,
            device: None,
            meta_data: None,
        }
    }
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The complete JSON document sent in one notify request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub api_key: String,
    pub notifier: Notifier,
    /// Serialized as an array even when empty, unlike the optional
    /// event fields.
    pub events: Vec<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_event_serializes_bare() {
        let event = Event::new();

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "payloadVersion": "2" })
        );
    }

    #[test]
    fn event_with_empty_exceptions_omits_the_array() {
        let event = Event::new();
        let value = serde_json::to_value(&event).unwrap();

        assert!(value.get("exceptions").is_none());
    }

    #[test]
    fn attached_user_keeps_empty_fields() {
        let mut event = Event::new();
        event.user = Some(User {
            email: "a@b.com".to_owned(),
            ..User::default()
        });

        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(
            value["user"],
            json!({ "id": "", "name": "", "email": "a@b.com" })
        );
    }

    #[test]
    fn default_app_carries_production_stage() {
        let app = App::default();

        assert!(!app.is_empty());
        assert_eq!(
            serde_json::to_value(&app).unwrap(),
            json!({ "version": "", "releaseStage": "production" })
        );
    }

    #[test]
    fn exception_serializes_its_frames() {
        let mut exception = Exception::new("RuntimeError", "disk full");
        exception.stacktrace.push(StackFrame::placeholder());

        assert_eq!(
            serde_json::to_value(&exception).unwrap(),
            json!({
                "errorClass": "RuntimeError",
                "message": "disk full",
                "stacktrace": [{
                    "file": "somefile",
                    "lineNumber": 123,
                    "columnNumber": 0,
                    "method": "somemethod",
                    "inProject": false,
                }],
            })
        );
    }

    #[test]
    fn bare_exception_still_emits_the_stacktrace_array() {
        let exception = Exception::new("RuntimeError", "disk full");
        let value = serde_json::to_value(&exception).unwrap();

        assert_eq!(value["stacktrace"], json!([]));
    }

    #[test]
    fn meta_data_serializes_nested_groups() {
        let mut meta = MetaData::new();
        meta.insert("diagnostics", "retry", "3");

        let mut event = Event::new();
        event.meta_data = Some(meta);

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["metaData"], json!({ "diagnostics": { "retry": "3" } }));
    }

    #[test]
    fn meta_data_emptiness_ignores_entry_less_groups() {
        let mut meta = MetaData::new();
        assert!(meta.is_empty());

        meta.0.insert("diagnostics".to_owned(), BTreeMap::new());
        assert!(meta.is_empty());

        meta.insert("diagnostics", "retry", "3");
        assert!(!meta.is_empty());
    }

    #[test]
    fn entry_less_group_serializes_beside_a_populated_one() {
        let mut meta = MetaData::new();
        meta.0.insert("empty".to_owned(), BTreeMap::new());
        meta.insert("diagnostics", "retry", "3");

        assert_eq!(
            serde_json::to_value(&meta).unwrap(),
            json!({ "empty": {}, "diagnostics": { "retry": "3" } })
        );
    }

    #[test]
    fn severity_uses_lowercase_wire_names() {
        assert_eq!(serde_json::to_value(Severity::Error).unwrap(), json!("error"));
        assert_eq!(
            serde_json::to_value(Severity::Warning).unwrap(),
            json!("warning")
        );
        assert_eq!(serde_json::to_value(Severity::Info).unwrap(), json!("info"));
    }

    #[test]
    fn payload_round_trips() {
        let mut exception = Exception::new("RuntimeError", "disk full");
        exception.stacktrace.push(StackFrame::placeholder());

        let mut event = Event::new();
        event.exceptions.push(exception);
        event.severity = Some(Severity::Error);
        event.context = Some("saveFile".to_owned());

        let payload = Payload {
            api_key: "some-api-key".to_owned(),
            notifier: Notifier::default(),
            events: vec![event],
        };

        let body = serde_json::to_string(&payload).unwrap();
        let decoded: Payload = serde_json::from_str(&body).unwrap();

        assert_eq!(decoded, payload);
        assert_eq!(decoded.api_key, "some-api-key");
        assert_eq!(decoded.notifier.name, "Bugsnag Rust");
        assert_eq!(decoded.events.len(), 1);
        assert_eq!(decoded.events[0].exceptions.len(), 1);
    }

    #[test]
    fn payload_always_writes_the_events_array() {
        let payload = Payload {
            api_key: "some-api-key".to_owned(),
            notifier: Notifier::default(),
            events: Vec::new(),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["events"], json!([]));
    }
}
