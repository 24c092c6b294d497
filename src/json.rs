use serde::Deserialize;
use serde_json::Value;

const NO_RESULTS_MESSAGE: &str = "no results found";

/// One uploaded application as listed by `recent_apps`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AppRecord {
    pub app_id: String,
    pub app_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecentUploads {
    Apps(Vec<Value>),
    NoResults,
    Message(String),
}

pub(crate) fn classify_recent_uploads(payload: Value) -> RecentUploads {
    match payload {
        Value::Array(entries) => RecentUploads::Apps(entries),
        Value::Object(ref fields) => match fields.get("message") {
            Some(Value::String(message)) if is_no_results(message) => RecentUploads::NoResults,
            Some(Value::String(message)) => RecentUploads::Message(message.clone()),
            _ => RecentUploads::Message(format!("unexpected response: {}", payload)),
        },
        other => RecentUploads::Message(format!("unexpected response: {}", other)),
    }
}

fn is_no_results(message: &str) -> bool {
    message.trim().eq_ignore_ascii_case(NO_RESULTS_MESSAGE)
}

/// `None` unless the entry is an object with string `app_id` and `app_name`.
pub(crate) fn as_app_record(entry: &Value) -> Option<AppRecord> {
    if !entry.is_object() {
        return None;
    }
    serde_json::from_value(entry.clone()).ok()
}
