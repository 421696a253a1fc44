//! Client-side mirror of the server's snapshot recorder configuration.
//!
//! The server pushes its view as JSON; [`SnapshotState::apply_update`]
//! merges it field by field and reports whether anything the snapshot table
//! shows has changed. Edits made in the page go the other way: they mark the
//! state locally changed until the sender collects it with
//! [`SnapshotState::take_local_change`] and ships [`SnapshotState::to_message`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Server → client snapshot update. Every field is optional; a missing,
/// null or wrongly typed field leaves the local value alone without
/// affecting its neighbours.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    #[serde(rename = "baseFilename", deserialize_with = "lenient")]
    pub base_filename: Option<String>,
    #[serde(rename = "triggerType", deserialize_with = "lenient")]
    pub trigger_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub triggers: Option<Vec<Value>>,
    #[serde(rename = "preTriggerMilliSec", deserialize_with = "lenient")]
    pub pre_trigger_ms: Option<i64>,
    #[serde(rename = "postTriggerMilliSec", deserialize_with = "lenient")]
    pub post_trigger_ms: Option<i64>,
    #[serde(rename = "snapState", deserialize_with = "lenient")]
    pub snap_state: Option<String>,
    #[serde(rename = "triggerState", deserialize_with = "lenient")]
    pub trigger_state: Option<String>,
    #[serde(rename = "currentSizeMbytes", deserialize_with = "lenient")]
    pub current_size_mbytes: Option<f64>,
    #[serde(rename = "expectedSizeMbytes", deserialize_with = "lenient")]
    pub expected_size_mbytes: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub file_format: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub directory_list: Option<Vec<Value>>,
}

/// Read any JSON value, keeping it only if it has the expected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    match serde_json::from_value(value) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            log::debug!("ignoring snapshot field: {e}");
            Ok(None)
        }
    }
}

/// Client → server message body.
#[derive(Serialize)]
struct SnapUpdate<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "baseFilename")]
    base_filename: &'a str,
    #[serde(rename = "snapState")]
    snap_state: &'a str,
    #[serde(rename = "preTriggerMilliSec")]
    pre_trigger_ms: i64,
    #[serde(rename = "postTriggerMilliSec")]
    post_trigger_ms: i64,
    #[serde(rename = "triggerState")]
    trigger_state: &'a str,
    #[serde(rename = "triggerType")]
    trigger_type: &'a str,
    triggers: &'a [Value],
    #[serde(rename = "snapCurrentSize")]
    current_size: f64,
    #[serde(rename = "snapExpectedSize")]
    expected_size: f64,
    #[serde(rename = "directoryList")]
    directory_list: &'a [Value],
    #[serde(rename = "deleteFileName")]
    delete_filename: &'a str,
    #[serde(rename = "fileFormat")]
    file_format: &'a str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotState {
    base_filename: String,
    trigger_type: String,
    trigger_state: String,
    triggers: Vec<Value>,
    pre_trigger_ms: i64,
    post_trigger_ms: i64,
    /// Recorder state; `"start"` arms a capture.
    snap_state: String,
    current_size_mbytes: f64,
    expected_size_mbytes: f64,
    directory_list: Vec<Value>,
    delete_filename: String,
    file_format: String,
    local_changed: bool,
}

impl Default for SnapshotState {
    fn default() -> Self {
        Self {
            base_filename: String::new(),
            trigger_type: "0".into(),
            trigger_state: "0".into(),
            triggers: Vec::new(),
            pre_trigger_ms: 0,
            post_trigger_ms: 0,
            snap_state: String::new(),
            current_size_mbytes: 0.0,
            expected_size_mbytes: 0.0,
            directory_list: Vec::new(),
            delete_filename: String::new(),
            file_format: "bin".into(),
            local_changed: false,
        }
    }
}

/// Adopt `remote` into `local` when present and different. Returns whether
/// the value changed.
fn adopt<T: PartialEq + Clone>(local: &mut T, remote: &Option<T>) -> bool {
    match remote {
        Some(v) if v != local => {
            *local = v.clone();
            true
        }
        _ => false,
    }
}

impl SnapshotState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a server update. Returns `true` when the snapshot table needs
    /// redrawing; recorder state and file format changes are adopted
    /// silently. Any pending delete request is cleared.
    pub fn apply_update(&mut self, remote: &SnapshotConfig) -> bool {
        self.delete_filename.clear();

        let mut dirty = false;
        dirty |= adopt(&mut self.base_filename, &remote.base_filename);
        dirty |= adopt(&mut self.trigger_type, &remote.trigger_type);
        dirty |= adopt(&mut self.triggers, &remote.triggers);
        dirty |= adopt(&mut self.pre_trigger_ms, &remote.pre_trigger_ms);
        dirty |= adopt(&mut self.post_trigger_ms, &remote.post_trigger_ms);
        adopt(&mut self.snap_state, &remote.snap_state);
        dirty |= adopt(&mut self.trigger_state, &remote.trigger_state);
        dirty |= adopt(&mut self.current_size_mbytes, &remote.current_size_mbytes);
        dirty |= adopt(&mut self.expected_size_mbytes, &remote.expected_size_mbytes);
        adopt(&mut self.file_format, &remote.file_format);

        // Entries are only compared by count.
        if let Some(list) = &remote.directory_list {
            if list.len() != self.directory_list.len() {
                log::info!(
                    "snapshot directory now has {} entries (was {})",
                    list.len(),
                    self.directory_list.len()
                );
                self.directory_list = list.clone();
                dirty = true;
            }
        }
        dirty
    }

    /// Parse and merge a server message.
    pub fn apply_json(&mut self, text: &str) -> Result<bool, SnapshotError> {
        let remote: SnapshotConfig = serde_json::from_str(text)?;
        Ok(self.apply_update(&remote))
    }

    /// Whether the page changed something since the last call; clears the
    /// flag.
    pub fn take_local_change(&mut self) -> bool {
        std::mem::take(&mut self.local_changed)
    }

    pub fn has_local_change(&self) -> bool {
        self.local_changed
    }

    /// Flag the state as changed again, e.g. after a send that could not go
    /// out.
    pub fn mark_local_change(&mut self) {
        self.local_changed = true;
    }

    pub fn set_base_filename(&mut self, name: impl Into<String>) {
        self.base_filename = name.into();
        self.local_changed = true;
    }

    pub fn set_trigger_type(&mut self, trigger_type: impl Into<String>) {
        self.trigger_type = trigger_type.into();
        self.local_changed = true;
    }

    pub fn set_pre_trigger_ms(&mut self, ms: i64) {
        self.pre_trigger_ms = ms;
        self.local_changed = true;
    }

    pub fn set_post_trigger_ms(&mut self, ms: i64) {
        self.post_trigger_ms = ms;
        self.local_changed = true;
    }

    pub fn set_file_format(&mut self, format: impl Into<String>) {
        self.file_format = format.into();
        self.local_changed = true;
    }

    /// Ask the recorder to start a capture.
    pub fn arm_trigger(&mut self) {
        self.snap_state = "start".into();
        self.local_changed = true;
    }

    /// Ask the server to delete a recorded file. Cleared by the next update.
    pub fn request_delete(&mut self, filename: impl Into<String>) {
        self.delete_filename = filename.into();
        self.local_changed = true;
    }

    /// The `snapUpdate` message carrying the full local state.
    pub fn to_message(&self) -> Result<String, SnapshotError> {
        let msg = SnapUpdate {
            kind: "snapUpdate",
            base_filename: &self.base_filename,
            snap_state: &self.snap_state,
            pre_trigger_ms: self.pre_trigger_ms,
            post_trigger_ms: self.post_trigger_ms,
            trigger_state: &self.trigger_state,
            trigger_type: &self.trigger_type,
            triggers: &self.triggers,
            current_size: self.current_size_mbytes,
            expected_size: self.expected_size_mbytes,
            directory_list: &self.directory_list,
            delete_filename: &self.delete_filename,
            file_format: &self.file_format,
        };
        Ok(serde_json::to_string(&msg)?)
    }

    pub fn base_filename(&self) -> &str {
        &self.base_filename
    }

    pub fn trigger_type(&self) -> &str {
        &self.trigger_type
    }

    pub fn trigger_state(&self) -> &str {
        &self.trigger_state
    }

    pub fn triggers(&self) -> &[Value] {
        &self.triggers
    }

    pub fn pre_trigger_ms(&self) -> i64 {
        self.pre_trigger_ms
    }

    pub fn post_trigger_ms(&self) -> i64 {
        self.post_trigger_ms
    }

    pub fn snap_state(&self) -> &str {
        &self.snap_state
    }

    pub fn current_size_mbytes(&self) -> f64 {
        self.current_size_mbytes
    }

    pub fn expected_size_mbytes(&self) -> f64 {
        self.expected_size_mbytes
    }

    pub fn directory_list(&self) -> &[Value] {
        &self.directory_list
    }

    pub fn delete_filename(&self) -> &str {
        &self.delete_filename
    }

    pub fn file_format(&self) -> &str {
        &self.file_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(v: Value) -> SnapshotConfig {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_defaults() {
        let s = SnapshotState::new();
        assert_eq!(s.trigger_state(), "0");
        assert_eq!(s.file_format(), "bin");
        assert!(s.directory_list().is_empty());
        assert!(!s.has_local_change());
    }

    #[test]
    fn test_snap_state_only_is_not_dirty() {
        let mut s = SnapshotState::new();
        assert!(!s.apply_update(&update(json!({"snapState": "busy"}))));
        assert_eq!(s.snap_state(), "busy");
        assert!(!s.apply_update(&update(json!({"file_format": "wav"}))));
        assert_eq!(s.file_format(), "wav");
    }

    #[test]
    fn test_trigger_state_change_is_dirty() {
        let mut s = SnapshotState::new();
        assert!(s.apply_update(&update(json!({"triggerState": "1"}))));
        assert_eq!(s.trigger_state(), "1");
        assert!(!s.apply_update(&update(json!({"triggerState": "1"}))), "same value");
    }

    #[test]
    fn test_each_table_field_is_dirty() {
        let cases = [
            json!({"baseFilename": "capture"}),
            json!({"triggerType": "2"}),
            json!({"triggers": [{"freq": 433.92}]}),
            json!({"preTriggerMilliSec": 250}),
            json!({"postTriggerMilliSec": 750}),
            json!({"currentSizeMbytes": 1.5}),
            json!({"expectedSizeMbytes": 12.0}),
            json!({"directory_list": ["a.bin"]}),
        ];
        for case in cases {
            let mut s = SnapshotState::new();
            assert!(s.apply_update(&update(case.clone())), "{case} should be dirty");
        }
    }

    #[test]
    fn test_directory_list_compared_by_length() {
        let mut s = SnapshotState::new();
        assert!(s.apply_update(&update(json!({"directory_list": ["a", "b"]}))));
        assert!(!s.apply_update(&update(json!({"directory_list": ["c", "d"]}))));
        assert_eq!(s.directory_list(), &[json!("a"), json!("b")]);
        assert!(s.apply_update(&update(json!({"directory_list": ["c"]}))));
        assert_eq!(s.directory_list(), &[json!("c")]);
    }

    #[test]
    fn test_missing_fields_leave_state() {
        let mut s = SnapshotState::new();
        s.apply_update(&update(json!({"baseFilename": "keep", "preTriggerMilliSec": 10})));
        assert!(!s.apply_update(&SnapshotConfig::default()));
        assert_eq!(s.base_filename(), "keep");
        assert_eq!(s.pre_trigger_ms(), 10);
    }

    #[test]
    fn test_update_clears_pending_delete() {
        let mut s = SnapshotState::new();
        s.request_delete("old.bin");
        assert_eq!(s.delete_filename(), "old.bin");
        s.apply_update(&SnapshotConfig::default());
        assert_eq!(s.delete_filename(), "");
    }

    #[test]
    fn test_local_change_read_and_clear() {
        let mut s = SnapshotState::new();
        assert!(!s.take_local_change());
        s.set_pre_trigger_ms(100);
        assert!(s.take_local_change());
        assert!(!s.take_local_change());

        s.arm_trigger();
        assert_eq!(s.snap_state(), "start");
        assert!(s.take_local_change());
    }

    #[test]
    fn test_remote_update_does_not_set_local_change() {
        let mut s = SnapshotState::new();
        s.apply_update(&update(json!({"baseFilename": "x", "snapState": "start"})));
        assert!(!s.take_local_change());
    }

    #[test]
    fn test_apply_json_ignores_unknown_fields() {
        let mut s = SnapshotState::new();
        let dirty = s
            .apply_json(r#"{"type": "snapUpdate", "triggerType": "3", "extra": [1, 2]}"#)
            .unwrap();
        assert!(dirty);
        assert_eq!(s.trigger_type(), "3");
        assert!(matches!(s.apply_json("{"), Err(SnapshotError::Json(_))));
    }

    #[test]
    fn test_wrongly_typed_field_skips_only_that_field() {
        let mut s = SnapshotState::new();
        let dirty = s
            .apply_json(r#"{"triggerType": 2, "snapState": "busy", "baseFilename": "run7"}"#)
            .unwrap();
        assert!(dirty);
        assert_eq!(s.trigger_type(), "0", "numeric trigger type is no change");
        assert_eq!(s.snap_state(), "busy");
        assert_eq!(s.base_filename(), "run7");

        let dirty = s
            .apply_json(r#"{"preTriggerMilliSec": "soon", "postTriggerMilliSec": 500, "directory_list": null}"#)
            .unwrap();
        assert!(dirty);
        assert_eq!(s.pre_trigger_ms(), 0);
        assert_eq!(s.post_trigger_ms(), 500);
        assert!(s.directory_list().is_empty());
    }

    #[test]
    fn test_message_uses_wire_names() {
        let mut s = SnapshotState::new();
        s.set_base_filename("run1");
        s.set_file_format("wav");
        s.request_delete("old.bin");
        let msg: Value = serde_json::from_str(&s.to_message().unwrap()).unwrap();
        assert_eq!(msg["type"], "snapUpdate");
        assert_eq!(msg["baseFilename"], "run1");
        assert_eq!(msg["fileFormat"], "wav");
        assert_eq!(msg["deleteFileName"], "old.bin");
        assert_eq!(msg["triggerState"], "0");
        assert_eq!(msg["preTriggerMilliSec"], 0);
        assert!(msg["directoryList"].as_array().is_some_and(|a| a.is_empty()));
    }
}
