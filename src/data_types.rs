// src/data_types.rs
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::error::AppError;

/// Which input branch is currently active. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Text,
    File,
}

impl Default for InputMode {
    fn default() -> Self {
        InputMode::Text
    }
}

/// One normalized output row: a client-assigned 1-based `id` plus the
/// fields returned by the service, in the order the service sent them.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: u64,
    pub fields: Map<String, Value>,
}

impl Record {
    /// Column headers contributed by this record: synthetic `id` first,
    /// then the record's own keys in insertion order.
    pub fn headers(&self) -> Vec<String> {
        let mut headers = Vec::with_capacity(self.fields.len() + 1);
        headers.push("id".to_string());
        headers.extend(self.fields.keys().cloned());
        headers
    }

    /// Positional row values for table rendering: the synthetic id followed
    /// by the record's own values in its own key order, padded or truncated
    /// to `width` cells. A record whose keys diverge from the header row
    /// still renders positionally, with missing cells shown as "undefined".
    pub fn cells(&self, width: usize) -> Vec<String> {
        let mut cells = Vec::with_capacity(width);
        cells.push(self.id.to_string());
        cells.extend(self.fields.values().map(display_value));
        cells.resize(width, "undefined".to_string());
        cells
    }

    /// Keyed lookup used by CSV export; absent keys export as "undefined".
    pub fn csv_value(&self, header: &str) -> String {
        if header == "id" {
            return self.id.to_string();
        }
        self.fields
            .get(header)
            .map(display_value)
            .unwrap_or_else(|| "undefined".to_string())
    }
}

/// Coerce a JSON value to its display text. Strings render bare, null as
/// "null", numbers and booleans as their canonical text, nested structures
/// as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// What the results area currently shows. `records: None` means nothing was
/// ever submitted; `Some` but empty means a submission completed with nothing
/// to show. A set error always takes rendering precedence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    pub records: Option<Vec<Record>>,
    pub error: Option<String>,
}

/// The whole per-session UI state, mutated only through the transition
/// methods below. Created at startup, discarded on exit, never persisted.
#[derive(Debug, Default)]
pub struct SessionState {
    pub mode: InputMode,
    pub text_content: String,
    pub file_path: Option<PathBuf>,
    pub display: DisplayState,
}

impl SessionState {
    /// Switch the active input branch. The staged content of the branch
    /// being left is discarded, along with any error display; committed
    /// results are kept. Re-selecting the current mode changes nothing.
    pub fn set_mode(&mut self, mode: InputMode) {
        if mode == self.mode {
            return;
        }
        match self.mode {
            InputMode::Text => self.text_content.clear(),
            InputMode::File => self.file_path = None,
        }
        self.mode = mode;
        self.display.error = None;
    }

    /// Store raw text as typed; validation happens at dispatch time.
    pub fn set_text(&mut self, content: String) {
        self.text_content = content;
    }

    /// Store exactly one file reference, replacing any previous one.
    pub fn set_file(&mut self, path: PathBuf) {
        self.file_path = Some(path);
    }

    /// Terminal state update for one submission. Errors reset records to
    /// empty ("attempted, nothing to show") except `MissingInput`, which
    /// never reached dispatch and leaves prior results visible.
    pub fn apply_outcome(&mut self, outcome: Result<Vec<Record>, AppError>) {
        match outcome {
            Ok(records) => {
                self.display.records = Some(records);
                self.display.error = None;
            }
            Err(err) => {
                if !matches!(err, AppError::MissingInput) {
                    self.display.records = Some(Vec::new());
                }
                self.display.error = Some(err.to_string());
            }
        }
    }
}
