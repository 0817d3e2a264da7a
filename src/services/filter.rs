//! Client-side list filtering
//!
//! List screens hold the whole fetched collection and recompute the visible
//! subset on every keystroke: a case-insensitive substring match across all
//! fields or one selected field, optionally narrowed by a status chip.

use serde::Serialize;
use serde_json::Value;

/// Which fields a search term is matched against
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    All,
    Field(String),
}

impl SearchField {
    /// `"all"` (or empty) selects every field
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            SearchField::All
        } else {
            SearchField::Field(raw.to_string())
        }
    }
}

/// String form of a field value used for matching
pub fn field_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

fn matches(record: &Value, needle: &str, field: &SearchField) -> bool {
    let contains = |value: &Value| field_text(value).to_lowercase().contains(needle);
    match (record, field) {
        (Value::Object(fields), SearchField::All) => fields.values().any(contains),
        (Value::Object(fields), SearchField::Field(name)) => {
            fields.get(name).map(contains).unwrap_or(false)
        }
        (other, _) => contains(other),
    }
}

/// Records whose selected field(s) contain `query`, case-insensitively.
/// An empty query returns the source unchanged.
pub fn filter_records<T>(records: &[T], query: &str, field: &SearchField) -> Vec<T>
where
    T: Serialize + Clone,
{
    if query.is_empty() {
        return records.to_vec();
    }
    let needle = query.to_lowercase();

    records
        .iter()
        .filter(|record| {
            serde_json::to_value(record)
                .map(|value| matches(&value, &needle, field))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Status chip selection; choosing the active chip again clears it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusFilter {
    field: String,
    selected: Option<String>,
}

impl StatusFilter {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            selected: None,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn toggle(&mut self, status: &str) {
        if self.selected.as_deref() == Some(status) {
            self.selected = None;
        } else {
            self.selected = Some(status.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    fn admits(&self, record: &Value) -> bool {
        match &self.selected {
            None => true,
            Some(status) => record
                .get(&self.field)
                .map(|value| field_text(value).eq_ignore_ascii_case(status))
                .unwrap_or(false),
        }
    }
}

/// State of one list screen: the fetched source and the active filters
#[derive(Debug, Clone)]
pub struct ListView<T> {
    source: Vec<T>,
    query: String,
    field: SearchField,
    status: StatusFilter,
}

impl<T: Serialize + Clone> ListView<T> {
    pub fn new(source: Vec<T>) -> Self {
        Self {
            source,
            query: String::new(),
            field: SearchField::All,
            status: StatusFilter::default(),
        }
    }

    /// Enable status chips matching against `field`
    pub fn with_status_field(mut self, field: &str) -> Self {
        self.status = StatusFilter::new(field);
        self
    }

    pub fn source(&self) -> &[T] {
        &self.source
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn set_field(&mut self, field: SearchField) {
        self.field = field;
    }

    pub fn toggle_status(&mut self, status: &str) {
        self.status.toggle(status);
    }

    pub fn status(&self) -> &StatusFilter {
        &self.status
    }

    /// Visible records for the current search and chip
    pub fn filtered(&self) -> Vec<T> {
        filter_records(&self.source, &self.query, &self.field)
            .into_iter()
            .filter(|record| {
                serde_json::to_value(record)
                    .map(|value| self.status.admits(&value))
                    .unwrap_or(false)
            })
            .collect()
    }
}
