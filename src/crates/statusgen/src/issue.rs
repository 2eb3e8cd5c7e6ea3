//! Issue normalization
//!
//! Raw tracker payloads are loose JSON. [`IssueSet::normalize`] is the single
//! boundary where every missing field turns into an explicit default; nothing
//! downstream sees an `Option` it has to guess about except the dates.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tabled::Tabled;
use tracing::debug;

/// The only status with special meaning.
pub const DONE_STATUS: &str = "Done";

/// Statuses previewed in the forward-looking section.
pub const UPCOMING_STATUSES: [&str; 2] = ["To Do", "In Progress"];

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNASSIGNED: &str = "Unassigned";

/// One tracked work item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueRecord {
    pub key: String,
    pub summary: String,
    pub description: String,
    pub status: String,
    pub assignee: String,
    pub priority: String,
    pub due_date: Option<NaiveDate>,
    pub created: Option<DateTime<FixedOffset>>,
    pub updated: Option<DateTime<FixedOffset>>,
    pub resolved: Option<DateTime<FixedOffset>>,
    pub parent: Option<String>,
    pub subtasks: Vec<String>,
}

impl IssueRecord {
    /// Build a record from one raw issue object. Never fails.
    pub fn from_raw(raw: &Value) -> Self {
        let fields = raw.get("fields").unwrap_or(&Value::Null);

        Self {
            key: str_at(raw, "/key").unwrap_or(NOT_AVAILABLE).to_string(),
            summary: str_at(fields, "/summary").unwrap_or(NOT_AVAILABLE).to_string(),
            description: fields
                .get("description")
                .map(flatten_description)
                .unwrap_or_default(),
            status: str_at(fields, "/status/name")
                .unwrap_or(NOT_AVAILABLE)
                .to_string(),
            assignee: str_at(fields, "/assignee/displayName")
                .unwrap_or(UNASSIGNED)
                .to_string(),
            priority: str_at(fields, "/priority/name")
                .unwrap_or(NOT_AVAILABLE)
                .to_string(),
            due_date: str_at(fields, "/duedate").and_then(parse_date),
            created: str_at(fields, "/created").and_then(parse_timestamp),
            updated: str_at(fields, "/updated").and_then(parse_timestamp),
            resolved: str_at(fields, "/resolutiondate").and_then(parse_timestamp),
            parent: str_at(fields, "/parent/key").map(str::to_string),
            subtasks: fields
                .get("subtasks")
                .and_then(Value::as_array)
                .map(|subs| {
                    subs.iter()
                        .filter_map(|sub| str_at(sub, "/key"))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == DONE_STATUS
    }

    pub fn is_upcoming(&self) -> bool {
        UPCOMING_STATUSES.contains(&self.status.as_str())
    }
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

/// `YYYY-MM-DD`, tolerating a trailing time component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.get(..10).unwrap_or(raw);
    let parsed = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok();
    if parsed.is_none() {
        debug!(value = raw, "Ignoring unparseable due date");
    }
    parsed
}

/// RFC 3339 or the tracker's `2025-10-02T10:00:00.000+0000` form.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .map_err(|e| debug!(value = raw, error = %e, "Ignoring unparseable timestamp"))
        .ok()
}

/// Plain text for a description field.
///
/// API v2 returns a string; v3 returns an Atlassian Document Format tree, whose
/// text nodes are concatenated with paragraph breaks between block nodes.
pub fn flatten_description(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(_) => {
            let mut blocks = Vec::new();
            collect_adf_blocks(value, &mut blocks);
            blocks.join("\n")
        }
        _ => String::new(),
    }
}

fn collect_adf_blocks(node: &Value, blocks: &mut Vec<String>) {
    let Some(children) = node.get("content").and_then(Value::as_array) else {
        return;
    };

    let inline: Vec<&Value> = children
        .iter()
        .filter(|child| child.get("type").and_then(Value::as_str) == Some("text"))
        .collect();

    if !inline.is_empty() {
        let line: String = inline
            .iter()
            .filter_map(|child| child.get("text").and_then(Value::as_str))
            .collect();
        if !line.is_empty() {
            blocks.push(line);
        }
    }

    for child in children {
        if child.get("type").and_then(Value::as_str) != Some("text") {
            collect_adf_blocks(child, blocks);
        }
    }
}

/// One fetched batch, keyed by identifier, in fetch order.
#[derive(Debug, Clone, Default)]
pub struct IssueSet {
    records: Vec<IssueRecord>,
    index: HashMap<String, usize>,
}

impl IssueSet {
    /// Normalize a batch of raw issues.
    ///
    /// A repeated key replaces the earlier record but keeps its position.
    pub fn normalize(raw_issues: &[Value]) -> Self {
        let mut set = Self::default();
        for raw in raw_issues {
            set.insert(IssueRecord::from_raw(raw));
        }
        debug!(issues = set.len(), "Normalized issue batch");
        set
    }

    fn insert(&mut self, record: IssueRecord) {
        match self.index.get(&record.key) {
            Some(&position) => self.records[position] = record,
            None => {
                self.index.insert(record.key.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&IssueRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in fetch order.
    pub fn iter(&self) -> impl Iterator<Item = &IssueRecord> {
        self.records.iter()
    }

    /// The Done subset, in fetch order.
    pub fn achieved(&self) -> AchievedSubset<'_> {
        AchievedSubset {
            records: self.records.iter().filter(|r| r.is_done()).collect(),
        }
    }

    /// Non-Done items that carry a due date, whether or not it has passed.
    pub fn overdue_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.due_date.is_some() && !r.is_done())
            .count()
    }

    pub fn current_rows(&self) -> Vec<CurrentIssueRow> {
        self.records.iter().map(CurrentIssueRow::from).collect()
    }
}

/// Completed items of an [`IssueSet`].
#[derive(Debug, Clone)]
pub struct AchievedSubset<'a> {
    records: Vec<&'a IssueRecord>,
}

impl<'a> AchievedSubset<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.iter().any(|r| r.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a IssueRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.records.iter().map(|r| r.key.as_str())
    }
}

/// Row of the current-issues table.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct CurrentIssueRow {
    #[tabled(rename = "Key")]
    #[serde(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Summary")]
    #[serde(rename = "Summary")]
    pub summary: String,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Assignee")]
    #[serde(rename = "Assignee")]
    pub assignee: String,
    #[tabled(rename = "Priority")]
    #[serde(rename = "Priority")]
    pub priority: String,
    #[tabled(rename = "Due Date")]
    #[serde(rename = "Due Date")]
    pub due_date: String,
    #[tabled(rename = "Created")]
    #[serde(rename = "Created")]
    pub created: String,
    #[tabled(rename = "Updated")]
    #[serde(rename = "Updated")]
    pub updated: String,
    #[tabled(rename = "Resolved")]
    #[serde(rename = "Resolved")]
    pub resolved: String,
    #[tabled(rename = "Parent")]
    #[serde(rename = "Parent")]
    pub parent: String,
    #[tabled(rename = "Subtasks")]
    #[serde(rename = "Subtasks")]
    pub subtasks: String,
}

impl From<&IssueRecord> for CurrentIssueRow {
    fn from(record: &IssueRecord) -> Self {
        let stamp = |ts: &Option<DateTime<FixedOffset>>| {
            ts.map(|t| t.to_rfc3339()).unwrap_or_default()
        };
        Self {
            key: record.key.clone(),
            summary: record.summary.clone(),
            status: record.status.clone(),
            assignee: record.assignee.clone(),
            priority: record.priority.clone(),
            due_date: record
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            created: stamp(&record.created),
            updated: stamp(&record.updated),
            resolved: stamp(&record.resolved),
            parent: record.parent.clone().unwrap_or_default(),
            subtasks: record.subtasks.join(", "),
        }
    }
}

/// Row of the next-period table.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct NextIssueRow {
    #[tabled(rename = "Key")]
    #[serde(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Summary")]
    #[serde(rename = "Summary")]
    pub summary: String,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Priority")]
    #[serde(rename = "Priority")]
    pub priority: String,
}

impl From<&IssueRecord> for NextIssueRow {
    fn from(record: &IssueRecord) -> Self {
        Self {
            key: record.key.clone(),
            summary: record.summary.clone(),
            status: record.status.clone(),
            priority: record.priority.clone(),
        }
    }
}

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(key: &str, status: &str) -> Value {
        json!({
            "key": key,
            "fields": {
                "summary": format!("Summary of {}", key),
                "status": {"name": status}
            }
        })
    }

    #[test]
    fn test_full_record() {
        let issue = json!({
            "key": "OPS-1",
            "fields": {
                "summary": "Ship the thing",
                "description": "Long text",
                "status": {"name": "Done"},
                "assignee": {"displayName": "Ana"},
                "priority": {"name": "High"},
                "duedate": "2025-10-05",
                "created": "2025-09-01T08:00:00.000+0000",
                "updated": "2025-10-02T10:00:00.000+0200",
                "resolutiondate": "2025-10-02T10:00:00Z",
                "parent": {"key": "OPS-0"},
                "subtasks": [{"key": "OPS-2"}, {"key": "OPS-3"}]
            }
        });

        let record = IssueRecord::from_raw(&issue);
        assert_eq!(record.key, "OPS-1");
        assert_eq!(record.assignee, "Ana");
        assert_eq!(record.priority, "High");
        assert_eq!(record.due_date, NaiveDate::from_ymd_opt(2025, 10, 5));
        assert!(record.created.is_some());
        assert_eq!(record.updated.unwrap().offset().local_minus_utc(), 7200);
        assert!(record.resolved.is_some());
        assert_eq!(record.parent.as_deref(), Some("OPS-0"));
        assert_eq!(record.subtasks, vec!["OPS-2", "OPS-3"]);
        assert!(record.is_done());
    }

    #[test]
    fn test_missing_fields_degrade_to_defaults() {
        let record = IssueRecord::from_raw(&json!({"key": "OPS-9"}));
        assert_eq!(record.summary, "N/A");
        assert_eq!(record.description, "");
        assert_eq!(record.status, "N/A");
        assert_eq!(record.assignee, "Unassigned");
        assert_eq!(record.priority, "N/A");
        assert!(record.due_date.is_none());
        assert!(record.parent.is_none());
        assert!(record.subtasks.is_empty());
        assert!(!record.is_done());
    }

    #[test]
    fn test_null_objects_degrade_to_defaults() {
        let record = IssueRecord::from_raw(&json!({
            "key": "OPS-9",
            "fields": {"assignee": null, "priority": null, "status": null, "parent": null}
        }));
        assert_eq!(record.assignee, "Unassigned");
        assert_eq!(record.priority, "N/A");
        assert_eq!(record.status, "N/A");
        assert!(record.parent.is_none());
    }

    #[test]
    fn test_malformed_values_do_not_abort_batch() {
        let set = IssueSet::normalize(&[
            json!("not an object"),
            json!({"key": "OPS-1", "fields": {"duedate": "soon", "resolutiondate": 42}}),
            raw("OPS-2", "Done"),
        ]);
        assert_eq!(set.len(), 3);
        let record = set.get("OPS-1").unwrap();
        assert!(record.due_date.is_none());
        assert!(record.resolved.is_none());
    }

    #[test]
    fn test_adf_description_is_flattened() {
        let adf = json!({
            "type": "doc",
            "version": 1,
            "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "Migrate the "},
                    {"type": "text", "text": "billing service"}
                ]},
                {"type": "bulletList", "content": [
                    {"type": "listItem", "content": [
                        {"type": "paragraph", "content": [{"type": "text", "text": "cut over"}]}
                    ]}
                ]}
            ]
        });
        assert_eq!(
            flatten_description(&adf),
            "Migrate the billing service\ncut over"
        );
    }

    #[test]
    fn test_insertion_order_and_duplicate_keys() {
        let set = IssueSet::normalize(&[
            raw("B-1", "To Do"),
            raw("A-1", "Done"),
            raw("B-1", "Done"),
        ]);
        let keys: Vec<&str> = set.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["B-1", "A-1"]);
        assert_eq!(set.get("B-1").unwrap().status, "Done");
    }

    #[test]
    fn test_achieved_subset_is_exact_match() {
        let set = IssueSet::normalize(&[
            raw("A-1", "Done"),
            raw("A-2", "done"),
            raw("A-3", "In Progress"),
            raw("A-4", "Done"),
        ]);
        let achieved = set.achieved();
        assert_eq!(achieved.keys().collect::<Vec<_>>(), vec!["A-1", "A-4"]);
        assert!(!achieved.contains("A-2"));
    }

    #[test]
    fn test_overdue_counts_any_due_date_not_done() {
        let set = IssueSet::normalize(&[
            json!({"key": "A-1", "fields": {"status": {"name": "To Do"}, "duedate": "2999-01-01"}}),
            json!({"key": "A-2", "fields": {"status": {"name": "Done"}, "duedate": "2020-01-01"}}),
            json!({"key": "A-3", "fields": {"status": {"name": "In Progress"}}}),
        ]);
        assert_eq!(set.overdue_count(), 1);
    }

    #[test]
    fn test_current_rows() {
        let set = IssueSet::normalize(&[json!({
            "key": "A-1",
            "fields": {
                "summary": "Root",
                "duedate": "2025-10-05",
                "subtasks": [{"key": "A-2"}, {"key": "A-3"}]
            }
        })]);
        let rows = set.current_rows();
        assert_eq!(rows[0].due_date, "2025-10-05");
        assert_eq!(rows[0].subtasks, "A-2, A-3");
        assert_eq!(rows[0].parent, "");
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("short", 50), "short");
        assert_eq!(truncate_chars("", 3), "");
    }
}
