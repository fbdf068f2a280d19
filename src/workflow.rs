//! Building blocks shared by every management page: user-facing notices, dropdown
//! options, the two-step delete, response classification and update payloads.

use chrono::{
    DateTime,
    NaiveDate,
    NaiveDateTime,
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};
use tracing::{
    info,
    warn,
};

use crate::{
    api::{
        ApiClient,
        ApiResponse,
    },
    models::{
        Entity,
        EntityKind,
    },
};

pub const CREATED: &[u16] = &[201];
pub const UPDATED: &[u16] = &[200];
pub const DELETED: &[u16] = &[200, 204];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Messages shown at the top of the current page until dismissed or the page changes.
#[derive(Debug, Default)]
pub struct Notices {
    items: Vec<Notice>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: NoticeLevel, text: impl Into<String>) {
        let notice = Notice { level, text: text.into() };
        if !self.items.contains(&notice) {
            self.items.push(notice);
        }
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Success, text);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Info, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Error, text);
    }

    pub fn dismiss(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn last(&self) -> Option<&Notice> {
        self.items.last()
    }

    pub fn contains(&self, level: NoticeLevel, text: &str) -> bool {
        self.items.iter().any(|n| n.level == level && n.text == text)
    }
}

/// A dropdown entry that carries its id instead of encoding it in the label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: i64,
    pub label: String,
}

pub fn options_for<T: Entity>(items: &[T]) -> Vec<SelectOption> {
    options_with(items, T::option_label)
}

pub fn options_with<T: Entity>(items: &[T], label: impl Fn(&T) -> String) -> Vec<SelectOption> {
    let mut options: Vec<SelectOption> =
        items.iter().map(|item| SelectOption { value: item.id(), label: label(item) }).collect();
    options.sort_by_key(|option| option.value);
    options
}

pub fn label_for(options: &[SelectOption], value: Option<i64>) -> Option<&str> {
    let value = value?;
    options.iter().find(|o| o.value == value).map(|o| o.label.as_str())
}

/// Keeps a selection valid: falls back to the first option when the id disappeared.
pub fn resolve_selection(options: &[SelectOption], selected: Option<i64>) -> Option<i64> {
    match selected {
        Some(id) if options.iter().any(|o| o.value == id) => Some(id),
        _ => options.first().map(|o| o.value),
    }
}

/// Outcome of a create, update or delete call.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Succeeded(Value),
    Conflict,
    Rejected(String),
}

impl Submission {
    pub fn interpret(response: &ApiResponse, success: &[u16]) -> Self {
        if success.contains(&response.status) {
            Submission::Succeeded(response.body.clone())
        } else if response.status == 409 {
            Submission::Conflict
        } else {
            Submission::Rejected(response.error_message())
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, Submission::Succeeded(_))
    }
}

/// Pending id for the confirm-before-delete flow. Never persisted: a restored session
/// always starts without a pending delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    #[serde(skip)]
    pending: Option<i64>,
}

impl DeleteConfirmation {
    pub fn request(&mut self, id: i64) {
        self.pending = Some(id);
    }

    pub fn pending(&self) -> Option<i64> {
        self.pending
    }

    pub fn is_pending_for(&self, selected: Option<i64>) -> bool {
        self.pending.is_some() && self.pending == selected
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Issues the DELETE only while the pending id matches `selected`. Returns `None`
    /// when nothing was sent. A failed delete leaves the pending id in place.
    pub fn confirm(
        &mut self,
        selected: Option<i64>,
        api: &ApiClient,
        kind: EntityKind,
    ) -> Option<Submission> {
        if !self.is_pending_for(selected) {
            return None;
        }
        let id = self.pending?;

        let response = api.delete(&kind.item_endpoint(id));
        let submission = Submission::interpret(&response, DELETED);
        if submission.succeeded() {
            info!(entity = %kind, id, "deleted");
            self.clear();
        } else {
            warn!(entity = %kind, id, status = response.status, "delete failed");
        }
        Some(submission)
    }
}

/// Update payload holding only the fields that changed, plus any that must always be sent.
#[derive(Debug, Default)]
pub struct ChangeSet {
    fields: Map<String, Value>,
    changed: usize,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<T>(mut self, key: &str, original: &T, edited: &T) -> Self
    where
        T: PartialEq + Serialize + ?Sized,
    {
        if original != edited {
            if let Ok(value) = serde_json::to_value(edited) {
                self.fields.insert(key.to_string(), value);
                self.changed += 1;
            }
        }
        self
    }

    pub fn always<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.fields.insert(key.to_string(), value);
        }
        self
    }

    pub fn has_changes(&self) -> bool {
        self.changed > 0
    }

    pub fn into_payload(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Exact, case-sensitive sibling name check.
pub fn name_taken<'a>(mut existing: impl Iterator<Item = &'a str>, candidate: &str) -> bool {
    existing.any(|name| name == candidate)
}

/// `YYYY-MM-DD` part of an ISO-8601 timestamp, or `N/A` when there is none.
pub fn date_portion(timestamp: Option<&str>) -> String {
    let Some(raw) = timestamp.map(str::trim).filter(|t| !t.is_empty()) else {
        return "N/A".to_string();
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.date_naive().format("%Y-%m-%d").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.date().format("%Y-%m-%d").to_string();
    }

    let date = raw.split('T').next().unwrap_or(raw);
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%Y-%m-%d").to_string(),
        Err(_) => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{
        api::{
            testing::ScriptedTransport,
            Method,
        },
        models::Subject,
    };

    fn subject(subid: i64, subname: &str) -> Subject {
        Subject { subid, subname: subname.into(), level: None, image_url: None }
    }

    #[test]
    fn options_are_sorted_by_id_and_keep_the_id() {
        let options = options_for(&[subject(9, "Science"), subject(3, "Maths")]);

        assert_eq!(
            options,
            vec![
                SelectOption { value: 3, label: "Maths (ID: 3)".into() },
                SelectOption { value: 9, label: "Science (ID: 9)".into() },
            ]
        );
        assert_eq!(label_for(&options, Some(9)), Some("Science (ID: 9)"));
        assert_eq!(resolve_selection(&options, Some(42)), Some(3));
        assert_eq!(resolve_selection(&[], Some(42)), None);
    }

    #[test]
    fn submission_classifies_statuses() {
        let ok = ApiResponse { status: 201, body: json!({ "tid": 1 }), malformed: false };
        let conflict = ApiResponse { status: 409, body: json!({ "message": "dup" }), malformed: false };
        let missing = ApiResponse { status: 404, body: json!({}), malformed: false };

        assert_eq!(Submission::interpret(&ok, CREATED), Submission::Succeeded(json!({ "tid": 1 })));
        assert_eq!(Submission::interpret(&conflict, CREATED), Submission::Conflict);
        assert_eq!(
            Submission::interpret(&missing, CREATED),
            Submission::Rejected("Unknown error".into())
        );
        assert_eq!(
            Submission::interpret(&ok, UPDATED),
            Submission::Rejected("Unknown error".into())
        );
    }

    #[test]
    fn single_delete_click_sends_nothing() {
        let transport = ScriptedTransport::new();
        let api = ApiClient::with_transport("http://api", transport.clone());
        let mut confirmation = DeleteConfirmation::default();

        assert_eq!(confirmation.confirm(Some(4), &api, EntityKind::Topic), None);
        confirmation.request(4);
        assert_eq!(confirmation.confirm(Some(5), &api, EntityKind::Topic), None);

        assert!(transport.requests().is_empty());
        assert_eq!(confirmation.pending(), Some(4));
    }

    #[test]
    fn confirmed_delete_clears_pending_only_on_success() {
        let transport = ScriptedTransport::new();
        transport
            .reply(Method::Delete, "/topics/4", 500, json!({ "message": "db down" }))
            .reply_text(Method::Delete, "/topics/4", 204, "");
        let api = ApiClient::with_transport("http://api", transport.clone());
        let mut confirmation = DeleteConfirmation::default();
        confirmation.request(4);

        let failed = confirmation.confirm(Some(4), &api, EntityKind::Topic);
        assert_eq!(failed, Some(Submission::Rejected("db down".into())));
        assert!(confirmation.is_pending_for(Some(4)));

        let retried = confirmation.confirm(Some(4), &api, EntityKind::Topic);
        assert!(retried.is_some_and(|s| s.succeeded()));
        assert_eq!(confirmation.pending(), None);
        assert_eq!(transport.requests_with(Method::Delete).len(), 2);
    }

    #[test]
    fn change_set_sends_changed_and_forced_fields() {
        let changes = ChangeSet::new()
            .field("tname", "Fractions", "Fractions")
            .field("image_url", "", "http://img/1.png")
            .always("subid", &3);

        assert!(changes.has_changes());
        assert_eq!(changes.into_payload(), json!({ "image_url": "http://img/1.png", "subid": 3 }));

        let unchanged = ChangeSet::new().field("gname", "North", "North").always("gid", &1);
        assert!(!unchanged.has_changes());
    }

    #[test]
    fn name_check_is_exact() {
        let names = ["Algebra Basics", "Geometry"];
        assert!(name_taken(names.iter().copied(), "Algebra Basics"));
        assert!(!name_taken(names.iter().copied(), "algebra basics"));
    }

    #[test]
    fn date_portion_handles_timestamps() {
        assert_eq!(date_portion(Some("2024-05-01T10:00:00.000Z")), "2024-05-01");
        assert_eq!(date_portion(Some("2024-05-01T10:00:00")), "2024-05-01");
        assert_eq!(date_portion(Some("2024-05-01")), "2024-05-01");
        assert_eq!(date_portion(Some("")), "N/A");
        assert_eq!(date_portion(None), "N/A");
    }

    #[test]
    fn notices_are_deduplicated() {
        let mut notices = Notices::new();
        notices.error("Failed to fetch subjects: Unknown error");
        notices.error("Failed to fetch subjects: Unknown error");
        notices.info("No Subjects available. Please create Subjects first.");

        assert_eq!(notices.iter().count(), 2);
        notices.dismiss(0);
        assert_eq!(notices.last().map(|n| n.level), Some(NoticeLevel::Info));
    }
}
