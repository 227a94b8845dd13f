use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A task as exchanged with clients and the backend.
///
/// Every field defaults to the empty string when decoding, so a body that
/// omits a field carries `""` for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub id: String,
    pub assignee: String,
    pub title: String,
    pub summary: String,
    /// Caller-supplied timestamp, validated by the backend.
    pub deadline: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of `PUT /v1/tasks/{id}`. The id always comes from the path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpdateTask {
    pub assignee: String,
    pub title: String,
    pub summary: String,
    pub deadline: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl UpdateTask {
    /// Full replace: every field of the body is carried over, empty or not.
    pub fn into_task(self, id: String) -> Task {
        Task {
            id,
            assignee: self.assignee,
            title: self.title,
            summary: self.summary,
            deadline: self.deadline,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListTasks {
    pub tasks: Vec<Task>,
}

/// Body of `GET /v1/overduetasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueQuery {
    /// Cutoff: tasks whose deadline is strictly before this are overdue.
    pub timed: String,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub page: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub id: String,
    pub message: String,
}

impl DeleteAck {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: "task deleted".to_string(),
        }
    }
}

/// Parses the timestamp shapes accepted for `deadline` and `timed`:
/// RFC 3339, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD` (all read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Current time as fixed-width RFC 3339 (microseconds, `Z`), so stored
/// timestamps sort chronologically as strings.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_three_timestamp_shapes() {
        let date = parse_timestamp("2024-01-01").unwrap();
        let spaced = parse_timestamp("2024-01-01 00:00:00").unwrap();
        let rfc = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(date, spaced);
        assert_eq!(spaced, rfc);
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn server_timestamps_are_fixed_width_and_parseable() {
        let stamp = now_rfc3339();
        assert_eq!(stamp.len(), "2024-01-01T00:00:00.000000Z".len());
        assert!(stamp.ends_with('Z'));
        assert!(parse_timestamp(&stamp).is_some());
    }

    #[test]
    fn update_body_replaces_every_field() {
        let body = UpdateTask {
            title: "new".to_string(),
            ..UpdateTask::default()
        };
        let task = body.into_task("abc".to_string());
        assert_eq!(task.id, "abc");
        assert_eq!(task.title, "new");
        assert_eq!(task.status, "");
    }
}
