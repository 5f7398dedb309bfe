use serde::{Deserialize, Serialize};

pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Status line published by the control plane when a replication task fails.
pub const TASK_FAILED_STATUS: &str = "Replication task has failed.";

/// Raw notification payload published for replication task events.
///
/// The publisher omits keys it has no value for, so every field defaults to
/// an empty string.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TaskNotification {
    #[serde(rename = "Event Message", default)]
    pub event_message: String,
    #[serde(rename = "Identifier Link", default)]
    pub identifier_link: String,
    #[serde(rename = "SourceId", default)]
    pub source_id: String,
}

/// Parsed view of a notification, reduced to the fields the handler acts on.
#[derive(Debug, Clone)]
pub struct FailureEvent {
    // First line of the event message, trimmed
    pub status: String,
    pub task_arn: String,
    pub task_name: String,
}

impl FailureEvent {
    pub fn parse(message: &str) -> Result<FailureEvent, Error> {
        let notification: TaskNotification = serde_json::from_str(message)?;

        Ok(notification.into())
    }

    /// Whether this event should trigger a restart of the named task.
    ///
    /// The status match is exact and case-sensitive; anything beyond the
    /// first line of the event message is ignored.
    pub fn is_task_failure(&self) -> bool {
        self.status == TASK_FAILED_STATUS
            && !self.task_arn.is_empty()
            && !self.task_name.is_empty()
    }
}

impl From<TaskNotification> for FailureEvent {
    fn from(notification: TaskNotification) -> Self {
        let status: &str = notification
            .event_message
            .split('\n')
            .next()
            .unwrap_or_default()
            .trim();

        FailureEvent {
            status: status.to_string(),
            task_arn: notification.identifier_link.trim().to_string(),
            task_name: notification.source_id.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{FailureEvent, TASK_FAILED_STATUS};

    #[test]
    fn parses_and_trims_all_fields() {
        let event: FailureEvent = FailureEvent::parse(
            r#"{"Event Message": "Replication task has failed.\nSee the task log for details.", "Identifier Link": " arn:aws:dms:eu-west-1:123456789012:task:TESTTASK ", "SourceId": " task-1 "}"#,
        )
        .expect("Message should parse");

        assert_eq!(TASK_FAILED_STATUS, event.status);
        assert_eq!(
            "arn:aws:dms:eu-west-1:123456789012:task:TESTTASK",
            event.task_arn
        );
        assert_eq!("task-1", event.task_name);
        assert!(event.is_task_failure());
    }

    #[test]
    fn absent_keys_default_to_empty() {
        let event: FailureEvent =
            FailureEvent::parse(r#"{"Event ID": "DMS-EVENT-0078"}"#).expect("Message should parse");

        assert_eq!("", event.status);
        assert_eq!("", event.task_arn);
        assert_eq!("", event.task_name);
        assert!(!event.is_task_failure());
    }

    #[test]
    fn status_is_first_line_of_event_message() {
        let event: FailureEvent = FailureEvent::parse(
            r#"{"Event Message": "Replication task has failed.\nLast Error: out of storage", "Identifier Link": "arn:task", "SourceId": "task-1"}"#,
        )
        .expect("Message should parse");

        assert_eq!(TASK_FAILED_STATUS, event.status);
        assert!(event.is_task_failure());
    }

    #[test]
    fn other_status_is_not_a_failure() {
        let event: FailureEvent = FailureEvent::parse(
            r#"{"Event Message": "Replication task state change.", "Identifier Link": "arn:task", "SourceId": "task-1"}"#,
        )
        .expect("Message should parse");

        assert!(!event.is_task_failure());
    }

    #[test]
    fn status_match_is_case_sensitive() {
        let event: FailureEvent = FailureEvent::parse(
            r#"{"Event Message": "replication task has failed.", "Identifier Link": "arn:task", "SourceId": "task-1"}"#,
        )
        .expect("Message should parse");

        assert!(!event.is_task_failure());
    }

    #[test]
    fn missing_task_arn_is_not_a_failure() {
        let event: FailureEvent = FailureEvent::parse(
            r#"{"Event Message": "Replication task has failed.", "Identifier Link": " ", "SourceId": "task-1"}"#,
        )
        .expect("Message should parse");

        assert!(!event.is_task_failure());
    }

    #[test]
    fn missing_task_name_is_not_a_failure() {
        let event: FailureEvent = FailureEvent::parse(
            r#"{"Event Message": "Replication task has failed.", "Identifier Link": "arn:task", "SourceId": ""}"#,
        )
        .expect("Message should parse");

        assert!(!event.is_task_failure());
    }

    #[test]
    fn malformed_message_fails_to_parse() {
        let result = FailureEvent::parse("not a notification");

        assert!(result.is_err());
    }
}
