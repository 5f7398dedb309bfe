use aws_lambda_events::sns::{SnsEvent, SnsRecord};
use aws_sdk_databasemigration::operation::describe_replication_tasks::{
    DescribeReplicationTasksError, DescribeReplicationTasksOutput,
};
use aws_sdk_databasemigration::operation::start_replication_task::{
    StartReplicationTaskError, StartReplicationTaskOutput,
};
use aws_sdk_databasemigration::types::error::{InvalidResourceStateFault, ResourceNotFoundFault};
use aws_sdk_databasemigration::types::{
    MigrationTypeValue, ReplicationTask, StartReplicationTaskTypeValue,
};
use aws_smithy_mocks::{Rule, mock};
use serde_json::json;

/// Replication task arn used throughout the tests
pub const TEST_TASK_ARN: &str = "arn:aws:dms:eu-west-1:123456789012:task:TESTTASK";

/// Create a dummy SNS record wrapping a raw message payload.
///
/// The envelope fields mirror what SNS delivers to Lambda so the record goes
/// through the same deserialization as a real notification.
pub fn sns_record_with_message(message: &str) -> SnsRecord {
    let record: serde_json::Value = json!({
        "EventVersion": "1.0",
        "EventSubscriptionArn": "arn:aws:sns:eu-west-1:123456789012:task-events:21be56ed-a058-49f5-8c98-aedd2564c486",
        "EventSource": "aws:sns",
        "Sns": {
            "Type": "Notification",
            "MessageId": "95df01b4-ee98-5cb9-9903-4c221d41eb5e",
            "TopicArn": "arn:aws:sns:eu-west-1:123456789012:task-events",
            "Subject": "DMS Notification Message",
            "Message": message,
            "Timestamp": "2024-01-02T12:45:07.000Z",
            "SignatureVersion": "1",
            "Signature": "EXAMPLE",
            "SigningCertUrl": "https://sns.eu-west-1.amazonaws.com/SimpleNotificationService.pem",
            "UnsubscribeUrl": "https://sns.eu-west-1.amazonaws.com/?Action=Unsubscribe",
            "MessageAttributes": {}
        }
    });

    serde_json::from_value(record).expect("SNS record fixture should deserialize")
}

/// Create an SNS event carrying one record per message payload
pub fn sns_event_with_messages(messages: &[&str]) -> SnsEvent {
    SnsEvent {
        records: messages
            .iter()
            .map(|message: &&str| sns_record_with_message(message))
            .collect(),
    }
}

/// Rule returning a single replication task from the describe call.
/// Only matches requests filtered on `replication-task-id` with `task_name`.
pub fn describe_task_rule(
    task_name: &str,
    task_arn: &str,
    migration_type: MigrationTypeValue,
) -> Rule {
    let expected_name: String = task_name.to_string();
    let task: ReplicationTask = ReplicationTask::builder()
        .replication_task_identifier(task_name)
        .replication_task_arn(task_arn)
        .migration_type(migration_type)
        .build();

    mock!(aws_sdk_databasemigration::Client::describe_replication_tasks)
        .match_requests(move |request| {
            request.filters().iter().any(|filter| {
                filter.name() == "replication-task-id"
                    && filter.values().iter().any(|value| value == &expected_name)
            })
        })
        .then_output(move || {
            DescribeReplicationTasksOutput::builder()
                .replication_tasks(task.clone())
                .build()
        })
}

/// Rule returning an empty result set from the describe call
pub fn describe_no_tasks_rule() -> Rule {
    mock!(aws_sdk_databasemigration::Client::describe_replication_tasks)
        .then_output(|| DescribeReplicationTasksOutput::builder().build())
}

/// Rule failing the describe call outright
pub fn describe_error_rule() -> Rule {
    mock!(aws_sdk_databasemigration::Client::describe_replication_tasks).then_error(|| {
        DescribeReplicationTasksError::ResourceNotFoundFault(
            ResourceNotFoundFault::builder()
                .message("Replication task could not be described")
                .build(),
        )
    })
}

/// Rule accepting any restart command
pub fn start_task_rule() -> Rule {
    mock!(aws_sdk_databasemigration::Client::start_replication_task)
        .then_output(|| StartReplicationTaskOutput::builder().build())
}

/// Rule accepting a restart command only for the given arn and start type
pub fn start_task_rule_expecting(
    task_arn: &str,
    start_type: StartReplicationTaskTypeValue,
) -> Rule {
    let expected_arn: String = task_arn.to_string();

    mock!(aws_sdk_databasemigration::Client::start_replication_task)
        .match_requests(move |request| {
            request.replication_task_arn() == Some(expected_arn.as_str())
                && request.start_replication_task_type() == Some(&start_type)
        })
        .then_output(|| StartReplicationTaskOutput::builder().build())
}

/// Rule rejecting the restart command, as the control plane does when the
/// task is already starting
pub fn start_error_rule() -> Rule {
    mock!(aws_sdk_databasemigration::Client::start_replication_task).then_error(|| {
        StartReplicationTaskError::InvalidResourceStateFault(
            InvalidResourceStateFault::builder()
                .message("Replication task is not stopped")
                .build(),
        )
    })
}
