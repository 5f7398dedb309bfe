use aws_lambda_events::sns::{SnsEvent, SnsRecord};
use lambda_runtime::tracing::{Instrument, Span};
use lambda_runtime::{LambdaEvent, tracing};
use model::{Error, FailureEvent};
use remediation::{Remediator, RestartOutcome};

/// Handle a batch of SNS notification records.
///
/// Records are processed in order, each to completion before the next
/// begins. Remediation outcomes are diagnostic only; a record which fails to
/// parse or to remediate never fails the batch.
pub async fn handle_sns_event(
    remediator: &Remediator,
    event: LambdaEvent<SnsEvent>,
) -> Result<(), Error> {
    let records: Vec<SnsRecord> = event.payload.records;

    tracing::info!("Handling batch of [{}] notifications from SNS", records.len());

    for record in records {
        let message_id: String = record.sns.message_id.clone();
        let record_span: Span = tracing::span!(tracing::Level::INFO, "SNS Handler", message_id);

        handle_record(remediator, &record)
            .instrument(record_span)
            .await;
    }

    Ok(())
}

/// Classify a single notification and remediate if it reports a failed task.
async fn handle_record(remediator: &Remediator, record: &SnsRecord) {
    let event: FailureEvent = match FailureEvent::parse(&record.sns.message) {
        Ok(event) => event,
        Err(err) => {
            // A malformed record must not take the rest of the batch down
            tracing::error!("Failed to parse notification message, {err}");

            return;
        }
    };

    tracing::info!(
        "Event status [{}], task arn [{}], task name [{}]",
        event.status,
        event.task_arn,
        event.task_name
    );

    if !event.is_task_failure() {
        tracing::info!("Event does not indicate a failed replication task, skipping record");

        return;
    }

    tracing::info!("Restarting failed replication task [{}]", event.task_name);

    match remediator.restart(&event.task_name).await {
        Ok(RestartOutcome::Restarted {
            task_arn,
            start_type,
        }) => {
            tracing::info!(
                "Restarted task [{}] with start type [{}]",
                task_arn,
                start_type.as_str()
            );
        }
        Ok(RestartOutcome::TaskNotFound) => {
            tracing::warn!("Replication task [{}] not found", event.task_name);
        }
        Err(err) => {
            tracing::error!("Failed to restart task [{}], {err}", event.task_name);
        }
    }
}
