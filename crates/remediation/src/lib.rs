use crate::RemediationErrorReason::{BadRequest, BadResponse, ControlPlaneFailure};
use crate::RemediationOperation::{DescribeTask, StartTask};
use aws_sdk_databasemigration::operation::describe_replication_tasks::DescribeReplicationTasksOutput;
use aws_sdk_databasemigration::types::{
    Filter, MigrationTypeValue, ReplicationTask, StartReplicationTaskTypeValue,
};
use model::Error;
use std::fmt::{Display, Formatter};

/// Filter field which uniquely identifies a replication task.
const TASK_ID_FILTER: &str = "replication-task-id";

/// Issues restart commands for failed replication tasks against the
/// control-plane API.
pub struct Remediator {
    dms_client: aws_sdk_databasemigration::Client,
}

/// Result of a remediation attempt which completed without a control-plane
/// fault.
#[derive(Debug, Clone, PartialEq)]
pub enum RestartOutcome {
    Restarted {
        task_arn: String,
        start_type: StartReplicationTaskTypeValue,
    },
    // The lookup matched no task. Terminal for this attempt.
    TaskNotFound,
}

impl Remediator {
    pub fn new(dms_client: aws_sdk_databasemigration::Client) -> Remediator {
        Remediator { dms_client }
    }

    /// Restart the replication task registered under `task_name`.
    ///
    /// The task is looked up fresh on every attempt. A full-load task has no
    /// checkpoint to resume from and is restarted from the beginning; every
    /// other migration type resumes from its last checkpoint.
    pub async fn restart(&self, task_name: &str) -> Result<RestartOutcome, RemediationError> {
        let task: ReplicationTask = match self.describe_task(task_name).await? {
            Some(task) => task,
            None => return Ok(RestartOutcome::TaskNotFound),
        };

        let task_arn: String = match task.replication_task_arn() {
            Some(arn) => arn.to_string(),
            None => {
                return Err(RemediationError::new(
                    task_name,
                    DescribeTask,
                    BadResponse("task is missing an arn".to_string()),
                ));
            }
        };
        let start_type: StartReplicationTaskTypeValue = restart_type(task.migration_type());

        self.dms_client
            .start_replication_task()
            .replication_task_arn(task_arn.as_str())
            .start_replication_task_type(start_type.clone())
            .send()
            .await
            .map_err(|err| {
                RemediationError::new(task_name, StartTask, ControlPlaneFailure(err.into()))
            })?;

        Ok(RestartOutcome::Restarted {
            task_arn,
            start_type,
        })
    }

    async fn describe_task(
        &self,
        task_name: &str,
    ) -> Result<Option<ReplicationTask>, RemediationError> {
        let filter: Filter = Filter::builder()
            .name(TASK_ID_FILTER)
            .values(task_name)
            .build()
            .map_err(|err| RemediationError::new(task_name, DescribeTask, BadRequest(err.into())))?;

        let output: DescribeReplicationTasksOutput = self
            .dms_client
            .describe_replication_tasks()
            .filters(filter)
            .send()
            .await
            .map_err(|err| {
                RemediationError::new(task_name, DescribeTask, ControlPlaneFailure(err.into()))
            })?;

        // The filter is on a unique identifier so duplicates are not expected.
        // Should the control plane return more than one task anyway, act on
        // whichever it ordered first.
        Ok(output
            .replication_tasks
            .unwrap_or_default()
            .into_iter()
            .next())
    }
}

/// Select the restart mode for a task's configured migration type.
fn restart_type(migration_type: Option<&MigrationTypeValue>) -> StartReplicationTaskTypeValue {
    match migration_type {
        // A one-time bulk copy has no durable position to pick up from
        Some(MigrationTypeValue::FullLoad) => StartReplicationTaskTypeValue::StartReplication,
        _ => StartReplicationTaskTypeValue::ResumeProcessing,
    }
}

/// Errors arising from a remediation attempt.
#[derive(Debug)]
pub struct RemediationError {
    pub task_name: String,

    pub operation: RemediationOperation,
    pub reason: RemediationErrorReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemediationOperation {
    DescribeTask,
    StartTask,
}

#[derive(Debug)]
pub enum RemediationErrorReason {
    // The control-plane request couldn't be constructed
    BadRequest(Error),
    // The control plane returned a task missing a required field
    BadResponse(String),
    // An error from the underlying control-plane call
    ControlPlaneFailure(Error),
}

impl RemediationError {
    pub fn new(
        task_name: &str,
        operation: RemediationOperation,
        reason: RemediationErrorReason,
    ) -> Self {
        RemediationError {
            task_name: task_name.to_string(),
            operation,
            reason,
        }
    }
}

impl Display for RemediationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(format!("{:?}", self).as_str())
    }
}

impl std::error::Error for RemediationError {}
