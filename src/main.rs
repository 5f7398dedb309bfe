use aws_config::BehaviorVersion;
use aws_lambda_events::sns::SnsEvent;
use dispatcher::handle_sns_event;
use lambda_runtime::{Error, LambdaEvent, service_fn, tracing};
use remediation::Remediator;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let dms_client: aws_sdk_databasemigration::Client = aws_sdk_databasemigration::Client::new(
        &aws_config::load_defaults(BehaviorVersion::latest()).await,
    );
    let remediator: Remediator = Remediator::new(dms_client);

    lambda_runtime::run(service_fn(async |event: LambdaEvent<SnsEvent>| {
        handle_sns_event(&remediator, event).await
    }))
    .await
}
