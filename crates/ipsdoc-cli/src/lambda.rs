//! AWS Lambda runtime loop.

use ipsdoc_locator::Handler;
use lambda_runtime::{LambdaEvent, service_fn};
use serde_json::Value;

use crate::TRACING_TARGET_LAMBDA;
use crate::config::ServeArgs;

/// Runs the Lambda runtime loop until the runtime API shuts the process down.
///
/// The handler, and the store operators behind it, live for the whole process
/// and are shared by every invocation.
pub async fn serve(handler: &Handler, args: &ServeArgs) -> anyhow::Result<()> {
    let stringify_body = args.stringify_body;

    tracing::info!(
        target: TRACING_TARGET_LAMBDA,
        stringify_body,
        "Starting Lambda runtime loop"
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        let (payload, context) = event.into_parts();

        tracing::debug!(
            target: TRACING_TARGET_LAMBDA,
            request_id = %context.request_id,
            "Invocation received"
        );

        handle_event(handler, payload, stringify_body)
            .await
            .map_err(lambda_runtime::Error::from)
    }))
    .await
    .map_err(|e| anyhow::anyhow!("Lambda runtime error: {e}"))
}

/// Processes one event and renders the envelope returned to the invoker.
pub async fn handle_event(
    handler: &Handler,
    payload: Value,
    stringify_body: bool,
) -> serde_json::Result<Value> {
    let response = handler.process(payload).await;

    tracing::info!(
        target: TRACING_TARGET_LAMBDA,
        status_code = response.status_code,
        success = response.is_success(),
        "Invocation handled"
    );

    response.into_value(stringify_body)
}
