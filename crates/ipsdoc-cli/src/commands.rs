//! Local commands: one-off invocation and presigning.

use anyhow::{Context, anyhow};
use ipsdoc_locator::Handler;

use crate::config::{InvokeArgs, ShareArgs};
use crate::lambda::handle_event;

/// Handles one event locally and prints the response envelope.
///
/// Lookup failures are part of the printed envelope, not command errors.
pub async fn invoke(handler: &Handler, args: &InvokeArgs) -> anyhow::Result<()> {
    let event = args.load_event()?;
    let response = handle_event(handler, event, args.stringify_body)
        .await
        .context("failed to render response")?;

    let rendered = serde_json::to_string_pretty(&response).context("failed to render response")?;
    println!("{rendered}");
    Ok(())
}

/// Prints a presigned URL for one object.
pub async fn share(handler: &Handler, args: &ShareArgs) -> anyhow::Result<()> {
    let url = handler
        .share(args.bucket.as_deref(), &args.key, Some(args.expiration()))
        .await
        .ok_or_else(|| anyhow!("could not generate a presigned URL for '{}'", args.key))?;

    println!("{url}");
    Ok(())
}
