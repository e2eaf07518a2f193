//! Lookup request handling.
//!
//! A request moves through four stages: validating, listing, fetching, and
//! responding. Every exit path, including panics below this module, ends in a
//! [`LookupResponse`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use strum::AsRefStr;
use tracing::Instrument;

use crate::{
    DocumentPayload, Error, Locator, LookupDefaults, LookupRequest, LookupResponse, Result,
    TRACING_TARGET_HANDLER,
};

#[derive(Debug, Clone, Copy, AsRefStr)]
#[strum(serialize_all = "snake_case")]
enum Stage {
    Validating,
    Listing,
    Fetching,
    Responding,
}

fn enter(stage: Stage) {
    tracing::debug!(target: TRACING_TARGET_HANDLER, stage = stage.as_ref(), "Lookup stage");
}

/// Turns lookup events into response envelopes.
#[derive(Debug, Clone)]
pub struct Handler {
    locator: Locator,
    defaults: LookupDefaults,
}

impl Handler {
    /// Creates a handler using the given defaults for omitted fields.
    pub fn new(locator: Locator, defaults: LookupDefaults) -> Self {
        Self { locator, defaults }
    }

    /// Handles one event. Never fails: errors and panics become envelopes.
    pub async fn process(&self, event: Value) -> LookupResponse {
        let span = tracing::info_span!(target: TRACING_TARGET_HANDLER, "lookup");
        let outcome = AssertUnwindSafe(self.try_process(event))
            .catch_unwind()
            .instrument(span)
            .await;

        let error = match outcome {
            Ok(Ok(response)) => return response,
            Ok(Err(error)) => error,
            Err(panic) => Error::internal(panic_message(panic.as_ref())),
        };

        if error.kind().is_client_error() {
            tracing::info!(
                target: TRACING_TARGET_HANDLER,
                kind = error.kind_str(),
                status_code = error.status_code(),
                error = %error,
                "Lookup rejected"
            );
        } else {
            tracing::error!(
                target: TRACING_TARGET_HANDLER,
                kind = error.kind_str(),
                status_code = error.status_code(),
                error = %error,
                "Lookup failed"
            );
        }

        LookupResponse::from_error(&error)
    }

    /// Handles one event, returning failures as errors.
    pub async fn try_process(&self, event: Value) -> Result<LookupResponse> {
        enter(Stage::Validating);
        let request = LookupRequest::from_event(event)?.resolve(&self.defaults)?;

        enter(Stage::Listing);
        let matches = self
            .locator
            .find(&request.bucket_name, &request.client_name, &request.prefix)
            .await;

        // First match in listing order wins.
        let Some(key) = matches.into_iter().next() else {
            return Err(Error::no_documents(&request.client_name));
        };

        enter(Stage::Fetching);
        let bytes = self.locator.fetch(&request.bucket_name, &key).await?;

        enter(Stage::Responding);
        let payload = DocumentPayload::new(key, bytes);

        tracing::info!(
            target: TRACING_TARGET_HANDLER,
            client_name = %request.client_name,
            key = %payload.key(),
            size = payload.bytes().len(),
            "Lookup succeeded"
        );

        Ok(LookupResponse::success(payload, request.client_name))
    }

    /// Issues a presigned URL for `key`, in `bucket` or the default bucket.
    pub async fn share(
        &self,
        bucket: Option<&str>,
        key: &str,
        expiration: Option<Duration>,
    ) -> Option<String> {
        let bucket = bucket.unwrap_or(self.defaults.bucket_name.as_str());
        self.locator.share(bucket, key, expiration).await
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use ipsdoc_storage::{Fault, MemoryStore, ObjectEntry, ObjectStore, StorageResult};
    use serde_json::json;

    use super::*;

    const BUCKET: &str = "advisor-ips-documents-bucket";

    fn handler(store: MemoryStore) -> Handler {
        Handler::new(Locator::new(store), LookupDefaults::default())
    }

    fn sample_store() -> MemoryStore {
        MemoryStore::new()
            .with_object(
                BUCKET,
                "ips-output/pdf/Client_Name_1_report.pdf",
                Bytes::from_static(b"%PDF-1.4 report"),
            )
            .with_object(BUCKET, "ips-output/pdf/Other.pdf", Bytes::from_static(b"%PDF other"))
    }

    #[tokio::test]
    async fn success_returns_first_match() {
        let response = handler(sample_store())
            .process(json!({
                "bucketName": BUCKET,
                "clientName": "Client_Name_1",
                "prefix": "ips-output/pdf/"
            }))
            .await;

        assert_eq!(response.status_code, 200);
        assert!(response.body.success);
        assert_eq!(response.body.file_name.as_deref(), Some("Client_Name_1_report.pdf"));
        assert_eq!(
            response.body.s3_key.as_deref(),
            Some("ips-output/pdf/Client_Name_1_report.pdf")
        );
        assert_eq!(response.body.client_name.as_deref(), Some("Client_Name_1"));

        let content = response.body.pdf_content.unwrap();
        assert_eq!(DocumentPayload::decode(&content).unwrap(), b"%PDF-1.4 report");
    }

    #[tokio::test]
    async fn defaults_fill_bucket_and_prefix() {
        let response = handler(sample_store())
            .process(json!({ "clientName": "client_name_1" }))
            .await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body.client_name.as_deref(), Some("client_name_1"));
    }

    #[tokio::test]
    async fn string_events_are_accepted() {
        let event = Value::String(r#"{"clientName":"Other"}"#.into());
        let response = handler(sample_store()).process(event).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body.file_name.as_deref(), Some("Other.pdf"));
    }

    #[tokio::test]
    async fn missing_client_name_is_rejected_before_store_access() {
        let store = sample_store();
        let handler = handler(store.clone());

        for event in [json!({}), json!({ "clientName": "" }), json!({ "clientName": null })] {
            let response = handler.process(event).await;
            assert_eq!(response.status_code, 400);
            assert!(!response.body.success);
            assert_eq!(response.body.error.as_deref(), Some("Client name is required"));
        }

        assert_eq!(store.list_calls(), 0);
        assert_eq!(store.get_calls(), 0);
    }

    #[tokio::test]
    async fn mistyped_fields_do_not_mask_missing_client_name() {
        let store = sample_store();
        let handler = handler(store.clone());

        for event in [
            json!({ "prefix": ["x"] }),
            json!({ "clientName": "", "bucketName": 5 }),
        ] {
            let response = handler.process(event).await;
            assert_eq!(response.status_code, 400);
            assert_eq!(response.body.error.as_deref(), Some("Client name is required"));
        }

        assert_eq!(store.list_calls(), 0);
    }

    #[tokio::test]
    async fn no_match_is_not_found_naming_client() {
        let store = sample_store();
        let response = handler(store.clone())
            .process(json!({ "clientName": "Nonexistent" }))
            .await;

        assert_eq!(response.status_code, 404);
        assert!(!response.body.success);
        assert!(response.body.error.unwrap().contains("Nonexistent"));
        assert_eq!(store.get_calls(), 0);
    }

    #[tokio::test]
    async fn non_pdf_keys_are_ignored() {
        let store = MemoryStore::new().with_object(BUCKET, "ips-output/pdf/Acme.docx", "doc");
        let response = handler(store)
            .process(json!({ "clientName": "Acme" }))
            .await;
        assert_eq!(response.status_code, 404);
    }

    #[tokio::test]
    async fn listing_order_decides_the_match() {
        let first = MemoryStore::new()
            .with_object(BUCKET, "ips-output/pdf/acme_b.pdf", "b")
            .with_object(BUCKET, "ips-output/pdf/acme_a.pdf", "a");
        let second = MemoryStore::new()
            .with_object(BUCKET, "ips-output/pdf/acme_a.pdf", "a")
            .with_object(BUCKET, "ips-output/pdf/acme_b.pdf", "b");

        let event = json!({ "clientName": "acme" });
        let from_first = handler(first).process(event.clone()).await;
        let from_second = handler(second).process(event).await;

        assert_eq!(from_first.body.file_name.as_deref(), Some("acme_b.pdf"));
        assert_eq!(from_second.body.file_name.as_deref(), Some("acme_a.pdf"));
    }

    #[tokio::test]
    async fn listing_fault_reads_as_not_found() {
        let store = sample_store();
        store.fail_list(Fault::Unavailable("SlowDown".into()));

        let response = handler(store)
            .process(json!({ "clientName": "Client_Name_1" }))
            .await;
        assert_eq!(response.status_code, 404);
    }

    #[tokio::test]
    async fn fetch_fault_is_server_error_with_detail() {
        let store = sample_store();
        store.fail_get(
            "ips-output/pdf/Client_Name_1_report.pdf",
            Fault::PermissionDenied("Access Denied".into()),
        );

        let response = handler(store)
            .process(json!({ "clientName": "Client_Name_1" }))
            .await;

        assert_eq!(response.status_code, 500);
        assert!(!response.body.success);
        let error = response.body.error.unwrap();
        assert!(error.starts_with("Error retrieving PDF from S3"));
        assert!(error.contains("Access Denied"));
        assert!(response.body.pdf_content.is_none());
    }

    #[tokio::test]
    async fn malformed_event_is_server_error() {
        let response = handler(sample_store())
            .process(Value::String("{not json".into()))
            .await;
        assert_eq!(response.status_code, 500);
        assert!(response.body.error.unwrap().starts_with("Lambda function error"));
    }

    struct PanickingStore;

    #[async_trait::async_trait]
    impl ObjectStore for PanickingStore {
        fn name(&self) -> &'static str {
            "panicking"
        }

        async fn list(&self, _bucket: &str, _prefix: &str) -> StorageResult<Vec<ObjectEntry>> {
            panic!("listing exploded")
        }

        async fn get(&self, _bucket: &str, _key: &str) -> StorageResult<Bytes> {
            unreachable!()
        }

        async fn presign(
            &self,
            _bucket: &str,
            _key: &str,
            _expires_in: Duration,
        ) -> StorageResult<String> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn panics_become_server_errors() {
        let handler = Handler::new(Locator::new(PanickingStore), LookupDefaults::default());
        let response = handler.process(json!({ "clientName": "Acme" })).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.body.error.as_deref(),
            Some("Lambda function error: listing exploded")
        );
    }

    #[tokio::test]
    async fn share_uses_default_bucket() {
        let handler = handler(MemoryStore::new());
        let url = handler.share(None, "ips-output/pdf/a.pdf", None).await.unwrap();
        assert!(url.starts_with("memory://advisor-ips-documents-bucket/"));

        let url = handler
            .share(Some("other"), "a.pdf", Some(Duration::from_secs(5)))
            .await
            .unwrap();
        assert_eq!(url, "memory://other/a.pdf?expires_in=5");
    }
}
