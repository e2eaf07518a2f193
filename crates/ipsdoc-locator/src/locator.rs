//! Client document lookup over an [`ObjectStore`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use ipsdoc_storage::ObjectStore;

use crate::{Error, Result, TRACING_TARGET_FETCH, TRACING_TARGET_FIND};

/// Lifetime of a presigned URL when the caller gives none.
pub const DEFAULT_SHARE_EXPIRATION: Duration = Duration::from_secs(3600);

const PDF_EXTENSION: &str = ".pdf";

/// Returns whether `key` is a PDF whose name contains the client.
///
/// `client_name_lower` must already be lowercase. Matching is plain substring
/// containment; the extension check is case-insensitive.
pub fn matches_client(key: &str, client_name_lower: &str) -> bool {
    let key = key.to_lowercase();
    key.ends_with(PDF_EXTENSION) && key.contains(client_name_lower)
}

/// Finds, fetches, and shares client documents.
#[derive(Clone)]
pub struct Locator {
    store: Arc<dyn ObjectStore>,
}

impl Locator {
    /// Creates a locator over the given store.
    pub fn new(store: impl ObjectStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Returns the keys under `prefix` that belong to `client_name`, in listing order.
    ///
    /// A failed listing is logged and reported as no matches.
    pub async fn find(&self, bucket: &str, client_name: &str, prefix: &str) -> Vec<String> {
        let entries = match self.store.list(bucket, prefix).await {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_FIND,
                    bucket = %bucket,
                    prefix = %prefix,
                    error = %error,
                    "Listing failed, treating as no matches"
                );
                return Vec::new();
            }
        };

        if entries.is_empty() {
            tracing::info!(
                target: TRACING_TARGET_FIND,
                bucket = %bucket,
                prefix = %prefix,
                "No objects under prefix"
            );
            return Vec::new();
        }

        let client_name_lower = client_name.to_lowercase();
        let matches: Vec<String> = entries
            .into_iter()
            .map(|entry| entry.key)
            .filter(|key| matches_client(key, &client_name_lower))
            .collect();

        for key in &matches {
            tracing::debug!(target: TRACING_TARGET_FIND, key = %key, "Matching PDF");
        }

        tracing::info!(
            target: TRACING_TARGET_FIND,
            bucket = %bucket,
            prefix = %prefix,
            client_name = %client_name,
            count = matches.len(),
            "Client documents matched"
        );

        matches
    }

    /// Reads the object at `key`. One attempt, no retry.
    pub async fn fetch(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let data = self.store.get(bucket, key).await.map_err(|error| {
            tracing::error!(
                target: TRACING_TARGET_FETCH,
                bucket = %bucket,
                key = %key,
                error = %error,
                "Object retrieval failed"
            );
            Error::retrieval(&error).with_source(error)
        })?;

        tracing::debug!(
            target: TRACING_TARGET_FETCH,
            bucket = %bucket,
            key = %key,
            size = data.len(),
            "Object retrieved"
        );

        Ok(data)
    }

    /// Returns a read URL for `key` valid for `expiration` (one hour if `None`).
    ///
    /// Returns `None` when the store cannot issue one; the failure is logged.
    pub async fn share(
        &self,
        bucket: &str,
        key: &str,
        expiration: Option<Duration>,
    ) -> Option<String> {
        let expiration = expiration.unwrap_or(DEFAULT_SHARE_EXPIRATION);

        match self.store.presign(bucket, key, expiration).await {
            Ok(url) => {
                tracing::info!(
                    target: TRACING_TARGET_FETCH,
                    bucket = %bucket,
                    key = %key,
                    expires_in_secs = expiration.as_secs(),
                    "Presigned URL issued"
                );
                Some(url)
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_FETCH,
                    bucket = %bucket,
                    key = %key,
                    error = %error,
                    "Presigned URL generation failed"
                );
                None
            }
        }
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("store", &self.store.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use ipsdoc_storage::{Fault, MemoryStore};

    use super::*;
    use crate::ErrorKind;

    const BUCKET: &str = "advisor-ips-documents-bucket";
    const PREFIX: &str = "ips-output/pdf/";

    fn store(keys: &[&str]) -> MemoryStore {
        keys.iter().fold(MemoryStore::new(), |store, key| {
            store.with_object(BUCKET, key, key.as_bytes().to_vec())
        })
    }

    #[test]
    fn match_requires_pdf_extension() {
        assert!(matches_client("ips-output/pdf/acme.pdf", "acme"));
        assert!(matches_client("ips-output/pdf/ACME.PDF", "acme"));
        assert!(!matches_client("ips-output/pdf/acme.docx", "acme"));
        assert!(!matches_client("ips-output/pdf/acme.pdf.bak", "acme"));
    }

    #[test]
    fn match_is_plain_substring() {
        assert!(matches_client("ips-output/pdf/Client_Name_10.pdf", "client_name_1"));
        assert!(matches_client("acme/other.pdf", "acme"));
        assert!(!matches_client("ips-output/pdf/Client Name.pdf", "client_name"));
    }

    #[tokio::test]
    async fn find_is_case_insensitive() {
        let locator = Locator::new(store(&["ips-output/pdf/CLIENT_A.pdf"]));

        for name in ["client_a", "CLIENT_A", "Client_A"] {
            assert_eq!(
                locator.find(BUCKET, name, PREFIX).await,
                vec!["ips-output/pdf/CLIENT_A.pdf"]
            );
        }
    }

    #[tokio::test]
    async fn find_keeps_listing_order() {
        let locator = Locator::new(store(&[
            "ips-output/pdf/acme_2024.pdf",
            "ips-output/pdf/other.pdf",
            "ips-output/pdf/acme_2023.pdf",
            "ips-output/pdf/acme_notes.txt",
        ]));

        assert_eq!(
            locator.find(BUCKET, "acme", PREFIX).await,
            vec!["ips-output/pdf/acme_2024.pdf", "ips-output/pdf/acme_2023.pdf"]
        );
    }

    #[tokio::test]
    async fn find_only_searches_under_prefix() {
        let locator = Locator::new(store(&["archive/acme.pdf"]));
        assert!(locator.find(BUCKET, "acme", PREFIX).await.is_empty());
    }

    #[tokio::test]
    async fn find_stops_at_first_page() {
        let store = store(&["ips-output/pdf/a.pdf", "ips-output/pdf/acme.pdf"]).with_max_keys(1);
        let locator = Locator::new(store);
        assert!(locator.find(BUCKET, "acme", PREFIX).await.is_empty());
    }

    #[tokio::test]
    async fn find_swallows_listing_faults() {
        let store = store(&["ips-output/pdf/acme.pdf"]);
        store.fail_list(Fault::PermissionDenied("Access Denied".into()));
        let locator = Locator::new(store.clone());

        assert!(locator.find(BUCKET, "acme", PREFIX).await.is_empty());
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn fetch_returns_bytes() {
        let locator = Locator::new(store(&["ips-output/pdf/acme.pdf"]));
        let data = locator.fetch(BUCKET, "ips-output/pdf/acme.pdf").await.unwrap();
        assert_eq!(&data[..], b"ips-output/pdf/acme.pdf");
    }

    #[tokio::test]
    async fn fetch_failure_is_retrieval_error_with_detail() {
        let store = store(&["ips-output/pdf/acme.pdf"]);
        store.fail_get(
            "ips-output/pdf/acme.pdf",
            Fault::PermissionDenied("Access Denied".into()),
        );
        let locator = Locator::new(store.clone());

        let err = locator
            .fetch(BUCKET, "ips-output/pdf/acme.pdf")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Retrieval);
        assert!(err.to_string().contains("Access Denied"));
        assert_eq!(store.get_calls(), 1);
    }

    #[tokio::test]
    async fn fetch_missing_object_fails() {
        let locator = Locator::new(MemoryStore::new());
        let err = locator.fetch(BUCKET, "missing.pdf").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Retrieval);
    }

    #[tokio::test]
    async fn share_defaults_to_one_hour() {
        let locator = Locator::new(MemoryStore::new());
        let url = locator.share(BUCKET, "ips-output/pdf/acme.pdf", None).await;
        assert_eq!(
            url.as_deref(),
            Some("memory://advisor-ips-documents-bucket/ips-output/pdf/acme.pdf?expires_in=3600")
        );
    }

    #[tokio::test]
    async fn share_honors_expiration() {
        let locator = Locator::new(MemoryStore::new());
        let url = locator
            .share(BUCKET, "a.pdf", Some(Duration::from_secs(60)))
            .await
            .unwrap();
        assert!(url.ends_with("expires_in=60"));
    }

    #[tokio::test]
    async fn share_failure_yields_none() {
        let store = MemoryStore::new();
        store.fail_presign(Fault::Unavailable("signing key unavailable".into()));
        let locator = Locator::new(store);
        assert!(locator.share(BUCKET, "a.pdf", None).await.is_none());
    }
}
