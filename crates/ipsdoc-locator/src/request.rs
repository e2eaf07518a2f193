//! Lookup request parsing and defaults.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Bucket searched when a request does not name one.
pub const DEFAULT_BUCKET_NAME: &str = "advisor-ips-documents-bucket";

/// Key prefix searched when a request does not name one.
pub const DEFAULT_PREFIX: &str = "ips-output/pdf/";

/// Values applied to fields a request leaves out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct LookupDefaults {
    /// Bucket searched when the request has no `bucketName`.
    #[cfg_attr(
        feature = "config",
        arg(long = "default-bucket", env = "DEFAULT_BUCKET_NAME", default_value = DEFAULT_BUCKET_NAME)
    )]
    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,

    /// Prefix searched when the request has no `prefix`.
    #[cfg_attr(
        feature = "config",
        arg(long = "default-prefix", env = "DEFAULT_PREFIX", default_value = DEFAULT_PREFIX)
    )]
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_bucket_name() -> String {
    DEFAULT_BUCKET_NAME.to_string()
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

impl Default for LookupDefaults {
    fn default() -> Self {
        Self {
            bucket_name: default_bucket_name(),
            prefix: default_prefix(),
        }
    }
}

/// Inbound lookup event.
///
/// Every field is optional on the wire; `null` behaves like an absent field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    /// Bucket to search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    /// Client whose document is wanted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    /// Key prefix to search under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl LookupRequest {
    /// Creates a request for one client with default bucket and prefix.
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: Some(client_name.into()),
            ..Self::default()
        }
    }

    /// Sets the bucket.
    pub fn with_bucket(mut self, bucket_name: impl Into<String>) -> Self {
        self.bucket_name = Some(bucket_name.into());
        self
    }

    /// Sets the prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Parses an invocation event.
    ///
    /// The event is either the request object itself or a JSON string holding
    /// it, as delivered by some invokers. A missing or empty `clientName` is
    /// rejected before the remaining fields are decoded, so a malformed
    /// `bucketName` or `prefix` cannot mask it.
    pub fn from_event(event: Value) -> Result<Self> {
        let event = match event {
            Value::String(raw) => serde_json::from_str(&raw).map_err(invalid_event)?,
            other => other,
        };

        if let Value::Object(fields) = &event {
            match fields.get("clientName") {
                None | Some(Value::Null) => return Err(client_name_required()),
                Some(Value::String(name)) if name.is_empty() => {
                    return Err(client_name_required());
                }
                Some(_) => {}
            }
        }

        serde_json::from_value(event).map_err(invalid_event)
    }

    /// Applies defaults and checks that a client name is present.
    ///
    /// Only an absent or empty client name is rejected. An explicitly empty
    /// bucket or prefix is kept as given.
    pub fn resolve(self, defaults: &LookupDefaults) -> Result<ResolvedRequest> {
        let client_name = self
            .client_name
            .filter(|name| !name.is_empty())
            .ok_or_else(client_name_required)?;

        Ok(ResolvedRequest {
            bucket_name: self
                .bucket_name
                .unwrap_or_else(|| defaults.bucket_name.clone()),
            client_name,
            prefix: self.prefix.unwrap_or_else(|| defaults.prefix.clone()),
        })
    }
}

fn client_name_required() -> Error {
    Error::validation("Client name is required")
}

fn invalid_event(error: serde_json::Error) -> Error {
    Error::internal(format!("invalid event: {error}")).with_source(error)
}

/// A validated request with every field filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    /// Bucket to search.
    pub bucket_name: String,
    /// Non-empty client name.
    pub client_name: String,
    /// Key prefix to search under.
    pub prefix: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn parse_object_event() {
        let event = json!({
            "bucketName": "bucket",
            "clientName": "Client_Name_1",
            "prefix": "ips-output/pdf/"
        });
        let request = LookupRequest::from_event(event).unwrap();
        assert_eq!(
            request,
            LookupRequest::new("Client_Name_1")
                .with_bucket("bucket")
                .with_prefix("ips-output/pdf/")
        );
    }

    #[test]
    fn parse_string_event() {
        let event = Value::String(r#"{"clientName":"Acme"}"#.to_string());
        let request = LookupRequest::from_event(event).unwrap();
        assert_eq!(request, LookupRequest::new("Acme"));
    }

    #[test]
    fn null_fields_are_absent() {
        let event = json!({ "clientName": "Acme", "bucketName": null, "prefix": null });
        let resolved = LookupRequest::from_event(event)
            .unwrap()
            .resolve(&LookupDefaults::default())
            .unwrap();
        assert_eq!(resolved.bucket_name, DEFAULT_BUCKET_NAME);
        assert_eq!(resolved.prefix, DEFAULT_PREFIX);
    }

    #[test]
    fn malformed_events_are_internal_errors() {
        for event in [
            Value::String("not json".into()),
            json!([1, 2, 3]),
            Value::Null,
            json!({ "clientName": 42 }),
        ] {
            let err = LookupRequest::from_event(event).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Internal);
        }
    }

    #[test]
    fn client_name_is_checked_before_other_fields() {
        for event in [
            json!({ "prefix": ["x"] }),
            json!({ "clientName": "", "bucketName": 5 }),
            json!({ "clientName": null, "prefix": {} }),
            Value::String(r#"{"bucketName":false}"#.into()),
        ] {
            let err = LookupRequest::from_event(event).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn malformed_fields_fail_once_client_name_is_present() {
        let err = LookupRequest::from_event(json!({ "clientName": "Acme", "prefix": 7 }))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn missing_or_empty_client_name_is_rejected() {
        let defaults = LookupDefaults::default();
        for request in [LookupRequest::default(), LookupRequest::new("")] {
            let err = request.resolve(&defaults).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert_eq!(err.to_string(), "Client name is required");
        }
    }

    #[test]
    fn empty_bucket_and_prefix_are_kept() {
        let resolved = LookupRequest::new("Acme")
            .with_bucket("")
            .with_prefix("")
            .resolve(&LookupDefaults::default())
            .unwrap();
        assert_eq!(resolved.bucket_name, "");
        assert_eq!(resolved.prefix, "");
    }

    #[test]
    fn custom_defaults_apply() {
        let defaults = LookupDefaults {
            bucket_name: "staging-docs".into(),
            prefix: "pdf/".into(),
        };
        let resolved = LookupRequest::new("Acme").resolve(&defaults).unwrap();
        assert_eq!(resolved.bucket_name, "staging-docs");
        assert_eq!(resolved.prefix, "pdf/");
    }
}
