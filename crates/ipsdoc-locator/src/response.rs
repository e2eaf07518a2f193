//! Response envelope and document payload.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

/// A fetched document, ready to be placed in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPayload {
    key: String,
    bytes: Bytes,
    encoded_content: String,
}

impl DocumentPayload {
    /// Wraps fetched bytes and base64-encodes them.
    pub fn new(key: impl Into<String>, bytes: Bytes) -> Self {
        let encoded_content = STANDARD.encode(&bytes);
        Self {
            key: key.into(),
            bytes,
            encoded_content,
        }
    }

    /// Full object key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw object content.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Base64 (standard alphabet, padded) rendering of the content.
    pub fn encoded_content(&self) -> &str {
        &self.encoded_content
    }

    /// Portion of the key after the last `/`.
    pub fn file_name(&self) -> &str {
        self.key
            .rsplit_once('/')
            .map_or(self.key.as_str(), |(_, name)| name)
    }

    /// Decodes content previously produced by [`encoded_content`](Self::encoded_content).
    pub fn decode(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(encoded)
    }
}

/// Body of a [`LookupResponse`].
///
/// Successful responses carry the payload fields; failed ones carry `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    /// Whether a document was returned.
    pub success: bool,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Base64-encoded PDF content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_content: Option<String>,
    /// Name of the file, without its key prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Full object key.
    #[serde(default, rename = "s3Key", skip_serializing_if = "Option::is_none")]
    pub s3_key: Option<String>,
    /// Client name echoed from the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
}

/// Envelope returned for every lookup, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    /// 200, 400, 404, or 500.
    pub status_code: u16,
    /// Response body.
    pub body: ResponseBody,
}

impl LookupResponse {
    /// Builds the 200 response for a fetched document.
    pub fn success(payload: DocumentPayload, client_name: impl Into<String>) -> Self {
        let file_name = payload.file_name().to_owned();
        let DocumentPayload {
            key,
            encoded_content,
            ..
        } = payload;

        Self {
            status_code: 200,
            body: ResponseBody {
                success: true,
                error: None,
                pdf_content: Some(encoded_content),
                file_name: Some(file_name),
                s3_key: Some(key),
                client_name: Some(client_name.into()),
            },
        }
    }

    /// Builds the failure response for an error.
    pub fn from_error(error: &Error) -> Self {
        Self {
            status_code: error.status_code(),
            body: ResponseBody {
                success: false,
                error: Some(error.message.clone()),
                ..ResponseBody::default()
            },
        }
    }

    /// Returns whether the response carries a document.
    pub fn is_success(&self) -> bool {
        self.body.success
    }

    /// Renders the envelope for the invoker.
    ///
    /// With `stringify_body`, the body is embedded as a JSON string, the shape
    /// API Gateway proxy integrations expect.
    pub fn into_value(self, stringify_body: bool) -> serde_json::Result<Value> {
        let body = if stringify_body {
            Value::String(serde_json::to_string(&self.body)?)
        } else {
            serde_json::to_value(&self.body)?
        };

        let mut envelope = serde_json::Map::with_capacity(2);
        envelope.insert("statusCode".into(), Value::from(self.status_code));
        envelope.insert("body".into(), body);
        Ok(Value::Object(envelope))
    }
}

impl From<Error> for LookupResponse {
    fn from(error: Error) -> Self {
        Self::from_error(&error)
    }
}
