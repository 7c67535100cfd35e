//! Logical operations against the IAM API.
//!
//! An `Operation` is built once by the caller and never mutated by the
//! executor. Attempts are derived from it, not stored on it.

use std::fmt;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ClientError;

/// Operation category. Keys the timeout table and labels metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Create => "create",
            Category::Read => "read",
            Category::Update => "update",
            Category::Delete => "delete",
            Category::List => "list",
        }
    }

    /// Whether this category addresses a resource that should already exist.
    pub fn expects_existing(&self) -> bool {
        matches!(self, Category::Read | Category::Update | Category::Delete)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The specific remote resource an operation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub resource_type: String,
    pub id: String,
}

/// One logical request: category, method, path and optional JSON body.
#[derive(Debug, Clone)]
pub struct Operation {
    category: Category,
    method: Method,
    path: String,
    path_segments: Vec<String>,
    body: Option<serde_json::Value>,
    resource: Option<ResourceRef>,
    request_id: Uuid,
}

impl Operation {
    /// Create an operation with no body. `path` is relative to the base URL
    /// and must start with `/`.
    pub fn new(category: Category, method: Method, path: impl Into<String>) -> Self {
        Self {
            category,
            method,
            path: path.into(),
            path_segments: Vec::new(),
            body: None,
            resource: None,
            request_id: Uuid::new_v4(),
        }
    }

    /// Append one path segment after `path`. The segment is sent
    /// percent-encoded, so `/`, `?` and `#` in ids stay part of the id.
    pub fn with_path_segment(mut self, segment: impl Into<String>) -> Self {
        self.path_segments.push(segment.into());
        self
    }

    /// Attach a JSON body.
    pub fn with_json_body<B: Serialize>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body).map_err(ClientError::Encoding)?);
        Ok(self)
    }

    /// Name the resource this operation targets. A 404 on a read, update or
    /// delete of a named resource becomes `NotFound`.
    pub fn targeting(mut self, resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        self.resource = Some(ResourceRef {
            resource_type: resource_type.into(),
            id: id.into(),
        });
        self
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw, unencoded segments appended after `path`.
    pub fn path_segments(&self) -> &[String] {
        &self.path_segments
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn resource(&self) -> Option<&ResourceRef> {
        self.resource.as_ref()
    }

    /// Correlation id sent as `X-Request-Id` on every attempt.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}
