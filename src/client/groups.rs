//! Group resource operations.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::resilience::CallContext;

use super::{Category, IamClient, Operation};

/// Resource type reported in `NotFound` errors.
pub const RESOURCE_TYPE: &str = "group";

/// A group as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
struct GroupPayload<'a> {
    name: &'a str,
    description: &'a str,
}

const GROUPS_PATH: &str = "/groups";

/// An operation on the single group `id`, sent as `/groups/{id}`.
fn group_operation(category: Category, method: Method, id: &str) -> Operation {
    Operation::new(category, method, GROUPS_PATH)
        .with_path_segment(id)
        .targeting(RESOURCE_TYPE, id)
}

impl IamClient {
    /// `POST /groups`
    pub async fn create_group(
        &self,
        ctx: &CallContext,
        name: &str,
        description: &str,
    ) -> Result<Group, ClientError> {
        let op = Operation::new(Category::Create, Method::POST, GROUPS_PATH)
            .with_json_body(&GroupPayload { name, description })?;
        tracing::debug!(name, "Creating group");
        self.executor().execute(ctx, op, self.call_options()).await
    }

    /// `GET /groups/{id}`
    pub async fn get_group(&self, ctx: &CallContext, id: &str) -> Result<Group, ClientError> {
        let op = group_operation(Category::Read, Method::GET, id);
        self.executor().execute(ctx, op, self.call_options()).await
    }

    /// `PUT /groups/{id}`
    pub async fn update_group(
        &self,
        ctx: &CallContext,
        id: &str,
        name: &str,
        description: &str,
    ) -> Result<Group, ClientError> {
        let op = group_operation(Category::Update, Method::PUT, id)
            .with_json_body(&GroupPayload { name, description })?;
        self.executor().execute(ctx, op, self.call_options()).await
    }

    /// `DELETE /groups/{id}`. Deleting an absent group yields `NotFound`.
    pub async fn delete_group(&self, ctx: &CallContext, id: &str) -> Result<(), ClientError> {
        let op = group_operation(Category::Delete, Method::DELETE, id);
        self.executor().execute_no_content(ctx, op, self.call_options()).await
    }

    /// `GET /groups`
    pub async fn list_groups(&self, ctx: &CallContext) -> Result<Vec<Group>, ClientError> {
        let op = Operation::new(Category::List, Method::GET, GROUPS_PATH);
        self.executor().execute(ctx, op, self.call_options()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let body = serde_json::to_value(GroupPayload {
            name: "team-a",
            description: "desc",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"name": "team-a", "description": "desc"}));
    }

    #[test]
    fn test_group_without_description() {
        let group: Group = serde_json::from_str(r#"{"id":"g1","name":"team-a"}"#).unwrap();
        assert_eq!(group.description, "");
    }

    #[test]
    fn test_group_operation_keeps_id_as_one_segment() {
        let op = group_operation(Category::Delete, Method::DELETE, "../admin");
        assert_eq!(op.path(), "/groups");
        assert_eq!(op.path_segments(), ["../admin".to_string()]);
        assert_eq!(op.resource().map(|r| r.id.as_str()), Some("../admin"));
    }
}
