use chrono::{DateTime, Utc};
use conhash_core::{
    ApiConfig, DEFAULT_NODE_HOST, DEFAULT_NODE_PORT, Node, NodeId, ServerError,
};
use serde::{Deserialize, Serialize};

/// JSON envelope shared by every API response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
            code: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(err: &ServerError) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(err.to_string()),
            code: Some(err.code().to_string()),
            timestamp: Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            error: None,
            code: None,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NodeRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    DEFAULT_NODE_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_NODE_PORT
}

impl NodeRequest {
    pub fn validate(&self, limits: &ApiConfig) -> Result<(), ServerError> {
        if self.id.trim().is_empty() {
            return Err(ServerError::Validation("node id is required".into()));
        }
        if self.id.chars().count() > limits.max_node_id_len {
            return Err(ServerError::Validation(format!(
                "node id must be between 1 and {} characters",
                limits.max_node_id_len
            )));
        }
        if self.host.chars().count() > limits.max_host_len {
            return Err(ServerError::Validation(format!(
                "host must not exceed {} characters",
                limits.max_host_len
            )));
        }
        if self.port == 0 {
            return Err(ServerError::Validation("port must be positive".into()));
        }
        Ok(())
    }

    pub fn into_node(self) -> Node {
        Node::new(self.id, self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLookupResponse {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_address: Option<String>,
    pub found: bool,
}

impl NodeLookupResponse {
    pub fn found(key: String, node: &Node) -> Self {
        Self {
            key,
            node_id: Some(node.id().clone()),
            node_address: Some(node.address()),
            found: true,
        }
    }

    pub fn not_found(key: String) -> Self {
        Self {
            key,
            node_id: None,
            node_address: None,
            found: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DistributionRequest {
    #[serde(default = "default_key_count")]
    pub key_count: i64,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_key_count() -> i64 {
    1000
}

fn default_key_prefix() -> String {
    "testkey".to_string()
}

impl DistributionRequest {
    /// Validated key count.
    pub fn validate(&self, limits: &ApiConfig) -> Result<usize, ServerError> {
        let min = limits.min_distribution_keys as i64;
        let max = limits.max_distribution_keys as i64;
        if self.key_count < min || self.key_count > max {
            return Err(ServerError::Validation(format!(
                "key_count must be between {min} and {max}"
            )));
        }
        if self.key_prefix.trim().is_empty() {
            return Err(ServerError::Validation("key_prefix is required".into()));
        }
        if self.key_prefix.chars().count() > limits.max_key_prefix_len {
            return Err(ServerError::Validation(format!(
                "key_prefix must be between 1 and {} characters",
                limits.max_key_prefix_len
            )));
        }
        Ok(self.key_count as usize)
    }
}
