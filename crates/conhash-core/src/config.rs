use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub http_addr: String,
    pub ring: RingConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingConfig {
    /// Virtual positions placed on the ring for every physical node.
    pub virtual_nodes_per_node: usize,
    /// Size of the synthetic key set sampled by ring introspection.
    pub sample_key_count: usize,
    pub sample_key_prefix: String,
}

/// Input bounds enforced by the HTTP layer before anything reaches the ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub max_node_id_len: usize,
    pub max_host_len: usize,
    pub min_distribution_keys: usize,
    pub max_distribution_keys: usize,
    pub max_key_prefix_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:8080".to_string(),
            ring: RingConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            virtual_nodes_per_node: 150,
            sample_key_count: 1000,
            sample_key_prefix: "key".to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_node_id_len: 50,
            max_host_len: 100,
            min_distribution_keys: 1,
            max_distribution_keys: 1_000_000,
            max_key_prefix_len: 20,
        }
    }
}

impl RingConfig {
    pub fn with_virtual_nodes(virtual_nodes_per_node: usize) -> Self {
        Self {
            virtual_nodes_per_node,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.virtual_nodes_per_node == 0 {
            return Err("virtual_nodes_per_node must be positive".to_string());
        }
        Ok(())
    }
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(ServerConfig::default()));

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("CONHASH_").split("__"));

        figment.extract()
    }
}
