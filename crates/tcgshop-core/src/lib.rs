pub mod app_config;
pub mod categories;
pub mod config;
pub mod filters;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use categories::{load_category_groups, CategoryGroups};
pub use config::{load_app_config, load_app_config_from_env};
pub use filters::{SortOrder, StockFilter, StockState};
pub use products::{
    CatalogPage, LocationInventory, NormalizedCatalogItem, NormalizedProductResponse,
    NormalizedVariation, TaxInfo,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read category groups file {path}: {source}")]
    CategoryFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse category groups file: {0}")]
    CategoryFileParse(#[from] serde_yaml::Error),

    #[error("category groups validation failed: {0}")]
    Validation(String),
}
