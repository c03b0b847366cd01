pub mod activations;
pub mod builder;
pub mod config;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod registry;
pub mod storage;
pub mod types;

// Re-export commonly used items
pub use builder::build_registry;
pub use config::AppConfig;
pub use error::{ErrorKind, ErrorPayload, ServiceError};
pub use registry::ToolRegistry;
pub use storage::Database;
