use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::registry::RegistryError;
use crate::error::{ErrorPayload, ServiceError};

// ============================================================================
// Schema Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActivationInfo {
    pub namespace: String,
    pub version: String,
    pub description: String,
    pub methods: Vec<String>,
}

/// One callable tool: its name, help text and argument schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodSchemaInfo {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<schemars::Schema>,
}

impl MethodSchemaInfo {
    /// Describe a tool whose arguments deserialize into `P`
    pub fn new<P: JsonSchema>(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params: Some(schemars::schema_for!(P)),
        }
    }

    /// Names of the arguments the schema marks as required
    pub fn required_params(&self) -> Vec<&str> {
        self.params
            .as_ref()
            .and_then(|schema| schema.as_value().get("required"))
            .and_then(Value::as_array)
            .map(|required| required.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Argument type for tools that take no arguments
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

// ============================================================================
// Replies
// ============================================================================

/// Outcome of a tool call
///
/// Domain failures are still replies: `payload` holds an [`ErrorPayload`]
/// and `is_error` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolReply {
    pub payload: Value,
    pub is_error: bool,
}

impl ToolReply {
    pub fn ok<T: Serialize>(value: &T) -> Result<Self, RegistryError> {
        let payload =
            serde_json::to_value(value).map_err(|e| RegistryError::Serialization(e.to_string()))?;
        Ok(Self {
            payload,
            is_error: false,
        })
    }

    pub fn failure(error: ErrorPayload) -> Result<Self, RegistryError> {
        let payload = serde_json::to_value(&error)
            .map_err(|e| RegistryError::Serialization(e.to_string()))?;
        Ok(Self {
            payload,
            is_error: true,
        })
    }

    /// Reply with the value, or with the error payload for a domain failure
    pub fn from_result<T: Serialize>(result: Result<T, ServiceError>) -> Result<Self, RegistryError> {
        match result {
            Ok(value) => Self::ok(&value),
            Err(e) => Self::failure(ErrorPayload::from(&e)),
        }
    }
}

/// Deserialize validated tool arguments into a typed input
pub fn parse_params<P: DeserializeOwned>(params: Value) -> Result<P, RegistryError> {
    serde_json::from_value(params).map_err(|e| RegistryError::InvalidParams(e.to_string()))
}

// ============================================================================
// Activation Trait
// ============================================================================

/// A group of related tools served from one backing component
#[async_trait]
pub trait Activation: Send + Sync + 'static {
    fn namespace(&self) -> &str;
    fn version(&self) -> &str;
    fn description(&self) -> &str {
        "No description available"
    }

    /// Every tool this activation serves
    fn methods(&self) -> Vec<MethodSchemaInfo>;

    /// Run `method` with arguments already checked against its schema
    async fn call(&self, method: &str, params: Value) -> Result<ToolReply, RegistryError>;

    fn info(&self) -> ActivationInfo {
        ActivationInfo {
            namespace: self.namespace().to_string(),
            version: self.version().to_string(),
            description: self.description().to_string(),
            methods: self.methods().into_iter().map(|m| m.name).collect(),
        }
    }
}
