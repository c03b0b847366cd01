//! ToolRegistry - the routing layer between the protocol and activations
//!
//! Activations are registered once at startup. Each of their methods is
//! exposed under its own flat tool name.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::activation::{Activation, ActivationInfo, MethodSchemaInfo, ToolReply};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    ToolNotFound(String),
    InvalidParams(String),
    Serialization(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::ToolNotFound(name) => write!(f, "Tool not found: {}", name),
            RegistryError::InvalidParams(msg) => write!(f, "Invalid params: {}", msg),
            RegistryError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for RegistryError {}

// ============================================================================
// Registry
// ============================================================================

struct RegisteredTool {
    schema: MethodSchemaInfo,
    activation: Arc<dyn Activation>,
}

#[derive(Default)]
pub struct ToolRegistry {
    activations: Vec<Arc<dyn Activation>>,
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an activation and all of its tools
    ///
    /// A tool whose name is already taken is skipped with a warning.
    pub fn register<A: Activation>(mut self, activation: A) -> Self {
        let activation: Arc<dyn Activation> = Arc::new(activation);

        for schema in activation.methods() {
            if self.index.contains_key(&schema.name) {
                tracing::warn!(
                    tool = %schema.name,
                    namespace = %activation.namespace(),
                    "Duplicate tool name, skipping"
                );
                continue;
            }
            self.index.insert(schema.name.clone(), self.tools.len());
            self.tools.push(RegisteredTool {
                schema,
                activation: Arc::clone(&activation),
            });
        }

        tracing::debug!(namespace = %activation.namespace(), "Registered activation");
        self.activations.push(activation);
        self
    }

    /// Tool schemas in registration order
    pub fn list_tools(&self) -> Vec<&MethodSchemaInfo> {
        self.tools.iter().map(|tool| &tool.schema).collect()
    }

    pub fn list_activations(&self) -> Vec<ActivationInfo> {
        self.activations.iter().map(|a| a.info()).collect()
    }

    pub fn get_tool(&self, name: &str) -> Option<&MethodSchemaInfo> {
        self.index.get(name).map(|&i| &self.tools[i].schema)
    }

    /// Validate arguments for `name` and dispatch to its activation
    pub async fn route(&self, name: &str, params: Value) -> Result<ToolReply, RegistryError> {
        let tool = self
            .index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| RegistryError::ToolNotFound(name.to_string()))?;

        let params = validate_params(&tool.schema, params)?;
        tracing::debug!(tool = %name, "Dispatching tool call");
        tool.activation.call(name, params).await
    }
}

/// Check that `params` is an object carrying every required argument
///
/// A missing (null) argument list counts as an empty object.
fn validate_params(schema: &MethodSchemaInfo, params: Value) -> Result<Value, RegistryError> {
    let params = match params {
        Value::Null => Value::Object(Map::new()),
        Value::Object(_) => params,
        other => {
            return Err(RegistryError::InvalidParams(format!(
                "arguments must be an object, got {}",
                json_type_name(&other)
            )))
        }
    };

    for key in schema.required_params() {
        if params.get(key).is_none() {
            return Err(RegistryError::InvalidParams(format!(
                "missing required argument '{}'",
                key
            )));
        }
    }

    Ok(params)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
