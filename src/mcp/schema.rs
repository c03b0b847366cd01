//! Registry tool schemas as MCP tool descriptors

use serde_json::{json, Map, Value};

use super::types::McpTool;
use crate::registry::MethodSchemaInfo;

pub fn methods_to_mcp_tools<'a, I>(methods: I) -> Vec<McpTool>
where
    I: IntoIterator<Item = &'a MethodSchemaInfo>,
{
    methods.into_iter().map(to_mcp_tool).collect()
}

fn to_mcp_tool(method: &MethodSchemaInfo) -> McpTool {
    McpTool {
        name: method.name.clone(),
        description: Some(method.description.clone()).filter(|d| !d.is_empty()),
        input_schema: input_schema(method),
    }
}

/// The argument schema as MCP clients expect it: always an object schema
/// with a `properties` member, without the `$schema` meta key
fn input_schema(method: &MethodSchemaInfo) -> Value {
    let mut schema = match &method.params {
        Some(params) => params.as_value().clone(),
        None => json!({ "type": "object" }),
    };

    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object
            .entry("properties")
            .or_insert_with(|| Value::Object(Map::new()));
    }
    schema
}
