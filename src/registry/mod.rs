mod activation;
#[allow(clippy::module_inception)]
mod registry;

pub use activation::{
    parse_params, Activation, ActivationInfo, MethodSchemaInfo, NoParams, ToolReply,
};
pub use registry::{RegistryError, ToolRegistry};
