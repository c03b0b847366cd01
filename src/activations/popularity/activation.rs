use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::storage::PopularityStorage;
use super::types::PopularToppings;
use crate::activations::catalog::CatalogStorage;
use crate::error::ServiceError;
use crate::registry::{parse_params, Activation, MethodSchemaInfo, RegistryError, ToolReply};

fn default_limit() -> u32 {
    10
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PopularityInput {
    /// Maximum number of entries to return
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Rankings built from order history
#[derive(Clone)]
pub struct Popularity {
    storage: PopularityStorage,
    catalog: CatalogStorage,
}

impl Popularity {
    pub fn new(storage: PopularityStorage, catalog: CatalogStorage) -> Self {
        Self { storage, catalog }
    }

    /// Ranked toppings, or the first `limit` available toppings when no
    /// ranking can be produced
    pub async fn popular_toppings(&self, limit: u32) -> Result<PopularToppings, ServiceError> {
        match self.storage.popular_toppings(limit).await {
            Ok(ranked) if !ranked.is_empty() => return Ok(PopularToppings::Ranked(ranked)),
            Ok(_) => tracing::debug!("No topping order history, serving unranked toppings"),
            Err(e) => tracing::warn!(error = %e, "Topping ranking failed, serving unranked toppings"),
        }

        let mut toppings = self.catalog.toppings(None).await?;
        toppings.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(PopularToppings::Unranked(toppings))
    }
}

#[async_trait]
impl Activation for Popularity {
    fn namespace(&self) -> &str {
        "popularity"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &str {
        "Most ordered toppings and pizzas"
    }

    fn methods(&self) -> Vec<MethodSchemaInfo> {
        vec![
            MethodSchemaInfo::new::<PopularityInput>(
                "get_popular_toppings",
                "List the most frequently ordered toppings (default limit 10)",
            ),
            MethodSchemaInfo::new::<PopularityInput>(
                "get_popular_pizzas",
                "List pizzas ranked by how many have been ordered (default limit 10)",
            ),
        ]
    }

    async fn call(&self, method: &str, params: Value) -> Result<ToolReply, RegistryError> {
        match method {
            "get_popular_toppings" => {
                let input: PopularityInput = parse_params(params)?;
                ToolReply::from_result(self.popular_toppings(input.limit).await)
            }
            "get_popular_pizzas" => {
                let input: PopularityInput = parse_params(params)?;
                let result = self.storage.popular_pizzas(input.limit).await;
                ToolReply::from_result(result.map_err(ServiceError::from))
            }
            other => Err(RegistryError::ToolNotFound(other.to_string())),
        }
    }
}
