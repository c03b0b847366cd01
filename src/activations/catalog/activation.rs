use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::storage::CatalogStorage;
use crate::error::ServiceError;
use crate::registry::{
    parse_params, Activation, MethodSchemaInfo, NoParams, RegistryError, ToolReply,
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ByIdInput {
    /// The unique identifier of the item to retrieve
    pub id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetToppingsInput {
    /// Category name to filter by, e.g. "meats" or "vegetables"
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetStoreLocationsInput {
    /// City name (or part of one) to filter by
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetActiveOffersInput {
    /// Store location id; global offers are always included
    #[serde(default)]
    pub location_id: Option<String>,
}

/// Menu, topping, store and offer lookups
#[derive(Clone)]
pub struct Catalog {
    storage: CatalogStorage,
}

impl Catalog {
    pub fn new(storage: CatalogStorage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Activation for Catalog {
    fn namespace(&self) -> &str {
        "catalog"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &str {
        "Pizza menu, toppings, store locations and offers"
    }

    fn methods(&self) -> Vec<MethodSchemaInfo> {
        vec![
            MethodSchemaInfo::new::<NoParams>(
                "get_pizzas",
                "List the available pizzas with their sizes and prices, most popular first",
            ),
            MethodSchemaInfo::new::<ByIdInput>(
                "get_pizza_by_id",
                "Get one pizza by id, including its sizes with prices and availability",
            ),
            MethodSchemaInfo::new::<GetToppingsInput>(
                "get_toppings",
                "List the available toppings, optionally for a single category",
            ),
            MethodSchemaInfo::new::<ByIdInput>(
                "get_topping_by_id",
                "Get one topping by id, including its category and price",
            ),
            MethodSchemaInfo::new::<NoParams>(
                "get_topping_categories",
                "List all topping categories",
            ),
            MethodSchemaInfo::new::<GetStoreLocationsInput>(
                "get_store_locations",
                "List active store locations with addresses, phone numbers and opening hours",
            ),
            MethodSchemaInfo::new::<GetActiveOffersInput>(
                "get_active_offers",
                "List offers valid right now, best discount first",
            ),
            MethodSchemaInfo::new::<NoParams>(
                "get_menu_summary",
                "Count available pizzas, toppings, categories, offers and locations",
            ),
        ]
    }

    async fn call(&self, method: &str, params: Value) -> Result<ToolReply, RegistryError> {
        match method {
            "get_pizzas" => {
                let result = self.storage.pizzas().await;
                ToolReply::from_result(result.map_err(ServiceError::from))
            }
            "get_pizza_by_id" => {
                let input: ByIdInput = parse_params(params)?;
                let result = match self.storage.pizza_by_id(&input.id).await {
                    Ok(Some(pizza)) => Ok(pizza),
                    Ok(None) => Err(ServiceError::PizzaNotFound(input.id)),
                    Err(e) => Err(e.into()),
                };
                ToolReply::from_result(result)
            }
            "get_toppings" => {
                let input: GetToppingsInput = parse_params(params)?;
                let result = self.storage.toppings(input.category.as_deref()).await;
                ToolReply::from_result(result.map_err(ServiceError::from))
            }
            "get_topping_by_id" => {
                let input: ByIdInput = parse_params(params)?;
                let result = match self.storage.topping_by_id(&input.id).await {
                    Ok(Some(topping)) => Ok(topping),
                    Ok(None) => Err(ServiceError::ToppingNotFound(input.id)),
                    Err(e) => Err(e.into()),
                };
                ToolReply::from_result(result)
            }
            "get_topping_categories" => {
                let result = self.storage.topping_categories().await;
                ToolReply::from_result(result.map_err(ServiceError::from))
            }
            "get_store_locations" => {
                let input: GetStoreLocationsInput = parse_params(params)?;
                let result = self.storage.store_locations(input.city.as_deref()).await;
                ToolReply::from_result(result.map_err(ServiceError::from))
            }
            "get_active_offers" => {
                let input: GetActiveOffersInput = parse_params(params)?;
                let result = self.storage.active_offers(input.location_id.as_deref()).await;
                ToolReply::from_result(result.map_err(ServiceError::from))
            }
            "get_menu_summary" => {
                let result = self.storage.menu_summary().await;
                ToolReply::from_result(result.map_err(ServiceError::from))
            }
            other => Err(RegistryError::ToolNotFound(other.to_string())),
        }
    }
}
