//! Registry builder - constructs a fully configured ToolRegistry
//!
//! Used by the binary and by the integration tests.

use crate::activations::{
    catalog::{Catalog, CatalogStorage},
    orders::{OrderLedger, Orders},
    popularity::{Popularity, PopularityStorage},
};
use crate::registry::ToolRegistry;
use crate::storage::Database;

/// Build the registry with all activations sharing `db`'s pool
pub fn build_registry(db: &Database) -> ToolRegistry {
    let pool = db.pool().clone();
    let catalog = CatalogStorage::new(pool.clone());

    ToolRegistry::new()
        .register(Catalog::new(catalog.clone()))
        .register(Orders::new(OrderLedger::new(pool.clone())))
        .register(Popularity::new(PopularityStorage::new(pool), catalog))
}
