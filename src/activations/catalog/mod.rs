mod activation;
mod storage;
mod types;

pub use activation::{
    ByIdInput, Catalog, GetActiveOffersInput, GetStoreLocationsInput, GetToppingsInput,
};
pub use storage::CatalogStorage;
pub use types::{
    DiscountType, MenuSummary, Offer, Pizza, PizzaSize, SizePrices, StoreHours, StoreLocation,
    Topping, ToppingCategory,
};
