mod activation;
mod storage;
mod types;

pub use activation::{Popularity, PopularityInput};
pub(crate) use storage::bump_pizza_popularity;
pub use storage::PopularityStorage;
pub use types::{PopularPizza, PopularTopping, PopularToppings};
