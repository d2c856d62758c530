pub mod get;

pub use get::{GetOrderError, GetOrderQuery, GetOrderResponse};
