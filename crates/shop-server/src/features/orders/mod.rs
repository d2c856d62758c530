//! Orders feature

pub mod queries;
pub mod routes;

pub use routes::orders_routes;
