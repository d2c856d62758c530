//! Customers feature: read-only views over `users` and their orders

pub mod queries;
pub mod routes;

pub use routes::customers_routes;
