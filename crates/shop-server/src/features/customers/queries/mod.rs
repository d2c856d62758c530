pub mod get;
pub mod list;
pub mod list_orders;

pub use get::{GetCustomerError, GetCustomerQuery, GetCustomerResponse};
pub use list::{CustomerSummary, ListCustomersError, ListCustomersQuery, ListCustomersResponse};
pub use list_orders::{ListCustomerOrdersError, ListCustomerOrdersQuery};
