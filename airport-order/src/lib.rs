pub mod manager;
pub mod models;

pub use manager::{OrderError, OrderManager};
pub use models::{CreateOrderRequest, CreateTicketRequest};
