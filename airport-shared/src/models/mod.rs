pub mod booking;
pub mod fleet;
pub mod flight;
pub mod network;
