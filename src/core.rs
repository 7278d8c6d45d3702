pub mod catalog;
pub mod offline;
pub mod store;
pub mod backends;
pub mod detection;
pub mod coordinator;
pub mod orchestrator;
pub mod session;
pub mod speech;
