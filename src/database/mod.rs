pub mod fact_store;
pub mod manager;
pub mod memory;
pub mod models;

pub use fact_store::{FactStore, PgFactStore};
pub use manager::{DatabaseManager, StoreError};
pub use memory::MemoryFactStore;
pub use models::{Fact, FactText};
