//! Database module
//!
//! This module handles database connections and the persistent store

pub mod connection;
pub mod repositories;
pub mod service;
pub mod registry;
pub mod memory;

// Re-export commonly used database components
pub use connection::{DatabasePool, PoolConfig, create_pool, run_migrations, health_check};
pub use repositories::{MemberRepository, DocumentRepository, RequestRepository, SettingRepository};
pub use service::DatabaseService;
pub use registry::Registry;
pub use memory::InMemoryRegistry;
