//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod member;
pub mod document;
pub mod request;
pub mod setting;

// Re-export repositories
pub use member::MemberRepository;
pub use document::DocumentRepository;
pub use request::RequestRepository;
pub use setting::SettingRepository;
