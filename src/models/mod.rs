//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod member;
pub mod document;
pub mod request;
pub mod setting;

// Re-export commonly used models
pub use member::{Member, CreateMemberRequest, UpdateMemberRequest};
pub use document::{MemberDocument, CreateDocumentRequest, DocumentType};
pub use request::{ConversionRequest, CreateConversionRequest, RequestStatus, Currency, FlowDirection};
pub use setting::{SystemSetting, VerificationMethod, VERIFICATION_METHOD_SETTING};
