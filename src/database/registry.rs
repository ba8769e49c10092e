//! Persistent store abstraction
//!
//! The conversation handlers and admin services only see this trait, so the
//! same flows run against Postgres in production and memory in tests.

use crate::models::{
    ConversionRequest, CreateConversionRequest, CreateDocumentRequest, CreateMemberRequest,
    DocumentType, Member, MemberDocument, RequestStatus, UpdateMemberRequest, VerificationMethod,
    VERIFICATION_METHOD_SETTING,
};
use crate::utils::errors::LiraError;

#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    async fn find_member(&self, id: i64) -> Result<Option<Member>, LiraError>;
    async fn find_member_by_telegram_id(&self, telegram_id: &str) -> Result<Option<Member>, LiraError>;
    async fn find_member_by_phone(&self, phone: &str) -> Result<Option<Member>, LiraError>;
    async fn find_member_by_phone_and_code(&self, phone: &str, code: &str) -> Result<Option<Member>, LiraError>;
    async fn create_member(&self, request: CreateMemberRequest) -> Result<Member, LiraError>;
    async fn update_member(&self, id: i64, request: UpdateMemberRequest) -> Result<Member, LiraError>;
    async fn delete_member(&self, id: i64) -> Result<(), LiraError>;

    async fn create_document(&self, request: CreateDocumentRequest) -> Result<MemberDocument, LiraError>;
    async fn list_documents(&self, member_id: i64, file_type: DocumentType) -> Result<Vec<MemberDocument>, LiraError>;
    async fn delete_documents(&self, member_id: i64, file_type: DocumentType) -> Result<Vec<MemberDocument>, LiraError>;

    async fn create_request(&self, request: CreateConversionRequest) -> Result<ConversionRequest, LiraError>;
    async fn find_request(&self, id: i64) -> Result<Option<ConversionRequest>, LiraError>;
    async fn find_request_by_member_and_status(
        &self,
        member_id: i64,
        status: RequestStatus,
    ) -> Result<Option<ConversionRequest>, LiraError>;
    /// Attach a proof URL to the member's pending request that has none yet
    async fn attach_proof(&self, member_id: i64, file_url: &str) -> Result<Option<ConversionRequest>, LiraError>;
    /// Move a pending request to `status`; `None` if it is missing or not pending
    async fn transition_request(
        &self,
        id: i64,
        status: RequestStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<ConversionRequest>, LiraError>;

    async fn get_setting(&self, name: &str) -> Result<Option<String>, LiraError>;

    /// Configured verification method, image unless set to `code`
    async fn verification_method(&self) -> Result<VerificationMethod, LiraError> {
        let value = self.get_setting(VERIFICATION_METHOD_SETTING).await?;
        Ok(VerificationMethod::from_setting(value.as_deref()))
    }
}
