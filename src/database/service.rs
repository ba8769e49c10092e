//! Database service layer
//!
//! This module provides a high-level interface to database operations and
//! the Postgres-backed `Registry`.

use crate::database::{DatabasePool, MemberRepository, DocumentRepository, RequestRepository, SettingRepository};
use crate::database::registry::Registry;
use crate::models::*;
use crate::utils::errors::LiraError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub members: MemberRepository,
    pub documents: DocumentRepository,
    pub requests: RequestRepository,
    pub settings: SettingRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            members: MemberRepository::new(pool.clone()),
            documents: DocumentRepository::new(pool.clone()),
            requests: RequestRepository::new(pool.clone()),
            settings: SettingRepository::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Registry for DatabaseService {
    async fn find_member(&self, id: i64) -> Result<Option<Member>, LiraError> {
        self.members.find_by_id(id).await
    }

    async fn find_member_by_telegram_id(&self, telegram_id: &str) -> Result<Option<Member>, LiraError> {
        self.members.find_by_telegram_id(telegram_id).await
    }

    async fn find_member_by_phone(&self, phone: &str) -> Result<Option<Member>, LiraError> {
        self.members.find_by_phone(phone).await
    }

    async fn find_member_by_phone_and_code(&self, phone: &str, code: &str) -> Result<Option<Member>, LiraError> {
        self.members.find_by_phone_and_code(phone, code).await
    }

    async fn create_member(&self, request: CreateMemberRequest) -> Result<Member, LiraError> {
        self.members.create(request).await
    }

    async fn update_member(&self, id: i64, request: UpdateMemberRequest) -> Result<Member, LiraError> {
        self.members.update(id, request).await
    }

    async fn delete_member(&self, id: i64) -> Result<(), LiraError> {
        self.members.delete(id).await
    }

    async fn create_document(&self, request: CreateDocumentRequest) -> Result<MemberDocument, LiraError> {
        self.documents.create(request).await
    }

    async fn list_documents(&self, member_id: i64, file_type: DocumentType) -> Result<Vec<MemberDocument>, LiraError> {
        self.documents.list_by_member(member_id, file_type).await
    }

    async fn delete_documents(&self, member_id: i64, file_type: DocumentType) -> Result<Vec<MemberDocument>, LiraError> {
        self.documents.delete_by_member(member_id, file_type).await
    }

    async fn create_request(&self, request: CreateConversionRequest) -> Result<ConversionRequest, LiraError> {
        self.requests.create(request).await
    }

    async fn find_request(&self, id: i64) -> Result<Option<ConversionRequest>, LiraError> {
        self.requests.find_by_id(id).await
    }

    async fn find_request_by_member_and_status(
        &self,
        member_id: i64,
        status: RequestStatus,
    ) -> Result<Option<ConversionRequest>, LiraError> {
        self.requests.find_by_member_and_status(member_id, status).await
    }

    async fn attach_proof(&self, member_id: i64, file_url: &str) -> Result<Option<ConversionRequest>, LiraError> {
        self.requests.attach_proof(member_id, file_url).await
    }

    async fn transition_request(
        &self,
        id: i64,
        status: RequestStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<ConversionRequest>, LiraError> {
        self.requests.transition_from_pending(id, status, rejection_reason).await
    }

    async fn get_setting(&self, name: &str) -> Result<Option<String>, LiraError> {
        self.settings.get(name).await
    }
}
