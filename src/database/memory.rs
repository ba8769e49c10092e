//! In-memory `Registry` used by tests and dry runs

use std::collections::{BTreeMap, HashMap};
use chrono::Utc;
use tokio::sync::Mutex;
use crate::database::registry::Registry;
use crate::models::*;
use crate::utils::errors::LiraError;

#[derive(Default)]
struct Tables {
    next_id: i64,
    members: BTreeMap<i64, Member>,
    documents: BTreeMap<i64, MemberDocument>,
    requests: BTreeMap<i64, ConversionRequest>,
    settings: HashMap<String, String>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct InMemoryRegistry {
    tables: Mutex<Tables>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_setting(&self, name: &str, value: &str) {
        let mut tables = self.tables.lock().await;
        tables.settings.insert(name.to_string(), value.to_string());
    }

    /// Set the one-time verification code of a member, as admin tooling does
    pub async fn set_verify_code(&self, member_id: i64, code: &str) -> Result<(), LiraError> {
        let mut tables = self.tables.lock().await;
        let member = tables
            .members
            .get_mut(&member_id)
            .ok_or(LiraError::MemberNotFound { member_id })?;
        member.verify_code = Some(code.to_string());
        Ok(())
    }

    pub async fn members(&self) -> Vec<Member> {
        self.tables.lock().await.members.values().cloned().collect()
    }

    pub async fn documents(&self) -> Vec<MemberDocument> {
        self.tables.lock().await.documents.values().cloned().collect()
    }

    pub async fn requests(&self) -> Vec<ConversionRequest> {
        self.tables.lock().await.requests.values().cloned().collect()
    }
}

#[async_trait::async_trait]
impl Registry for InMemoryRegistry {
    async fn find_member(&self, id: i64) -> Result<Option<Member>, LiraError> {
        Ok(self.tables.lock().await.members.get(&id).cloned())
    }

    async fn find_member_by_telegram_id(&self, telegram_id: &str) -> Result<Option<Member>, LiraError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .members
            .values()
            .find(|m| m.telegram_id.as_deref() == Some(telegram_id))
            .cloned())
    }

    async fn find_member_by_phone(&self, phone: &str) -> Result<Option<Member>, LiraError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .members
            .values()
            .find(|m| m.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn find_member_by_phone_and_code(&self, phone: &str, code: &str) -> Result<Option<Member>, LiraError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .members
            .values()
            .find(|m| m.phone.as_deref() == Some(phone) && m.verify_code.as_deref() == Some(code))
            .cloned())
    }

    async fn create_member(&self, request: CreateMemberRequest) -> Result<Member, LiraError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let member = Member {
            id: tables.allocate_id(),
            name: request.name,
            phone: request.phone,
            telegram_id: request.telegram_id,
            telegram_username: request.telegram_username,
            verify_code: request.verify_code,
            is_verified: request.is_verified,
            is_blocked: false,
            created_at: now,
            updated_at: now,
        };
        tables.members.insert(member.id, member.clone());
        Ok(member)
    }

    async fn update_member(&self, id: i64, request: UpdateMemberRequest) -> Result<Member, LiraError> {
        let mut tables = self.tables.lock().await;
        let member = tables
            .members
            .get_mut(&id)
            .ok_or(LiraError::MemberNotFound { member_id: id })?;

        if let Some(name) = request.name {
            member.name = Some(name);
        }
        if let Some(telegram_id) = request.telegram_id {
            member.telegram_id = Some(telegram_id);
        }
        if let Some(username) = request.telegram_username {
            member.telegram_username = Some(username);
        }
        if let Some(verified) = request.is_verified {
            member.is_verified = verified;
        }
        if let Some(blocked) = request.is_blocked {
            member.is_blocked = blocked;
        }
        member.updated_at = Utc::now();

        Ok(member.clone())
    }

    async fn delete_member(&self, id: i64) -> Result<(), LiraError> {
        let mut tables = self.tables.lock().await;
        tables.members.remove(&id);
        // mirrors ON DELETE CASCADE
        tables.documents.retain(|_, d| d.member_id != id);
        tables.requests.retain(|_, r| r.member_id != id);
        Ok(())
    }

    async fn create_document(&self, request: CreateDocumentRequest) -> Result<MemberDocument, LiraError> {
        let mut tables = self.tables.lock().await;
        let document = MemberDocument {
            id: tables.allocate_id(),
            member_id: request.member_id,
            name: request.name,
            file_type: request.file_type.as_str().to_string(),
            file_path: request.file_path,
            file_url: request.file_url,
            created_at: Utc::now(),
        };
        tables.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn list_documents(&self, member_id: i64, file_type: DocumentType) -> Result<Vec<MemberDocument>, LiraError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .documents
            .values()
            .filter(|d| d.member_id == member_id && d.file_type == file_type.as_str())
            .cloned()
            .collect())
    }

    async fn delete_documents(&self, member_id: i64, file_type: DocumentType) -> Result<Vec<MemberDocument>, LiraError> {
        let mut tables = self.tables.lock().await;
        let (removed, kept): (BTreeMap<_, _>, BTreeMap<_, _>) = std::mem::take(&mut tables.documents)
            .into_iter()
            .partition(|(_, d)| d.member_id == member_id && d.file_type == file_type.as_str());
        tables.documents = kept;
        Ok(removed.into_values().collect())
    }

    async fn create_request(&self, request: CreateConversionRequest) -> Result<ConversionRequest, LiraError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let created = ConversionRequest {
            id: tables.allocate_id(),
            member_id: request.member_id,
            from_currency: request.direction.source().code().to_string(),
            to_currency: request.direction.target().code().to_string(),
            amount: request.amount,
            file_url: None,
            receive_code: Some(request.receive_code),
            receive_name: Some(request.receive_name),
            code: request.code,
            status: RequestStatus::Pending.as_str().to_string(),
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        tables.requests.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_request(&self, id: i64) -> Result<Option<ConversionRequest>, LiraError> {
        Ok(self.tables.lock().await.requests.get(&id).cloned())
    }

    async fn find_request_by_member_and_status(
        &self,
        member_id: i64,
        status: RequestStatus,
    ) -> Result<Option<ConversionRequest>, LiraError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .requests
            .values()
            .rev()
            .find(|r| r.member_id == member_id && r.status() == Some(status))
            .cloned())
    }

    async fn attach_proof(&self, member_id: i64, file_url: &str) -> Result<Option<ConversionRequest>, LiraError> {
        let mut tables = self.tables.lock().await;
        let target = tables
            .requests
            .values_mut()
            .rev()
            .find(|r| r.member_id == member_id && r.is_pending() && r.file_url.is_none());

        Ok(target.map(|request| {
            request.file_url = Some(file_url.to_string());
            request.updated_at = Utc::now();
            request.clone()
        }))
    }

    async fn transition_request(
        &self,
        id: i64,
        status: RequestStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<ConversionRequest>, LiraError> {
        let mut tables = self.tables.lock().await;
        let Some(request) = tables.requests.get_mut(&id).filter(|r| r.is_pending()) else {
            return Ok(None);
        };

        request.status = status.as_str().to_string();
        if let Some(reason) = rejection_reason {
            request.rejection_reason = Some(reason.to_string());
        }
        request.updated_at = Utc::now();
        Ok(Some(request.clone()))
    }

    async fn get_setting(&self, name: &str) -> Result<Option<String>, LiraError> {
        Ok(self.tables.lock().await.settings.get(name).cloned())
    }
}
