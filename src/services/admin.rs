//! Admin decisions on members and conversion requests
//!
//! The admin panel itself lives elsewhere; this service applies the state
//! changes behind its buttons and tells the affected member about them.

use std::sync::Arc;
use tracing::{info, warn};
use crate::database::Registry;
use crate::handlers::{keyboards, texts};
use crate::models::{ConversionRequest, DocumentType, Member, MemberDocument, RequestStatus, UpdateMemberRequest};
use crate::utils::errors::{LiraError, Result};
use crate::utils::logging::log_admin_action;
use super::notification::NotificationService;
use super::storage::FileStorage;

/// Longest rejection reason accepted from the panel
pub const MAX_REJECTION_REASON_CHARS: usize = 2000;

#[derive(Clone)]
pub struct AdminService {
    registry: Arc<dyn Registry>,
    notifier: NotificationService,
    storage: Arc<dyn FileStorage>,
}

impl AdminService {
    pub fn new(registry: Arc<dyn Registry>, notifier: NotificationService, storage: Arc<dyn FileStorage>) -> Self {
        Self {
            registry,
            notifier,
            storage,
        }
    }

    /// Mark a pending request as done and tell the member
    pub async fn approve_request(&self, request_id: i64) -> Result<ConversionRequest> {
        let request = self.decide(request_id, RequestStatus::Done, None).await?;

        log_admin_action("approve_request", request_id, None);
        self.notify_owner(&request, &texts::request_approved(&request)).await;
        Ok(request)
    }

    /// Move a pending request to `status`; decided requests stay as they are
    async fn decide(
        &self,
        request_id: i64,
        status: RequestStatus,
        reason: Option<&str>,
    ) -> Result<ConversionRequest> {
        if let Some(request) = self.registry.transition_request(request_id, status, reason).await? {
            return Ok(request);
        }

        match self.registry.find_request(request_id).await? {
            Some(current) => Err(LiraError::InvalidStateTransition {
                from: current.status,
                to: status.as_str().to_string(),
            }),
            None => Err(LiraError::RequestNotFound { request_id }),
        }
    }

    /// Reject a pending request, storing the reason and quoting it to the member
    pub async fn reject_request(&self, request_id: i64, reason: &str) -> Result<ConversionRequest> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LiraError::InvalidInput("Rejection reason is required".to_string()));
        }
        if reason.chars().count() > MAX_REJECTION_REASON_CHARS {
            return Err(LiraError::InvalidInput(format!(
                "Rejection reason must be at most {} characters",
                MAX_REJECTION_REASON_CHARS
            )));
        }

        let request = self.decide(request_id, RequestStatus::Rejected, Some(reason)).await?;

        log_admin_action("reject_request", request_id, Some(reason));
        self.notify_owner(&request, &texts::request_rejected(reason)).await;
        Ok(request)
    }

    pub async fn approve_member(&self, member_id: i64) -> Result<Member> {
        let member = self
            .registry
            .update_member(
                member_id,
                UpdateMemberRequest {
                    is_verified: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        log_admin_action("approve_member", member_id, None);
        self.notifier
            .notify_member(&member, texts::MEMBER_APPROVED, Some(keyboards::main_menu()))
            .await;
        Ok(member)
    }

    /// Purge the member's verification documents and ask for a new attempt
    pub async fn reject_member(&self, member_id: i64, reason: Option<&str>) -> Result<Member> {
        let member = self
            .registry
            .find_member(member_id)
            .await?
            .ok_or(LiraError::MemberNotFound { member_id })?;

        let removed = self.registry.delete_documents(member_id, DocumentType::Verification).await?;
        for document in &removed {
            if let Err(e) = self.storage.delete(&document.file_path).await {
                warn!(member_id = member_id, path = %document.file_path, error = %e, "Failed to delete verification file");
            }
        }
        info!(member_id = member_id, documents = removed.len(), "Verification documents purged");

        log_admin_action("reject_member", member_id, reason);
        self.notifier
            .notify_member(&member, &texts::member_rejected(reason), None)
            .await;
        self.notifier
            .notify_member(&member, texts::VERIFICATION_PROMPT, Some(keyboards::verification()))
            .await;
        Ok(member)
    }

    pub async fn set_member_blocked(&self, member_id: i64, blocked: bool) -> Result<Member> {
        let member = self
            .registry
            .update_member(
                member_id,
                UpdateMemberRequest {
                    is_blocked: Some(blocked),
                    ..Default::default()
                },
            )
            .await?;

        let action = if blocked { "block_member" } else { "unblock_member" };
        log_admin_action(action, member_id, None);
        Ok(member)
    }

    pub async fn verification_documents(&self, member_id: i64) -> Result<Vec<MemberDocument>> {
        self.registry.list_documents(member_id, DocumentType::Verification).await
    }

    async fn notify_owner(&self, request: &ConversionRequest, text: &str) {
        match self.registry.find_member(request.member_id).await {
            Ok(Some(member)) => {
                self.notifier.notify_member(&member, text, None).await;
            }
            Ok(None) => warn!(request_id = request.id, "Request owner no longer exists"),
            Err(e) => warn!(request_id = request.id, error = %e, "Failed to load request owner"),
        }
    }
}
