use std::sync::Arc;

use tracing::info;

use crate::domain::repository::Storage;
use crate::domain::types::{NewSupportTicket, SupportTicket};
use crate::error::ChatServiceError;

pub struct OpenTicketUseCase<S: Storage> {
    pub store: Arc<S>,
}

impl<S: Storage> OpenTicketUseCase<S> {
    /// Log a general-purpose ticket for a registered user.
    pub async fn execute(
        &self,
        user_phone: &str,
        user_type: &str,
        user_id: &str,
        description: &str,
    ) -> Result<SupportTicket, ChatServiceError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ChatServiceError::Validation(
                "Please describe your issue.".to_owned(),
            ));
        }
        let ticket = self
            .store
            .create_support_ticket(NewSupportTicket {
                user_phone: user_phone.to_owned(),
                user_type: user_type.to_owned(),
                user_id: user_id.to_owned(),
                issue_type: "general".to_owned(),
                description: description.to_owned(),
                status: "open".to_owned(),
                priority: "medium".to_owned(),
            })
            .await?;
        info!(ticket_id = %ticket.id, user_phone, user_id, "support ticket opened");
        Ok(ticket)
    }
}
