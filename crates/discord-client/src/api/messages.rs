use reqwest::Method;

use super::models::BulkDeleteRequest;
use super::*;

/// Discord accepts 2..=100 ids per bulk delete.
pub const BULK_DELETE_MAX: usize = 100;

fn message_path(channel_id: &str, message_id: &str) -> String {
    format!("/channels/{channel_id}/messages/{message_id}")
}

impl DiscordClient {
    pub async fn send_message(
        &self,
        channel_id: &str,
        message: &CreateMessage,
    ) -> Result<Message, DiscordError> {
        let path = format!("/channels/{channel_id}/messages");
        let body = self
            .authenticated_request(Method::POST, &path, Some(message))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        edit: &EditMessage,
    ) -> Result<Message, DiscordError> {
        let path = message_path(channel_id, message_id);
        let body = self
            .authenticated_request(Method::PATCH, &path, Some(edit))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<(), DiscordError> {
        let path = message_path(channel_id, message_id);
        self.authenticated_request(Method::DELETE, &path, None::<&()>)
            .await?;
        Ok(())
    }

    /// Delete 2..=100 messages of one channel in a single call. Discord
    /// rejects the whole call if any message is older than two weeks.
    pub async fn bulk_delete_messages(
        &self,
        channel_id: &str,
        message_ids: &[String],
    ) -> Result<(), DiscordError> {
        if !(2..=BULK_DELETE_MAX).contains(&message_ids.len()) {
            return Err(DiscordError::InvalidRequest(format!(
                "bulk delete takes 2..={BULK_DELETE_MAX} ids, got {}",
                message_ids.len()
            )));
        }
        let path = format!("/channels/{channel_id}/messages/bulk-delete");
        let body = BulkDeleteRequest {
            messages: message_ids,
        };
        self.authenticated_request(Method::POST, &path, Some(&body))
            .await?;
        Ok(())
    }
}
