use discord_client::DiscordError;
use discord_client::api::{
    CreateMessage, DiscordClient, EditMessage, Embed, EmbedAuthor, EmbedField, EmbedFooter,
    EmbedImage,
};
use live_sync::{ChannelId, LiveBroadcastInfo, MessageId, MessagingSurface, SurfaceError};

/// Twitch purple.
const EMBED_COLOR: u32 = 0x9146FF;

/// Announcements as Discord channel messages.
pub struct DiscordSurface {
    client: DiscordClient,
}

impl DiscordSurface {
    pub fn new(client: DiscordClient) -> Self {
        Self { client }
    }
}

fn surface_error(e: DiscordError) -> SurfaceError {
    if e.is_not_found() {
        SurfaceError::NotFound
    } else {
        SurfaceError::Failed(e.to_string())
    }
}

/// Render the announcement embed for a live broadcast.
pub fn announcement_embed(info: &LiveBroadcastInfo) -> Embed {
    let login = &info.display.broadcaster_login;
    let channel_url = (!login.is_empty()).then(|| format!("https://www.twitch.tv/{login}"));
    let name = if info.display.broadcaster_name.is_empty() {
        info.broadcaster_id.as_str()
    } else {
        info.display.broadcaster_name.as_str()
    };

    let mut fields = Vec::new();
    if !info.display.category_name.is_empty() {
        fields.push(EmbedField {
            name: "Category".into(),
            value: info.display.category_name.clone(),
            inline: true,
        });
    }
    fields.push(EmbedField {
        name: "Viewers".into(),
        value: info.display.viewer_count.to_string(),
        inline: true,
    });

    Embed {
        title: Some(info.title.clone()),
        url: channel_url.clone(),
        description: None,
        color: Some(EMBED_COLOR),
        timestamp: info.started_at,
        author: Some(EmbedAuthor {
            name: format!("{name} is live"),
            url: channel_url,
        }),
        image: (!info.display.thumbnail_url.is_empty()).then(|| EmbedImage {
            url: info.display.thumbnail_url.clone(),
        }),
        footer: Some(EmbedFooter {
            text: "Twitch".into(),
        }),
        fields,
    }
}

impl MessagingSurface for DiscordSurface {
    async fn send(
        &self,
        channel: &ChannelId,
        info: &LiveBroadcastInfo,
    ) -> Result<MessageId, SurfaceError> {
        let message = CreateMessage {
            content: None,
            embeds: vec![announcement_embed(info)],
        };
        let sent = self
            .client
            .send_message(channel.as_str(), &message)
            .await
            .map_err(surface_error)?;
        Ok(MessageId::new(sent.id))
    }

    async fn edit(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        info: &LiveBroadcastInfo,
    ) -> Result<(), SurfaceError> {
        let edit = EditMessage {
            content: None,
            embeds: Some(vec![announcement_embed(info)]),
        };
        self.client
            .edit_message(channel.as_str(), message.as_str(), &edit)
            .await
            .map_err(surface_error)?;
        Ok(())
    }

    async fn delete(&self, channel: &ChannelId, message: &MessageId) -> Result<(), SurfaceError> {
        self.client
            .delete_message(channel.as_str(), message.as_str())
            .await
            .map_err(surface_error)
    }

    async fn bulk_delete(
        &self,
        channel: &ChannelId,
        messages: &[MessageId],
    ) -> Result<(), SurfaceError> {
        let ids: Vec<String> = messages.iter().map(|m| m.as_str().to_string()).collect();
        self.client
            .bulk_delete_messages(channel.as_str(), &ids)
            .await
            .map_err(surface_error)
    }
}
