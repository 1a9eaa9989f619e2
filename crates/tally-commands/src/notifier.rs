//! Notice delivery over the Discord HTTP API.

use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tally_common::{Result, TallyError};
use tally_stats::{Notice, NoticeTarget, Notifier};

/// Sends notices as channel messages or direct messages.
#[derive(Clone)]
pub struct SerenityNotifier {
    http: Arc<serenity::Http>,
}

impl SerenityNotifier {
    /// Creates a notifier using the client's HTTP handle.
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }

    async fn send(&self, target: NoticeTarget, message: serenity::CreateMessage) -> Result<()> {
        let sent = match target {
            NoticeTarget::Group(group_id) => {
                let channel = nonzero(group_id.0).map(serenity::ChannelId::new)?;
                channel.send_message(&*self.http, message).await
            }
            NoticeTarget::User(user_id) => {
                let user = nonzero(user_id.0).map(serenity::UserId::new)?;
                user.direct_message(&*self.http, message).await
            }
        };

        sent.map(|_| ())
            .map_err(|e| TallyError::delivery_with_source(format!("Failed to notify {target:?}"), e))
    }
}

#[async_trait]
impl Notifier for SerenityNotifier {
    async fn send_rich(&self, notice: &Notice) -> Result<()> {
        let mut embed = serenity::CreateEmbed::new().description(&notice.text);
        if let Some(url) = &notice.image_url {
            embed = embed.image(url);
        }

        self.send(notice.target, serenity::CreateMessage::new().embed(embed))
            .await
    }

    async fn send_plain(&self, notice: &Notice) -> Result<()> {
        self.send(notice.target, serenity::CreateMessage::new().content(&notice.text))
            .await
    }
}

fn nonzero(id: u64) -> Result<u64> {
    if id == 0 {
        Err(TallyError::delivery("Cannot address id 0"))
    } else {
        Ok(id)
    }
}
