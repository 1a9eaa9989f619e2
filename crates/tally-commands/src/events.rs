//! Gateway event handling: every guild message goes through the tracker.

use crate::framework::{Data, Error};
use poise::serenity_prelude as serenity;
use tally_common::{GroupId, UserId};
use tally_i18n::{MessageKey, Messages};
use tally_stats::{AdmissionOutcome, EventKind, InboundEvent};
use tracing::{debug, error, info, warn};

/// Central event handler for Discord events.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("Bot ready event received for: {}", data_about_bot.user.name);
        }
        serenity::FullEvent::Message { new_message } => {
            on_message(ctx, new_message, data).await;
        }
        _ => {}
    }
    Ok(())
}

async fn on_message(ctx: &serenity::Context, message: &serenity::Message, data: &Data) {
    if message.author.bot {
        return;
    }

    let kind = event_kind(&message.content, &data.config.discord.command_prefix, message.kind);
    let group_id = message.guild_id.map(|_| GroupId(message.channel_id.get()));

    // Only look names up for events that can be recorded.
    let (display_name, group_display_name) = if group_id.is_some() && kind == EventKind::TextMessage {
        let display_name = message
            .author_nick(ctx)
            .await
            .or_else(|| message.author.global_name.clone())
            .unwrap_or_else(|| message.author.name.clone());
        let group_display_name = match message.channel_id.name(ctx).await {
            Ok(name) => name,
            Err(e) => {
                debug!("Could not resolve channel name: {:?}", e);
                message.channel_id.to_string()
            }
        };
        (display_name, group_display_name)
    } else {
        (message.author.name.clone(), String::new())
    };

    let event = InboundEvent {
        user_id: UserId(message.author.id.get()),
        display_name,
        group_id,
        group_display_name,
        kind,
    };

    match data.tracker.handle(&event).await {
        Ok(AdmissionOutcome::Ignored | AdmissionOutcome::Recorded) => {}
        Ok(outcome) => debug!(user_id = %event.user_id, ?outcome, "Message not counted"),
        Err(e) => {
            error!(error = %e, user_id = %event.user_id, "Failed to process message");
            let language = data.language_for(event.user_id);
            if let Err(e) = message
                .channel_id
                .say(&ctx.http, Messages::get(MessageKey::RetryLater, language))
                .await
            {
                warn!("Failed to send retry notice: {:?}", e);
            }
        }
    }
}

/// Classifies a message; prefixed commands and non-text messages are not counted.
pub fn event_kind(content: &str, prefix: &str, kind: serenity::MessageType) -> EventKind {
    let is_text = matches!(
        kind,
        serenity::MessageType::Regular | serenity::MessageType::InlineReply
    );
    let content = content.trim();

    if !is_text || content.is_empty() || content.starts_with(prefix) {
        EventKind::Other
    } else {
        EventKind::TextMessage
    }
}
