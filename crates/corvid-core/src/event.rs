//! Event categories and typed dispatch payloads.
//!
//! Only the payload fields the framework and typical modules need are
//! modelled; interaction payloads are forwarded as opaque
//! [`serde_json::Value`].

use serde::{Deserialize, Serialize};

use crate::Intents;

// ── Categories ───────────────────────────────────────────────

/// The categories of realtime events a bot can subscribe to.
///
/// Each category carries a fixed mapping to the Gateway intents required
/// to receive it, see [`EventKind::intents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Session established (`READY`).
    Ready,
    /// Previous session resumed (`RESUMED`).
    Resumed,
    /// Message posted (`MESSAGE_CREATE`).
    MessageCreate,
    /// Message edited (`MESSAGE_UPDATE`).
    MessageUpdate,
    /// Message deleted (`MESSAGE_DELETE`).
    MessageDelete,
    /// Reaction added to a message (`MESSAGE_REACTION_ADD`).
    ReactionAdd,
    /// Reaction removed from a message (`MESSAGE_REACTION_REMOVE`).
    ReactionRemove,
    /// Member joined a guild (`GUILD_MEMBER_ADD`).
    MemberAdd,
    /// Member left or was removed from a guild (`GUILD_MEMBER_REMOVE`).
    MemberRemove,
    /// Guild became available or was joined (`GUILD_CREATE`).
    GuildCreate,
    /// Channel created (`CHANNEL_CREATE`).
    ChannelCreate,
    /// User started typing (`TYPING_START`).
    TypingStart,
    /// Presence changed (`PRESENCE_UPDATE`).
    PresenceUpdate,
    /// Interaction received (`INTERACTION_CREATE`).
    InteractionCreate,
}

impl EventKind {
    /// Every category, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Ready,
        Self::Resumed,
        Self::MessageCreate,
        Self::MessageUpdate,
        Self::MessageDelete,
        Self::ReactionAdd,
        Self::ReactionRemove,
        Self::MemberAdd,
        Self::MemberRemove,
        Self::GuildCreate,
        Self::ChannelCreate,
        Self::TypingStart,
        Self::PresenceUpdate,
        Self::InteractionCreate,
    ];

    /// The Gateway intents required to receive this category.
    ///
    /// Lifecycle categories and interactions are delivered regardless of
    /// the requested mask and therefore map to [`Intents::NONE`]. Message,
    /// reaction, and typing categories cover both their guild and
    /// direct-message variants.
    #[must_use]
    pub const fn intents(self) -> Intents {
        match self {
            Self::Ready | Self::Resumed | Self::InteractionCreate => Intents::NONE,
            Self::MessageCreate | Self::MessageUpdate | Self::MessageDelete => {
                Intents::GUILD_MESSAGES.union(Intents::DIRECT_MESSAGES)
            },
            Self::ReactionAdd | Self::ReactionRemove => {
                Intents::GUILD_MESSAGE_REACTIONS.union(Intents::DIRECT_MESSAGE_REACTIONS)
            },
            Self::MemberAdd | Self::MemberRemove => Intents::GUILD_MEMBERS,
            Self::GuildCreate | Self::ChannelCreate => Intents::GUILDS,
            Self::TypingStart => {
                Intents::GUILD_MESSAGE_TYPING.union(Intents::DIRECT_MESSAGE_TYPING)
            },
            Self::PresenceUpdate => Intents::GUILD_PRESENCES,
        }
    }
}

// ── Payloads ─────────────────────────────────────────────────

/// A Discord user, as embedded in event payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Snowflake ID.
    pub id: String,
    /// Username, when the platform includes it.
    #[serde(default)]
    pub username: Option<String>,
    /// Whether the user is a bot account.
    #[serde(default)]
    pub bot: bool,
}

/// `READY` payload: the session is established.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ready {
    /// The bot's own user.
    pub user: User,
    /// Session ID, required for resuming.
    pub session_id: String,
    /// Preferred gateway URL for resuming this session.
    pub resume_gateway_url: String,
}

/// A message, as delivered by create and update events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Snowflake ID.
    pub id: String,
    /// Channel the message was posted in.
    pub channel_id: String,
    /// Guild the channel belongs to; absent for direct messages.
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Author; absent on some partial update payloads.
    #[serde(default)]
    pub author: Option<User>,
    /// Text content. Empty unless the `MESSAGE_CONTENT` intent was
    /// granted or the bot is addressed directly.
    #[serde(default)]
    pub content: String,
}

/// `MESSAGE_DELETE` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDelete {
    /// ID of the deleted message.
    pub id: String,
    /// Channel it was deleted from.
    pub channel_id: String,
    /// Guild, when applicable.
    #[serde(default)]
    pub guild_id: Option<String>,
}

/// A partial emoji in reaction payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emoji {
    /// Custom emoji ID; `None` for unicode emoji.
    #[serde(default)]
    pub id: Option<String>,
    /// Emoji name or unicode character.
    #[serde(default)]
    pub name: Option<String>,
}

/// Reaction add/remove payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    /// User who reacted.
    pub user_id: String,
    /// Channel of the target message.
    pub channel_id: String,
    /// Target message.
    pub message_id: String,
    /// Guild, when applicable.
    #[serde(default)]
    pub guild_id: Option<String>,
    /// The emoji used.
    pub emoji: Emoji,
}

/// `GUILD_MEMBER_ADD` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberAdd {
    /// Guild the member joined.
    pub guild_id: String,
    /// The joining user; absent on some partial payloads.
    #[serde(default)]
    pub user: Option<User>,
}

/// `GUILD_MEMBER_REMOVE` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRemove {
    /// Guild the member left.
    pub guild_id: String,
    /// The departing user.
    pub user: User,
}

/// A guild, as delivered by `GUILD_CREATE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guild {
    /// Snowflake ID.
    pub id: String,
    /// Guild name; absent for unavailable guilds.
    #[serde(default)]
    pub name: Option<String>,
    /// Member count, when included.
    #[serde(default)]
    pub member_count: Option<u64>,
}

/// A channel, as delivered by `CHANNEL_CREATE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// Snowflake ID.
    pub id: String,
    /// Guild the channel belongs to; absent for DM channels.
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Channel name, when applicable.
    #[serde(default)]
    pub name: Option<String>,
}

/// `TYPING_START` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingStart {
    /// Channel the typing happens in.
    pub channel_id: String,
    /// The typing user.
    pub user_id: String,
    /// Guild, when applicable.
    #[serde(default)]
    pub guild_id: Option<String>,
}

/// `PRESENCE_UPDATE` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presence {
    /// The user whose presence changed.
    pub user: User,
    /// Guild scope of the update.
    #[serde(default)]
    pub guild_id: Option<String>,
    /// New status (`online`, `idle`, `dnd`, `offline`).
    #[serde(default)]
    pub status: Option<String>,
}

// ── Events ───────────────────────────────────────────────────

/// A decoded dispatch event.
#[derive(Debug, Clone)]
pub enum Event {
    /// Session established.
    Ready(Ready),
    /// Previous session resumed.
    Resumed,
    /// Message posted.
    MessageCreate(Message),
    /// Message edited.
    MessageUpdate(Message),
    /// Message deleted.
    MessageDelete(MessageDelete),
    /// Reaction added.
    ReactionAdd(Reaction),
    /// Reaction removed.
    ReactionRemove(Reaction),
    /// Member joined a guild.
    MemberAdd(MemberAdd),
    /// Member left a guild.
    MemberRemove(MemberRemove),
    /// Guild became available.
    GuildCreate(Guild),
    /// Channel created.
    ChannelCreate(Channel),
    /// User started typing.
    TypingStart(TypingStart),
    /// Presence changed.
    PresenceUpdate(Presence),
    /// Interaction received, forwarded opaquely.
    InteractionCreate(serde_json::Value),
}

impl Event {
    /// The category this event belongs to.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Ready(_) => EventKind::Ready,
            Self::Resumed => EventKind::Resumed,
            Self::MessageCreate(_) => EventKind::MessageCreate,
            Self::MessageUpdate(_) => EventKind::MessageUpdate,
            Self::MessageDelete(_) => EventKind::MessageDelete,
            Self::ReactionAdd(_) => EventKind::ReactionAdd,
            Self::ReactionRemove(_) => EventKind::ReactionRemove,
            Self::MemberAdd(_) => EventKind::MemberAdd,
            Self::MemberRemove(_) => EventKind::MemberRemove,
            Self::GuildCreate(_) => EventKind::GuildCreate,
            Self::ChannelCreate(_) => EventKind::ChannelCreate,
            Self::TypingStart(_) => EventKind::TypingStart,
            Self::PresenceUpdate(_) => EventKind::PresenceUpdate,
            Self::InteractionCreate(_) => EventKind::InteractionCreate,
        }
    }

    /// Decode a Gateway dispatch from its event name (`t`) and data
    /// (`d`).
    ///
    /// Returns `Ok(None)` for event names this framework does not model.
    ///
    /// # Errors
    ///
    /// Returns a deserialization error when the payload does not match
    /// the documented shape for a known event name.
    pub fn from_dispatch(
        name: &str,
        data: serde_json::Value,
    ) -> Result<Option<Self>, serde_json::Error> {
        let event = match name {
            "READY" => Self::Ready(serde_json::from_value(data)?),
            "RESUMED" => Self::Resumed,
            "MESSAGE_CREATE" => Self::MessageCreate(serde_json::from_value(data)?),
            "MESSAGE_UPDATE" => Self::MessageUpdate(serde_json::from_value(data)?),
            "MESSAGE_DELETE" => Self::MessageDelete(serde_json::from_value(data)?),
            "MESSAGE_REACTION_ADD" => Self::ReactionAdd(serde_json::from_value(data)?),
            "MESSAGE_REACTION_REMOVE" => Self::ReactionRemove(serde_json::from_value(data)?),
            "GUILD_MEMBER_ADD" => Self::MemberAdd(serde_json::from_value(data)?),
            "GUILD_MEMBER_REMOVE" => Self::MemberRemove(serde_json::from_value(data)?),
            "GUILD_CREATE" => Self::GuildCreate(serde_json::from_value(data)?),
            "CHANNEL_CREATE" => Self::ChannelCreate(serde_json::from_value(data)?),
            "TYPING_START" => Self::TypingStart(serde_json::from_value(data)?),
            "PRESENCE_UPDATE" => Self::PresenceUpdate(serde_json::from_value(data)?),
            "INTERACTION_CREATE" => Self::InteractionCreate(data),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_categories_require_no_intent() {
        assert!(EventKind::Ready.intents().is_empty());
        assert!(EventKind::Resumed.intents().is_empty());
        assert!(EventKind::InteractionCreate.intents().is_empty());
    }

    #[test]
    fn message_categories_cover_guild_and_dm() {
        let mask = EventKind::MessageCreate.intents();
        assert!(mask.contains(Intents::GUILD_MESSAGES));
        assert!(mask.contains(Intents::DIRECT_MESSAGES));
        assert!(!mask.contains(Intents::MESSAGE_CONTENT));
    }

    #[test]
    fn member_and_presence_categories_are_privileged() {
        assert!(EventKind::MemberAdd.intents().requires_privilege());
        assert!(EventKind::PresenceUpdate.intents().requires_privilege());
    }

    #[test]
    fn every_category_has_a_table_entry() {
        // The table is total: no category panics or maps inconsistently.
        for kind in EventKind::ALL {
            let _ = kind.intents();
        }
    }

    #[test]
    fn ready_dispatch_decodes() {
        let data = serde_json::json!({
            "user": { "id": "42", "username": "corvid", "bot": true },
            "session_id": "sess",
            "resume_gateway_url": "wss://gateway.discord.gg",
            "guilds": [],
        });
        let event = Event::from_dispatch("READY", data).unwrap().unwrap();
        assert_eq!(event.kind(), EventKind::Ready);
        let Event::Ready(ready) = event else {
            panic!("expected READY");
        };
        assert_eq!(ready.user.id, "42");
        assert_eq!(ready.session_id, "sess");
    }

    #[test]
    fn message_create_decodes_without_optional_fields() {
        let data = serde_json::json!({
            "id": "1",
            "channel_id": "2",
        });
        let event = Event::from_dispatch("MESSAGE_CREATE", data).unwrap().unwrap();
        let Event::MessageCreate(message) = event else {
            panic!("expected MESSAGE_CREATE");
        };
        assert!(message.guild_id.is_none());
        assert!(message.author.is_none());
        assert_eq!(message.content, "");
    }

    #[test]
    fn unknown_dispatch_name_is_skipped() {
        let event = Event::from_dispatch("STAGE_INSTANCE_CREATE", serde_json::json!({})).unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn malformed_known_payload_is_an_error() {
        let result = Event::from_dispatch("MESSAGE_DELETE", serde_json::json!({"id": "1"}));
        assert!(result.is_err());
    }

    #[test]
    fn interaction_payload_stays_opaque() {
        let data = serde_json::json!({"type": 2, "token": "t"});
        let event = Event::from_dispatch("INTERACTION_CREATE", data.clone())
            .unwrap()
            .unwrap();
        let Event::InteractionCreate(value) = event else {
            panic!("expected INTERACTION_CREATE");
        };
        assert_eq!(value, data);
    }
}
