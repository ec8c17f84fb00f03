//! Gateway intent bitmask.
//!
//! Intents gate which event categories the platform delivers over the
//! realtime connection. They are requested once, in the Identify payload,
//! as a single bitwise-combined mask.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// A Gateway intents bitmask (Discord Gateway v10).
///
/// Joins with bitwise OR, which is commutative, associative, and
/// idempotent: the order in which intents are combined never affects the
/// resulting mask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intents(u32);

impl Intents {
    /// The empty mask.
    pub const NONE: Self = Self(0);

    /// Guild create/update/delete and channel events.
    pub const GUILDS: Self = Self(1 << 0);
    /// Guild member add/update/remove. **Privileged.**
    pub const GUILD_MEMBERS: Self = Self(1 << 1);
    /// Bans and audit-log moderation events.
    pub const GUILD_MODERATION: Self = Self(1 << 2);
    /// Custom emoji, sticker, and soundboard updates.
    pub const GUILD_EXPRESSIONS: Self = Self(1 << 3);
    /// Integration updates.
    pub const GUILD_INTEGRATIONS: Self = Self(1 << 4);
    /// Webhook updates.
    pub const GUILD_WEBHOOKS: Self = Self(1 << 5);
    /// Invite create/delete.
    pub const GUILD_INVITES: Self = Self(1 << 6);
    /// Voice state updates.
    pub const GUILD_VOICE_STATES: Self = Self(1 << 7);
    /// Presence updates. **Privileged.**
    pub const GUILD_PRESENCES: Self = Self(1 << 8);
    /// Messages posted in guild channels.
    pub const GUILD_MESSAGES: Self = Self(1 << 9);
    /// Reactions on guild messages.
    pub const GUILD_MESSAGE_REACTIONS: Self = Self(1 << 10);
    /// Typing indicators in guild channels.
    pub const GUILD_MESSAGE_TYPING: Self = Self(1 << 11);
    /// Messages posted in direct-message channels.
    pub const DIRECT_MESSAGES: Self = Self(1 << 12);
    /// Reactions on direct messages.
    pub const DIRECT_MESSAGE_REACTIONS: Self = Self(1 << 13);
    /// Typing indicators in direct messages.
    pub const DIRECT_MESSAGE_TYPING: Self = Self(1 << 14);
    /// Message content fields on message events. **Privileged.**
    pub const MESSAGE_CONTENT: Self = Self(1 << 15);
    /// Scheduled event updates.
    pub const GUILD_SCHEDULED_EVENTS: Self = Self(1 << 16);
    /// Auto-moderation rule configuration.
    pub const AUTO_MODERATION_CONFIGURATION: Self = Self(1 << 20);
    /// Auto-moderation rule execution.
    pub const AUTO_MODERATION_EXECUTION: Self = Self(1 << 21);

    /// Intents that require explicit opt-in in the developer portal.
    pub const PRIVILEGED: Self = Self(
        Self::GUILD_MEMBERS.0 | Self::GUILD_PRESENCES.0 | Self::MESSAGE_CONTENT.0,
    );

    /// Every defined intent.
    pub const ALL: Self = Self(
        Self::GUILDS.0
            | Self::GUILD_MEMBERS.0
            | Self::GUILD_MODERATION.0
            | Self::GUILD_EXPRESSIONS.0
            | Self::GUILD_INTEGRATIONS.0
            | Self::GUILD_WEBHOOKS.0
            | Self::GUILD_INVITES.0
            | Self::GUILD_VOICE_STATES.0
            | Self::GUILD_PRESENCES.0
            | Self::GUILD_MESSAGES.0
            | Self::GUILD_MESSAGE_REACTIONS.0
            | Self::GUILD_MESSAGE_TYPING.0
            | Self::DIRECT_MESSAGES.0
            | Self::DIRECT_MESSAGE_REACTIONS.0
            | Self::DIRECT_MESSAGE_TYPING.0
            | Self::MESSAGE_CONTENT.0
            | Self::GUILD_SCHEDULED_EVENTS.0
            | Self::AUTO_MODERATION_CONFIGURATION.0
            | Self::AUTO_MODERATION_EXECUTION.0,
    );

    /// Every non-privileged intent.
    ///
    /// This is the designated fallback mask when intent inference records
    /// nothing that requires a privilege: a real, connectable value that
    /// never needs portal opt-in.
    pub const NON_PRIVILEGED: Self = Self(Self::ALL.0 & !Self::PRIVILEGED.0);

    /// The raw bits, as sent in the Identify payload.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build a mask from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns `true` if no intent bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// The bitwise union of two masks (`const` counterpart of `|`).
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if the mask includes any privileged intent.
    #[must_use]
    pub const fn requires_privilege(self) -> bool {
        self.0 & Self::PRIVILEGED.0 != 0
    }
}

impl BitOr for Intents {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Intents {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Intents {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for Intents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Intents({:#x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privileged_bits() {
        assert!(Intents::PRIVILEGED.contains(Intents::GUILD_MEMBERS));
        assert!(Intents::PRIVILEGED.contains(Intents::GUILD_PRESENCES));
        assert!(Intents::PRIVILEGED.contains(Intents::MESSAGE_CONTENT));
        assert_eq!(Intents::PRIVILEGED.bits(), (1 << 1) | (1 << 8) | (1 << 15));
    }

    #[test]
    fn non_privileged_excludes_privileged() {
        assert!(!Intents::NON_PRIVILEGED.requires_privilege());
        assert!(Intents::NON_PRIVILEGED.contains(Intents::GUILDS));
        assert!(Intents::NON_PRIVILEGED.contains(Intents::GUILD_MESSAGES));
        assert!(!Intents::NON_PRIVILEGED.contains(Intents::GUILD_MEMBERS));
    }

    #[test]
    fn non_privileged_is_connectable() {
        // The fallback must be a real mask, never empty.
        assert!(!Intents::NON_PRIVILEGED.is_empty());
    }

    #[test]
    fn union_is_idempotent_and_commutative() {
        let a = Intents::GUILD_MESSAGES;
        let b = Intents::DIRECT_MESSAGES;
        assert_eq!(a | a, a);
        assert_eq!(a | b, b | a);
        assert_eq!((a | b) | a, a | b);
    }

    #[test]
    fn or_assign_accumulates() {
        let mut mask = Intents::NONE;
        mask |= Intents::GUILDS;
        mask |= Intents::GUILD_MESSAGES;
        assert!(mask.contains(Intents::GUILDS | Intents::GUILD_MESSAGES));
    }

    #[test]
    fn serde_transparent_roundtrip() {
        let mask = Intents::GUILD_MESSAGES | Intents::DIRECT_MESSAGES;
        let json = serde_json::to_string(&mask).unwrap();
        assert_eq!(json, "4608");
        let restored: Intents = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, mask);
    }
}
