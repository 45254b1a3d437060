//! # Protocol Module
//!
//! Wire data model for the platform's webhook interaction protocol.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! The inbound envelope deserializes from the platform's JSON, the outbound
//! envelope serializes back to it. Integer type tags round-trip through
//! `u8` conversions so illegal tags are rejected at parse time.

pub mod interaction;
pub mod response;

use serde::{Deserialize, Serialize};

// Re-export the envelope types most callers need.
pub use interaction::{
    Attachment, Interaction, InteractionData, InteractionOption, Member, Message, PartialChannel,
    ResolvedData, Role, SubmittedField, SubmittedRow, User,
};
pub use response::{
    ActionRow, AllowedMentions, AutocompleteData, Button, Choice, ChoiceValue, Component, Embed,
    EmbedField, InteractionResponse, MessageData, ModalData, ResponseData, SelectMenu,
    SelectOption, TextInput, EPHEMERAL,
};

/// Kind tag of an inbound interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum InteractionKind {
    Ping = 1,
    ApplicationCommand = 2,
    MessageComponent = 3,
    Autocomplete = 4,
    ModalSubmit = 5,
}

impl From<InteractionKind> for u8 {
    fn from(kind: InteractionKind) -> u8 {
        kind as u8
    }
}

impl TryFrom<u8> for InteractionKind {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(Self::Ping),
            2 => Ok(Self::ApplicationCommand),
            3 => Ok(Self::MessageComponent),
            4 => Ok(Self::Autocomplete),
            5 => Ok(Self::ModalSubmit),
            other => Err(format!("unknown interaction kind {other}")),
        }
    }
}

/// Value kind of a declared or supplied command option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OptionKind {
    SubCommand = 1,
    SubCommandGroup = 2,
    String = 3,
    Integer = 4,
    Boolean = 5,
    User = 6,
    Channel = 7,
    Role = 8,
    Mentionable = 9,
    Number = 10,
    Attachment = 11,
}

impl OptionKind {
    /// True for the two kinds that select a child tree node rather than
    /// carrying a value.
    pub fn is_subcommand(self) -> bool {
        matches!(self, Self::SubCommand | Self::SubCommandGroup)
    }
}

impl From<OptionKind> for u8 {
    fn from(kind: OptionKind) -> u8 {
        kind as u8
    }
}

impl TryFrom<u8> for OptionKind {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(Self::SubCommand),
            2 => Ok(Self::SubCommandGroup),
            3 => Ok(Self::String),
            4 => Ok(Self::Integer),
            5 => Ok(Self::Boolean),
            6 => Ok(Self::User),
            7 => Ok(Self::Channel),
            8 => Ok(Self::Role),
            9 => Ok(Self::Mentionable),
            10 => Ok(Self::Number),
            11 => Ok(Self::Attachment),
            other => Err(format!("unknown option kind {other}")),
        }
    }
}

/// Kind tag of a message component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ComponentKind {
    ActionRow = 1,
    Button = 2,
    StringSelect = 3,
    TextInput = 4,
    UserSelect = 5,
    RoleSelect = 6,
    MentionableSelect = 7,
    ChannelSelect = 8,
}

impl From<ComponentKind> for u8 {
    fn from(kind: ComponentKind) -> u8 {
        kind as u8
    }
}

impl TryFrom<u8> for ComponentKind {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(Self::ActionRow),
            2 => Ok(Self::Button),
            3 => Ok(Self::StringSelect),
            4 => Ok(Self::TextInput),
            5 => Ok(Self::UserSelect),
            6 => Ok(Self::RoleSelect),
            7 => Ok(Self::MentionableSelect),
            8 => Ok(Self::ChannelSelect),
            other => Err(format!("unknown component kind {other}")),
        }
    }
}

/// Type tag of an outbound interaction response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ResponseKind {
    Pong = 1,
    ChannelMessageWithSource = 4,
    DeferredChannelMessageWithSource = 5,
    DeferredUpdateMessage = 6,
    UpdateMessage = 7,
    AutocompleteResult = 8,
    Modal = 9,
}

impl ResponseKind {
    /// True for the two acknowledgement-only tags that defer the real
    /// content to a later follow-up edit.
    pub fn is_deferred(self) -> bool {
        matches!(
            self,
            Self::DeferredChannelMessageWithSource | Self::DeferredUpdateMessage
        )
    }
}

impl From<ResponseKind> for u8 {
    fn from(kind: ResponseKind) -> u8 {
        kind as u8
    }
}

impl TryFrom<u8> for ResponseKind {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(Self::Pong),
            4 => Ok(Self::ChannelMessageWithSource),
            5 => Ok(Self::DeferredChannelMessageWithSource),
            6 => Ok(Self::DeferredUpdateMessage),
            7 => Ok(Self::UpdateMessage),
            8 => Ok(Self::AutocompleteResult),
            9 => Ok(Self::Modal),
            other => Err(format!("unknown response kind {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_kind_round_trip() {
        let json = serde_json::to_string(&InteractionKind::ApplicationCommand).unwrap();
        assert_eq!(json, "2");
        let back: InteractionKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, InteractionKind::ApplicationCommand);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let parsed: Result<InteractionKind, _> = serde_json::from_str("42");
        assert!(parsed.is_err());
        let parsed: Result<ResponseKind, _> = serde_json::from_str("3");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_option_kind_is_subcommand() {
        assert!(OptionKind::SubCommand.is_subcommand());
        assert!(OptionKind::SubCommandGroup.is_subcommand());
        assert!(!OptionKind::String.is_subcommand());
        assert!(!OptionKind::Mentionable.is_subcommand());
    }

    #[test]
    fn test_response_kind_is_deferred() {
        assert!(ResponseKind::DeferredUpdateMessage.is_deferred());
        assert!(ResponseKind::DeferredChannelMessageWithSource.is_deferred());
        assert!(!ResponseKind::UpdateMessage.is_deferred());
        assert!(!ResponseKind::ChannelMessageWithSource.is_deferred());
    }
}
