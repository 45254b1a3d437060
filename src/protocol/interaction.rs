//! Inbound interaction envelope
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! One `Interaction` is created per inbound webhook request and is read-only
//! for the lifetime of the dispatch. The kind-specific fields live in a
//! single `InteractionData` struct mirroring the wire shape; the dispatch
//! layer reads only the fields the kind requires and faults on absence.

use std::collections::HashMap;

use serde::Deserialize;

use super::{ComponentKind, InteractionKind, OptionKind};
use crate::resolved::MessageHandle;

/// One inbound event from the platform's webhook protocol.
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub application_id: String,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    #[serde(default)]
    pub data: Option<InteractionData>,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Present when invoked from a guild.
    #[serde(default)]
    pub member: Option<Member>,
    /// Present when invoked from a direct message.
    #[serde(default)]
    pub user: Option<User>,
    /// Short-lived token for replying to this interaction.
    pub token: String,
    /// The message the component sits on, for component interactions.
    #[serde(default)]
    pub message: Option<Message>,
}

impl Interaction {
    /// The invoking user, whether the event came from a guild member or a DM.
    pub fn invoking_user(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }

    /// The resolved-entity side tables, when the payload carries any.
    pub fn resolved(&self) -> Option<&ResolvedData> {
        self.data.as_ref().and_then(|d| d.resolved.as_ref())
    }

    /// Lazy handle for the target message of a message-targeted command.
    pub fn target_message(&self) -> Option<MessageHandle<'_>> {
        let target = self.data.as_ref()?.target_id.as_deref()?;
        Some(MessageHandle::new(target, self.resolved()))
    }
}

/// Kind-specific payload of an interaction.
///
/// The wire protocol reuses one object for commands, components and modals;
/// fields not applicable to the current kind are simply absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionData {
    /// Command id, for application commands.
    #[serde(default)]
    pub id: Option<String>,
    /// Command name, for application commands and autocomplete.
    #[serde(default)]
    pub name: Option<String>,
    /// Flat option list; nested options only at sub-command levels.
    #[serde(default)]
    pub options: Vec<InteractionOption>,
    /// Custom identifier, for components and modals.
    #[serde(default)]
    pub custom_id: Option<String>,
    /// Component kind, for component interactions.
    #[serde(default)]
    pub component_type: Option<ComponentKind>,
    /// Selected values, for select-menu components.
    #[serde(default)]
    pub values: Vec<String>,
    /// Submitted field rows, for modal submissions.
    #[serde(default)]
    pub components: Vec<SubmittedRow>,
    /// Target id, for user/message-targeted commands.
    #[serde(default)]
    pub target_id: Option<String>,
    /// Side tables of full entities referenced by option values.
    #[serde(default)]
    pub resolved: Option<ResolvedData>,
}

/// One supplied command option.
///
/// A node carries either a value (at leaves) or nested options (at
/// sub-command levels), never both.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub options: Vec<InteractionOption>,
    /// True on the option currently being typed, for autocomplete.
    #[serde(default)]
    pub focused: bool,
}

/// One action row of a submitted modal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmittedRow {
    #[serde(default)]
    pub components: Vec<SubmittedField>,
}

/// One submitted modal input field.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedField {
    pub custom_id: String,
    #[serde(default)]
    pub value: String,
}

/// Platform-supplied side tables of full entities keyed by id.
///
/// Referenced, never copied, by option values during a dispatch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolvedData {
    #[serde(default)]
    pub users: HashMap<String, User>,
    #[serde(default)]
    pub members: HashMap<String, Member>,
    #[serde(default)]
    pub roles: HashMap<String, Role>,
    #[serde(default)]
    pub channels: HashMap<String, PartialChannel>,
    #[serde(default)]
    pub messages: HashMap<String, Message>,
    #[serde(default)]
    pub attachments: HashMap<String, Attachment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Member {
    /// Absent inside resolved member tables; the matching user record lives
    /// in the users table under the same id.
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub permissions: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartialChannel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default)]
    pub permissions: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_envelope() {
        let raw = serde_json::json!({
            "id": "100",
            "application_id": "200",
            "type": 2,
            "token": "tok",
            "guild_id": "300",
            "member": {
                "user": { "id": "400", "username": "ada" },
                "roles": ["500"]
            },
            "data": {
                "id": "600",
                "name": "greet",
                "options": [
                    { "name": "who", "type": 6, "value": "400" }
                ],
                "resolved": {
                    "users": { "400": { "id": "400", "username": "ada" } }
                }
            }
        });

        let itx: Interaction = serde_json::from_value(raw).unwrap();
        assert_eq!(itx.kind, InteractionKind::ApplicationCommand);
        assert_eq!(itx.invoking_user().unwrap().username, "ada");

        let data = itx.data.as_ref().unwrap();
        assert_eq!(data.name.as_deref(), Some("greet"));
        assert_eq!(data.options.len(), 1);
        assert_eq!(data.options[0].kind, OptionKind::User);
        assert!(itx.resolved().unwrap().users.contains_key("400"));
    }

    #[test]
    fn test_parse_modal_envelope() {
        let raw = serde_json::json!({
            "id": "1",
            "application_id": "2",
            "type": 5,
            "token": "tok",
            "data": {
                "custom_id": "/feedback/42",
                "components": [
                    { "components": [ { "custom_id": "topic", "value": "routing" } ] }
                ]
            }
        });

        let itx: Interaction = serde_json::from_value(raw).unwrap();
        assert_eq!(itx.kind, InteractionKind::ModalSubmit);
        let data = itx.data.unwrap();
        assert_eq!(data.custom_id.as_deref(), Some("/feedback/42"));
        assert_eq!(data.components[0].components[0].value, "routing");
    }

    #[test]
    fn test_invoking_user_prefers_member() {
        let raw = serde_json::json!({
            "id": "1",
            "application_id": "2",
            "type": 1,
            "token": "tok",
            "member": { "user": { "id": "10", "username": "guild-side" } },
            "user": { "id": "11", "username": "dm-side" }
        });
        let itx: Interaction = serde_json::from_value(raw).unwrap();
        assert_eq!(itx.invoking_user().unwrap().id, "10");
    }
}
