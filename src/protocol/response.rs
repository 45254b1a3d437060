//! Outbound response envelope
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! An `InteractionResponse` is immutable once built and owned by the
//! dispatch glue until handed to the transport collaborator.

use serde::{Deserialize, Serialize};

use super::{ComponentKind, ResponseKind};

/// Message flag marking a response as visible only to the invoking user.
pub const EPHEMERAL: u64 = 1 << 6;

/// The outbound object: a type tag plus kind-appropriate payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl InteractionResponse {
    /// Acknowledgement for a ping interaction.
    pub fn pong() -> Self {
        Self {
            kind: ResponseKind::Pong,
            data: None,
        }
    }

    /// A plain message response, the most common shape.
    pub fn message(data: MessageData) -> Self {
        Self {
            kind: ResponseKind::ChannelMessageWithSource,
            data: Some(ResponseData::Message(data)),
        }
    }
}

/// Kind-appropriate response payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    Message(MessageData),
    Autocomplete(AutocompleteData),
    Modal(ModalData),
}

/// Message-creation data for message and update responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<Embed>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ActionRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
}

impl MessageData {
    /// Shorthand for content-only message data.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Mark the message ephemeral (visible only to the invoking user).
    pub fn ephemeral(mut self) -> Self {
        self.flags = Some(self.flags.unwrap_or(0) | EPHEMERAL);
        self
    }
}

/// Autocomplete choice list payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AutocompleteData {
    pub choices: Vec<Choice>,
}

/// Modal description payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalData {
    pub custom_id: String,
    pub title: String,
    pub components: Vec<ActionRow>,
}

/// One static or autocomplete choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub name: String,
    pub value: ChoiceValue,
}

impl Choice {
    pub fn new(name: impl Into<String>, value: impl Into<ChoiceValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A choice value: string, integer or float, matching the option kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    String(String),
    Integer(i64),
    Number(f64),
}

impl From<&str> for ChoiceValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ChoiceValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<i64> for ChoiceValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for ChoiceValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

/// Per-response mention policy.
///
/// Empty lists serialize deliberately: an all-empty policy suppresses every
/// mention in the rendered message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowedMentions {
    #[serde(default)]
    pub parse: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub users: Vec<String>,
}

impl AllowedMentions {
    /// Policy suppressing all mentions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Policy allowing user mentions only.
    pub fn users_only() -> Self {
        Self {
            parse: vec!["users".to_string()],
            ..Self::default()
        }
    }
}

/// A rich embed. Only the fields this core needs; everything else is the
/// builder DSL's concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// A top-level component row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    kind: ComponentKind,
    pub components: Vec<Component>,
}

impl ActionRow {
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            kind: ComponentKind::ActionRow,
            components,
        }
    }
}

/// One interactive component inside a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Component {
    Button(Button),
    Select(SelectMenu),
    TextInput(TextInput),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Button {
    #[serde(rename = "type")]
    kind: ComponentKind,
    pub style: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub custom_id: String,
    #[serde(default)]
    pub disabled: bool,
}

impl Button {
    pub fn new(custom_id: impl Into<String>, label: impl Into<String>, style: u8) -> Self {
        Self {
            kind: ComponentKind::Button,
            style,
            label: Some(label.into()),
            custom_id: custom_id.into(),
            disabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectMenu {
    #[serde(rename = "type")]
    kind: ComponentKind,
    pub custom_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<SelectOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl SelectMenu {
    pub fn new(custom_id: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self {
            kind: ComponentKind::StringSelect,
            custom_id: custom_id.into(),
            options,
            placeholder: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextInput {
    #[serde(rename = "type")]
    kind: ComponentKind,
    pub custom_id: String,
    pub label: String,
    pub style: u8,
    #[serde(default)]
    pub required: bool,
}

impl TextInput {
    pub fn new(custom_id: impl Into<String>, label: impl Into<String>, style: u8) -> Self {
        Self {
            kind: ComponentKind::TextInput,
            custom_id: custom_id.into(),
            label: label.into(),
            style,
            required: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_serializes_tag_and_data() {
        let response = InteractionResponse::message(MessageData::text("hello"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], 4);
        assert_eq!(json["data"]["content"], "hello");
        assert!(json["data"].get("embeds").is_none());
    }

    #[test]
    fn test_pong_has_no_data() {
        let json = serde_json::to_value(InteractionResponse::pong()).unwrap();
        assert_eq!(json["type"], 1);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_ephemeral_sets_flag_bit() {
        let data = MessageData::text("secret").ephemeral();
        assert_eq!(data.flags, Some(EPHEMERAL));
        // Setting it twice must not clear the bit.
        let data = data.ephemeral();
        assert_eq!(data.flags, Some(EPHEMERAL));
    }

    #[test]
    fn test_choice_value_untagged() {
        let choices = vec![
            Choice::new("a", "alpha"),
            Choice::new("b", 7i64),
            Choice::new("c", 0.5f64),
        ];
        let json = serde_json::to_value(&choices).unwrap();
        assert_eq!(json[0]["value"], "alpha");
        assert_eq!(json[1]["value"], 7);
        assert_eq!(json[2]["value"], 0.5);
    }

    #[test]
    fn test_allowed_mentions_empty_lists_serialize() {
        let json = serde_json::to_value(AllowedMentions::none()).unwrap();
        assert_eq!(json["parse"], serde_json::json!([]));
        assert_eq!(json["users"], serde_json::json!([]));
    }

    #[test]
    fn test_action_row_kind_tag() {
        let row = ActionRow::new(vec![Component::Button(Button::new("/set/1", "Set", 1))]);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["type"], 1);
        assert_eq!(json["components"][0]["type"], 2);
    }
}
