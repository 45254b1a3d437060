//! Per-invocation contexts handed to command and autocomplete handlers
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! A context borrows the interaction for the duration of one dispatch and
//! exposes typed accessors over the coerced option map, mirroring the option
//! kinds the schema can declare. Handlers never see raw wire values.

use std::collections::HashMap;

use crate::protocol::{Interaction, InteractionOption, User};
use crate::resolved::{
    AttachmentHandle, ChannelHandle, MentionableHandle, RoleHandle, UserHandle,
};
use crate::response::PendingResponse;

use super::OptionValue;

/// Everything a command handler may consult while producing its response.
pub struct CommandContext<'a> {
    pub interaction: &'a Interaction,
    pub response: &'a PendingResponse,
    options: HashMap<String, OptionValue<'a>>,
}

impl<'a> CommandContext<'a> {
    pub(crate) fn new(
        interaction: &'a Interaction,
        response: &'a PendingResponse,
        options: HashMap<String, OptionValue<'a>>,
    ) -> Self {
        Self {
            interaction,
            response,
            options,
        }
    }

    /// The invoking user, from the member record in guilds or directly in DMs.
    pub fn user(&self) -> Option<&'a User> {
        self.interaction.invoking_user()
    }

    /// The raw coerced value of a supplied option.
    pub fn option(&self, name: &str) -> Option<&OptionValue<'a>> {
        self.options.get(name)
    }

    /// A string option's value, `None` when absent or of another kind.
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.options.get(name)? {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.options.get(name)? {
            OptionValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.options.get(name)? {
            OptionValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.options.get(name)? {
            OptionValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn user_option(&self, name: &str) -> Option<&UserHandle<'a>> {
        match self.options.get(name)? {
            OptionValue::User(h) => Some(h),
            _ => None,
        }
    }

    pub fn role_option(&self, name: &str) -> Option<&RoleHandle<'a>> {
        match self.options.get(name)? {
            OptionValue::Role(h) => Some(h),
            _ => None,
        }
    }

    pub fn channel_option(&self, name: &str) -> Option<&ChannelHandle<'a>> {
        match self.options.get(name)? {
            OptionValue::Channel(h) => Some(h),
            _ => None,
        }
    }

    pub fn mentionable_option(&self, name: &str) -> Option<&MentionableHandle<'a>> {
        match self.options.get(name)? {
            OptionValue::Mentionable(h) => Some(h),
            _ => None,
        }
    }

    pub fn attachment_option(&self, name: &str) -> Option<&AttachmentHandle<'a>> {
        match self.options.get(name)? {
            OptionValue::Attachment(h) => Some(h),
            _ => None,
        }
    }
}

/// Context for an autocomplete callback: the interaction plus the single
/// option currently being typed.
pub struct AutocompleteContext<'a> {
    pub interaction: &'a Interaction,
    focused: &'a InteractionOption,
}

impl<'a> AutocompleteContext<'a> {
    pub(crate) fn new(interaction: &'a Interaction, focused: &'a InteractionOption) -> Self {
        Self {
            interaction,
            focused,
        }
    }

    /// Name of the focused option.
    pub fn focused_name(&self) -> &str {
        &self.focused.name
    }

    /// The text typed so far, when the platform sent it as a string.
    pub fn partial(&self) -> Option<&str> {
        self.focused.value.as_ref()?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interaction() -> Interaction {
        serde_json::from_value(serde_json::json!({
            "id": "1",
            "application_id": "2",
            "type": 2,
            "token": "tok",
            "member": { "user": { "id": "10", "username": "ada" } }
        }))
        .unwrap()
    }

    #[test]
    fn test_typed_accessors_filter_by_kind() {
        let itx = interaction();
        let response = PendingResponse::new();
        let mut options = HashMap::new();
        options.insert("n".to_string(), OptionValue::Integer(5));
        options.insert("s".to_string(), OptionValue::String("hi".to_string()));
        let ctx = CommandContext::new(&itx, &response, options);

        assert_eq!(ctx.integer("n"), Some(5));
        assert_eq!(ctx.string("s"), Some("hi"));
        // Wrong kind and absent name both come back empty.
        assert_eq!(ctx.string("n"), None);
        assert_eq!(ctx.integer("missing"), None);
        assert_eq!(ctx.user().unwrap().username, "ada");
    }

    #[test]
    fn test_autocomplete_partial_text() {
        let itx = interaction();
        let focused: InteractionOption = serde_json::from_value(serde_json::json!({
            "name": "query",
            "type": 3,
            "value": "rou",
            "focused": true
        }))
        .unwrap();
        let ctx = AutocompleteContext::new(&itx, &focused);
        assert_eq!(ctx.focused_name(), "query");
        assert_eq!(ctx.partial(), Some("rou"));
    }
}
