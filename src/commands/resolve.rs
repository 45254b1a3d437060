//! Tree walk and typed option coercion
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! Turns the interaction's nested option list into a pointer at one
//! registered leaf plus a typed value map. The walk also collects the
//! nearest-ancestor mention-policy override along the path, child overrides
//! winning over parent ones.

use std::collections::HashMap;

use crate::error::DispatchError;
use crate::protocol::{AllowedMentions, InteractionOption, OptionKind, ResolvedData};
use crate::resolved::{
    AttachmentHandle, ChannelHandle, MentionableHandle, RoleHandle, UserHandle,
};

use super::{Command, CommandNode, CommandTree};

/// One supplied option after schema validation and coercion. Entity kinds
/// carry lazy handles over the interaction's resolved tables.
#[derive(Debug, Clone)]
pub enum OptionValue<'a> {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    User(UserHandle<'a>),
    Role(RoleHandle<'a>),
    Channel(ChannelHandle<'a>),
    Mentionable(MentionableHandle<'a>),
    Attachment(AttachmentHandle<'a>),
}

/// The outcome of one tree walk.
pub(crate) struct ResolvedLeaf<'a> {
    pub command: &'a Command,
    /// The leaf-level option list (the innermost `options` array).
    pub options: &'a [InteractionOption],
    /// Nearest-ancestor mention-policy override along the walked path.
    pub mentions: Option<&'a AllowedMentions>,
}

impl CommandTree {
    /// Walk from the top-level name down through sub-command options to the
    /// invocable leaf.
    ///
    /// At every interior node the supplied options must be exactly one
    /// tree-selecting option; that is checked before the option's name is
    /// looked up, so a wrong shape never reports a misleading "unknown
    /// command".
    pub(crate) fn resolve_leaf<'a>(
        &'a self,
        name: &str,
        options: &'a [InteractionOption],
    ) -> Result<ResolvedLeaf<'a>, DispatchError> {
        let mut mentions = self.root.allowed_mentions.as_ref();
        let mut node = self
            .root
            .get(name)
            .ok_or_else(|| DispatchError::UnknownCommand(name.to_string()))?;
        let mut options = options;

        loop {
            match node {
                CommandNode::Command(command) => {
                    if let Some(m) = &command.allowed_mentions {
                        mentions = Some(m);
                    }
                    return Ok(ResolvedLeaf {
                        command,
                        options,
                        mentions,
                    });
                }
                CommandNode::Group(group) => {
                    if let Some(m) = &group.allowed_mentions {
                        mentions = Some(m);
                    }
                    if options.len() != 1 || !options[0].kind.is_subcommand() {
                        return Err(DispatchError::ExpectedSubcommand(options.len()));
                    }
                    let selector = &options[0];
                    let child = group.get(&selector.name).ok_or_else(|| {
                        if selector.kind == OptionKind::SubCommandGroup {
                            DispatchError::UnknownGroup(selector.name.clone())
                        } else {
                            DispatchError::UnknownCommand(selector.name.clone())
                        }
                    })?;
                    match (child, selector.kind) {
                        (CommandNode::Group(_), OptionKind::SubCommand) => {
                            return Err(DispatchError::ExpectedCommand(selector.name.clone()));
                        }
                        (CommandNode::Command(_), OptionKind::SubCommandGroup) => {
                            return Err(DispatchError::ExpectedGroup(selector.name.clone()));
                        }
                        _ => {}
                    }
                    node = child;
                    options = &selector.options;
                }
            }
        }
    }
}

/// Validate the leaf's supplied options against its declared schema and
/// coerce each value. The resulting map holds exactly the supplied names.
pub(crate) fn resolve_options<'a>(
    command: &Command,
    supplied: &'a [InteractionOption],
    resolved: Option<&'a ResolvedData>,
) -> Result<HashMap<String, OptionValue<'a>>, DispatchError> {
    let mut values = HashMap::with_capacity(supplied.len());
    for option in supplied {
        let declared = command
            .find_option(&option.name)
            .ok_or_else(|| DispatchError::UnknownOption(option.name.clone()))?;
        if declared.kind != option.kind {
            return Err(DispatchError::MismatchedOption {
                name: option.name.clone(),
                declared: declared.kind,
                supplied: option.kind,
            });
        }
        values.insert(option.name.clone(), coerce(option, resolved)?);
    }
    Ok(values)
}

fn coerce<'a>(
    option: &'a InteractionOption,
    resolved: Option<&'a ResolvedData>,
) -> Result<OptionValue<'a>, DispatchError> {
    let malformed = DispatchError::MalformedPayload("option value");
    let value = option.value.as_ref().ok_or(malformed)?;
    let coerced = match option.kind {
        OptionKind::String => value
            .as_str()
            .map(|s| OptionValue::String(s.to_string())),
        OptionKind::Integer => value.as_i64().map(OptionValue::Integer),
        OptionKind::Number => value.as_f64().map(OptionValue::Float),
        OptionKind::Boolean => value.as_bool().map(OptionValue::Boolean),
        OptionKind::User => value
            .as_str()
            .map(|id| OptionValue::User(UserHandle::new(id, resolved))),
        OptionKind::Role => value
            .as_str()
            .map(|id| OptionValue::Role(RoleHandle::new(id, resolved))),
        OptionKind::Channel => value
            .as_str()
            .map(|id| OptionValue::Channel(ChannelHandle::new(id, resolved))),
        OptionKind::Mentionable => value
            .as_str()
            .map(|id| OptionValue::Mentionable(MentionableHandle::new(id, resolved))),
        OptionKind::Attachment => value
            .as_str()
            .map(|id| OptionValue::Attachment(AttachmentHandle::new(id, resolved))),
        // Tree-selecting kinds never reach a leaf schema.
        OptionKind::SubCommand | OptionKind::SubCommandGroup => None,
    };
    coerced.ok_or(DispatchError::MalformedPayload("option value"))
}
