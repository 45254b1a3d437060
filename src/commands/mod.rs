//! # Command Tree
//!
//! Nested registry of slash commands and the resolution machinery that maps
//! an interaction's flat option list onto a registered leaf.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! The tree has a two-phase lifecycle: a mutable [`CommandTreeBuilder`] used
//! only at startup, and the immutable [`CommandTree`] it produces, shared by
//! concurrent dispatches without locking. Registration faults (nesting
//! depth, duplicate names) surface synchronously from the builder and never
//! reach dispatch time.

pub mod context;
pub mod resolve;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::error::RegistryError;
use crate::protocol::{AllowedMentions, Choice, OptionKind};

pub use context::{AutocompleteContext, CommandContext};
pub use resolve::OptionValue;

/// Placeholder used in the registration payload when a description is absent.
const DEFAULT_DESCRIPTION: &str = "-";

/// Deepest group level: root (0) → group (1) → sub-command-group (2).
const MAX_GROUP_DEPTH: u8 = 2;

/// Handler for one invocable command leaf.
///
/// Handlers write their intent into `ctx.response`; returning `Err` routes
/// the fault through the injected fault handler, replacing the response.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<()>;
}

/// Callback producing choices for an option currently being typed.
#[async_trait]
pub trait AutocompleteHandler: Send + Sync {
    async fn complete(&self, ctx: &AutocompleteContext<'_>) -> Result<Vec<Choice>>;
}

/// One typed option descriptor in a command's declared schema.
pub struct CommandOption {
    pub name: String,
    pub kind: OptionKind,
    pub description: String,
    pub required: bool,
    pub choices: Vec<Choice>,
    pub(crate) autocomplete: Option<Arc<dyn AutocompleteHandler>>,
}

impl CommandOption {
    pub fn new(name: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            required: false,
            choices: Vec::new(),
            autocomplete: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn autocomplete(mut self, handler: Arc<dyn AutocompleteHandler>) -> Self {
        self.autocomplete = Some(handler);
        self
    }
}

/// A leaf registration: schema, overrides and the user-supplied handler.
pub struct Command {
    pub description: String,
    pub options: Vec<CommandOption>,
    pub default_permission: bool,
    /// Mention-policy override for responses from this leaf.
    pub allowed_mentions: Option<AllowedMentions>,
    pub(crate) handler: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new(handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            description: String::new(),
            options: Vec::new(),
            default_permission: true,
            allowed_mentions: None,
            handler,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn default_permission(mut self, value: bool) -> Self {
        self.default_permission = value;
        self
    }

    pub fn allowed_mentions(mut self, mentions: AllowedMentions) -> Self {
        self.allowed_mentions = Some(mentions);
        self
    }

    pub(crate) fn find_option(&self, name: &str) -> Option<&CommandOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Option names must be unique within a leaf, and the schema may not
    /// declare tree-selecting kinds.
    fn validate(&self) -> Result<(), RegistryError> {
        for (i, option) in self.options.iter().enumerate() {
            if option.kind.is_subcommand()
                || self.options[..i].iter().any(|o| o.name == option.name)
            {
                return Err(RegistryError::DuplicateOption(option.name.clone()));
            }
        }
        Ok(())
    }
}

/// A tree slot: either an invocable leaf or a nesting group, never both.
pub enum CommandNode {
    Command(Command),
    Group(CommandGroup),
}

/// An interior, non-invocable tree node.
pub struct CommandGroup {
    pub description: String,
    pub allowed_mentions: Option<AllowedMentions>,
    children: HashMap<String, CommandNode>,
}

impl CommandGroup {
    pub(crate) fn get(&self, name: &str) -> Option<&CommandNode> {
        self.children.get(name)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// The frozen registration for one application. Read-only after build.
pub struct CommandTree {
    pub(crate) root: CommandGroup,
}

impl CommandTree {
    pub fn builder() -> CommandTreeBuilder {
        CommandTreeBuilder::new()
    }

    /// Flatten the tree into the platform's command-registration schema:
    /// groups become sub-command-group options, commands become sub-command
    /// options, absent descriptions default to a fixed placeholder. Purely
    /// a data transform; entries are sorted by name for stable output.
    pub fn registration_payload(&self) -> Vec<RegistrationEntry> {
        let mut entries: Vec<RegistrationEntry> = self
            .root
            .children
            .iter()
            .map(|(name, node)| registration_entry(name, node))
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }
}

fn or_placeholder(description: &str) -> String {
    if description.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        description.to_string()
    }
}

fn registration_entry(name: &str, node: &CommandNode) -> RegistrationEntry {
    match node {
        CommandNode::Command(command) => RegistrationEntry {
            name: name.to_string(),
            description: or_placeholder(&command.description),
            options: schema_options(command),
            default_permission: command.default_permission,
        },
        CommandNode::Group(group) => RegistrationEntry {
            name: name.to_string(),
            description: or_placeholder(&group.description),
            options: nested_options(group),
            default_permission: true,
        },
    }
}

fn nested_options(group: &CommandGroup) -> Vec<RegistrationOption> {
    let mut options: Vec<RegistrationOption> = group
        .children
        .iter()
        .map(|(name, node)| match node {
            CommandNode::Command(command) => RegistrationOption {
                kind: OptionKind::SubCommand,
                name: name.to_string(),
                description: or_placeholder(&command.description),
                required: false,
                choices: Vec::new(),
                options: schema_options(command),
                autocomplete: false,
            },
            CommandNode::Group(sub) => RegistrationOption {
                kind: OptionKind::SubCommandGroup,
                name: name.to_string(),
                description: or_placeholder(&sub.description),
                required: false,
                choices: Vec::new(),
                options: nested_options(sub),
                autocomplete: false,
            },
        })
        .collect();
    options.sort_by(|a, b| a.name.cmp(&b.name));
    options
}

fn schema_options(command: &Command) -> Vec<RegistrationOption> {
    command
        .options
        .iter()
        .map(|option| RegistrationOption {
            kind: option.kind,
            name: option.name.clone(),
            description: or_placeholder(&option.description),
            required: option.required,
            choices: option.choices.clone(),
            options: Vec::new(),
            autocomplete: option.autocomplete.is_some(),
        })
        .collect()
}

/// One top-level entry of the registration payload.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationEntry {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<RegistrationOption>,
    pub default_permission: bool,
}

/// One flattened option in the registration payload.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationOption {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<RegistrationOption>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub autocomplete: bool,
}

/// Mutable startup-time builder for the command tree.
pub struct CommandTreeBuilder {
    root: GroupBuilder,
}

impl Default for CommandTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTreeBuilder {
    pub fn new() -> Self {
        Self {
            root: GroupBuilder::new(0, String::new()),
        }
    }

    /// Register a top-level command.
    pub fn command(&mut self, name: &str, command: Command) -> Result<&mut Self, RegistryError> {
        self.root.command(name, command)?;
        Ok(self)
    }

    /// Register a top-level group, populated inside the closure.
    pub fn group(
        &mut self,
        name: &str,
        description: &str,
        f: impl FnOnce(&mut GroupBuilder) -> Result<(), RegistryError>,
    ) -> Result<&mut Self, RegistryError> {
        self.root.group(name, description, f)?;
        Ok(self)
    }

    /// Freeze the registration; the returned tree is immutable and safely
    /// shared across dispatches.
    pub fn build(self) -> CommandTree {
        CommandTree {
            root: self.root.freeze(),
        }
    }
}

/// Builder for one group level. Nesting past the sub-command-group level
/// fails with the child map left untouched.
pub struct GroupBuilder {
    depth: u8,
    description: String,
    allowed_mentions: Option<AllowedMentions>,
    children: HashMap<String, CommandNode>,
}

impl GroupBuilder {
    fn new(depth: u8, description: String) -> Self {
        Self {
            depth,
            description,
            allowed_mentions: None,
            children: HashMap::new(),
        }
    }

    /// Number of children registered so far.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Mention-policy override inherited by every child without its own.
    pub fn allowed_mentions(&mut self, mentions: AllowedMentions) -> &mut Self {
        self.allowed_mentions = Some(mentions);
        self
    }

    pub fn command(&mut self, name: &str, command: Command) -> Result<&mut Self, RegistryError> {
        command.validate()?;
        if self.children.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        self.children
            .insert(name.to_string(), CommandNode::Command(command));
        Ok(self)
    }

    pub fn group(
        &mut self,
        name: &str,
        description: &str,
        f: impl FnOnce(&mut GroupBuilder) -> Result<(), RegistryError>,
    ) -> Result<&mut Self, RegistryError> {
        if self.depth + 1 > MAX_GROUP_DEPTH {
            return Err(RegistryError::NestingTooDeep);
        }
        if self.children.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        let mut child = GroupBuilder::new(self.depth + 1, description.to_string());
        f(&mut child)?;
        self.children
            .insert(name.to_string(), CommandNode::Group(child.freeze()));
        Ok(self)
    }

    fn freeze(self) -> CommandGroup {
        CommandGroup {
            description: self.description,
            allowed_mentions: self.allowed_mentions,
            children: self.children,
        }
    }
}
