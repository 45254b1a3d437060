//! Fault taxonomy for registration and dispatch
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! Two separate enums on purpose: `RegistryError` is returned synchronously
//! while the command tree and route tables are being built, `DispatchError`
//! covers everything that can go wrong while serving one interaction. A
//! `DispatchError` never escapes the dispatcher raw; it is always converted
//! into a protocol-legal response by the injected fault handler.

use thiserror::Error;

use crate::protocol::OptionKind;

/// Faults raised while building the command tree or route tables.
///
/// These are caller mistakes and must surface at startup, never at dispatch
/// time. A failed registration leaves the structure being built unmodified.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Command groups may nest one level below the root and no further.
    #[error("command group nesting exceeds the sub-command-group limit")]
    NestingTooDeep,

    /// A command or group with this name already exists at this level.
    #[error("`{0}` is already registered at this level")]
    DuplicateName(String),

    /// Two option descriptors in the same command schema share a name.
    #[error("duplicate option `{0}` in command schema")]
    DuplicateOption(String),

    /// The route pattern collides with an already registered pattern
    /// (same literal/parameter shape at the same position).
    #[error("route `{0}` conflicts with an existing pattern")]
    AmbiguousRoute(String),
}

/// Faults raised while dispatching one interaction.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The named top-level or nested command does not exist.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    /// The named sub-command group does not exist.
    #[error("unknown command group `{0}`")]
    UnknownGroup(String),

    /// A sub-command option named something that is registered as a group.
    #[error("`{0}` is a command group, not a command")]
    ExpectedCommand(String),

    /// A sub-command-group option named something registered as a command.
    #[error("`{0}` is a command, not a command group")]
    ExpectedGroup(String),

    /// An interior tree node received the wrong number of options, or an
    /// option that is not a sub-command / sub-command-group.
    #[error("expected exactly one sub-command option at this level, got {0}")]
    ExpectedSubcommand(usize),

    /// A supplied option is not declared in the command's schema.
    #[error("option `{0}` is not declared by this command")]
    UnknownOption(String),

    /// The supplied option type disagrees with the declared schema.
    #[error("option `{name}` is declared as {declared:?} but was supplied as {supplied:?}")]
    MismatchedOption {
        name: String,
        declared: OptionKind,
        supplied: OptionKind,
    },

    /// The focused option has no registered autocomplete callback.
    #[error("option `{0}` has no autocomplete callback")]
    NoAutocomplete(String),

    /// No component/modal route matches the custom identifier.
    #[error("no route matches custom id `{0}`")]
    UnknownRoute(String),

    /// A command handler returned without writing response data and without
    /// an explicit deferred acknowledgement.
    #[error("command produced no response data and no deferred acknowledgement")]
    NoResponse,

    /// The inbound envelope is missing a field the kind requires.
    #[error("interaction payload is missing `{0}`")]
    MalformedPayload(&'static str),

    /// A handler panicked; the payload message is preserved so the fault
    /// handler sees the same text as a returned error would carry.
    #[error("{0}")]
    HandlerPanic(String),

    /// A handler returned a fault of its own.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl DispatchError {
    /// True for faults produced by handler code rather than the framework.
    pub fn is_handler_fault(&self) -> bool {
        matches!(self, Self::Handler(_) | Self::HandlerPanic(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_and_error_display_identically() {
        let from_panic = DispatchError::HandlerPanic("boom".to_string());
        let from_error = DispatchError::Handler(anyhow::anyhow!("boom"));
        assert_eq!(from_panic.to_string(), from_error.to_string());
    }

    #[test]
    fn test_is_handler_fault() {
        assert!(DispatchError::HandlerPanic("x".into()).is_handler_fault());
        assert!(DispatchError::Handler(anyhow::anyhow!("x")).is_handler_fault());
        assert!(!DispatchError::NoResponse.is_handler_fault());
        assert!(!DispatchError::UnknownCommand("ping".into()).is_handler_fault());
    }
}
