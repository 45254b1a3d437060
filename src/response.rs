//! Per-dispatch response accumulation and type inference
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Mention-policy cascade applied at finalize time
//! - 1.0.0: Initial state machine over (explicit tag, data presence, context)
//!
//! A `PendingResponse` is created at the start of a dispatch, written to by
//! the handler through `&self` methods, and finalized exactly once by the
//! dispatch glue. The message data is lazily initialized behind a lock
//! because a handler may write to it from more than one code path.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::DispatchError;
use crate::protocol::{
    ActionRow, AllowedMentions, Embed, InteractionResponse, MessageData, ModalData, ResponseData,
    ResponseKind, EPHEMERAL,
};

/// Mutable accumulator for one dispatch's eventual response.
#[derive(Debug, Default)]
pub struct PendingResponse {
    explicit: Mutex<Option<ResponseKind>>,
    data: Mutex<Option<MessageData>>,
    modal: Mutex<Option<ModalData>>,
}

// A poisoned lock only means a sibling write panicked mid-update; the data
// already written is still the best content available.
fn relock<'a, T>(
    guard: Result<MutexGuard<'a, T>, PoisonError<MutexGuard<'a, T>>>,
) -> MutexGuard<'a, T> {
    guard.unwrap_or_else(PoisonError::into_inner)
}

impl PendingResponse {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_data<R>(&self, f: impl FnOnce(&mut MessageData) -> R) -> R {
        let mut slot = relock(self.data.lock());
        f(slot.get_or_insert_with(MessageData::default))
    }

    /// Set the response text.
    pub fn content(&self, content: impl Into<String>) {
        let content = content.into();
        self.with_data(|d| d.content = Some(content));
    }

    /// Append an embed.
    pub fn add_embed(&self, embed: Embed) {
        self.with_data(|d| d.embeds.get_or_insert_with(Vec::new).push(embed));
    }

    /// Append a component row.
    pub fn add_row(&self, row: ActionRow) {
        self.with_data(|d| d.components.get_or_insert_with(Vec::new).push(row));
    }

    /// Mark the response as visible only to the invoking user.
    pub fn ephemeral(&self) {
        self.with_data(|d| d.flags = Some(d.flags.unwrap_or(0) | EPHEMERAL));
    }

    /// Override the mention policy for this response only. Takes precedence
    /// over every per-scope override and the process-wide default.
    pub fn allowed_mentions(&self, mentions: AllowedMentions) {
        self.with_data(|d| d.allowed_mentions = Some(mentions));
    }

    /// Explicitly acknowledge now and promise a later follow-up message.
    pub fn defer(&self) {
        *relock(self.explicit.lock()) = Some(ResponseKind::DeferredChannelMessageWithSource);
    }

    /// Explicitly acknowledge a component without visible change yet.
    pub fn acknowledge(&self) {
        *relock(self.explicit.lock()) = Some(ResponseKind::DeferredUpdateMessage);
    }

    /// Explicitly treat the response as an update of the source message.
    pub fn edit(&self) {
        *relock(self.explicit.lock()) = Some(ResponseKind::UpdateMessage);
    }

    /// Respond with a modal instead of a message.
    pub fn show_modal(&self, modal: ModalData) {
        *relock(self.modal.lock()) = Some(modal);
        *relock(self.explicit.lock()) = Some(ResponseKind::Modal);
    }

    /// The explicitly requested response kind, if any.
    pub(crate) fn explicit_kind(&self) -> Option<ResponseKind> {
        *relock(self.explicit.lock())
    }

    /// True once any message data has been written.
    pub(crate) fn has_data(&self) -> bool {
        relock(self.data.lock()).is_some()
    }

    /// Snapshot of the written message data with the mention-policy cascade
    /// applied: per-response policy, else the nearest-ancestor override,
    /// else the process-wide default.
    pub(crate) fn resolved_data(
        &self,
        inherited: Option<&AllowedMentions>,
        default: &AllowedMentions,
    ) -> Option<MessageData> {
        let mut data = relock(self.data.lock()).clone()?;
        if data.allowed_mentions.is_none() {
            data.allowed_mentions = Some(inherited.unwrap_or(default).clone());
        }
        Some(data)
    }

    /// Collapse the accumulated state into the outbound response.
    ///
    /// Explicit kinds are used verbatim. Otherwise the kind is inferred
    /// from data presence and execution context; a command that produced
    /// neither data nor a deferred acknowledgement is a contract violation.
    /// Pure over the accumulated state: calling it twice without further
    /// writes yields identical output.
    pub(crate) fn finalize(
        &self,
        component_context: bool,
        inherited: Option<&AllowedMentions>,
        default: &AllowedMentions,
    ) -> Result<InteractionResponse, DispatchError> {
        if let Some(kind) = self.explicit_kind() {
            let data = match kind {
                ResponseKind::Modal => relock(self.modal.lock()).clone().map(ResponseData::Modal),
                // Deferred acknowledgements carry no payload; any written
                // data is reconciled by the glue through a follow-up edit.
                k if k.is_deferred() => None,
                _ => self
                    .resolved_data(inherited, default)
                    .map(ResponseData::Message),
            };
            return Ok(InteractionResponse { kind, data });
        }

        match self.resolved_data(inherited, default) {
            None if component_context => Ok(InteractionResponse {
                kind: ResponseKind::DeferredUpdateMessage,
                data: None,
            }),
            None => Err(DispatchError::NoResponse),
            Some(data) => Ok(InteractionResponse {
                kind: if component_context {
                    ResponseKind::UpdateMessage
                } else {
                    ResponseKind::ChannelMessageWithSource
                },
                data: Some(ResponseData::Message(data)),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_mentions() -> AllowedMentions {
        AllowedMentions::none()
    }

    fn finalize(
        pending: &PendingResponse,
        component_context: bool,
    ) -> Result<InteractionResponse, DispatchError> {
        pending.finalize(component_context, None, &default_mentions())
    }

    #[test]
    fn test_no_data_command_context_is_contract_violation() {
        let pending = PendingResponse::new();
        assert!(matches!(
            finalize(&pending, false),
            Err(DispatchError::NoResponse)
        ));
    }

    #[test]
    fn test_no_data_component_context_defers_update() {
        let pending = PendingResponse::new();
        let response = finalize(&pending, true).unwrap();
        assert_eq!(response.kind, ResponseKind::DeferredUpdateMessage);
        assert!(response.data.is_none());
    }

    #[test]
    fn test_data_infers_kind_per_context() {
        let pending = PendingResponse::new();
        pending.content("hello");
        assert_eq!(
            finalize(&pending, true).unwrap().kind,
            ResponseKind::UpdateMessage
        );
        assert_eq!(
            finalize(&pending, false).unwrap().kind,
            ResponseKind::ChannelMessageWithSource
        );
    }

    #[test]
    fn test_explicit_kind_wins_over_inference() {
        let pending = PendingResponse::new();
        pending.content("later");
        pending.defer();
        let response = finalize(&pending, false).unwrap();
        assert_eq!(response.kind, ResponseKind::DeferredChannelMessageWithSource);
        assert!(response.data.is_none());

        let pending = PendingResponse::new();
        pending.acknowledge();
        let response = finalize(&pending, true).unwrap();
        assert_eq!(response.kind, ResponseKind::DeferredUpdateMessage);
    }

    #[test]
    fn test_explicit_edit_in_command_context() {
        let pending = PendingResponse::new();
        pending.edit();
        pending.content("patched");
        let response = finalize(&pending, false).unwrap();
        assert_eq!(response.kind, ResponseKind::UpdateMessage);
        assert!(response.data.is_some());
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let pending = PendingResponse::new();
        pending.content("same");
        pending.ephemeral();
        let first = finalize(&pending, false).unwrap();
        let second = finalize(&pending, false).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_mention_cascade() {
        let default = AllowedMentions::none();
        let inherited = AllowedMentions::users_only();

        // No per-response policy: nearest-ancestor override applies.
        let pending = PendingResponse::new();
        pending.content("hi");
        let response = pending.finalize(false, Some(&inherited), &default).unwrap();
        let Some(ResponseData::Message(data)) = response.data else {
            panic!("expected message data");
        };
        assert_eq!(data.allowed_mentions, Some(inherited.clone()));

        // No override anywhere: process-wide default applies.
        let pending = PendingResponse::new();
        pending.content("hi");
        let response = pending.finalize(false, None, &default).unwrap();
        let Some(ResponseData::Message(data)) = response.data else {
            panic!("expected message data");
        };
        assert_eq!(data.allowed_mentions, Some(default.clone()));

        // Per-response policy beats both.
        let own = AllowedMentions {
            parse: vec!["roles".to_string()],
            ..AllowedMentions::default()
        };
        let pending = PendingResponse::new();
        pending.content("hi");
        pending.allowed_mentions(own.clone());
        let response = pending.finalize(false, Some(&inherited), &default).unwrap();
        let Some(ResponseData::Message(data)) = response.data else {
            panic!("expected message data");
        };
        assert_eq!(data.allowed_mentions, Some(own));
    }

    #[test]
    fn test_multiple_write_paths_accumulate() {
        let pending = PendingResponse::new();
        pending.add_embed(Embed {
            title: Some("one".to_string()),
            ..Embed::default()
        });
        pending.add_row(ActionRow::new(vec![]));
        pending.content("text");
        let data = pending
            .resolved_data(None, &default_mentions())
            .unwrap();
        assert_eq!(data.content.as_deref(), Some("text"));
        assert_eq!(data.embeds.unwrap().len(), 1);
        assert_eq!(data.components.unwrap().len(), 1);
    }

    #[test]
    fn test_show_modal() {
        let pending = PendingResponse::new();
        pending.show_modal(ModalData {
            custom_id: "/feedback".to_string(),
            title: "Feedback".to_string(),
            components: vec![],
        });
        let response = finalize(&pending, false).unwrap();
        assert_eq!(response.kind, ResponseKind::Modal);
        match response.data {
            Some(ResponseData::Modal(modal)) => assert_eq!(modal.custom_id, "/feedback"),
            other => panic!("expected modal data, got {other:?}"),
        }
    }

    #[test]
    fn test_fresh_builder_state() {
        let pending = PendingResponse::new();
        assert!(pending.explicit_kind().is_none());
        assert!(!pending.has_data());
        pending.ephemeral();
        assert!(pending.has_data());
    }
}
