//! # Dispatch Glue
//!
//! The single entry point turning one inbound interaction into one
//! protocol-legal response.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Deferred responses with written data reconciled via follow-up edit
//! - 1.0.0: Initial kind switch with panic containment
//!
//! `dispatch` never returns an error and never unwinds: every fault,
//! including a handler panic, is converted into a response by the injected
//! fault handler. The dispatcher owns no per-request state; one
//! `PendingResponse` is created per call and dropped with it, so a single
//! dispatcher is shared freely across concurrent requests.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::FutureExt;
use log::{debug, error, warn};
use uuid::Uuid;

use crate::commands::resolve::resolve_options;
use crate::commands::{AutocompleteContext, CommandContext, CommandTree};
use crate::components::{ComponentContext, ComponentRouter, ModalContext, ModalRouter};
use crate::error::DispatchError;
use crate::protocol::{
    AllowedMentions, AutocompleteData, Interaction, InteractionKind, InteractionResponse,
    MessageData, ResponseData, ResponseKind,
};
use crate::response::PendingResponse;

/// Platform cap on choices in one autocomplete response.
const MAX_AUTOCOMPLETE_CHOICES: usize = 25;

/// Converts a dispatch fault into the response the user sees.
#[async_trait]
pub trait FaultHandler: Send + Sync {
    async fn handle(&self, interaction: &Interaction, error: &DispatchError)
        -> InteractionResponse;
}

/// Replies with the fault text as an ephemeral message.
pub struct DefaultFaultHandler;

#[async_trait]
impl FaultHandler for DefaultFaultHandler {
    async fn handle(
        &self,
        _interaction: &Interaction,
        error: &DispatchError,
    ) -> InteractionResponse {
        InteractionResponse::message(
            MessageData::text(format!("Something went wrong: {error}")).ephemeral(),
        )
    }
}

/// Transport collaborator for follow-up edits against the platform's REST
/// surface. Injected so the core stays free of HTTP concerns.
#[async_trait]
pub trait RestClient: Send + Sync {
    async fn edit_original_response(
        &self,
        application_id: &str,
        token: &str,
        data: &MessageData,
    ) -> Result<()>;
}

/// Discards follow-up edits. For deployments that answer the webhook only.
pub struct NoopRestClient;

#[async_trait]
impl RestClient for NoopRestClient {
    async fn edit_original_response(
        &self,
        _application_id: &str,
        _token: &str,
        _data: &MessageData,
    ) -> Result<()> {
        Ok(())
    }
}

/// The shared, immutable dispatch core: registries plus injected
/// collaborators, configured once at startup.
pub struct Dispatcher {
    tree: CommandTree,
    components: ComponentRouter,
    modals: ModalRouter,
    on_fault: Arc<dyn FaultHandler>,
    rest: Arc<dyn RestClient>,
    default_mentions: AllowedMentions,
}

impl Dispatcher {
    /// A dispatcher with empty routers, the default fault handler, no REST
    /// transport and an all-suppressing default mention policy.
    pub fn new(tree: CommandTree) -> Self {
        Self {
            tree,
            components: ComponentRouter::default(),
            modals: ModalRouter::default(),
            on_fault: Arc::new(DefaultFaultHandler),
            rest: Arc::new(NoopRestClient),
            default_mentions: AllowedMentions::none(),
        }
    }

    pub fn with_components(mut self, components: ComponentRouter) -> Self {
        self.components = components;
        self
    }

    pub fn with_modals(mut self, modals: ModalRouter) -> Self {
        self.modals = modals;
        self
    }

    pub fn with_fault_handler(mut self, handler: Arc<dyn FaultHandler>) -> Self {
        self.on_fault = handler;
        self
    }

    pub fn with_rest_client(mut self, rest: Arc<dyn RestClient>) -> Self {
        self.rest = rest;
        self
    }

    /// Process-wide mention policy applied when neither the response nor any
    /// registration scope overrides it.
    pub fn with_default_mentions(mut self, mentions: AllowedMentions) -> Self {
        self.default_mentions = mentions;
        self
    }

    /// Serve one interaction. Infallible by construction: faults are routed
    /// through the fault handler and panics are contained per dispatch.
    pub async fn dispatch(&self, interaction: &Interaction) -> InteractionResponse {
        let request_id = Uuid::new_v4();
        debug!(
            "[{request_id}] Dispatching {:?} interaction {}",
            interaction.kind, interaction.id
        );
        match self.try_dispatch(interaction, request_id).await {
            Ok(response) => response,
            Err(fault) => {
                if fault.is_handler_fault() {
                    error!("[{request_id}] Handler fault: {fault}");
                } else {
                    warn!("[{request_id}] Dispatch fault: {fault}");
                }
                self.on_fault.handle(interaction, &fault).await
            }
        }
    }

    async fn try_dispatch(
        &self,
        interaction: &Interaction,
        request_id: Uuid,
    ) -> Result<InteractionResponse, DispatchError> {
        match interaction.kind {
            InteractionKind::Ping => Ok(InteractionResponse::pong()),
            InteractionKind::ApplicationCommand => {
                self.dispatch_command(interaction, request_id).await
            }
            InteractionKind::Autocomplete => {
                self.dispatch_autocomplete(interaction, request_id).await
            }
            InteractionKind::MessageComponent => {
                self.dispatch_component(interaction, request_id).await
            }
            InteractionKind::ModalSubmit => self.dispatch_modal(interaction, request_id).await,
        }
    }

    async fn dispatch_command(
        &self,
        interaction: &Interaction,
        request_id: Uuid,
    ) -> Result<InteractionResponse, DispatchError> {
        let data = interaction
            .data
            .as_ref()
            .ok_or(DispatchError::MalformedPayload("data"))?;
        let name = data
            .name
            .as_deref()
            .ok_or(DispatchError::MalformedPayload("data.name"))?;

        let leaf = self.tree.resolve_leaf(name, &data.options)?;
        let values = resolve_options(leaf.command, leaf.options, interaction.resolved())?;

        let pending = PendingResponse::new();
        let ctx = CommandContext::new(interaction, &pending, values);
        run_guarded(leaf.command.handler.handle(&ctx), request_id).await?;

        let response = pending.finalize(false, leaf.mentions, &self.default_mentions)?;
        self.reconcile_deferred(interaction, &pending, &response, leaf.mentions, request_id)
            .await;
        Ok(response)
    }

    async fn dispatch_autocomplete(
        &self,
        interaction: &Interaction,
        request_id: Uuid,
    ) -> Result<InteractionResponse, DispatchError> {
        let data = interaction
            .data
            .as_ref()
            .ok_or(DispatchError::MalformedPayload("data"))?;
        let name = data
            .name
            .as_deref()
            .ok_or(DispatchError::MalformedPayload("data.name"))?;

        let leaf = self.tree.resolve_leaf(name, &data.options)?;
        let focused = leaf
            .options
            .iter()
            .find(|option| option.focused)
            .ok_or(DispatchError::MalformedPayload("focused option"))?;
        let declared = leaf
            .command
            .find_option(&focused.name)
            .ok_or_else(|| DispatchError::UnknownOption(focused.name.clone()))?;
        let callback = declared
            .autocomplete
            .as_ref()
            .ok_or_else(|| DispatchError::NoAutocomplete(focused.name.clone()))?;

        let ctx = AutocompleteContext::new(interaction, focused);
        let mut choices = run_guarded(callback.complete(&ctx), request_id).await?;
        if choices.len() > MAX_AUTOCOMPLETE_CHOICES {
            warn!(
                "[{request_id}] Autocomplete for `{}` produced {} choices, keeping the first {}",
                focused.name,
                choices.len(),
                MAX_AUTOCOMPLETE_CHOICES
            );
            choices.truncate(MAX_AUTOCOMPLETE_CHOICES);
        }

        Ok(InteractionResponse {
            kind: ResponseKind::AutocompleteResult,
            data: Some(ResponseData::Autocomplete(AutocompleteData { choices })),
        })
    }

    async fn dispatch_component(
        &self,
        interaction: &Interaction,
        request_id: Uuid,
    ) -> Result<InteractionResponse, DispatchError> {
        let data = interaction
            .data
            .as_ref()
            .ok_or(DispatchError::MalformedPayload("data"))?;
        let custom_id = data
            .custom_id
            .as_deref()
            .ok_or(DispatchError::MalformedPayload("data.custom_id"))?;
        let (handler, params) = self
            .components
            .lookup(custom_id)
            .ok_or_else(|| DispatchError::UnknownRoute(custom_id.to_string()))?;

        let pending = PendingResponse::new();
        let ctx = ComponentContext::new(interaction, &pending, params, &data.values);
        run_guarded(handler.handle(&ctx), request_id).await?;

        let response = pending.finalize(true, None, &self.default_mentions)?;
        self.reconcile_deferred(interaction, &pending, &response, None, request_id)
            .await;
        Ok(response)
    }

    async fn dispatch_modal(
        &self,
        interaction: &Interaction,
        request_id: Uuid,
    ) -> Result<InteractionResponse, DispatchError> {
        let data = interaction
            .data
            .as_ref()
            .ok_or(DispatchError::MalformedPayload("data"))?;
        let custom_id = data
            .custom_id
            .as_deref()
            .ok_or(DispatchError::MalformedPayload("data.custom_id"))?;
        let (handler, params) = self
            .modals
            .lookup(custom_id)
            .ok_or_else(|| DispatchError::UnknownRoute(custom_id.to_string()))?;

        let pending = PendingResponse::new();
        let ctx = ModalContext::new(interaction, &pending, params);
        run_guarded(handler.handle(&ctx), request_id).await?;

        // A submitted modal sits on a message, so it finalizes like a
        // component: untouched state becomes a silent acknowledgement.
        let response = pending.finalize(true, None, &self.default_mentions)?;
        self.reconcile_deferred(interaction, &pending, &response, None, request_id)
            .await;
        Ok(response)
    }

    /// A deferred acknowledgement with message data already written means
    /// the handler wanted both: acknowledge now, show the content as soon
    /// as possible. The content goes out as a follow-up edit; a transport
    /// failure is logged and never replaces the acknowledgement.
    async fn reconcile_deferred(
        &self,
        interaction: &Interaction,
        pending: &PendingResponse,
        response: &InteractionResponse,
        inherited: Option<&AllowedMentions>,
        request_id: Uuid,
    ) {
        if !response.kind.is_deferred() {
            return;
        }
        let Some(data) = pending.resolved_data(inherited, &self.default_mentions) else {
            return;
        };
        match self
            .rest
            .edit_original_response(&interaction.application_id, &interaction.token, &data)
            .await
        {
            Ok(()) => debug!("[{request_id}] Deferred response reconciled via follow-up edit"),
            Err(fault) => {
                warn!("[{request_id}] Follow-up edit for deferred response failed: {fault:#}")
            }
        }
    }
}

/// Run a handler future with panic containment. A panic is demoted to a
/// [`DispatchError::HandlerPanic`] carrying the payload text, so downstream
/// treatment is identical to a returned error.
async fn run_guarded<T>(
    fut: impl Future<Output = Result<T>>,
    request_id: Uuid,
) -> Result<T, DispatchError> {
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(fault)) => Err(DispatchError::Handler(fault)),
        Err(payload) => {
            let message = panic_message(payload);
            error!("[{request_id}] Handler panicked: {message}");
            Err(DispatchError::HandlerPanic(message))
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
