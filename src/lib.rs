// Fault taxonomy - registration and dispatch errors
pub mod error;

// Wire layer - inbound and outbound protocol model
pub mod protocol;

// Entity layer - lazy handles over resolved side tables
pub mod resolved;

// Routing layer - parameterized custom-id matching
pub mod routes;

// Response layer - per-dispatch accumulation and type inference
pub mod response;

// Application layer - command tree, component/modal routing, dispatch glue
pub mod commands;
pub mod components;
pub mod dispatch;

// Re-export the types a typical integration touches
pub use commands::{
    // Tree construction
    Command, CommandOption, CommandTree, CommandTreeBuilder, GroupBuilder,
    // Handler surface
    AutocompleteContext, AutocompleteHandler, CommandContext, CommandHandler, OptionValue,
};
pub use components::{
    ComponentContext, ComponentHandler, ComponentRouter, ComponentRouterBuilder, ModalContext,
    ModalHandler, ModalRouter, ModalRouterBuilder,
};
pub use dispatch::{
    DefaultFaultHandler, Dispatcher, FaultHandler, NoopRestClient, RestClient,
};
pub use error::{DispatchError, RegistryError};
pub use protocol::{
    AllowedMentions, Choice, Interaction, InteractionKind, InteractionResponse, MessageData,
    ModalData, ResponseKind, EPHEMERAL,
};
pub use response::PendingResponse;
pub use routes::{PathTrie, RouteParams, VOID_ROUTE};
