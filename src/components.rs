//! # Component and Modal Routing
//!
//! Handlers for message components (buttons, selects) and modal submissions,
//! keyed by parameterized custom-identifier routes.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! Both routers are thin wrappers over [`PathTrie`]. Every router is born
//! with the reserved void route bound to a no-op handler, so UI elements
//! that should do nothing (expired pagination arrows, disabled toggles) can
//! point at a stable identifier instead of falling through to "route not
//! found".

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::error::RegistryError;
use crate::protocol::Interaction;
use crate::response::PendingResponse;
use crate::routes::{PathTrie, RouteParams, VOID_ROUTE};

/// Handler for one component route.
#[async_trait]
pub trait ComponentHandler: Send + Sync {
    async fn handle(&self, ctx: &ComponentContext<'_>) -> Result<()>;
}

/// Handler for one modal-submission route.
#[async_trait]
pub trait ModalHandler: Send + Sync {
    async fn handle(&self, ctx: &ModalContext<'_>) -> Result<()>;
}

/// Context for a component interaction: captured route parameters plus the
/// values selected in a select menu (empty for buttons).
pub struct ComponentContext<'a> {
    pub interaction: &'a Interaction,
    pub response: &'a PendingResponse,
    params: RouteParams,
    values: &'a [String],
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(
        interaction: &'a Interaction,
        response: &'a PendingResponse,
        params: RouteParams,
        values: &'a [String],
    ) -> Self {
        Self {
            interaction,
            response,
            params,
            values,
        }
    }

    /// A parameter captured from the matched route pattern.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Values selected in the select menu that fired this interaction.
    pub fn values(&self) -> &[String] {
        self.values
    }
}

/// Context for a modal submission: captured route parameters plus the
/// submitted fields flattened into a custom-id → value map.
pub struct ModalContext<'a> {
    pub interaction: &'a Interaction,
    pub response: &'a PendingResponse,
    params: RouteParams,
    fields: HashMap<&'a str, &'a str>,
}

impl<'a> ModalContext<'a> {
    pub(crate) fn new(
        interaction: &'a Interaction,
        response: &'a PendingResponse,
        params: RouteParams,
    ) -> Self {
        let fields = interaction
            .data
            .as_ref()
            .map(|data| {
                data.components
                    .iter()
                    .flat_map(|row| &row.components)
                    .map(|field| (field.custom_id.as_str(), field.value.as_str()))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            interaction,
            response,
            params,
            fields,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The submitted value of one input field, by its custom id.
    pub fn field(&self, custom_id: &str) -> Option<&str> {
        self.fields.get(custom_id).copied()
    }

    pub fn fields(&self) -> &HashMap<&'a str, &'a str> {
        &self.fields
    }
}

/// Accepts everything, changes nothing. Finalization of an untouched
/// response in component context yields a deferred update, i.e. a no-op.
struct VoidHandler;

#[async_trait]
impl ComponentHandler for VoidHandler {
    async fn handle(&self, _ctx: &ComponentContext<'_>) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl ModalHandler for VoidHandler {
    async fn handle(&self, _ctx: &ModalContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Startup-time builder for the component route table.
pub struct ComponentRouterBuilder {
    trie: PathTrie<Arc<dyn ComponentHandler>>,
}

impl Default for ComponentRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRouterBuilder {
    pub fn new() -> Self {
        let mut trie: PathTrie<Arc<dyn ComponentHandler>> = PathTrie::new();
        // A fresh trie cannot conflict with the reserved route.
        let _ = trie.register(VOID_ROUTE, Arc::new(VoidHandler));
        Self { trie }
    }

    /// Register a route pattern; `:name` segments capture parameters.
    pub fn route(
        &mut self,
        pattern: &str,
        handler: Arc<dyn ComponentHandler>,
    ) -> Result<&mut Self, RegistryError> {
        self.trie.register(pattern, handler)?;
        Ok(self)
    }

    pub fn build(self) -> ComponentRouter {
        ComponentRouter { trie: self.trie }
    }
}

/// Frozen component route table, shared across dispatches.
pub struct ComponentRouter {
    trie: PathTrie<Arc<dyn ComponentHandler>>,
}

impl Default for ComponentRouter {
    fn default() -> Self {
        ComponentRouterBuilder::new().build()
    }
}

impl ComponentRouter {
    pub fn builder() -> ComponentRouterBuilder {
        ComponentRouterBuilder::new()
    }

    pub(crate) fn lookup(&self, custom_id: &str) -> Option<(&Arc<dyn ComponentHandler>, RouteParams)> {
        self.trie.matches(custom_id)
    }
}

/// Startup-time builder for the modal route table.
pub struct ModalRouterBuilder {
    trie: PathTrie<Arc<dyn ModalHandler>>,
}

impl Default for ModalRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalRouterBuilder {
    pub fn new() -> Self {
        let mut trie: PathTrie<Arc<dyn ModalHandler>> = PathTrie::new();
        let _ = trie.register(VOID_ROUTE, Arc::new(VoidHandler));
        Self { trie }
    }

    pub fn route(
        &mut self,
        pattern: &str,
        handler: Arc<dyn ModalHandler>,
    ) -> Result<&mut Self, RegistryError> {
        self.trie.register(pattern, handler)?;
        Ok(self)
    }

    pub fn build(self) -> ModalRouter {
        ModalRouter { trie: self.trie }
    }
}

/// Frozen modal route table, shared across dispatches.
pub struct ModalRouter {
    trie: PathTrie<Arc<dyn ModalHandler>>,
}

impl Default for ModalRouter {
    fn default() -> Self {
        ModalRouterBuilder::new().build()
    }
}

impl ModalRouter {
    pub fn builder() -> ModalRouterBuilder {
        ModalRouterBuilder::new()
    }

    pub(crate) fn lookup(&self, custom_id: &str) -> Option<(&Arc<dyn ModalHandler>, RouteParams)> {
        self.trie.matches(custom_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interaction(raw: serde_json::Value) -> Interaction {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_void_route_preregistered() {
        let router = ComponentRouter::default();
        assert!(router.lookup(VOID_ROUTE).is_some());
        let router = ModalRouter::default();
        assert!(router.lookup(VOID_ROUTE).is_some());
    }

    #[test]
    fn test_route_params_reach_lookup() {
        struct Probe;
        #[async_trait]
        impl ComponentHandler for Probe {
            async fn handle(&self, _ctx: &ComponentContext<'_>) -> Result<()> {
                Ok(())
            }
        }

        let mut builder = ComponentRouter::builder();
        builder.route("/set/:number", Arc::new(Probe)).unwrap();
        let router = builder.build();

        let (_, params) = router.lookup("/set/42").unwrap();
        assert_eq!(params["number"], "42");
        assert!(router.lookup("/unset/42").is_none());
    }

    #[test]
    fn test_conflicting_route_rejected() {
        struct Probe;
        #[async_trait]
        impl ComponentHandler for Probe {
            async fn handle(&self, _ctx: &ComponentContext<'_>) -> Result<()> {
                Ok(())
            }
        }

        let mut builder = ComponentRouter::builder();
        builder.route("/a/:x", Arc::new(Probe)).unwrap();
        assert!(builder.route("/a/:y", Arc::new(Probe)).is_err());
    }

    #[test]
    fn test_modal_fields_flatten_across_rows() {
        let itx = interaction(serde_json::json!({
            "id": "1",
            "application_id": "2",
            "type": 5,
            "token": "tok",
            "data": {
                "custom_id": "/feedback",
                "components": [
                    { "components": [ { "custom_id": "topic", "value": "routing" } ] },
                    { "components": [ { "custom_id": "body", "value": "works" } ] }
                ]
            }
        }));
        let response = PendingResponse::new();
        let ctx = ModalContext::new(&itx, &response, RouteParams::new());
        assert_eq!(ctx.field("topic"), Some("routing"));
        assert_eq!(ctx.field("body"), Some("works"));
        assert_eq!(ctx.field("missing"), None);
        assert_eq!(ctx.fields().len(), 2);
    }

    #[test]
    fn test_component_context_values() {
        let itx = interaction(serde_json::json!({
            "id": "1",
            "application_id": "2",
            "type": 3,
            "token": "tok",
            "data": {
                "custom_id": "/pick",
                "component_type": 3,
                "values": ["red", "blue"]
            }
        }));
        let response = PendingResponse::new();
        let values = itx.data.as_ref().map(|d| d.values.as_slice()).unwrap_or(&[]);
        let mut params = RouteParams::new();
        params.insert("k".to_string(), "v".to_string());
        let ctx = ComponentContext::new(&itx, &response, params, values);
        assert_eq!(ctx.values(), ["red", "blue"]);
        assert_eq!(ctx.param("k"), Some("v"));
        assert_eq!(ctx.param("other"), None);
    }
}
