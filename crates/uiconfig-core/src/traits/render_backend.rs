// # Render Backend Trait
//
// Defines the interface between the binding layer and a concrete UI toolkit.
//
// ## Purpose
//
// A backend owns the kind → widget table. The binding layer never knows what
// a "slider" looks like; it only asks the backend to render a node once and
// to refresh it whenever its bound value may have changed.
//
// ## Implementations
//
// - `uiconfig-text`: plain-text rendering, used by the demo host and tests
// - Future: immediate-mode GUI toolkits, web front-ends
//
// ## Usage
//
// ```rust,ignore
// use uiconfig_core::{ConfigRenderer, UiConfigSettings};
//
// let (renderer, events) = ConfigRenderer::new(backend, methods, UiConfigSettings::default())?;
// renderer.render_ui_config(&node)?;
// renderer.run_frame(std::time::Duration::from_millis(16));
// ```

use crate::methods::ConfigMethods;
use crate::node::NodeRef;

/// Renderer-owned resource attached to a rendered node
///
/// Released through [`dispose`](RenderHandle::dispose) when the node is
/// disposed or re-rendered as a different kind.
pub trait RenderHandle: Send + Sync {
    /// Release the resource
    fn dispose(&self) {}
}

/// Trait for render backends
///
/// # Backend Boundaries
///
/// ## Allowed Capabilities
/// - ✅ Read node attributes and bound values through [`ConfigMethods`]
/// - ✅ Issue writes and clicks through [`ConfigMethods`] in response to user input
/// - ✅ Keep per-node widget state inside the returned handle
///
/// ## Forbidden Capabilities
/// - ❌ Render children: the renderer walks the tree and renders each child itself
/// - ❌ Write to application state directly (bypasses change events and undo)
/// - ❌ Block inside `refresh` (it runs inside a dispatch phase)
pub trait RenderBackend: Send + Sync {
    /// Render a node for the first time (or again after its kind changed)
    ///
    /// # Parameters
    ///
    /// - `node`: The node to render; its kind is already defaulted
    /// - `methods`: Value pipeline for reading labels, values and bounds
    ///
    /// # Returns
    ///
    /// - `Ok(handle)`: Resource stored on the node until it's disposed
    /// - `Err(Error)`: The node could not be rendered; it stays unrendered
    fn render(&self, node: &NodeRef, methods: &ConfigMethods) -> crate::Result<Box<dyn RenderHandle>>;

    /// Refresh an already rendered node from its current bound value
    fn refresh(&self, node: &NodeRef, methods: &ConfigMethods);

    /// Get the backend name (for logging)
    fn backend_name(&self) -> &str;
}
