// # Text Render Backend
//
// This crate renders uiconfig trees as plain text, one line per node.
//
// ## Purpose
//
// - Headless hosts (CLIs, logs, CI)
// - Inspecting what a generated tree looks like
// - Driving edits from text input (`TextBackend::input`)
//
// ## Architecture
//
// Every rendered node owns a `TextWidget` handle. The backend keeps the
// widgets' current lines in render order; `refresh` rewrites a node's line
// from its bound value and `dispose` removes it. `snapshot` joins the visible
// lines into a panel.

use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace};
use uiconfig_core::methods::{Bounds, ConfigMethods};
use uiconfig_core::node::{NodeId, NodeRef};
use uiconfig_core::scheduler::Deferred;
use uiconfig_core::traits::{RenderBackend, RenderHandle};
use uiconfig_core::value::{ObjectValue, Value};
use uiconfig_core::{ChangeProps, Error, Result};

/// One rendered line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub kind: String,
    pub text: String,
    pub hidden: bool,
}

type Lines = Arc<Mutex<IndexMap<NodeId, TextLine>>>;

/// Handle of a node rendered as text
pub struct TextWidget {
    node_id: NodeId,
    lines: Lines,
}

impl RenderHandle for TextWidget {
    fn dispose(&self) {
        self.lines.lock().shift_remove(&self.node_id);
        trace!(node = %self.node_id, "Text widget disposed");
    }
}

/// Plain-text render backend
#[derive(Default)]
pub struct TextBackend {
    lines: Lines,
}

impl TextBackend {
    /// Create a new text backend
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Current line of a node, if it is rendered
    pub fn line(&self, node: &NodeRef) -> Option<TextLine> {
        self.lines.lock().get(node.id()).cloned()
    }

    /// Number of rendered nodes, hidden ones included
    pub fn widget_count(&self) -> usize {
        self.lines.lock().len()
    }

    /// All visible lines joined by newlines, in render order
    pub fn snapshot(&self) -> String {
        self.lines
            .lock()
            .values()
            .filter(|line| !line.hidden)
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Apply text typed by a user to a node
    ///
    /// The text is parsed according to the node's kind: numbers are clamped
    /// to the node's bounds, checkboxes accept `true/false/x/on/off`. The
    /// write is deferred to the node's dispatch phase.
    ///
    /// # Returns
    ///
    /// - `Ok(deferred)`: Resolves to whether the write was accepted
    /// - `Err(Error::InvalidInput)`: The text doesn't parse for this kind, or
    ///   the node is read-only or disabled
    pub fn input(&self, methods: &ConfigMethods, node: &NodeRef, text: &str) -> Result<Deferred<bool>> {
        if methods.is_read_only(node) || methods.is_disabled(node) {
            return Err(Error::invalid_input(format!(
                "{} does not accept input",
                methods.label(node)
            )));
        }

        let kind = node.kind().unwrap_or_default();
        let value = match kind.as_str() {
            "number" | "slider" => {
                let n: f64 = text
                    .trim()
                    .parse()
                    .map_err(|_| Error::invalid_input(format!("Not a number: {text}")))?;
                let bounds = methods.bounds(node, kind == "number");
                Value::from(clamp_to_bounds(n, bounds))
            }
            "checkbox" => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "x" | "on" | "1" => Value::from(true),
                "false" | "" | "off" | "0" => Value::from(false),
                other => return Err(Error::invalid_input(format!("Not a boolean: {other}"))),
            },
            "button" | "folder" | "panel" | "vec" | "color" | "image" | "monitor" => {
                return Err(Error::invalid_input(format!("{kind} nodes take no text input")));
            }
            _ => Value::from(text),
        };

        debug!(node = node.id(), kind = %kind, "Applying text input");
        Ok(methods.write(node, value, ChangeProps::last(true), false, true))
    }

    fn format_line(node: &NodeRef, methods: &ConfigMethods) -> TextLine {
        let kind = node.kind().unwrap_or_else(|| "input".to_string());
        let label = methods.label(node);
        let value = methods.raw_value(node);

        let mut text = match kind.as_str() {
            "folder" | "panel" => {
                let marker = if methods.is_expanded(node) { "-" } else { "+" };
                format!("[{marker}] {label}")
            }
            "button" => format!("[ {label} ]"),
            "checkbox" => {
                let checked = value.as_ref().is_some_and(Value::is_truthy);
                format!("{label}: [{}]", if checked { "x" } else { " " })
            }
            "slider" => {
                let bounds = methods.bounds(node, false);
                format!(
                    "{label}: {} ({}..{}, step {})",
                    display(value.as_ref()),
                    bounds.min,
                    bounds.max,
                    bounds.step
                )
            }
            "dropdown" => {
                let options: Vec<String> = node.children().iter().map(|c| methods.label(c)).collect();
                format!("{label}: {} {{{}}}", display(value.as_ref()), options.join("|"))
            }
            "option" => format!("  - {label}"),
            "image" => format!("{label}: <image>"),
            _ => format!("{label}: {}", display(value.as_ref())),
        };

        if methods.is_disabled(node) {
            text.push_str(" (disabled)");
        } else if methods.is_read_only(node) && kind != "monitor" {
            text.push_str(" (read-only)");
        }

        TextLine {
            hidden: methods.is_hidden(node),
            kind,
            text,
        }
    }
}

/// Clamp into `[min, max]`; reversed or NaN bounds leave the number as typed
fn clamp_to_bounds(n: f64, bounds: Bounds) -> f64 {
    if bounds.min <= bounds.max {
        n.max(bounds.min).min(bounds.max)
    } else {
        n
    }
}

fn display(value: Option<&Value>) -> String {
    match value {
        None => "-".to_string(),
        Some(Value::Object(o)) if o.get("x").is_some() => {
            let parts: Vec<String> = ["x", "y", "z", "w"]
                .iter()
                .filter_map(|k| o.get(k))
                .map(|v| v.to_string())
                .collect();
            format!("({})", parts.join(", "))
        }
        Some(Value::Object(o)) if o.get("r").is_some() => {
            let parts: Vec<String> = ["r", "g", "b"]
                .iter()
                .map(|k| o.get(k).map(|v| v.to_string()).unwrap_or_else(|| "0".to_string()))
                .collect();
            format!("rgb({})", parts.join(", "))
        }
        Some(other) => other.to_string(),
    }
}

impl RenderBackend for TextBackend {
    fn render(&self, node: &NodeRef, methods: &ConfigMethods) -> Result<Box<dyn RenderHandle>> {
        let line = Self::format_line(node, methods);
        trace!(node = node.id(), text = %line.text, "Rendering text widget");
        self.lines.lock().insert(node.id().to_string(), line);
        Ok(Box::new(TextWidget {
            node_id: node.id().to_string(),
            lines: self.lines.clone(),
        }))
    }

    fn refresh(&self, node: &NodeRef, methods: &ConfigMethods) {
        let line = Self::format_line(node, methods);
        if let Some(existing) = self.lines.lock().get_mut(node.id()) {
            *existing = line;
        }
    }

    fn backend_name(&self) -> &str {
        "text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uiconfig_core::node::ConfigNode;
    use uiconfig_core::value::Record;
    use uiconfig_core::{ConfigRenderer, DispatchMode, UiConfigSettings};

    fn renderer() -> (ConfigRenderer, Arc<TextBackend>) {
        let backend = TextBackend::new();
        let (renderer, _rx, _history) =
            ConfigRenderer::with_history(backend.clone(), UiConfigSettings::default()).unwrap();
        renderer.mount().unwrap();
        (renderer, backend)
    }

    #[test]
    fn test_renders_one_line_per_node() {
        let (renderer, backend) = renderer();
        let person = Record::new()
            .with_field("name", "John")
            .with_field("age", 30)
            .with_field("active", true)
            .into_shared();

        renderer.append_child(ConfigNode::builder("input").label("Name").bind(person.clone(), "name").build());
        renderer.append_child(
            ConfigNode::builder("slider")
                .label("Age")
                .bind(person.clone(), "age")
                .bounds(vec![0.0, 150.0])
                .step_size(1.0)
                .build(),
        );
        renderer.append_child(ConfigNode::builder("checkbox").label("Active").bind(person, "active").build());
        renderer.run_frame(Duration::from_millis(16));

        assert_eq!(
            backend.snapshot(),
            "[+] Configuration\nName: John\nAge: 30 (0..150, step 1)\nActive: [x]"
        );
    }

    #[test]
    fn test_refresh_updates_line() {
        let (renderer, backend) = renderer();
        let person = Record::new().with_field("age", 30).into_shared();
        let node = ConfigNode::builder("number").label("Age").bind(person.clone(), "age").build();
        renderer.render_ui_config(&node).unwrap();

        person.insert("age", 31);
        node.request_refresh(false, Some(DispatchMode::PostRender), Duration::ZERO);
        renderer.run_frame(Duration::from_millis(16));

        assert_eq!(backend.line(&node).unwrap().text, "Age: 31");
    }

    #[test]
    fn test_dispose_removes_line() {
        let (renderer, backend) = renderer();
        let node = ConfigNode::builder("button").label("Reset").build();
        renderer.render_ui_config(&node).unwrap();
        assert_eq!(backend.line(&node).unwrap().text, "[ Reset ]");

        renderer.dispose_ui_config(&node, true);
        assert!(backend.line(&node).is_none());
    }

    #[test]
    fn test_hidden_nodes_are_not_shown() {
        let (renderer, backend) = renderer();
        let node = ConfigNode::builder("input").label("Secret").value("x").hidden(true).build();
        renderer.render_ui_config(&node).unwrap();

        assert_eq!(backend.widget_count(), 2);
        assert_eq!(backend.snapshot(), "[+] Configuration");
    }

    #[tokio::test]
    async fn test_number_input_is_clamped() {
        let (renderer, backend) = renderer();
        let person = Record::new().with_field("age", 30).into_shared();
        let node = ConfigNode::builder("slider").bind(person.clone(), "age").bounds(vec![0.0, 150.0]).build();

        let write = backend.input(renderer.methods(), &node, "200").unwrap();
        renderer.run_frame(Duration::from_millis(16));
        assert!(write.await.unwrap());
        assert_eq!(person.get("age"), Some(Value::from(150)));

        assert!(backend.input(renderer.methods(), &node, "abc").is_err());
    }

    #[tokio::test]
    async fn test_unordered_bounds_do_not_clamp() {
        let (renderer, backend) = renderer();
        let record = Record::new().with_field("v", 7).into_shared();
        let lower_only = ConfigNode::builder("slider").bind(record.clone(), "v").bounds(vec![5.0]).build();
        let reversed = ConfigNode::builder("slider").bind(record.clone(), "v").bounds(vec![10.0, 0.0]).build();

        let write = backend.input(renderer.methods(), &lower_only, "6").unwrap();
        renderer.run_frame(Duration::from_millis(16));
        assert!(write.await.unwrap());
        assert_eq!(record.get("v"), Some(Value::from(6)));

        let write = backend.input(renderer.methods(), &reversed, "12").unwrap();
        renderer.run_frame(Duration::from_millis(16));
        assert!(write.await.unwrap());
        assert_eq!(record.get("v"), Some(Value::from(12)));
    }

    #[test]
    fn test_clamp_to_bounds() {
        let bounds = |min, max| Bounds { min, max, step: 1.0 };
        assert_eq!(clamp_to_bounds(200.0, bounds(0.0, 150.0)), 150.0);
        assert_eq!(clamp_to_bounds(-1.0, bounds(0.0, 150.0)), 0.0);
        assert_eq!(clamp_to_bounds(6.0, bounds(5.0, 1.0)), 6.0);
        assert_eq!(clamp_to_bounds(3.0, bounds(f64::NAN, 1.0)), 3.0);
    }

    #[test]
    fn test_read_only_rejects_input() {
        let (renderer, backend) = renderer();
        let node = ConfigNode::builder("input").value("x").read_only(true).build();
        assert!(backend.input(renderer.methods(), &node, "y").is_err());
    }

    #[test]
    fn test_vector_and_color_display() {
        let vec = Record::new().with_field("x", 1).with_field("y", 2).with_field("z", 3).into_shared();
        let color = Record::new().with_field("r", 1).with_field("g", 0.5).into_shared();
        assert_eq!(display(Some(&Value::from(vec))), "(1, 2, 3)");
        assert_eq!(display(Some(&Value::from(color))), "rgb(1, 0.5, 0)");
        assert_eq!(display(None), "-");
    }
}
