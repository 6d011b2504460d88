// # uiconfig-demo - Text-mode demo host
//
// This binary is a THIN host around uiconfig-core and uiconfig-text. It
// owns no binding or undo logic of its own.
//
// The demo is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering the demo `Person` class and generating its panel
// 4. Driving the renderer's frame loop and applying commands
//
// ## Configuration
//
// - `UICONFIG_SETTINGS_FILE`: JSON file with `UiConfigSettings` (optional)
// - `UICONFIG_FRAME_INTERVAL_MS`: Frame interval override
// - `UICONFIG_UNDO_WINDOW_MS`: Undo coalescing window override
// - `UICONFIG_HISTORY_CAPACITY`: Undo history capacity override
// - `UICONFIG_SCRIPT`: `;`-separated commands to run instead of the default script
// - `UICONFIG_INTERACTIVE`: Read commands from stdin when set to `1`/`true`
// - `UICONFIG_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Commands
//
// - `show`: Print the panel
// - `set <field> <value>`: Type a value into a field
// - `click <field>`: Click a button
// - `undo` / `redo`
// - `history`: Print the undo/redo stack sizes
// - `quit` (interactive only)
//
// ## Example
//
// ```bash
// UICONFIG_SCRIPT="set age 35; undo; show" uiconfig-demo
// ```

use anyhow::{Context, Result, anyhow};
use std::env;
use std::process::ExitCode;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use uiconfig_core::node::{Child, Listeners, NodeRef};
use uiconfig_core::registry::{ClassRegistry, FieldDescriptor, FieldParams};
use uiconfig_core::tree::{container_folder, flatten};
use uiconfig_core::value::{Action, ClickOutcome, ObjectValue, Record, Value};
use uiconfig_core::{ConfigNode, ConfigRenderer, UiConfigSettings, UndoHistory};
use uiconfig_text::TextBackend;

const DEFAULT_SCRIPT: &str =
    "show; set age 35; undo; redo; set city London; click reset; history; undo; show";

const CITIES: [&str; 3] = ["New York", "Paris", "London"];

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum DemoExitCode {
    /// All commands ran
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// A command failed
    RuntimeError = 2,
}

impl From<DemoExitCode> for ExitCode {
    fn from(code: DemoExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    settings: UiConfigSettings,
    script: Option<String>,
    interactive: bool,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let mut settings = match env::var("UICONFIG_SETTINGS_FILE") {
            Ok(path) => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read UICONFIG_SETTINGS_FILE {path}"))?;
                UiConfigSettings::from_json(&json)
                    .with_context(|| format!("Invalid settings in {path}"))?
            }
            Err(_) => UiConfigSettings::default(),
        };

        if let Some(ms) = parse_env("UICONFIG_FRAME_INTERVAL_MS")? {
            settings.frame_interval_ms = ms;
        }
        if let Some(ms) = parse_env("UICONFIG_UNDO_WINDOW_MS")? {
            settings.undo_coalesce_window_ms = ms;
        }
        if let Some(capacity) = parse_env("UICONFIG_HISTORY_CAPACITY")? {
            settings.history_capacity = capacity;
        }

        Ok(Self {
            settings,
            script: env::var("UICONFIG_SCRIPT").ok(),
            interactive: env::var("UICONFIG_INTERACTIVE")
                .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
            log_level: env::var("UICONFIG_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.settings.validate()?;

        if !(1..=1000).contains(&self.settings.frame_interval_ms) {
            anyhow::bail!(
                "UICONFIG_FRAME_INTERVAL_MS must be between 1 and 1000. Got: {}",
                self.settings.frame_interval_ms
            );
        }

        if self.settings.undo_coalesce_window_ms > 60_000 {
            anyhow::bail!(
                "UICONFIG_UNDO_WINDOW_MS must be at most 60000. Got: {}",
                self.settings.undo_coalesce_window_ms
            );
        }

        if self.interactive && self.script.is_some() {
            anyhow::bail!("UICONFIG_SCRIPT and UICONFIG_INTERACTIVE cannot be used together");
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "UICONFIG_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("{name} must be a non-negative integer. Got: {raw}")),
        Err(_) => Ok(None),
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DemoExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DemoExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DemoExitCode::ConfigError.into();
    }

    info!("Starting uiconfig demo");

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DemoExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_demo(config).await {
            error!("Demo error: {:#}", e);
            DemoExitCode::RuntimeError
        } else {
            DemoExitCode::Success
        }
    });

    result.into()
}

/// Register the demo class
fn person_registry() -> Result<Arc<ClassRegistry>> {
    let registry = Arc::new(ClassRegistry::new());
    registry.register_class("Person", None)?;
    registry.register_field("Person", FieldDescriptor::input("name", "Name"))?;
    registry.register_field(
        "Person",
        FieldDescriptor::slider("age", "Age", [0.0, 150.0], Some(1.0)),
    )?;
    registry.register_field(
        "Person",
        FieldDescriptor::dropdown(
            "city",
            "City",
            CITIES
                .iter()
                .map(|city| Child::from(ConfigNode::builder("option").label(*city).build())),
        ),
    )?;
    registry.register_field("Person", FieldDescriptor::button("reset", "Reset"))?;
    Ok(registry)
}

/// The demo instance, with a `reset` action that can be undone
fn person() -> Arc<Record> {
    let person = Record::new()
        .with_class("Person")
        .with_field("name", "John")
        .with_field("age", 30)
        .with_field("city", CITIES[0])
        .into_shared();

    let weak = Arc::downgrade(&person);
    person.insert("reset", Action::new(move |_| reset(&weak)));
    person
}

fn reset(person: &Weak<Record>) -> ClickOutcome {
    let Some(person) = person.upgrade() else {
        return ClickOutcome::None;
    };

    let saved: Vec<(&'static str, Value)> = ["name", "age", "city"]
        .into_iter()
        .filter_map(|key| person.get(key).map(|value| (key, value)))
        .collect();

    person.insert("name", "John");
    person.insert("age", 30);
    person.insert("city", CITIES[0]);
    info!("Person reset to defaults");

    let weak = Arc::downgrade(&person);
    ClickOutcome::Undo(Action::unit(move || {
        if let Some(person) = weak.upgrade() {
            for (key, value) in &saved {
                person.insert(*key, value.clone());
            }
        }
    }))
}

/// Command interpreter over a mounted renderer
struct Demo {
    renderer: ConfigRenderer,
    backend: Arc<TextBackend>,
    history: Arc<UndoHistory>,
    frame: Duration,
}

impl Demo {
    fn find(&self, field: &str) -> Result<NodeRef> {
        let methods = self.renderer.methods();
        flatten(self.renderer.root())
            .into_iter()
            .find(|node| {
                methods
                    .binding(node, false)
                    .is_some_and(|b| b.key.as_name() == field)
                    || node.label().is_some_and(|l| l.eq_ignore_ascii_case(field))
            })
            .ok_or_else(|| anyhow!("No field named '{field}'"))
    }

    /// Wait for queued refreshes to run
    async fn settle(&self) {
        tokio::time::sleep(self.frame * 3).await;
    }

    async fn execute(&self, command: &str) -> Result<()> {
        let mut parts = command.split_whitespace();
        let Some(verb) = parts.next() else {
            return Ok(());
        };
        let methods = self.renderer.methods();

        match verb {
            "show" => {
                self.settle().await;
                println!("{}\n", self.backend.snapshot());
            }
            "set" => {
                let field = parts.next().context("usage: set <field> <value>")?;
                let text = parts.collect::<Vec<_>>().join(" ");
                let node = self.find(field)?;
                let accepted = self.backend.input(methods, &node, &text)?.await?;
                if !accepted {
                    warn!(field, value = %text, "Write was not accepted");
                }
                self.settle().await;
                println!("> set {field} {text}\n{}\n", self.backend.snapshot());
            }
            "click" => {
                let field = parts.next().context("usage: click <field>")?;
                let node = self.find(field)?;
                methods.click_button(&node, Vec::new()).await?;
                self.renderer.refresh_root(true, methods.dispatch_mode(&node), Duration::ZERO);
                self.settle().await;
                println!("> click {field}\n{}\n", self.backend.snapshot());
            }
            "undo" | "redo" => {
                let done = if verb == "undo" {
                    methods.undo().await?
                } else {
                    methods.redo().await?
                };
                if !done {
                    warn!("Nothing to {verb}");
                }
                self.settle().await;
                println!("> {verb}\n{}\n", self.backend.snapshot());
            }
            "history" => {
                println!(
                    "> history\nundo: {}, redo: {}\n",
                    self.history.undo_count(),
                    self.history.redo_count()
                );
            }
            other => anyhow::bail!("Unknown command '{other}'"),
        }
        Ok(())
    }
}

/// Run the demo
async fn run_demo(config: Config) -> Result<()> {
    let backend = TextBackend::new();
    let (renderer, mut events, history) =
        ConfigRenderer::with_history(backend.clone(), config.settings.clone())?;

    let event_log = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "Renderer event");
        }
    });

    renderer.mount()?;
    let frames = renderer.spawn_frame_loop();

    let registry = person_registry()?;
    let person = person();
    let params = FieldParams {
        expanded: Some(true),
        ..FieldParams::new()
    };
    let panel = container_folder(&registry, "Person", &Value::from(person), &params, "panel");

    // edits anywhere in the panel bubble up here
    let weak_panel = Arc::downgrade(&panel);
    panel.props_mut().on_change = Some(Listeners::one(move |event, _| {
        if let Some(panel) = weak_panel.upgrade() {
            debug!(origin = event.config.id(), "Panel changed, refreshing");
            panel.request_refresh(true, None, Duration::ZERO);
        }
    }));
    renderer.append_child(panel);

    let demo = Demo {
        renderer: renderer.clone(),
        backend,
        history,
        frame: config.settings.frame_interval(),
    };

    if config.interactive {
        info!("Reading commands from stdin, 'quit' to exit");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => match line.context("Failed to read stdin")? {
                    Some(line) if line.trim() == "quit" => break,
                    Some(line) => {
                        if let Err(e) = demo.execute(line.trim()).await {
                            eprintln!("{e:#}");
                        }
                    }
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Received SIGINT");
                    break;
                }
            }
        }
    } else {
        let script = config.script.as_deref().unwrap_or(DEFAULT_SCRIPT);
        for command in script.split(';') {
            demo.execute(command.trim())
                .await
                .with_context(|| format!("Command '{}' failed", command.trim()))?;
        }
    }

    info!("Shutting down demo");
    renderer.unmount();
    drop(demo);
    drop(renderer);

    frames.await.context("Frame loop panicked")?;
    event_log.await.context("Event logger panicked")?;
    Ok(())
}
