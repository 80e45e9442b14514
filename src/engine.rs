//=========================================================================
// Aetheric Engine
//
// Main entry point and coordinator for a hosted engine session.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run()──>  [Runtime]
//         │                          │
//         ├─ with_config()           ├─ init(|app| ..)
//         ├─ with_bindings()         ├─ event_sender()  (loader threads)
//         ├─ with_keymap()           └─ run(): logging, window,
//         └─ with_backend()                    event loop until exit
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::Path;

use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::config::EngineConfig;
use crate::core::input::table::BindingConfig;
use crate::core::input::viewport::LogicalResolution;
use crate::core::{Application, EventQueue, EventSender};
use crate::logging::init_logging;
use crate::platform::keymap::{KeyMap, KeyMapConfig};
use crate::platform::{BackendFactory, Platform, PlatformError};
use crate::render::{HeadlessBackend, RenderBackend};

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **Window**: "Aetheric Engine", 1280×800
/// - **Logical resolution**: 640×400
/// - **Bindings / key map**: empty
/// - **Backend**: [`HeadlessBackend`]
///
/// # Examples
///
/// ```no_run
/// use aetheric_core::EngineBuilder;
///
/// EngineBuilder::new()
///     .load_config("engine.toml")?
///     .with_title("Demo")
///     .build()?
///     .init(|app| {
///         let _jump = app.action_id("jump");
///     })
///     .run()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    backend: Option<BackendFactory>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            backend: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the configuration with the contents of a TOML file.
    pub fn load_config(self, path: impl AsRef<Path>) -> Result<Self, PlatformError> {
        let config = EngineConfig::load(path)?;
        Ok(self.with_config(config))
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.window.title = title.into();
        self
    }

    /// Initial inner size of the window, in logical pixels.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.config.window.width = width;
        self.config.window.height = height;
        self
    }

    /// Resolution cursor positions are mapped into.
    pub fn with_logical_resolution(mut self, width: u32, height: u32) -> Self {
        self.config.display = LogicalResolution::new(width, height);
        self
    }

    pub fn with_bindings(mut self, bindings: BindingConfig) -> Self {
        self.config.bindings = bindings;
        self
    }

    pub fn with_keymap(mut self, keymap: KeyMapConfig) -> Self {
        self.config.keymap = keymap;
        self
    }

    /// Sets the factory used to create the render backend for the window.
    pub fn with_backend<F>(mut self, factory: F) -> Self
    where
        F: FnMut() -> Box<dyn RenderBackend> + 'static,
    {
        self.backend = Some(Box::new(factory));
        self
    }

    /// Builds the engine instance.
    ///
    /// Validates the binding table and the key map; the window is not
    /// created until [`Engine::run`].
    pub fn build(self) -> Result<Engine, PlatformError> {
        let app = Application::from_config(&self.config)?;
        let keymap = KeyMap::from_config(&self.config.keymap)?;

        info!(
            "Building engine ({} actions, {} axes, logical {}x{})",
            self.config.bindings.actions.len(),
            self.config.bindings.axes.len(),
            self.config.display.width,
            self.config.display.height
        );

        let backend: BackendFactory = match self.backend {
            Some(factory) => factory,
            None => Box::new(|| Box::new(HeadlessBackend::new()) as Box<dyn RenderBackend>),
        };

        Ok(Engine {
            app,
            events: EventQueue::new(),
            keymap,
            config: self.config,
            backend,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Aetheric Engine runtime.
///
/// # Architecture
///
/// ```text
/// Engine (Main Thread)
///   └─► Platform (Winit event loop)
///         ├─► Window, input polling → EventQueue
///         ├─► Application::progress (one per redraw)
///         └─► Renderer
///
/// Loader threads ──EventSender──► EventQueue
/// ```
pub struct Engine {
    app: Application,
    events: EventQueue,
    keymap: KeyMap,
    config: EngineConfig,
    backend: BackendFactory,
}

impl Engine {
    //--- Initialization ---------------------------------------------------

    /// Gives mutable access to the [`Application`] before the loop starts.
    pub fn init<F>(mut self, init_fn: F) -> Self
    where
        F: FnOnce(&mut Application),
    {
        info!("Initializing application");
        init_fn(&mut self.app);
        self
    }

    /// Producer handle for events originating outside the event loop
    /// (asset imports, scripted input).
    pub fn event_sender(&self) -> EventSender {
        self.events.sender()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    //--- Execution --------------------------------------------------------

    /// Starts the runtime and blocks until the application exits.
    ///
    /// # Lifecycle
    ///
    /// 1. Initializes logging from the `[logging]` section
    /// 2. Creates the window and renderer on the first `resumed`
    /// 3. Runs one `progress` per redraw
    /// 4. Exits when the core terminates or a shutdown is requested
    pub fn run(self) -> Result<(), PlatformError> {
        init_logging(&self.config.logging);
        info!("Starting engine runtime");

        let platform = Platform::new(
            self.app,
            self.events,
            self.keymap,
            self.config.window,
            self.backend,
        );

        let result = platform.run();
        match &result {
            Ok(()) => info!("Engine shutdown complete"),
            Err(e) => error!("Platform error: {}", e),
        }
        result
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::core::input::binding::BindingError;
    use crate::core::input::event::ButtonState;
    use crate::core::input::table::{ActionConfig, GroupConfig};
    use crate::core::RequestQueue;

    fn bindings() -> BindingConfig {
        BindingConfig {
            groups: vec![GroupConfig { name: "gameplay".into() }],
            actions: vec![ActionConfig { name: "jump".into(), group: "gameplay".into() }],
            axes: Vec::new(),
        }
    }

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = EngineBuilder::new();

        assert_eq!(builder.config, EngineConfig::default());
        assert!(builder.backend.is_none());
    }

    #[test]
    fn builder_overrides_window_and_display() {
        let builder = EngineBuilder::new()
            .with_title("Demo")
            .with_window_size(800, 600)
            .with_logical_resolution(320, 200);

        assert_eq!(builder.config.window.title, "Demo");
        assert_eq!((builder.config.window.width, builder.config.window.height), (800, 600));
        assert_eq!(builder.config.display, LogicalResolution::new(320, 200));
    }

    #[test]
    fn builder_loads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"[window]\ntitle = \"From disk\"\n").unwrap();

        let builder = EngineBuilder::new().load_config(file.path()).unwrap();

        assert_eq!(builder.config.window.title, "From disk");
    }

    #[test]
    fn build_rejects_invalid_bindings() {
        let mut bad = bindings();
        bad.actions[0].group = "menu".into();

        let result = EngineBuilder::new().with_bindings(bad).build();

        assert!(matches!(
            result,
            Err(PlatformError::Bindings(BindingError::UnknownGroup { .. }))
        ));
    }

    #[test]
    fn build_rejects_unknown_key_names() {
        let mut keymap = KeyMapConfig::default();
        keymap.actions.insert("NotAKey".into(), "jump".into());

        let result = EngineBuilder::new().with_keymap(keymap).build();

        assert!(matches!(
            result,
            Err(PlatformError::Config(ConfigError::UnknownInput(_)))
        ));
    }

    //=====================================================================
    // Engine Tests
    //=====================================================================

    #[test]
    fn init_runs_against_the_application() {
        let mut seen = None;

        let _engine = EngineBuilder::new()
            .with_bindings(bindings())
            .build()
            .unwrap()
            .init(|app| seen = app.action_id("jump"));

        assert!(seen.is_some());
    }

    #[test]
    fn event_sender_feeds_the_application() {
        let engine = EngineBuilder::new().with_bindings(bindings()).build().unwrap();
        let sender = engine.event_sender();
        sender.push_action_named("jump", ButtonState::Pressed);

        let Engine { mut app, events, .. } = engine;
        let mut requests = RequestQueue::new();

        assert!(app.progress(&events, &mut requests, 0.016));
        let jump = app.action_id("jump").unwrap();
        assert!(app.input().is_just_pressed(jump));
    }
}
