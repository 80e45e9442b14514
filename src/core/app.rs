//=========================================================================
// Application Core
//=========================================================================
//
// Owns application state and advances it once per frame.
//
// Frame Step (`progress`):
// ```text
//   1. drain EventQueue            (exactly the events pushed before the call)
//   2. register asset events       (AssetRegistry)
//   3. resolve + apply input       (one binding-table generation per frame)
//   4. advance clock by dt         (only positive, finite dt)
//   5. fill RequestQueue           (ReloadBindings, Shutdown)
//   6. report continue / terminate (false once CloseRequested was seen)
// ```
//
// Termination signals:
// - `progress` returning `false` means the core is done (window close).
// - `Request::Shutdown` is an independent request raised by application
//   code through `request_exit`. Neither implies the other.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use log::{debug, info};

//=== Internal Dependencies ===============================================

use super::assets::AssetRegistry;
use super::event_queue::{AppEvent, EventQueue};
use super::input::binding::{ActionId, AxisId, BindingError, BindingKind, GroupId};
use super::input::database::InputBindingDatabase;
use super::input::table::{BindingConfig, BindingTable};
use super::input::viewport::LogicalResolution;
use super::input::{FrameInput, InputSystem};
use super::request_queue::{Request, RequestQueue};
use crate::config::EngineConfig;
use crate::render::{Frame, Renderer};

//=== FrameClock ==========================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    /// Number of completed frame steps.
    pub frame_index: u64,
    /// Seconds of simulated time.
    pub elapsed: f64,
    /// Delta applied by the last frame step (0.0 for a no-op tick).
    pub last_delta: f32,
}

impl FrameClock {
    fn tick(&mut self, dt: f32) -> f32 {
        self.frame_index += 1;
        self.last_delta = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.elapsed += f64::from(self.last_delta);
        self.last_delta
    }
}

//=== Application =========================================================

pub struct Application {
    bindings: Arc<InputBindingDatabase>,
    input: InputSystem,
    assets: AssetRegistry,
    clock: FrameClock,
    last_frame: FrameInput,

    bindings_generation: u64,
    exit_requested: bool,
    terminated: bool,
}

impl Application {
    //--- Construction -----------------------------------------------------

    pub fn new(bindings: BindingTable, logical: LogicalResolution) -> Self {
        Self {
            bindings: Arc::new(InputBindingDatabase::new(bindings)),
            input: InputSystem::new(logical),
            assets: AssetRegistry::new(),
            clock: FrameClock::default(),
            last_frame: FrameInput::default(),
            bindings_generation: 0,
            exit_requested: false,
            terminated: false,
        }
    }

    /// Builds an application from the binding set and display section of
    /// `config`.
    pub fn from_config(config: &EngineConfig) -> Result<Self, BindingError> {
        let table = config.bindings.build()?;
        Ok(Self::new(table, config.display))
    }

    //--- Frame Step -------------------------------------------------------

    /// Advances the application by one frame.
    ///
    /// Returns `false` once a `CloseRequested` event has been observed. The
    /// host must stop calling `progress` after that; further calls are
    /// no-ops that keep returning `false`.
    pub fn progress(&mut self, events: &EventQueue, requests: &mut RequestQueue, delta_time: f32) -> bool {
        if self.terminated {
            debug!(target: "core", "progress called after termination; ignored");
            return false;
        }

        let (generation, table) = self.bindings.current_generation();

        if generation != self.bindings_generation {
            self.input.retain_bindings(&table);
            requests.push(Request::ReloadBindings);
            self.bindings_generation = generation;
        }

        //--- Step 1-2: Drain events, register assets ----------------------
        let mut raw_input = Vec::new();
        let mut registered = 0;
        for event in events.drain() {
            match event {
                AppEvent::Input(input) => raw_input.push(input),
                AppEvent::Asset(asset) => {
                    self.assets.register(asset);
                    registered += 1;
                }
            }
        }
        if registered > 0 {
            debug!(
                target: "core",
                "Registered {} assets ({} meshes, {} textures loaded)",
                registered,
                self.assets.mesh_count(),
                self.assets.texture_count()
            );
        }

        //--- Step 3: Resolve and apply input ------------------------------
        self.input.begin_frame();
        self.last_frame = self.input.process_events(&raw_input, &table);

        //--- Step 4: Advance time -----------------------------------------
        let dt = self.clock.tick(delta_time);
        if dt > 0.0 {
            self.input.advance(dt);
        }

        //--- Step 5: Requests ---------------------------------------------
        if self.exit_requested {
            requests.push(Request::Shutdown);
            self.exit_requested = false;
        }

        //--- Step 6: Continue? --------------------------------------------
        if self.last_frame.close_requested {
            info!(target: "core", "Close requested at frame {}; terminating", self.clock.frame_index);
            self.terminated = true;
            return false;
        }
        true
    }

    /// Advances one frame, then renders it with `renderer` when given.
    ///
    /// A render that leaves the renderer `Lost` raises
    /// `Request::RecreateSurface`.
    pub fn progress_with_renderer(
        &mut self,
        events: &EventQueue,
        requests: &mut RequestQueue,
        renderer: Option<&mut Renderer>,
        delta_time: f32,
    ) -> bool {
        if !self.progress(events, requests, delta_time) {
            return false;
        }

        if let Some(renderer) = renderer {
            if !renderer.render(self) && renderer.is_lost() {
                requests.push(Request::RecreateSurface);
            }
        }
        true
    }

    //--- Control ----------------------------------------------------------

    /// Replaces the binding table. Live state of removed bindings is dropped
    /// and `Request::ReloadBindings` is raised on the next frame.
    pub fn reload_bindings(&mut self, table: BindingTable) {
        self.bindings.reload(table);
    }

    /// Validates `config` and reloads from it. On error nothing changes.
    pub fn reload_bindings_from(&mut self, config: &BindingConfig) -> Result<(), BindingError> {
        let table = config.build()?;
        self.reload_bindings(table);
        Ok(())
    }

    /// Asks the host to shut down (`Request::Shutdown` on the next frame).
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn set_group_enabled(&mut self, group: GroupId, enabled: bool) -> Result<(), BindingError> {
        let table = self.bindings.current();
        if table.group(group).is_none() {
            return Err(BindingError::NotFound {
                kind: BindingKind::Group,
                id: group.to_raw(),
            });
        }
        self.input.set_group_enabled(group, enabled, &table);
        Ok(())
    }

    //--- Queries ----------------------------------------------------------

    /// Shared binding database (lookup and snapshot export). A reload
    /// through any clone of it is picked up by the next frame exactly like
    /// [`Application::reload_bindings`].
    pub fn bindings(&self) -> &Arc<InputBindingDatabase> {
        &self.bindings
    }

    pub fn input(&self) -> &InputSystem {
        &self.input
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn clock(&self) -> FrameClock {
        self.clock
    }

    /// Input summary of the last frame step.
    pub fn last_frame_input(&self) -> FrameInput {
        self.last_frame
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn action_id(&self, name: &str) -> Option<ActionId> {
        self.bindings.current().find_action(name).map(|a| a.id)
    }

    pub fn axis_id(&self, name: &str) -> Option<AxisId> {
        self.bindings.current().find_axis(name).map(|a| a.id)
    }

    /// Render view of the current state at the given surface size.
    pub fn frame(&self, width: u32, height: u32) -> Frame<'_> {
        Frame {
            index: self.clock.frame_index,
            elapsed: self.clock.elapsed,
            width,
            height,
            cursor: self.input.cursor_position(),
            assets: &self.assets,
        }
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new(BindingTable::default(), LogicalResolution::default())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
