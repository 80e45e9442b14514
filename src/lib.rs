//=========================================================================
// Aetheric Core — Library Root
//
// Frame-driven, embeddable engine core. A host owns the window and calls
// into the core once per frame; the core never owns the loop.
//
// Responsibilities:
// - Expose the core types (`Application`, `EventQueue`, `RequestQueue`,
//   input bindings, `Renderer`) to Rust hosts
// - Expose the same surface to C hosts through `ffi` (cdylib)
// - Provide an optional winit host (`Engine`) for standalone use
//
// Typical usage (embedded):
// ```no_run
// use aetheric_core::prelude::*;
//
// let mut app = Application::default();
// let events = EventQueue::new();
// let mut requests = RequestQueue::new();
//
// events.push_close_requested();
// while app.progress(&events, &mut requests, 1.0 / 60.0) {
//     requests.reset();
// }
// ```
//
// Typical usage (hosted):
// ```no_run
// use aetheric_core::EngineBuilder;
//
// EngineBuilder::new().with_title("Demo").build()?.run()?;
// # Ok::<(), aetheric_core::platform::PlatformError>(())
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the frame loop, the queues and the input system.
// `render` holds the surface state machine and its backends.
// `import` turns asset files into queue events.
// `ffi` is the C boundary built on top of the three.
//
pub mod config;
pub mod core;
pub mod ffi;
pub mod import;
pub mod logging;
pub mod prelude;
pub mod render;

//--- Host Modules --------------------------------------------------------
//
// `platform` is the winit integration (window, event loop, key map);
// only its configuration and error types are public.
//
// `engine` wraps it behind a builder.
//
pub mod platform;
mod engine;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder};
