//=========================================================================
// Engine Core
//
// Frame-driven core of the engine, independent of any windowing layer.
//
// Components (leaf-first):
// - `event_queue`:   host → core input and asset events
// - `request_queue`: core → host requests (shutdown, reload, recreate)
// - `input`:         binding database, resolution and live input state
// - `assets`:        imported meshes/textures and their registry
// - `handle`:        generation-counted arenas for boundary tokens
// - `app`:           the `Application` frame step tying them together
//
// Notes:
// Nothing here spawns threads or touches global state. The host owns one
// `Application`, one queue pair and any number of renderers.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod app;
pub mod assets;
pub mod event_queue;
pub mod handle;
pub mod input;
pub mod request_queue;

//=== Public API ==========================================================

pub use app::{Application, FrameClock};
pub use assets::{AssetEvent, AssetRegistry, Mesh, Texture, Vertex};
pub use event_queue::{AppEvent, EventQueue, EventSender};
pub use handle::{Handle, HandleArena};
pub use request_queue::{Request, RequestQueue};
