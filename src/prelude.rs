//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types.
//
// Usage:
//   use aetheric_core::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine host
pub use crate::engine::{Engine, EngineBuilder};
pub use crate::config::EngineConfig;

// Frame loop
pub use crate::core::{AppEvent, Application, EventQueue, EventSender, FrameClock, Request, RequestQueue};

// Input system
pub use crate::core::input::binding::{ActionId, AxisId, AxisRange, BindingError, GroupId};
pub use crate::core::input::event::{ButtonState, RawInputEvent};
pub use crate::core::input::table::{BindingConfig, BindingTable};
pub use crate::core::input::viewport::LogicalResolution;

// Rendering
pub use crate::render::{RenderBackend, Renderer, RendererError, SurfaceState, SurfaceTarget};

// Assets
pub use crate::core::{AssetEvent, AssetRegistry, Mesh, Texture};
pub use crate::import::{import_image, import_model, ImportError};
