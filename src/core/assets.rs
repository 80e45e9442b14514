//=========================================================================
// Assets
//=========================================================================
//
// CPU-side asset payloads produced by the import pipeline and the
// registry the application keeps them in.
//
// Assets reach the application through the event queue as `AssetEvent`s,
// so ingestion stays decoupled from the frame loop:
//
// ```text
//   import_model / import_image ──► EventQueue ──► progress() ──► AssetRegistry
// ```
//
//=========================================================================

use std::collections::HashMap;

use log::debug;

//=== Mesh ================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Tangent with handedness in `w`.
    pub tangent: [f32; 4],
}

/// Triangle list. Every three vertices form one triangle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

//=== Texture =============================================================

/// Tightly packed RGBA8 image, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

//=== AssetEvent ==========================================================

/// Asset registration carried through the event queue.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetEvent {
    Mesh { name: String, mesh: Mesh },
    Texture { name: String, texture: Texture },
}

impl AssetEvent {
    pub fn name(&self) -> &str {
        match self {
            Self::Mesh { name, .. } | Self::Texture { name, .. } => name,
        }
    }
}

//=== AssetRegistry =======================================================

/// Named meshes and textures known to the application.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    meshes: HashMap<String, Mesh>,
    textures: HashMap<String, Texture>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the payload; a later entry with the same name replaces
    /// the earlier one.
    pub fn register(&mut self, event: AssetEvent) {
        match event {
            AssetEvent::Mesh { name, mesh } => {
                debug!(target: "core", "Registered mesh '{}' ({} triangles)", name, mesh.triangle_count());
                self.meshes.insert(name, mesh);
            }
            AssetEvent::Texture { name, texture } => {
                debug!(target: "core", "Registered texture '{}' ({}x{})", name, texture.width, texture.height);
                self.textures.insert(name, texture);
            }
        }
    }

    pub fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.get(name)
    }

    pub fn texture(&self, name: &str) -> Option<&Texture> {
        self.textures.get(name)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
