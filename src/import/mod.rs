//=========================================================================
// Import Pipeline
//
// Turns asset files into `AssetEvent`s on a caller-supplied event queue.
//
// Architecture:
// ```text
//   .obj  ──► ModelImporter (tobj)  ──┐
//                                     ├──► Vec<AssetEvent> ──► push_batch ──► EventQueue
//   .png  ──► ImageImporter (image) ──┘        (all or nothing)
// ```
//
// Responsibilities:
// - Parse the external representation completely before touching the queue
// - Push every derived event as a single batch, or nothing on failure
// - Report failures as `ImportError` values, never by panicking
//
//=========================================================================

//=== Submodules ==========================================================

pub mod image;
pub mod model;

//=== External Dependencies ===============================================

use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::{AppEvent, AssetEvent, EventQueue};

pub use self::image::ImageImporter;
pub use self::model::ModelImporter;

//=== ImportError =========================================================

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed OBJ source {}: {source}", path.display())]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("failed to decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },

    #[error("{} contains no triangles", path.display())]
    Empty { path: PathBuf },

    #[error("cannot derive an asset name from {}", path.display())]
    MissingName { path: PathBuf },
}

//=== Entry Points ========================================================

/// Imports every object of an OBJ file as a mesh.
///
/// Returns the number of meshes pushed. On error the queue is untouched.
pub fn import_model(
    path: impl AsRef<Path>,
    name: Option<&str>,
    flat_normals: bool,
    events: &EventQueue,
) -> Result<usize, ImportError> {
    let path = path.as_ref();
    let mut importer = ModelImporter::new(path).with_flat_normals(flat_normals);
    if let Some(name) = name {
        importer = importer.with_name(name);
    }

    let assets = importer.import().inspect_err(|e| {
        warn!(target: "import", "Model import failed: {}", e);
    })?;
    Ok(push_assets(events, assets))
}

/// Imports an image as an RGBA8 texture. The name defaults to the file stem.
pub fn import_image(path: impl AsRef<Path>, name: Option<&str>, events: &EventQueue) -> Result<usize, ImportError> {
    let path = path.as_ref();
    let mut importer = ImageImporter::new(path);
    if let Some(name) = name {
        importer = importer.with_name(name);
    }

    let asset = importer.import().inspect_err(|e| {
        warn!(target: "import", "Image import failed: {}", e);
    })?;
    Ok(push_assets(events, vec![asset]))
}

fn push_assets(events: &EventQueue, assets: Vec<AssetEvent>) -> usize {
    let count = assets.len();
    for asset in &assets {
        debug!(target: "import", "Queued asset '{}'", asset.name());
    }
    events.push_batch(assets.into_iter().map(AppEvent::from).collect());
    count
}

//--- Shared Helpers ------------------------------------------------------

pub(crate) fn read_source(path: &Path) -> Result<Vec<u8>, ImportError> {
    std::fs::read(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn file_stem(path: &Path) -> Result<String, ImportError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| ImportError::MissingName { path: path.to_path_buf() })
}

//=========================================================================
// Unit Tests
//=========================================================================
