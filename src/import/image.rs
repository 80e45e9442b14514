//=========================================================================
// Image Importer
//=========================================================================
//
// Any format the `image` crate decodes → `AssetEvent::Texture` (RGBA8).
//
//=========================================================================

use std::path::PathBuf;

use log::debug;

use super::{file_stem, read_source, ImportError};
use crate::core::{AssetEvent, Texture};

#[derive(Debug, Clone)]
pub struct ImageImporter {
    path: PathBuf,
    name: Option<String>,
}

impl ImageImporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), name: None }
    }

    /// Texture name. Defaults to the file stem.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn import(&self) -> Result<AssetEvent, ImportError> {
        let name = match &self.name {
            Some(name) => name.clone(),
            None => file_stem(&self.path)?,
        };

        let bytes = read_source(&self.path)?;
        let rgba = ::image::load_from_memory(&bytes)
            .map_err(|source| ImportError::Image {
                path: self.path.clone(),
                source,
            })?
            .to_rgba8();
        let (width, height) = rgba.dimensions();

        debug!(target: "import", "Texture '{}': {}x{}", name, width, height);

        Ok(AssetEvent::Texture {
            name,
            texture: Texture {
                width,
                height,
                pixels: rgba.into_raw(),
            },
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{Rgba, RgbaImage};

    #[test]
    fn decodes_to_tightly_packed_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile.png");
        let mut source = RgbaImage::new(3, 2);
        source.put_pixel(2, 1, Rgba([1, 2, 3, 4]));
        source.save(&path).unwrap();

        let asset = ImageImporter::new(&path).with_name("floor").import().unwrap();

        let AssetEvent::Texture { name, texture } = asset else {
            panic!("expected a texture");
        };
        assert_eq!(name, "floor");
        assert_eq!((texture.width, texture.height), (3, 2));
        assert_eq!(texture.pixels.len(), 3 * 2 * 4);
        assert_eq!(&texture.pixels[20..24], &[1, 2, 3, 4]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = ImageImporter::new("/definitely/not/here.png").import();

        assert!(matches!(result, Err(ImportError::Io { .. })));
    }
}
