//=========================================================================
// Model Importer
//=========================================================================
//
// Wavefront OBJ → one `AssetEvent::Mesh` per object.
//
// Every triangle is expanded to three vertices carrying position, normal,
// uv and tangent:
// - missing normals (or `flat_normals`) become the face normal
// - missing uvs become (0,0), (1,0), (0,1)
// - the tangent follows the uv gradient, handedness in `w`
//
//=========================================================================

use std::path::{Path, PathBuf};

use log::debug;

use super::{file_stem, read_source, ImportError};
use crate::core::{AssetEvent, Mesh, Vertex};

/// Name tobj gives to geometry declared before any `o`/`g` statement.
const UNNAMED_OBJECT: &str = "unnamed_object";

//=== ModelImporter =======================================================

#[derive(Debug, Clone)]
pub struct ModelImporter {
    path: PathBuf,
    name: Option<String>,
    flat_normals: bool,
}

impl ModelImporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: None,
            flat_normals: false,
        }
    }

    /// Base name of the produced meshes. Suffixed `_<index>` when the file
    /// holds more than one object.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Ignores the file's normals and uses face normals instead.
    pub fn with_flat_normals(mut self, flat: bool) -> Self {
        self.flat_normals = flat;
        self
    }

    /// Parses the file. Nothing is pushed anywhere; callers get every
    /// mesh or an error.
    pub fn import(&self) -> Result<Vec<AssetEvent>, ImportError> {
        let bytes = read_source(&self.path)?;
        let (models, _materials) = tobj::load_obj_buf(
            &mut std::io::Cursor::new(bytes),
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
            |_| Err(tobj::LoadError::OpenFileFailed),
        )
        .map_err(|source| ImportError::Obj {
            path: self.path.clone(),
            source,
        })?;

        let object_count = models.len();
        let mut assets = Vec::with_capacity(object_count);

        for (index, model) in models.iter().enumerate() {
            let mesh = self.build_mesh(&model.mesh).map_err(|source| ImportError::Obj {
                path: self.path.clone(),
                source,
            })?;
            if mesh.vertices.is_empty() {
                continue;
            }

            let name = self.object_name(&model.name, index, object_count)?;
            debug!(target: "import", "Mesh '{}': {} triangles", name, mesh.triangle_count());
            assets.push(AssetEvent::Mesh { name, mesh });
        }

        if assets.is_empty() {
            return Err(ImportError::Empty { path: self.path.clone() });
        }
        Ok(assets)
    }

    //--- Internal Helpers -------------------------------------------------

    fn object_name(&self, object: &str, index: usize, count: usize) -> Result<String, ImportError> {
        match &self.name {
            Some(name) if count > 1 => Ok(format!("{name}_{index}")),
            Some(name) => Ok(name.clone()),
            None if !object.is_empty() && object != UNNAMED_OBJECT => Ok(object.to_owned()),
            None => Ok(format!("{}_{index}", file_stem(&self.path)?)),
        }
    }

    fn build_mesh(&self, source: &tobj::Mesh) -> Result<Mesh, tobj::LoadError> {
        let has_normals = !source.normals.is_empty() && !self.flat_normals;
        let has_uvs = !source.texcoords.is_empty();

        let mut vertices = Vec::with_capacity(source.indices.len());
        for face in source.indices.chunks_exact(3) {
            let mut triangle = [Vertex::default(); 3];
            for (vertex, &index) in triangle.iter_mut().zip(face) {
                let i = index as usize;
                vertex.position = read3(&source.positions, i)?;
                if has_normals {
                    vertex.normal = read3(&source.normals, i)?;
                }
                if has_uvs {
                    vertex.uv = read2(&source.texcoords, i)?;
                }
            }

            if !has_normals {
                let normal = face_normal(&triangle);
                triangle.iter_mut().for_each(|v| v.normal = normal);
            }
            if !has_uvs {
                triangle[0].uv = [0.0, 0.0];
                triangle[1].uv = [1.0, 0.0];
                triangle[2].uv = [0.0, 1.0];
            }
            apply_tangents(&mut triangle);

            vertices.extend(triangle);
        }

        Ok(Mesh { vertices })
    }
}

//=== Geometry ============================================================

fn read3(data: &[f32], index: usize) -> Result<[f32; 3], tobj::LoadError> {
    data.get(index * 3..index * 3 + 3)
        .map(|v| [v[0], v[1], v[2]])
        .ok_or(tobj::LoadError::FaceVertexOutOfBounds)
}

fn read2(data: &[f32], index: usize) -> Result<[f32; 2], tobj::LoadError> {
    data.get(index * 2..index * 2 + 2)
        .map(|v| [v[0], v[1]])
        .ok_or(tobj::LoadError::FaceTexCoordOutOfBounds)
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn scale(a: [f32; 3], s: f32) -> [f32; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[1] * b[2] - a[2] * b[1], a[2] * b[0] - a[0] * b[2], a[0] * b[1] - a[1] * b[0]]
}

/// Unit vector, or zero for degenerate input.
fn normalize(a: [f32; 3]) -> [f32; 3] {
    let len = dot(a, a).sqrt();
    if len > f32::EPSILON {
        scale(a, 1.0 / len)
    } else {
        [0.0; 3]
    }
}

fn face_normal(triangle: &[Vertex; 3]) -> [f32; 3] {
    let a = sub(triangle[1].position, triangle[0].position);
    let b = sub(triangle[2].position, triangle[0].position);
    normalize(cross(a, b))
}

fn apply_tangents(triangle: &mut [Vertex; 3]) {
    let edge1 = sub(triangle[1].position, triangle[0].position);
    let edge2 = sub(triangle[2].position, triangle[0].position);
    let duv1 = [triangle[1].uv[0] - triangle[0].uv[0], triangle[1].uv[1] - triangle[0].uv[1]];
    let duv2 = [triangle[2].uv[0] - triangle[0].uv[0], triangle[2].uv[1] - triangle[0].uv[1]];

    let det = duv1[0] * duv2[1] - duv1[1] * duv2[0];
    let (tangent, bitangent) = if det.abs() > f32::EPSILON {
        let r = 1.0 / det;
        (
            scale(sub(scale(edge1, duv2[1]), scale(edge2, duv1[1])), r),
            scale(sub(scale(edge2, duv1[0]), scale(edge1, duv2[0])), r),
        )
    } else {
        // Degenerate uv mapping: any direction along the first edge.
        (edge1, edge2)
    };

    for vertex in triangle.iter_mut() {
        let n = vertex.normal;
        let w = if dot(cross(tangent, bitangent), n) > 0.0 { 1.0 } else { -1.0 };
        // Gram-Schmidt against the vertex normal.
        let t = normalize(sub(tangent, scale(n, dot(tangent, n))));
        vertex.tangent = [t[0], t[1], t[2], w];
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
