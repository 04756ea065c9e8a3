// src/assets.rs
//! Asset loading and caching
//!
//! Loads OBJ meshes and image textures from disk into CPU-side data, handing
//! out shared handles. Repeated requests for the same name return the cached
//! handle instead of re-decoding. Missing or corrupt assets are reported as
//! errors; callers treat them as fatal at startup.

use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load mesh '{path}': {source}")]
    MeshLoad {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("mesh file '{0}' contains no models")]
    EmptyMesh(String),

    #[error("failed to load texture '{path}': {source}")]
    TextureLoad {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// CPU-side mesh data: flat position/normal/uv arrays plus triangle indices
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub tex_coords: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Decoded RGBA8 image data
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureImage {
    /// Procedural checkerboard, handy for demos and untextured materials
    pub fn checker(size: u32, cell: u32, color_a: [u8; 4], color_b: [u8; 4]) -> Self {
        let cell = cell.max(1);
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let color = if ((x / cell) + (y / cell)) % 2 == 0 {
                    color_a
                } else {
                    color_b
                };
                pixels.extend_from_slice(&color);
            }
        }
        Self {
            pixels,
            width: size,
            height: size,
        }
    }
}

/// Cache of loaded meshes and textures, keyed by name
///
/// Handles are `Rc`s: cheap to clone, stable for the library's lifetime.
pub struct AssetLibrary {
    meshes: HashMap<String, Rc<MeshData>>,
    textures: HashMap<String, Rc<TextureImage>>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self {
            meshes: HashMap::new(),
            textures: HashMap::new(),
        }
    }

    /// Loads an OBJ mesh, or returns the cached handle for a known name
    ///
    /// Multi-model files are merged into a single mesh. Normals are taken
    /// from the file when present and complete, otherwise recomputed from
    /// face geometry. Missing texture coordinates become zeros.
    pub fn get_mesh(&mut self, path: &str) -> Result<Rc<MeshData>, AssetError> {
        if let Some(mesh) = self.meshes.get(path) {
            return Ok(mesh.clone());
        }

        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| AssetError::MeshLoad {
            path: path.to_string(),
            source,
        })?;

        if models.is_empty() {
            return Err(AssetError::EmptyMesh(path.to_string()));
        }

        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut tex_coords = Vec::new();
        let mut indices = Vec::new();

        for model in &models {
            let mesh = &model.mesh;
            let base = (positions.len() / 3) as u32;

            positions.extend_from_slice(&mesh.positions);
            if mesh.normals.len() == mesh.positions.len() {
                normals.extend_from_slice(&mesh.normals);
            } else {
                normals.extend(smooth_normals(&mesh.positions, &mesh.indices));
            }
            if mesh.texcoords.len() / 2 == mesh.positions.len() / 3 {
                tex_coords.extend_from_slice(&mesh.texcoords);
            } else {
                tex_coords.extend(std::iter::repeat(0.0).take(mesh.positions.len() / 3 * 2));
            }
            indices.extend(mesh.indices.iter().map(|i| i + base));
        }

        let data = Rc::new(MeshData {
            name: path.to_string(),
            positions,
            normals,
            tex_coords,
            indices,
        });
        log::info!(
            "loaded mesh '{}' ({} vertices, {} triangles)",
            path,
            data.vertex_count(),
            data.triangle_count()
        );
        self.meshes.insert(path.to_string(), data.clone());
        Ok(data)
    }

    /// Registers procedural mesh data under a name and returns its handle
    pub fn insert_mesh(&mut self, name: &str, data: MeshData) -> Rc<MeshData> {
        let handle = Rc::new(data);
        self.meshes.insert(name.to_string(), handle.clone());
        handle
    }

    /// Decodes an image file to RGBA8, or returns the cached handle
    pub fn get_texture(&mut self, path: &str) -> Result<Rc<TextureImage>, AssetError> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(texture.clone());
        }

        let decoded = image::open(path)
            .map_err(|source| AssetError::TextureLoad {
                path: path.to_string(),
                source,
            })?
            .to_rgba8();
        let (width, height) = decoded.dimensions();

        let texture = Rc::new(TextureImage {
            pixels: decoded.into_raw(),
            width,
            height,
        });
        log::info!("loaded texture '{}' ({}x{})", path, width, height);
        self.textures.insert(path.to_string(), texture.clone());
        Ok(texture)
    }

    /// Registers a procedural texture under a name and returns its handle
    pub fn insert_texture(&mut self, name: &str, image: TextureImage) -> Rc<TextureImage> {
        let handle = Rc::new(image);
        self.textures.insert(name.to_string(), handle.clone());
        handle
    }
}

impl Default for AssetLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-vertex normals from accumulated face normals
///
/// Each vertex normal is the normalized sum of the unnormalized face normals
/// of the triangles sharing it, which weights faces by area.
pub fn smooth_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let mut normals = vec![0.0f32; positions.len()];

    for triangle in indices.chunks(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];

        let v0 = [positions[i0 * 3], positions[i0 * 3 + 1], positions[i0 * 3 + 2]];
        let v1 = [positions[i1 * 3], positions[i1 * 3 + 1], positions[i1 * 3 + 2]];
        let v2 = [positions[i2 * 3], positions[i2 * 3 + 1], positions[i2 * 3 + 2]];

        let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

        let face_normal = [
            edge1[1] * edge2[2] - edge1[2] * edge2[1],
            edge1[2] * edge2[0] - edge1[0] * edge2[2],
            edge1[0] * edge2[1] - edge1[1] * edge2[0],
        ];

        for &vertex in &[i0, i1, i2] {
            normals[vertex * 3] += face_normal[0];
            normals[vertex * 3 + 1] += face_normal[1];
            normals[vertex * 3 + 2] += face_normal[2];
        }
    }

    for normal in normals.chunks_mut(3) {
        let length = (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
        if length > 0.0 {
            normal[0] /= length;
            normal[1] /= length;
            normal[2] /= length;
        }
    }

    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_requests_return_the_same_handle() {
        let mut assets = AssetLibrary::new();
        let data = MeshData {
            name: "tri".to_string(),
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            tex_coords: vec![0.0; 6],
            indices: vec![0, 1, 2],
        };
        assets.insert_mesh("tri", data);

        let first = assets.get_mesh("tri").unwrap();
        let second = assets.get_mesh("tri").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_mesh_is_an_error() {
        let mut assets = AssetLibrary::new();
        assert!(matches!(
            assets.get_mesh("does_not_exist.obj"),
            Err(AssetError::MeshLoad { .. })
        ));
    }

    #[test]
    fn test_missing_texture_is_an_error() {
        let mut assets = AssetLibrary::new();
        assert!(matches!(
            assets.get_texture("does_not_exist.png"),
            Err(AssetError::TextureLoad { .. })
        ));
    }

    #[test]
    fn test_smooth_normals_of_flat_triangle() {
        // CCW triangle in the XY plane faces +Z
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let indices = [0, 1, 2];
        let normals = smooth_normals(&positions, &indices);

        for vertex in normals.chunks(3) {
            assert!((vertex[0]).abs() < 1e-6);
            assert!((vertex[1]).abs() < 1e-6);
            assert!((vertex[2] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_checker_texture_dimensions() {
        let image = TextureImage::checker(8, 2, [255, 255, 255, 255], [0, 0, 0, 255]);
        assert_eq!(image.width, 8);
        assert_eq!(image.height, 8);
        assert_eq!(image.pixels.len(), 8 * 8 * 4);
        // Opposite cells differ
        assert_ne!(image.pixels[0..4], image.pixels[(2 * 4) as usize..(2 * 4 + 4) as usize]);
    }
}
