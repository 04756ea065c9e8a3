// src/gfx/geometry/primitives.rs
//! Procedural mesh generators

use std::f32::consts::PI;

use crate::assets::MeshData;

/// Generates a unit cube centered at the origin
///
/// 24 vertices (4 per face) so each face gets flat normals and its own
/// texture coordinates.
pub fn generate_cube() -> MeshData {
    // (normal, four corners CCW when viewed from outside)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [
                [-0.5, -0.5, 0.5],
                [0.5, -0.5, 0.5],
                [0.5, 0.5, 0.5],
                [-0.5, 0.5, 0.5],
            ],
        ),
        (
            [0.0, 0.0, -1.0],
            [
                [0.5, -0.5, -0.5],
                [-0.5, -0.5, -0.5],
                [-0.5, 0.5, -0.5],
                [0.5, 0.5, -0.5],
            ],
        ),
        (
            [1.0, 0.0, 0.0],
            [
                [0.5, -0.5, 0.5],
                [0.5, -0.5, -0.5],
                [0.5, 0.5, -0.5],
                [0.5, 0.5, 0.5],
            ],
        ),
        (
            [-1.0, 0.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [-0.5, -0.5, 0.5],
                [-0.5, 0.5, 0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        (
            [0.0, 1.0, 0.0],
            [
                [-0.5, 0.5, 0.5],
                [0.5, 0.5, 0.5],
                [0.5, 0.5, -0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        (
            [0.0, -1.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [0.5, -0.5, -0.5],
                [0.5, -0.5, 0.5],
                [-0.5, -0.5, 0.5],
            ],
        ),
    ];

    let corner_uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut positions = Vec::with_capacity(24 * 3);
    let mut normals = Vec::with_capacity(24 * 3);
    let mut tex_coords = Vec::with_capacity(24 * 2);
    let mut indices = Vec::with_capacity(36);

    for (face, (normal, corners)) in faces.iter().enumerate() {
        let base = (face * 4) as u32;
        for (corner, uv) in corners.iter().zip(corner_uvs.iter()) {
            positions.extend_from_slice(corner);
            normals.extend_from_slice(normal);
            tex_coords.extend_from_slice(uv);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData {
        name: "cube".to_string(),
        positions,
        normals,
        tex_coords,
        indices,
    }
}

/// Generates a flat rectangle in the XZ plane, facing +Y
pub fn generate_plane(width: f32, depth: f32) -> MeshData {
    let hw = width / 2.0;
    let hd = depth / 2.0;

    MeshData {
        name: "plane".to_string(),
        positions: vec![
            -hw, 0.0, hd, //
            hw, 0.0, hd, //
            hw, 0.0, -hd, //
            -hw, 0.0, -hd,
        ],
        normals: vec![
            0.0, 1.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ],
        tex_coords: vec![0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// Generates a unit sphere from latitude/longitude bands
pub fn generate_sphere(sectors: u32, stacks: u32) -> MeshData {
    let sectors = sectors.max(3);
    let stacks = stacks.max(2);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut tex_coords = Vec::new();
    let mut indices = Vec::new();

    for stack in 0..=stacks {
        let stack_angle = PI / 2.0 - (stack as f32) * PI / (stacks as f32);
        let xz = stack_angle.cos();
        let y = stack_angle.sin();

        for sector in 0..=sectors {
            let sector_angle = (sector as f32) * 2.0 * PI / (sectors as f32);
            let x = xz * sector_angle.cos();
            let z = xz * sector_angle.sin();

            positions.extend_from_slice(&[x * 0.5, y * 0.5, z * 0.5]);
            normals.extend_from_slice(&[x, y, z]);
            tex_coords.extend_from_slice(&[
                sector as f32 / sectors as f32,
                stack as f32 / stacks as f32,
            ]);
        }
    }

    for stack in 0..stacks {
        let row = stack * (sectors + 1);
        let next_row = (stack + 1) * (sectors + 1);

        for sector in 0..sectors {
            if stack != 0 {
                indices.extend_from_slice(&[row + sector, next_row + sector, row + sector + 1]);
            }
            if stack != stacks - 1 {
                indices.extend_from_slice(&[
                    row + sector + 1,
                    next_row + sector,
                    next_row + sector + 1,
                ]);
            }
        }
    }

    MeshData {
        name: "sphere".to_string(),
        positions,
        normals,
        tex_coords,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertex_count(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.normals.len(), cube.positions.len());
        assert_eq!(cube.tex_coords.len() / 2, cube.vertex_count());
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0);
        assert_eq!(plane.vertex_count(), 4);
        assert_eq!(plane.triangle_count(), 2);
        // All normals point up
        for normal in plane.normals.chunks(3) {
            assert_eq!(normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(8, 6);
        assert!(sphere.vertex_count() > 0);
        assert!(sphere.indices.len() > 0);
        assert_eq!(sphere.normals.len(), sphere.positions.len());
        assert_eq!(sphere.tex_coords.len() / 2, sphere.vertex_count());
        // Every normal is unit length
        for normal in sphere.normals.chunks(3) {
            let length =
                (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
            assert!((length - 1.0).abs() < 1e-5);
        }
    }
}
