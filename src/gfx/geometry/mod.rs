// src/gfx/geometry/mod.rs
//! Procedural geometry
//!
//! Simple generated meshes for demos and tests, so scenes work without
//! OBJ files on disk.

pub mod primitives;

pub use primitives::{generate_cube, generate_plane, generate_sphere};
