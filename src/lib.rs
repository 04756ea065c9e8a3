// src/lib.rs
//! Neep 3D Scene Viewer
//!
//! An interactive 3D scene viewer built on wgpu and winit: deferred shading
//! with shadow mapping, a transform scene graph, and a first-person fly
//! camera with an imgui entity editor overlay.

pub mod app;
pub mod assets;
pub mod gfx;
pub mod input;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::NeepApp;

/// Creates a default Neep application instance
pub fn default() -> NeepApp {
    NeepApp::new()
}
