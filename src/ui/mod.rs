// src/ui/mod.rs
//! # User Interface Module
//!
//! Dear ImGui overlay for the viewer: the [`UiManager`] integrates imgui
//! with winit and wgpu, [`entity_panel`] provides the entity editor, and
//! [`UiCaptureListener`] gives the overlay its seat in the input dispatch
//! chain.

pub mod entity_panel;
pub mod manager;

pub use entity_panel::draw_entity_editor;
pub use manager::UiManager;

use std::cell::Cell;
use std::rc::Rc;

use winit::keyboard::KeyCode;

use crate::input::InputListener;

/// The overlay's input-chain listener
///
/// Consumes key and mouse events while imgui wants to capture them (a
/// widget has focus, the cursor is over a window) and passes everything
/// through otherwise. Registered ahead of the camera controller so the
/// overlay can intercept input when it has focus.
///
/// The capture flags are shared cells refreshed from imgui's io once per
/// frame by the application shell.
pub struct UiCaptureListener {
    want_mouse: Rc<Cell<bool>>,
    want_keyboard: Rc<Cell<bool>>,
}

impl UiCaptureListener {
    pub fn new(want_mouse: Rc<Cell<bool>>, want_keyboard: Rc<Cell<bool>>) -> Self {
        Self {
            want_mouse,
            want_keyboard,
        }
    }
}

impl InputListener for UiCaptureListener {
    fn on_key_down(&mut self, _key: KeyCode) -> bool {
        self.want_keyboard.get()
    }

    fn on_key_up(&mut self, _key: KeyCode) -> bool {
        self.want_keyboard.get()
    }

    fn on_mouse_move(&mut self, _x: f64, _y: f64, captured: bool) -> bool {
        // While the cursor is captured for mouse look, the overlay never
        // interferes.
        !captured && self.want_mouse.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_through_without_focus() {
        let want_mouse = Rc::new(Cell::new(false));
        let want_keyboard = Rc::new(Cell::new(false));
        let mut listener = UiCaptureListener::new(want_mouse, want_keyboard);

        assert!(!listener.on_key_down(KeyCode::KeyW));
        assert!(!listener.on_mouse_move(0.0, 0.0, false));
    }

    #[test]
    fn test_consumes_while_focused() {
        let want_mouse = Rc::new(Cell::new(true));
        let want_keyboard = Rc::new(Cell::new(true));
        let mut listener = UiCaptureListener::new(want_mouse.clone(), want_keyboard.clone());

        assert!(listener.on_key_down(KeyCode::KeyW));
        assert!(listener.on_mouse_move(0.0, 0.0, false));

        // A captured cursor always belongs to the camera
        assert!(!listener.on_mouse_move(0.0, 0.0, true));
    }
}
