// src/input/mod.rs
//! # Input Module
//!
//! Event-driven input dispatch, decoupled from the window system. Raw device
//! events are translated into listener notifications delivered through an
//! ordered chain: each listener reports whether it consumed the event, and
//! the first consumer stops the chain. Earlier-registered listeners have
//! priority.

pub mod fly_controller;

pub use fly_controller::FlyController;

use std::cell::RefCell;
use std::rc::Rc;

use winit::keyboard::KeyCode;

/// A receiver of input notifications
///
/// Each handler returns `true` when it consumed the event, which stops the
/// dispatch chain.
pub trait InputListener {
    fn on_key_down(&mut self, key: KeyCode) -> bool;
    fn on_key_up(&mut self, key: KeyCode) -> bool;

    /// Cursor moved to a new window position
    ///
    /// `captured` reports the current cursor mode: deltas are only
    /// meaningful while the cursor is captured, and listeners must
    /// resynchronize their reference position when `captured` flips.
    fn on_mouse_move(&mut self, x: f64, y: f64, captured: bool) -> bool;
}

/// Ordered chain of input listeners
///
/// Listeners are shared with the application through `Rc<RefCell<..>>`; the
/// dispatcher only defines delivery order. `clear_listeners` ends delivery;
/// a removed listener is never invoked again.
pub struct InputDispatcher {
    listeners: Vec<Rc<RefCell<dyn InputListener>>>,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Appends a listener to the chain; earlier registrations run first
    pub fn add_listener(&mut self, listener: Rc<RefCell<dyn InputListener>>) {
        self.listeners.push(listener);
    }

    /// Drops every listener; nothing is notified afterwards
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn dispatch_key_down(&self, key: KeyCode) {
        for listener in &self.listeners {
            if listener.borrow_mut().on_key_down(key) {
                break;
            }
        }
    }

    pub fn dispatch_key_up(&self, key: KeyCode) {
        for listener in &self.listeners {
            if listener.borrow_mut().on_key_up(key) {
                break;
            }
        }
    }

    pub fn dispatch_mouse_move(&self, x: f64, y: f64, captured: bool) {
        for listener in &self.listeners {
            if listener.borrow_mut().on_mouse_move(x, y, captured) {
                break;
            }
        }
    }
}

impl Default for InputDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every call it sees; consumes according to its flags
    struct RecordingListener {
        consume_keys: bool,
        consume_mouse: bool,
        key_downs: Vec<KeyCode>,
        key_ups: Vec<KeyCode>,
        mouse_moves: Vec<(f64, f64)>,
    }

    impl RecordingListener {
        fn new(consume_keys: bool, consume_mouse: bool) -> Rc<RefCell<Self>> {
            Rc::new(RefCell::new(Self {
                consume_keys,
                consume_mouse,
                key_downs: Vec::new(),
                key_ups: Vec::new(),
                mouse_moves: Vec::new(),
            }))
        }
    }

    impl InputListener for RecordingListener {
        fn on_key_down(&mut self, key: KeyCode) -> bool {
            self.key_downs.push(key);
            self.consume_keys
        }

        fn on_key_up(&mut self, key: KeyCode) -> bool {
            self.key_ups.push(key);
            self.consume_keys
        }

        fn on_mouse_move(&mut self, x: f64, y: f64, _captured: bool) -> bool {
            self.mouse_moves.push((x, y));
            self.consume_mouse
        }
    }

    #[test]
    fn test_events_flow_through_non_consuming_listeners() {
        let mut dispatcher = InputDispatcher::new();
        let first = RecordingListener::new(false, false);
        let second = RecordingListener::new(false, false);
        dispatcher.add_listener(first.clone());
        dispatcher.add_listener(second.clone());

        dispatcher.dispatch_key_down(KeyCode::KeyW);
        dispatcher.dispatch_key_up(KeyCode::KeyW);
        dispatcher.dispatch_mouse_move(10.0, 20.0, true);

        assert_eq!(first.borrow().key_downs, vec![KeyCode::KeyW]);
        assert_eq!(second.borrow().key_downs, vec![KeyCode::KeyW]);
        assert_eq!(first.borrow().key_ups, vec![KeyCode::KeyW]);
        assert_eq!(second.borrow().mouse_moves, vec![(10.0, 20.0)]);
    }

    #[test]
    fn test_consuming_listener_short_circuits_the_chain() {
        let mut dispatcher = InputDispatcher::new();
        let first = RecordingListener::new(true, true);
        let second = RecordingListener::new(false, false);
        dispatcher.add_listener(first.clone());
        dispatcher.add_listener(second.clone());

        dispatcher.dispatch_key_down(KeyCode::KeyA);
        dispatcher.dispatch_mouse_move(1.0, 2.0, true);

        assert_eq!(first.borrow().key_downs.len(), 1);
        assert!(second.borrow().key_downs.is_empty());
        assert!(second.borrow().mouse_moves.is_empty());
    }

    #[test]
    fn test_registration_order_sets_priority() {
        let mut dispatcher = InputDispatcher::new();
        let first = RecordingListener::new(false, false);
        let interceptor = RecordingListener::new(true, true);
        dispatcher.add_listener(first.clone());
        dispatcher.add_listener(interceptor.clone());

        dispatcher.dispatch_key_down(KeyCode::Space);

        // The earlier listener saw it first; the later one consumed it but
        // could not hide it from its predecessor.
        assert_eq!(first.borrow().key_downs.len(), 1);
        assert_eq!(interceptor.borrow().key_downs.len(), 1);
    }

    #[test]
    fn test_cleared_listeners_are_never_invoked() {
        let mut dispatcher = InputDispatcher::new();
        let listener = RecordingListener::new(false, false);
        dispatcher.add_listener(listener.clone());
        dispatcher.clear_listeners();

        dispatcher.dispatch_key_down(KeyCode::KeyW);
        dispatcher.dispatch_mouse_move(0.0, 0.0, false);

        assert!(listener.borrow().key_downs.is_empty());
        assert!(listener.borrow().mouse_moves.is_empty());
        assert_eq!(dispatcher.listener_count(), 0);
    }
}
