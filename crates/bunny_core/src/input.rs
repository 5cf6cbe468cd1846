//! Per-frame input sample with both edge-triggered and level-triggered queries.
//!
//! Keys and mouse buttons are identified by the host's code names (for the
//! winit host, the `KeyCode` debug name such as `"ArrowUp"` or `"KeyW"`), so
//! bindings can live in data files without a translation table.
//!
//! - **Level-triggered (held):** `key_down(code)` is true every frame the key
//!   is physically down.
//! - **Edge-triggered (pressed / released):** true only during the frame the
//!   transition happened. Cleared by `end_frame()`, which the host calls after
//!   the frame's `draw`.
//!
//! Scroll deltas accumulate across all wheel events of the frame and reset in
//! `end_frame()`, so `scroll()` is zero on frames without wheel input.

use std::collections::HashSet;

use glam::Vec2;

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<String>,
    just_pressed: HashSet<String>,
    just_released: HashSet<String>,

    mouse_held: HashSet<String>,
    mouse_just_pressed: HashSet<String>,
    mouse_just_released: HashSet<String>,

    mouse_position: Vec2,
    scroll: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, code: &str) {
        if self.held.insert(code.to_string()) {
            self.just_pressed.insert(code.to_string());
        }
    }

    pub fn release(&mut self, code: &str) {
        if self.held.remove(code) {
            self.just_released.insert(code.to_string());
        }
    }

    /// Replaces the held set, emitting press/release edges for the difference.
    pub fn set_held<'a>(&mut self, codes: impl IntoIterator<Item = &'a str>) {
        let next: HashSet<&str> = codes.into_iter().collect();
        let released: Vec<String> = self
            .held
            .iter()
            .filter(|code| !next.contains(code.as_str()))
            .cloned()
            .collect();
        for code in released {
            self.release(&code);
        }
        for code in next {
            self.press(code);
        }
    }

    pub fn press_button(&mut self, button: &str) {
        if self.mouse_held.insert(button.to_string()) {
            self.mouse_just_pressed.insert(button.to_string());
        }
    }

    pub fn release_button(&mut self, button: &str) {
        if self.mouse_held.remove(button) {
            self.mouse_just_released.insert(button.to_string());
        }
    }

    pub fn set_mouse_position(&mut self, position: Vec2) {
        self.mouse_position = position;
    }

    pub fn add_scroll(&mut self, delta: Vec2) {
        self.scroll += delta;
    }

    pub fn key_down(&self, code: &str) -> bool {
        self.held.contains(code)
    }

    pub fn key_pressed(&self, code: &str) -> bool {
        self.just_pressed.contains(code)
    }

    pub fn key_released(&self, code: &str) -> bool {
        self.just_released.contains(code)
    }

    pub fn mouse_down(&self, button: &str) -> bool {
        self.mouse_held.contains(button)
    }

    pub fn mouse_pressed(&self, button: &str) -> bool {
        self.mouse_just_pressed.contains(button)
    }

    pub fn mouse_released(&self, button: &str) -> bool {
        self.mouse_just_released.contains(button)
    }

    /// Pointer position in screen pixels (origin top-left).
    pub fn mouse_pos(&self) -> Vec2 {
        self.mouse_position
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    /// Held key codes, sorted so snapshots are reproducible.
    pub fn held_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.held.iter().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Releases every held key and button, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.just_released.extend(self.held.drain());
        self.mouse_just_released.extend(self.mouse_held.drain());
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.mouse_just_pressed.clear();
        self.mouse_just_released.clear();
        self.scroll = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.press("KeyA");
        assert!(input.key_down("KeyA"));
        assert!(input.key_pressed("KeyA"));
    }

    #[test]
    fn test_release_clears_held_sets_just_released() {
        let mut input = InputState::new();
        input.press("KeyA");
        input.release("KeyA");
        assert!(!input.key_down("KeyA"));
        assert!(input.key_released("KeyA"));
    }

    #[test]
    fn test_press_repeat_does_not_double_just_pressed() {
        let mut input = InputState::new();
        input.press("ArrowUp");
        input.end_frame();
        // OS key repeat sends more presses while held; that is not a new edge.
        input.press("ArrowUp");
        assert!(input.key_down("ArrowUp"));
        assert!(!input.key_pressed("ArrowUp"));
    }

    #[test]
    fn test_release_without_press_is_no_op() {
        let mut input = InputState::new();
        input.release("KeyA");
        assert!(!input.key_released("KeyA"));
        assert!(!input.key_down("KeyA"));
    }

    #[test]
    fn test_end_frame_clears_transient_state() {
        let mut input = InputState::new();
        input.press("KeyA");
        input.press("Space");
        input.add_scroll(Vec2::new(0.0, 2.0));
        input.end_frame();
        assert!(!input.key_pressed("KeyA"));
        assert!(!input.key_pressed("Space"));
        assert_eq!(input.scroll(), Vec2::ZERO);
        // Held state persists across frames.
        assert!(input.key_down("KeyA"));
        assert!(input.key_down("Space"));
    }

    #[test]
    fn test_scroll_accumulates_within_frame() {
        let mut input = InputState::new();
        input.add_scroll(Vec2::new(0.0, 1.0));
        input.add_scroll(Vec2::new(0.5, -3.0));
        assert_eq!(input.scroll(), Vec2::new(0.5, -2.0));
    }

    #[test]
    fn test_set_held_emits_edges_for_difference() {
        let mut input = InputState::new();
        input.set_held(["ArrowUp", "Minus"]);
        input.end_frame();

        input.set_held(["Minus", "Equal"]);
        assert!(input.key_released("ArrowUp"));
        assert!(!input.key_down("ArrowUp"));
        assert!(input.key_pressed("Equal"));
        assert!(!input.key_pressed("Minus"));
        assert_eq!(input.held_keys(), vec!["Equal", "Minus"]);
    }

    #[test]
    fn test_mouse_buttons_track_edges() {
        let mut input = InputState::new();
        input.press_button("Left");
        assert!(input.mouse_down("Left"));
        assert!(input.mouse_pressed("Left"));
        input.end_frame();
        assert!(!input.mouse_pressed("Left"));

        input.release_button("Left");
        assert!(input.mouse_released("Left"));
        assert!(!input.mouse_down("Left"));
    }

    #[test]
    fn test_mouse_position_tracking() {
        let mut input = InputState::new();
        input.set_mouse_position(Vec2::new(100.0, 200.0));
        assert_eq!(input.mouse_pos(), Vec2::new(100.0, 200.0));
        input.end_frame();
        assert_eq!(input.mouse_pos(), Vec2::new(100.0, 200.0));
    }

    #[test]
    fn test_release_all_emits_release_edges() {
        let mut input = InputState::new();
        input.press("KeyW");
        input.press_button("Left");
        input.end_frame();

        input.release_all();
        assert!(!input.key_down("KeyW"));
        assert!(input.key_released("KeyW"));
        assert!(!input.mouse_down("Left"));
        assert!(input.mouse_released("Left"));
        assert!(input.held_keys().is_empty());

        input.end_frame();
        input.release_all();
        assert!(!input.key_released("KeyW"));
    }

    #[test]
    fn test_default_state_is_empty() {
        let input = InputState::new();
        assert!(!input.key_down("KeyA"));
        assert!(!input.key_pressed("KeyA"));
        assert!(!input.key_released("KeyA"));
        assert!(!input.mouse_down("Left"));
        assert_eq!(input.mouse_pos(), Vec2::ZERO);
        assert_eq!(input.scroll(), Vec2::ZERO);
        assert!(input.held_keys().is_empty());
    }
}
