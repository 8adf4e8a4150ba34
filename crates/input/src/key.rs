use serde::{Deserialize, Serialize};

/// A logical key the simulation understands.
///
/// Hosts map their raw key names onto these; the core never sees raw events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    /// Held to charge, released to fire.
    Fire,
}

impl Key {
    /// Map a host key name (`KeyboardEvent.key` style) to a logical key.
    pub fn from_name(name: &str) -> Option<Key> {
        match name.to_ascii_lowercase().as_str() {
            "w" | "arrowup" => Some(Key::Forward),
            "s" | "arrowdown" => Some(Key::Backward),
            "a" | "arrowleft" => Some(Key::TurnLeft),
            "d" | "arrowright" => Some(Key::TurnRight),
            " " | "space" | "spacebar" => Some(Key::Fire),
            _ => None,
        }
    }
}

/// Keys as seen at the start of one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    /// Fire key is currently held.
    pub charge_held: bool,
    /// Fire key went up at least once since the previous snapshot.
    pub fire_released: bool,
}

impl InputSnapshot {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Host-side key state, written by key event callbacks between frames.
///
/// Release of the fire key is latched so a press and release that both land
/// between two frames is still seen once.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    current: InputSnapshot,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.set(key, true);
    }

    pub fn release(&mut self, key: Key) {
        if key == Key::Fire && self.current.charge_held {
            self.current.fire_released = true;
        }
        self.set(key, false);
    }

    /// Apply a raw host event by key name. Unknown keys are ignored.
    pub fn handle_named(&mut self, name: &str, pressed: bool) -> bool {
        match Key::from_name(name) {
            Some(key) if pressed => {
                self.press(key);
                true
            }
            Some(key) => {
                self.release(key);
                true
            }
            None => false,
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        match key {
            Key::Forward => self.current.forward,
            Key::Backward => self.current.backward,
            Key::TurnLeft => self.current.turn_left,
            Key::TurnRight => self.current.turn_right,
            Key::Fire => self.current.charge_held,
        }
    }

    /// Take this frame's snapshot and clear the latched release edge.
    pub fn snapshot(&mut self) -> InputSnapshot {
        let snap = self.current;
        self.current.fire_released = false;
        snap
    }

    fn set(&mut self, key: Key, down: bool) {
        match key {
            Key::Forward => self.current.forward = down,
            Key::Backward => self.current.backward = down,
            Key::TurnLeft => self.current.turn_left = down,
            Key::TurnRight => self.current.turn_right = down,
            Key::Fire => self.current.charge_held = down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_map_case_insensitively() {
        assert_eq!(Key::from_name("W"), Some(Key::Forward));
        assert_eq!(Key::from_name("ArrowLeft"), Some(Key::TurnLeft));
        assert_eq!(Key::from_name(" "), Some(Key::Fire));
        assert_eq!(Key::from_name("q"), None);
    }

    #[test]
    fn press_and_release_track_held_keys() {
        let mut input = InputState::new();
        input.press(Key::Forward);
        input.press(Key::TurnRight);
        let snap = input.snapshot();
        assert!(snap.forward);
        assert!(snap.turn_right);
        assert!(!snap.backward);

        input.release(Key::Forward);
        assert!(!input.is_held(Key::Forward));
        assert!(input.is_held(Key::TurnRight));
    }

    #[test]
    fn fire_release_is_latched_for_one_snapshot() {
        let mut input = InputState::new();
        input.press(Key::Fire);
        input.release(Key::Fire);

        let first = input.snapshot();
        assert!(!first.charge_held);
        assert!(first.fire_released);

        let second = input.snapshot();
        assert!(!second.fire_released);
    }

    #[test]
    fn release_without_press_does_not_latch() {
        let mut input = InputState::new();
        input.release(Key::Fire);
        assert!(!input.snapshot().fire_released);
    }

    #[test]
    fn unknown_named_keys_are_ignored() {
        let mut input = InputState::new();
        assert!(!input.handle_named("Escape", true));
        assert!(input.handle_named("d", true));
        assert!(input.snapshot().turn_right);
        assert!(InputSnapshot::idle().is_idle());
    }
}
