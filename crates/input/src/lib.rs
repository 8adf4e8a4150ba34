//! Input: host key events folded into per-frame snapshots.
//!
//! # Invariants
//! - The simulation reads an explicit [`InputSnapshot`], never live key state.
//! - One fire-key release produces at most one fire signal.

pub mod key;
pub mod trigger;

pub use key::{InputSnapshot, InputState, Key};
pub use trigger::{FireTrigger, TriggerPhase, TriggerSignal};

pub fn crate_info() -> &'static str {
    "tankfield-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("input"));
    }
}
