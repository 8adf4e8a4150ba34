use crate::key::InputSnapshot;

/// Where the fire key is in its press/release cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerPhase {
    #[default]
    Idle,
    Charging,
    /// Released this frame; becomes `Idle` on the next update.
    JustReleased,
}

/// What the weapon should do this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSignal {
    None,
    /// Keep accumulating charge.
    Charge,
    /// Fire once with whatever charge has built up.
    Fire,
}

/// Edge detector turning the level-triggered fire key into fire events.
///
/// Updated exactly once per frame. It remembers the previous frame's held
/// state, so a release is seen as a transition rather than as "not held".
#[derive(Debug, Clone, Default)]
pub struct FireTrigger {
    phase: TriggerPhase,
    was_held: bool,
}

impl FireTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TriggerPhase {
        self.phase
    }

    pub fn update(&mut self, input: &InputSnapshot) -> TriggerSignal {
        let held = input.charge_held;
        let released = (self.was_held && !held) || input.fire_released;
        self.was_held = held;

        if released {
            // Press-release-press between frames: fire now, charge again next frame.
            self.phase = if held {
                TriggerPhase::Charging
            } else {
                TriggerPhase::JustReleased
            };
            tracing::trace!(phase = ?self.phase, "fire edge");
            return TriggerSignal::Fire;
        }

        if held {
            self.phase = TriggerPhase::Charging;
            TriggerSignal::Charge
        } else {
            self.phase = TriggerPhase::Idle;
            TriggerSignal::None
        }
    }
}
