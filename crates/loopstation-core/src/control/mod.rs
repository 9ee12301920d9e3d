//! Control surface contract
//!
//! Once per block the looper pulls a [`ControlFrame`] from a
//! [`ControlSource`]: the four transport triggers plus the feedback and
//! volume levels. Triggers are one-shot; a source hands each press out once
//! and then forgets it, so a press that doesn't apply in the current state is
//! dropped rather than queued.
//!
//! [`SharedControls`] is the lock-free source a UI or host thread writes to
//! while the audio thread polls it.

mod params;
mod shared;

pub use params::{param_layout, ParamId, ParamInfo, ParamKind};
pub use shared::SharedControls;

use crate::types::{DEFAULT_FEEDBACK, DEFAULT_VOLUME};

/// Transport buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Record,
    Play,
    Stop,
    Overdub,
}

/// One-shot transport triggers for a single block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Triggers {
    pub record: bool,
    pub play: bool,
    pub stop: bool,
    pub overdub: bool,
}

impl Triggers {
    /// No buttons pressed
    pub const NONE: Triggers = Triggers {
        record: false,
        play: false,
        stop: false,
        overdub: false,
    };

    /// Triggers with just `button` pressed
    pub fn pressed(button: Button) -> Self {
        let mut triggers = Self::NONE;
        match button {
            Button::Record => triggers.record = true,
            Button::Play => triggers.play = true,
            Button::Stop => triggers.stop = true,
            Button::Overdub => triggers.overdub = true,
        }
        triggers
    }

    /// Whether any button was pressed
    pub fn any(&self) -> bool {
        self.record || self.play || self.stop || self.overdub
    }
}

/// Control values for one block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlFrame {
    pub triggers: Triggers,
    /// Feedback level, 0..1
    pub feedback: f32,
    /// Output volume, 0..2
    pub volume: f32,
}

impl ControlFrame {
    /// Frame at the given levels with no triggers
    pub fn new(feedback: f32, volume: f32) -> Self {
        Self {
            triggers: Triggers::NONE,
            feedback,
            volume,
        }
    }

    /// Same levels with `button` pressed
    pub fn with_press(mut self, button: Button) -> Self {
        self.triggers = Triggers::pressed(button);
        self
    }
}

impl Default for ControlFrame {
    fn default() -> Self {
        Self::new(DEFAULT_FEEDBACK, DEFAULT_VOLUME)
    }
}

/// Supplies control values to the audio thread
///
/// `poll` runs on the audio thread once per block: it must not block or
/// allocate, and it consumes the triggers it returns.
pub trait ControlSource {
    fn poll(&self) -> ControlFrame;
}

/// Test fixture: replays the same triggers and levels on every poll
#[cfg(test)]
impl ControlSource for ControlFrame {
    fn poll(&self) -> ControlFrame {
        *self
    }
}

impl<T: ControlSource + ?Sized> ControlSource for std::sync::Arc<T> {
    fn poll(&self) -> ControlFrame {
        (**self).poll()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressed_sets_one_trigger() {
        let triggers = Triggers::pressed(Button::Overdub);
        assert!(triggers.overdub);
        assert!(!triggers.record && !triggers.play && !triggers.stop);
        assert!(triggers.any());
        assert!(!Triggers::NONE.any());
    }

    #[test]
    fn test_shared_source_hands_out_each_press_once() {
        let controls = std::sync::Arc::new(SharedControls::new());
        controls.press(Button::Stop);

        let source: &dyn ControlSource = &controls;
        assert!(source.poll().triggers.stop);
        assert!(!source.poll().triggers.any());
    }

    #[test]
    fn test_default_frame_levels() {
        let frame = ControlFrame::default();
        assert_eq!(frame.feedback, 0.8);
        assert_eq!(frame.volume, 1.0);
        assert_eq!(frame.triggers, Triggers::NONE);
    }
}
