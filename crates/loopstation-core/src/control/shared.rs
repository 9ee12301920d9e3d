//! Lock-free control surface shared between a UI thread and the audio thread
//!
//! Every field is its own atomic with a single writer (the control side) and
//! a single reader (the audio side). Writers publish with `Release`, readers
//! load with `Acquire`. Triggers are taken with `swap(false, AcqRel)`, so
//! each press is observed exactly once however the two sides' cadences line
//! up.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::atomic::AtomicF32;
use crate::config::LooperConfig;
use crate::types::{clamp_to, DEFAULT_FEEDBACK, DEFAULT_VOLUME, FEEDBACK_RANGE, VOLUME_RANGE};

use super::{Button, ControlFrame, ControlSource, ParamId, ParamKind, Triggers};

/// One button: pending trigger plus the last level seen for edge detection
#[derive(Debug, Default)]
struct ButtonSlot {
    triggered: AtomicBool,
    level: AtomicBool,
}

impl ButtonSlot {
    #[inline]
    fn press(&self) {
        self.triggered.store(true, Ordering::Release);
    }

    /// Raise the trigger on a false -> true transition of the level
    #[inline]
    fn set_level(&self, level: bool) {
        let previous = self.level.swap(level, Ordering::AcqRel);
        if level && !previous {
            self.press();
        }
    }

    #[inline]
    fn take(&self) -> bool {
        self.triggered.swap(false, Ordering::AcqRel)
    }
}

/// Control state written by a UI or host thread and polled by the looper
///
/// Share it behind an `Arc`: the control side calls the setters, the audio
/// side passes it to [`Looper::process_block`](crate::Looper::process_block)
/// as its [`ControlSource`].
#[derive(Debug)]
pub struct SharedControls {
    record: ButtonSlot,
    play: ButtonSlot,
    stop: ButtonSlot,
    overdub: ButtonSlot,
    feedback: AtomicF32,
    volume: AtomicF32,
}

impl SharedControls {
    /// Controls at default levels with no pending triggers
    pub fn new() -> Self {
        Self {
            record: ButtonSlot::default(),
            play: ButtonSlot::default(),
            stop: ButtonSlot::default(),
            overdub: ButtonSlot::default(),
            feedback: AtomicF32::new(DEFAULT_FEEDBACK),
            volume: AtomicF32::new(DEFAULT_VOLUME),
        }
    }

    fn slot(&self, button: Button) -> &ButtonSlot {
        match button {
            Button::Record => &self.record,
            Button::Play => &self.play,
            Button::Stop => &self.stop,
            Button::Overdub => &self.overdub,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Control side
    // ─────────────────────────────────────────────────────────────

    /// Fire a one-shot trigger for `button`
    pub fn press(&self, button: Button) {
        self.slot(button).press();
    }

    /// Feed the current level of a held button
    ///
    /// Only the transition from released to held fires a trigger; holding
    /// the button across many updates fires it once.
    pub fn set_button_level(&self, button: Button, held: bool) {
        self.slot(button).set_level(held);
    }

    /// Feed the levels of all four buttons (record, play, stop, overdub)
    pub fn set_button_levels(&self, levels: Triggers) {
        self.record.set_level(levels.record);
        self.play.set_level(levels.play);
        self.stop.set_level(levels.stop);
        self.overdub.set_level(levels.overdub);
    }

    /// Set the feedback level (clamped to 0..1)
    pub fn set_feedback(&self, level: f32) {
        self.feedback
            .store(clamp_to(level, FEEDBACK_RANGE), Ordering::Release);
    }

    /// Set the output volume (clamped to 0..2)
    pub fn set_volume(&self, level: f32) {
        self.volume
            .store(clamp_to(level, VOLUME_RANGE), Ordering::Release);
    }

    /// Take the startup feedback and volume levels from a config
    pub fn apply_config(&self, config: &LooperConfig) {
        self.set_feedback(config.feedback);
        self.set_volume(config.volume);
    }

    /// Forward a raw host parameter change
    ///
    /// Button parameters count as held above 0.5.
    pub fn set_param(&self, param: ParamId, value: f32) {
        match param.info().kind {
            ParamKind::Button(button) => self.set_button_level(button, value > 0.5),
            ParamKind::Continuous => match param {
                ParamId::Feedback => self.set_feedback(value),
                ParamId::Volume => self.set_volume(value),
                _ => {}
            },
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Audio side
    // ─────────────────────────────────────────────────────────────

    /// Consume all pending triggers
    pub fn take_triggers(&self) -> Triggers {
        Triggers {
            record: self.record.take(),
            play: self.play.take(),
            stop: self.stop.take(),
            overdub: self.overdub.take(),
        }
    }

    /// Current feedback level
    #[inline]
    pub fn feedback(&self) -> f32 {
        self.feedback.load(Ordering::Acquire)
    }

    /// Current output volume
    #[inline]
    pub fn volume(&self) -> f32 {
        self.volume.load(Ordering::Acquire)
    }
}

impl Default for SharedControls {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlSource for SharedControls {
    fn poll(&self) -> ControlFrame {
        ControlFrame {
            triggers: self.take_triggers(),
            feedback: self.feedback(),
            volume: self.volume(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_trigger_is_consumed_once() {
        let controls = SharedControls::new();
        controls.press(Button::Record);

        assert!(controls.poll().triggers.record);
        assert!(!controls.poll().triggers.record);
    }

    #[test]
    fn test_repeated_presses_between_polls_collapse() {
        let controls = SharedControls::new();
        controls.press(Button::Play);
        controls.press(Button::Play);

        let triggers = controls.take_triggers();
        assert!(triggers.play);
        assert!(!controls.take_triggers().any());
    }

    #[test]
    fn test_levels_fire_on_rising_edge_only() {
        let controls = SharedControls::new();

        controls.set_button_level(Button::Overdub, true);
        controls.set_button_level(Button::Overdub, true);
        assert!(controls.take_triggers().overdub);

        // Still held: nothing new
        controls.set_button_level(Button::Overdub, true);
        assert!(!controls.take_triggers().overdub);

        controls.set_button_level(Button::Overdub, false);
        assert!(!controls.take_triggers().overdub);

        controls.set_button_level(Button::Overdub, true);
        assert!(controls.take_triggers().overdub);
    }

    #[test]
    fn test_button_levels_are_independent() {
        let controls = SharedControls::new();
        controls.set_button_levels(Triggers {
            record: true,
            stop: true,
            ..Triggers::NONE
        });

        let triggers = controls.take_triggers();
        assert!(triggers.record && triggers.stop);
        assert!(!triggers.play && !triggers.overdub);
    }

    #[test]
    fn test_levels_are_clamped() {
        let controls = SharedControls::new();
        assert_eq!(controls.feedback(), 0.8);
        assert_eq!(controls.volume(), 1.0);

        controls.set_feedback(1.7);
        controls.set_volume(-3.0);
        assert_eq!(controls.feedback(), 1.0);
        assert_eq!(controls.volume(), 0.0);

        controls.set_volume(f32::NAN);
        assert_eq!(controls.volume(), 0.0);
    }

    #[test]
    fn test_set_param_routes_by_kind() {
        let controls = SharedControls::new();
        controls.set_param(ParamId::Feedback, 0.25);
        controls.set_param(ParamId::Volume, 1.5);
        controls.set_param(ParamId::Stop, 1.0);

        let frame = controls.poll();
        assert_eq!(frame.feedback, 0.25);
        assert_eq!(frame.volume, 1.5);
        assert!(frame.triggers.stop);
    }

    #[test]
    fn test_apply_config_sets_levels() {
        let controls = SharedControls::new();
        controls.apply_config(&LooperConfig {
            feedback: 0.5,
            volume: 1.25,
            ..LooperConfig::default()
        });
        assert_eq!(controls.feedback(), 0.5);
        assert_eq!(controls.volume(), 1.25);
    }

    #[test]
    fn test_presses_from_another_thread_arrive_once() {
        let controls = Arc::new(SharedControls::new());
        let writer = Arc::clone(&controls);

        thread::spawn(move || {
            for _ in 0..100 {
                writer.press(Button::Play);
            }
        })
        .join()
        .unwrap();

        assert!(controls.poll().triggers.play);
        assert!(!controls.poll().triggers.play);
    }
}
