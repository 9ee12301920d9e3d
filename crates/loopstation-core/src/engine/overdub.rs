//! Overdub engine - layers live input onto existing loop content
//!
//! Each pass scales what is already in the loop by the feedback level and
//! adds the new input scaled by the overdub gain:
//!
//! ```text
//! existing[i] = existing[i] * feedback + input[i] * overdub_gain
//! ```
//!
//! With feedback below 1 older layers fade geometrically from pass to pass,
//! like a tape loop. Feedback multiplies the whole loop history, so changes
//! to it are ramped across the block; the overdub gain only touches new
//! material and is applied as is.

use crate::types::{
    clamp_to, AudioBuffer, DEFAULT_FEEDBACK, DEFAULT_OVERDUB_GAIN, FEEDBACK_RANGE,
    OVERDUB_GAIN_RANGE,
};

use super::smoothing::SmoothedGain;

/// Mixes new input into loop content with feedback decay
#[derive(Debug, Clone)]
pub struct OverdubEngine {
    feedback: SmoothedGain,
    overdub_gain: f32,
    sample_rate: f64,
    initialized: bool,
}

impl OverdubEngine {
    /// Create an engine with default feedback (0.8) and unity overdub gain
    pub fn new() -> Self {
        Self {
            feedback: SmoothedGain::new(DEFAULT_FEEDBACK),
            overdub_gain: DEFAULT_OVERDUB_GAIN,
            sample_rate: 0.0,
            initialized: false,
        }
    }

    /// Prepare for processing; any pending feedback ramp is settled
    pub fn initialize(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.feedback.reset(self.feedback.target());
        self.initialized = true;
    }

    /// Check if the engine has been initialized
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Sample rate passed to initialize
    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Set the feedback level (clamped to 0..1), ramped in on the next pass
    pub fn set_feedback_level(&mut self, level: f32) {
        self.feedback.set_target(clamp_to(level, FEEDBACK_RANGE));
    }

    /// Feedback level being applied (the ramp target)
    #[inline]
    pub fn feedback_level(&self) -> f32 {
        self.feedback.target()
    }

    /// Set the gain for new material (clamped to 0..2)
    pub fn set_overdub_gain(&mut self, gain: f32) {
        self.overdub_gain = clamp_to(gain, OVERDUB_GAIN_RANGE);
    }

    /// Gain applied to new material
    #[inline]
    pub fn overdub_gain(&self) -> f32 {
        self.overdub_gain
    }

    /// Mix `input` into `existing` in place
    ///
    /// Processes the channels and samples both buffers have. Does nothing
    /// before initialization or when there is nothing in common to mix.
    pub fn process_overdub(
        &mut self,
        existing: &mut AudioBuffer,
        input: &AudioBuffer,
        feedback_level: f32,
    ) {
        if !self.initialized {
            return;
        }
        let num_samples = existing.len().min(input.len());
        let num_channels = existing.num_channels().min(input.num_channels());
        if num_samples == 0 || num_channels == 0 {
            return;
        }

        self.set_feedback_level(feedback_level);
        let gain = self.overdub_gain;

        for ch in 0..num_channels {
            let new = &input.channel(ch)[..num_samples];
            let loop_content = &mut existing.channel_mut(ch)[..num_samples];
            for (i, (sample, &new_sample)) in loop_content.iter_mut().zip(new).enumerate() {
                let feedback = self.feedback.gain_at(i, num_samples);
                *sample = *sample * feedback + new_sample * gain;
            }
        }

        self.feedback.finish_block();
    }
}

impl Default for OverdubEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(num_channels: usize, len: usize, value: f32) -> AudioBuffer {
        let mut buffer = AudioBuffer::new(num_channels, len);
        for ch in 0..num_channels {
            buffer.channel_mut(ch).fill(value);
        }
        buffer
    }

    fn engine() -> OverdubEngine {
        let mut engine = OverdubEngine::new();
        engine.initialize(48000.0);
        engine
    }

    #[test]
    fn test_defaults() {
        let engine = OverdubEngine::new();
        assert_eq!(engine.feedback_level(), 0.8);
        assert_eq!(engine.overdub_gain(), 1.0);
        assert!(!engine.is_initialized());
    }

    #[test]
    fn test_uninitialized_is_noop() {
        let mut engine = OverdubEngine::new();
        let mut existing = constant(1, 8, 1.0);
        engine.process_overdub(&mut existing, &constant(1, 8, 1.0), 0.5);
        assert_eq!(existing.channel(0), &[1.0; 8]);
    }

    #[test]
    fn test_mix_formula() {
        let mut engine = engine();
        engine.set_overdub_gain(0.5);

        let mut existing = constant(2, 16, 1.0);
        let input = constant(2, 16, 0.4);
        engine.process_overdub(&mut existing, &input, 0.8);

        for ch in 0..2 {
            for &s in existing.channel(ch) {
                assert!((s - (0.8 + 0.2)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_parameters_are_clamped() {
        let mut engine = engine();
        engine.set_overdub_gain(5.0);
        assert_eq!(engine.overdub_gain(), 2.0);
        engine.set_overdub_gain(-1.0);
        assert_eq!(engine.overdub_gain(), 0.0);

        engine.set_feedback_level(1.5);
        assert_eq!(engine.feedback_level(), 1.0);
        engine.set_feedback_level(-0.5);
        assert_eq!(engine.feedback_level(), 0.0);
    }

    #[test]
    fn test_feedback_change_is_ramped() {
        let mut engine = engine();
        let mut existing = constant(1, 8, 1.0);
        engine.process_overdub(&mut existing, &constant(1, 8, 0.0), 0.4);

        let samples = existing.channel(0);
        // Starts just below the previous 0.8, ends exactly on 0.4
        assert!((samples[0] - 0.75).abs() < 1e-6);
        assert!((samples[7] - 0.4).abs() < 1e-6);
        for pair in samples.windows(2) {
            assert!(pair[1] < pair[0]);
        }

        // Next block at the same level is flat
        let mut existing = constant(1, 8, 1.0);
        engine.process_overdub(&mut existing, &constant(1, 8, 0.0), 0.4);
        assert!(existing.channel(0).iter().all(|&s| (s - 0.4).abs() < 1e-6));
    }

    #[test]
    fn test_mismatched_buffers_use_common_part() {
        let mut engine = engine();
        let mut existing = constant(2, 8, 1.0);
        let input = constant(1, 4, 1.0);
        engine.process_overdub(&mut existing, &input, 0.8);

        assert!(existing.channel(0)[..4].iter().all(|&s| (s - 1.8).abs() < 1e-6));
        assert_eq!(&existing.channel(0)[4..], &[1.0; 4]);
        assert_eq!(existing.channel(1), &[1.0; 8]);
    }

    #[test]
    fn test_empty_buffers_are_noop() {
        let mut engine = engine();
        let mut existing = AudioBuffer::new(2, 0);
        engine.process_overdub(&mut existing, &constant(2, 4, 1.0), 0.8);
        assert!(existing.is_empty());
    }

    #[test]
    fn test_layers_decay_geometrically() {
        let amplitude = 0.5;
        let gain = 0.75;
        let feedback = 0.6;

        let mut engine = engine();
        engine.set_overdub_gain(gain);

        // First pass lays down the input onto an empty loop
        let mut loop_content = constant(2, 64, 0.0);
        engine.process_overdub(&mut loop_content, &constant(2, 64, amplitude), feedback);

        let silence = constant(2, 64, 0.0);
        for k in 1..=10 {
            engine.process_overdub(&mut loop_content, &silence, feedback);
            let expected = amplitude * gain * feedback.powi(k);
            for ch in 0..2 {
                for &s in loop_content.channel(ch) {
                    assert!(
                        (s - expected).abs() < 1e-6,
                        "pass {}: {} != {}",
                        k,
                        s,
                        expected
                    );
                }
            }
        }
    }
}
