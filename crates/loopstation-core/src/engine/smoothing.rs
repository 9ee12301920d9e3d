//! Per-block linear gain ramp
//!
//! A gain that changes between blocks would step abruptly at the block
//! boundary and click. [`SmoothedGain`] instead ramps linearly from the value
//! reached at the end of the previous block to the new target over the
//! length of the current block.

/// Gain that ramps from its previous value to a target across one block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedGain {
    current: f32,
    target: f32,
}

impl SmoothedGain {
    /// Create a gain resting at `value`
    pub fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
        }
    }

    /// Set the value to ramp towards over the next block
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump straight to `value` with no ramp
    #[inline]
    pub fn reset(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    /// Value reached at the end of the last block
    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Value being ramped towards
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the next block will ramp
    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.current != self.target
    }

    /// Gain for sample `index` of a block of `block_len` samples
    ///
    /// The last sample of the block lands exactly on the target.
    #[inline]
    pub fn gain_at(&self, index: usize, block_len: usize) -> f32 {
        if block_len == 0 || !self.is_ramping() {
            return self.target;
        }
        let t = (index + 1) as f32 / block_len as f32;
        self.current + (self.target - self.current) * t
    }

    /// Mark the block as done, so the next block starts from the target
    #[inline]
    pub fn finish_block(&mut self) {
        self.current = self.target;
    }
}

impl Default for SmoothedGain {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steady_gain_is_flat() {
        let gain = SmoothedGain::new(0.8);
        for i in 0..16 {
            assert_eq!(gain.gain_at(i, 16), 0.8);
        }
    }

    #[test]
    fn test_ramp_ends_on_target() {
        let mut gain = SmoothedGain::new(0.0);
        gain.set_target(1.0);
        assert!(gain.is_ramping());

        assert!((gain.gain_at(0, 4) - 0.25).abs() < 1e-6);
        assert!((gain.gain_at(1, 4) - 0.5).abs() < 1e-6);
        assert_eq!(gain.gain_at(3, 4), 1.0);

        gain.finish_block();
        assert!(!gain.is_ramping());
        assert_eq!(gain.current(), 1.0);
    }

    #[test]
    fn test_ramp_is_monotonic() {
        let mut gain = SmoothedGain::new(0.8);
        gain.set_target(0.2);
        let mut last = gain.current();
        for i in 0..64 {
            let g = gain.gain_at(i, 64);
            assert!(g <= last);
            last = g;
        }
        assert!((last - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_reset_skips_ramp() {
        let mut gain = SmoothedGain::new(0.8);
        gain.set_target(0.1);
        gain.reset(0.5);
        assert!(!gain.is_ramping());
        assert_eq!(gain.gain_at(0, 8), 0.5);
    }
}
