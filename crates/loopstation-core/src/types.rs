//! Common types for Loopstation
//!
//! This module contains the fundamental audio types used throughout the
//! looper engine: the sample type, the planar multi-channel buffer that
//! carries one audio block, and the engine-wide constants.

/// Default sample rate (48kHz - standard professional audio rate)
/// The actual rate is supplied by the host at initialization.
pub const DEFAULT_SAMPLE_RATE: f64 = 48000.0;

/// Maximum loop duration in seconds, used to size the loop storage once
pub const MAX_LOOP_SECONDS: f64 = 60.0;

/// Largest ring capacity in samples per channel (2^30, over 90 minutes at
/// 192kHz). Longer maximum loop durations are rejected at setup.
pub const MAX_STORAGE_SAMPLES: usize = 1 << 30;

/// Feedback level range (fraction of old loop content kept per pass)
pub const FEEDBACK_RANGE: (f32, f32) = (0.0, 1.0);

/// Volume range (unity = 1.0)
pub const VOLUME_RANGE: (f32, f32) = (0.0, 2.0);

/// Overdub gain range for new material layered onto the loop
pub const OVERDUB_GAIN_RANGE: (f32, f32) = (0.0, 2.0);

/// Default feedback level
pub const DEFAULT_FEEDBACK: f32 = 0.8;

/// Default output volume
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Default overdub gain
pub const DEFAULT_OVERDUB_GAIN: f32 = 1.0;

/// Audio sample type (32-bit float)
pub type Sample = f32;

/// Clamp a value into an inclusive `(min, max)` range, mapping NaN to `min`
#[inline]
pub fn clamp_to(value: f32, range: (f32, f32)) -> f32 {
    if value.is_nan() {
        return range.0;
    }
    value.clamp(range.0, range.1)
}

/// A block of audio stored as one sample array per channel
///
/// This is the buffer type that carries audio through the engine. Channels
/// are kept planar (non-interleaved) so each channel can be copied into and
/// out of the loop storage with straight slice operations.
///
/// Buffers are pre-allocated to a maximum length at setup time; the working
/// length can then be changed with [`AudioBuffer::set_len_from_capacity`]
/// without touching the allocator.
#[derive(Debug, Clone, Default)]
pub struct AudioBuffer {
    channels: Vec<Vec<Sample>>,
    len: usize,
}

impl AudioBuffer {
    /// Create a silent buffer with `num_channels` channels of `len` samples
    pub fn new(num_channels: usize, len: usize) -> Self {
        Self {
            channels: vec![vec![0.0; len]; num_channels],
            len,
        }
    }

    /// Create a buffer from per-channel sample slices
    ///
    /// All channels are truncated to the shortest slice.
    pub fn from_channels(channels: &[&[Sample]]) -> Self {
        let len = channels.iter().map(|c| c.len()).min().unwrap_or(0);
        Self {
            channels: channels.iter().map(|c| c[..len].to_vec()).collect(),
            len,
        }
    }

    /// Number of channels
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Working length in samples (per channel)
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the buffer holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of samples each channel can hold without reallocating
    #[inline]
    pub fn capacity(&self) -> usize {
        self.channels.first().map_or(0, |c| c.len())
    }

    /// Set the working length of a pre-allocated buffer (real-time safe)
    ///
    /// The length is clamped to the allocated capacity; never allocates.
    #[inline]
    pub fn set_len_from_capacity(&mut self, new_len: usize) {
        debug_assert!(
            new_len <= self.capacity(),
            "set_len_from_capacity called with len > capacity"
        );
        self.len = new_len.min(self.capacity());
    }

    /// Read-only view of one channel's working samples
    #[inline]
    pub fn channel(&self, index: usize) -> &[Sample] {
        &self.channels[index][..self.len]
    }

    /// Mutable view of one channel's working samples
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [Sample] {
        let len = self.len;
        &mut self.channels[index][..len]
    }

    /// Fill the working samples of every channel with silence
    pub fn fill_silence(&mut self) {
        let len = self.len;
        for channel in &mut self.channels {
            channel[..len].fill(0.0);
        }
    }

    /// Silence `num_samples` samples starting at `start`, clipped to the buffer
    pub fn clear_range(&mut self, start: usize, num_samples: usize) {
        let start = start.min(self.len);
        let end = start.saturating_add(num_samples).min(self.len);
        for channel in &mut self.channels {
            channel[start..end].fill(0.0);
        }
    }

    /// Scale all working samples by a factor
    pub fn apply_gain(&mut self, gain: Sample) {
        let len = self.len;
        for channel in &mut self.channels {
            for sample in &mut channel[..len] {
                *sample *= gain;
            }
        }
    }

    /// Copy `num_samples` samples of `source` starting at `source_start` into
    /// this buffer starting at `dest_start`
    ///
    /// Copies the channels both buffers share; the range is clipped to
    /// whatever both buffers can hold. Never allocates.
    pub fn copy_range_from(
        &mut self,
        dest_start: usize,
        source: &AudioBuffer,
        source_start: usize,
        num_samples: usize,
    ) {
        let count = num_samples
            .min(self.len.saturating_sub(dest_start))
            .min(source.len.saturating_sub(source_start));
        if count == 0 {
            return;
        }
        let shared = self.num_channels().min(source.num_channels());
        for ch in 0..shared {
            self.channels[ch][dest_start..dest_start + count]
                .copy_from_slice(&source.channels[ch][source_start..source_start + count]);
        }
    }

    /// Fill this buffer from interleaved host samples `[c0, c1, .., c0, c1, ..]`
    ///
    /// `host_channels` is the channel count of the interleaved data. The
    /// working length becomes the number of whole frames that fit in both
    /// the input and this buffer's capacity; missing channels are silenced.
    pub fn copy_from_interleaved(&mut self, interleaved: &[Sample], host_channels: usize) {
        if host_channels == 0 {
            self.set_len_from_capacity(0);
            return;
        }
        let frames = (interleaved.len() / host_channels).min(self.capacity());
        self.len = frames;
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            if ch < host_channels {
                for (frame, sample) in channel[..frames].iter_mut().enumerate() {
                    *sample = interleaved[frame * host_channels + ch];
                }
            } else {
                channel[..frames].fill(0.0);
            }
        }
    }

    /// Write the working samples to an interleaved host buffer
    ///
    /// Host channels beyond this buffer's channel count are silenced.
    pub fn copy_to_interleaved(&self, interleaved: &mut [Sample], host_channels: usize) {
        if host_channels == 0 {
            return;
        }
        let frames = (interleaved.len() / host_channels).min(self.len);
        for frame in 0..frames {
            for ch in 0..host_channels {
                interleaved[frame * host_channels + ch] = self
                    .channels
                    .get(ch)
                    .map_or(0.0, |channel| channel[frame]);
            }
        }
    }

    /// Get the peak absolute amplitude across all channels
    pub fn peak(&self) -> Sample {
        self.channels
            .iter()
            .flat_map(|c| c[..self.len].iter())
            .fold(0.0, |peak, s| peak.max(s.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_len_keeps_capacity() {
        let mut buffer = AudioBuffer::new(2, 512);
        buffer.set_len_from_capacity(128);
        assert_eq!(buffer.len(), 128);
        assert_eq!(buffer.capacity(), 512);
        assert_eq!(buffer.channel(0).len(), 128);

        buffer.set_len_from_capacity(512);
        assert_eq!(buffer.channel(1).len(), 512);
    }

    #[test]
    fn test_interleaved_conversion() {
        let mut buffer = AudioBuffer::new(2, 8);
        buffer.copy_from_interleaved(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2);

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.channel(0), &[1.0, 3.0, 5.0]);
        assert_eq!(buffer.channel(1), &[2.0, 4.0, 6.0]);

        let mut output = [0.0; 6];
        buffer.copy_to_interleaved(&mut output, 2);
        assert_eq!(output, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_mono_host_into_stereo_buffer() {
        let mut buffer = AudioBuffer::new(2, 4);
        buffer.copy_from_interleaved(&[0.5, 0.25], 1);

        assert_eq!(buffer.channel(0), &[0.5, 0.25]);
        assert_eq!(buffer.channel(1), &[0.0, 0.0]);
    }

    #[test]
    fn test_clear_range_is_clipped() {
        let left = [1.0; 4];
        let right = [1.0; 4];
        let mut buffer = AudioBuffer::from_channels(&[&left, &right]);
        buffer.clear_range(2, 100);

        assert_eq!(buffer.channel(0), &[1.0, 1.0, 0.0, 0.0]);
        assert_eq!(buffer.channel(1), &[1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_apply_gain_and_peak() {
        let left = [0.5, -1.0];
        let mut buffer = AudioBuffer::from_channels(&[&left]);
        buffer.apply_gain(0.5);

        assert_eq!(buffer.channel(0), &[0.25, -0.5]);
        assert_eq!(buffer.peak(), 0.5);
    }

    #[test]
    fn test_clamp_to_handles_nan() {
        assert_eq!(clamp_to(f32::NAN, VOLUME_RANGE), 0.0);
        assert_eq!(clamp_to(3.0, VOLUME_RANGE), 2.0);
        assert_eq!(clamp_to(-0.5, FEEDBACK_RANGE), 0.0);
    }
}
