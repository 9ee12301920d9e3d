//! Loop store - the active loop window inside the ring
//!
//! The ring is sized once for the maximum loop duration. The loop actually in
//! use is a window of `loop_length` samples inside it, so loops of any length
//! up to the maximum share one allocation and nothing is ever reallocated
//! from the audio callback.
//!
//! # Anchoring
//!
//! A take is appended at the ring cursor while recording. Committing a loop
//! length `L` anchors the loop to the last `L` samples written: loop offset
//! `o` then lives at ring index `origin + o`. Reads and overdub writes are
//! split at the loop end so a block that straddles it continues from the
//! loop start rather than from whatever follows in the ring.

use crate::types::{AudioBuffer, MAX_STORAGE_SAMPLES};

use super::ring::RingStore;

/// Loop storage with an explicitly committed loop length
#[derive(Debug, Default)]
pub struct LoopStore {
    ring: RingStore,
    /// Active loop length in samples (0 = empty loop)
    loop_length: usize,
    /// Ring index of loop offset 0
    origin: usize,
    /// Samples appended since the loop was last committed
    written_since_commit: usize,
    sample_rate: f64,
    /// Longest loop that can be committed, in samples
    max_buffer_size: usize,
    initialized: bool,
}

impl LoopStore {
    /// Create an uninitialized loop store
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to a sample rate and size the ring for `max_length_seconds`
    ///
    /// The loop is capped at [`MAX_STORAGE_SAMPLES`]. Allocates: never call
    /// from the audio thread.
    pub fn initialize(&mut self, sample_rate: f64, max_channels: usize, max_length_seconds: f64) {
        let max_buffer_size =
            ((sample_rate * max_length_seconds).max(0.0) as usize).min(MAX_STORAGE_SAMPLES);

        self.ring.initialize(max_channels, max_buffer_size);
        self.sample_rate = sample_rate;
        self.max_buffer_size = max_buffer_size;
        self.loop_length = 0;
        self.origin = 0;
        self.written_since_commit = 0;
        self.initialized = true;
    }

    /// Check if the store has been initialized
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Active loop length in samples
    #[inline]
    pub fn loop_length(&self) -> usize {
        self.loop_length
    }

    /// Active loop length in seconds
    pub fn loop_length_seconds(&self) -> f64 {
        if self.sample_rate > 0.0 {
            self.loop_length as f64 / self.sample_rate
        } else {
            0.0
        }
    }

    /// Whether there is no loop to play
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.loop_length == 0
    }

    /// Longest loop that can be committed, in samples
    #[inline]
    pub fn max_buffer_size(&self) -> usize {
        self.max_buffer_size
    }

    /// Physical ring capacity in samples
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Sample rate the store was initialized with
    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Append audio at the ring cursor (recording)
    ///
    /// Does no loop length bookkeeping; the length is committed separately
    /// with [`LoopStore::set_loop_length`]. If appended audio runs into the
    /// committed loop's samples, that loop is no longer intact and is dropped.
    pub fn write_audio(&mut self, input: &AudioBuffer, start: usize, num_samples: usize) {
        if !self.initialized {
            return;
        }
        let num_samples = num_samples.min(input.len().saturating_sub(start));
        self.ring.write(input, start, num_samples);

        self.written_since_commit = self.written_since_commit.saturating_add(num_samples);
        let free = self.ring.capacity() - self.loop_length;
        if self.loop_length > 0 && self.written_since_commit > free {
            self.loop_length = 0;
        }
    }

    /// Read loop audio at a normalized position in `[0, 1)`
    ///
    /// The loop offset is `floor(position * loop_length)`. An empty loop
    /// yields silence.
    pub fn read_audio(
        &self,
        output: &mut AudioBuffer,
        start: usize,
        num_samples: usize,
        normalized_position: f32,
    ) {
        if self.loop_length == 0 {
            output.clear_range(start, num_samples);
            return;
        }
        let offset = (normalized_position as f64 * self.loop_length as f64).floor();
        let offset = (offset.max(0.0) as usize) % self.loop_length;
        self.read_audio_at(output, start, num_samples, offset);
    }

    /// Read loop audio starting at a loop offset in samples
    ///
    /// Wraps to the loop start when the read runs past the loop end. An empty
    /// or uninitialized loop yields silence.
    pub fn read_audio_at(
        &self,
        output: &mut AudioBuffer,
        start: usize,
        num_samples: usize,
        loop_offset: usize,
    ) {
        let num_samples = num_samples.min(output.len().saturating_sub(start));
        if !self.initialized || self.loop_length == 0 {
            output.clear_range(start, num_samples);
            return;
        }

        let mut offset = loop_offset % self.loop_length;
        let mut done = 0;
        while done < num_samples {
            let segment = (num_samples - done).min(self.loop_length - offset);
            self.ring
                .read(output, start + done, segment, self.ring_offset(offset));
            done += segment;
            offset = 0;
        }
    }

    /// Replace loop audio in place starting at a loop offset (overdub)
    ///
    /// Uses the same wrapping as [`LoopStore::read_audio_at`], so writing
    /// back what was read at an offset lands on exactly the same samples.
    pub fn overwrite_audio_at(
        &mut self,
        input: &AudioBuffer,
        start: usize,
        num_samples: usize,
        loop_offset: usize,
    ) {
        let num_samples = num_samples.min(input.len().saturating_sub(start));
        if !self.initialized || self.loop_length == 0 {
            return;
        }

        let mut offset = loop_offset % self.loop_length;
        let mut done = 0;
        while done < num_samples {
            let segment = (num_samples - done).min(self.loop_length - offset);
            let ring_offset = self.ring_offset(offset);
            self.ring.overwrite(input, start + done, segment, ring_offset);
            done += segment;
            offset = 0;
        }
    }

    /// Commit the active loop length
    ///
    /// Accepted only when `length <= max_buffer_size`; anything else is
    /// ignored, as is any call before initialization. Returns whether the
    /// length was applied. An accepted length anchors the loop to the last
    /// `length` samples written.
    pub fn set_loop_length(&mut self, length: usize) -> bool {
        if !self.initialized || length > self.max_buffer_size {
            return false;
        }
        let mask = self.ring.capacity() - 1;
        self.origin = self.ring.write_position().wrapping_sub(length) & mask;
        self.loop_length = length;
        self.written_since_commit = 0;
        true
    }

    /// Zero the ring and drop the loop
    pub fn clear(&mut self) {
        if !self.initialized {
            return;
        }
        self.ring.clear();
        self.loop_length = 0;
        self.origin = 0;
        self.written_since_commit = 0;
    }

    /// Distance from the ring cursor back to loop offset `offset`
    #[inline]
    fn ring_offset(&self, offset: usize) -> usize {
        let mask = self.ring.capacity() - 1;
        self.ring
            .write_position()
            .wrapping_sub(self.origin)
            .wrapping_sub(offset)
            & mask
    }
}
