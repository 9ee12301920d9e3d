//! Ring store - fixed-capacity circular sample storage
//!
//! Holds one sample array per channel, all sharing a single write cursor.
//! Capacity is always a power of two so every index wraps with a bitmask
//! instead of a division, which matters in a loop that runs once per sample
//! at audio rate.
//!
//! # Cursor publication
//!
//! The cursor is an `AtomicUsize`. A write copies its whole payload first and
//! only then publishes the new cursor with a single `Release` store; readers
//! load it with `Acquire`. A reader therefore only ever sees the cursor before
//! or after a write, never a partially advanced one, and a reader that sees
//! the advanced cursor also sees the samples behind it.
//!
//! Writing requires `&mut self`, so the borrow checker enforces the single
//! writer discipline the store depends on.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::types::{AudioBuffer, Sample, MAX_STORAGE_SAMPLES};

/// Fixed-capacity circular buffer of planar sample data
#[derive(Debug, Default)]
pub struct RingStore {
    /// One array of `capacity` samples per channel
    channels: Vec<Box<[Sample]>>,
    /// Samples per channel (power of two, 0 until initialized)
    capacity: usize,
    /// `capacity - 1`, used to wrap indices
    mask: usize,
    /// Next index to be written
    write_pos: AtomicUsize,
    initialized: bool,
}

impl RingStore {
    /// Create an uninitialized store (reads yield silence, writes do nothing)
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate storage for `num_channels` channels
    ///
    /// Capacity is `requested_size` rounded up to the next power of two (at
    /// least 1). Calling this again reallocates and resets the cursor.
    /// Allocates: never call from the audio thread.
    pub fn initialize(&mut self, num_channels: usize, requested_size: usize) {
        let capacity = capacity_for(requested_size);
        self.channels = (0..num_channels)
            .map(|_| vec![0.0; capacity].into_boxed_slice())
            .collect();
        self.capacity = capacity;
        self.mask = capacity - 1;
        self.write_pos.store(0, Ordering::Release);
        self.initialized = true;
    }

    /// Check if storage has been allocated
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Samples per channel (always a power of two once initialized)
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of channels held
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Current write cursor
    #[inline]
    pub fn write_position(&self) -> usize {
        self.write_pos.load(Ordering::Acquire)
    }

    /// Append `num_samples` samples of `input` (from `start`) at the cursor
    ///
    /// Copies the channels both sides have, then advances the cursor by
    /// `num_samples` in one step. The count is clipped to what `input` holds.
    pub fn write(&mut self, input: &AudioBuffer, start: usize, num_samples: usize) {
        let num_samples = num_samples.min(input.len().saturating_sub(start));
        if !self.initialized || num_samples == 0 {
            return;
        }

        let cursor = self.write_pos.load(Ordering::Relaxed);
        self.copy_in(input, start, num_samples, cursor);

        self.write_pos
            .store((cursor + num_samples) & self.mask, Ordering::Release);
    }

    /// Overwrite samples behind the cursor without moving it
    ///
    /// The first sample lands `read_offset` samples behind the cursor, the
    /// same addressing [`RingStore::read`] uses, so reading and then
    /// overwriting with the same offset replaces exactly what was read. The
    /// unchanged cursor is re-published afterwards so readers that sync on it
    /// also observe the new payload.
    pub fn overwrite(
        &mut self,
        input: &AudioBuffer,
        start: usize,
        num_samples: usize,
        read_offset: usize,
    ) {
        let num_samples = num_samples.min(input.len().saturating_sub(start));
        if !self.initialized || num_samples == 0 {
            return;
        }

        let cursor = self.write_pos.load(Ordering::Relaxed);
        let head = cursor.wrapping_sub(read_offset) & self.mask;
        self.copy_in(input, start, num_samples, head);

        self.write_pos.store(cursor, Ordering::Release);
    }

    /// Copy `num_samples` samples, starting `read_offset` samples behind the
    /// cursor, into `output` at `start`
    ///
    /// The read head is `(cursor - read_offset) & mask` using the cursor as of
    /// the call; samples are taken consecutively from there, wrapping at the
    /// end of the ring. Output channels the store doesn't hold are silenced,
    /// and an uninitialized store yields silence.
    pub fn read(
        &self,
        output: &mut AudioBuffer,
        start: usize,
        num_samples: usize,
        read_offset: usize,
    ) {
        let num_samples = num_samples.min(output.len().saturating_sub(start));
        if num_samples == 0 {
            return;
        }
        if !self.initialized {
            output.clear_range(start, num_samples);
            return;
        }

        let cursor = self.write_pos.load(Ordering::Acquire);
        let head = cursor.wrapping_sub(read_offset) & self.mask;

        for ch in 0..output.num_channels() {
            let out = &mut output.channel_mut(ch)[start..start + num_samples];
            match self.channels.get(ch) {
                Some(data) => {
                    for (i, sample) in out.iter_mut().enumerate() {
                        *sample = data[(head + i) & self.mask];
                    }
                }
                None => out.fill(0.0),
            }
        }
    }

    /// Zero all storage and reset the cursor
    ///
    /// Writer-only: must not run while a write is in flight, which `&mut self`
    /// guarantees.
    pub fn clear(&mut self) {
        if !self.initialized {
            return;
        }
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
        self.write_pos.store(0, Ordering::Release);
    }

    fn copy_in(&mut self, input: &AudioBuffer, start: usize, num_samples: usize, head: usize) {
        let mask = self.mask;
        let shared = self.channels.len().min(input.num_channels());
        for ch in 0..shared {
            let source = &input.channel(ch)[start..start + num_samples];
            let data = &mut self.channels[ch];
            for (i, &sample) in source.iter().enumerate() {
                data[(head + i) & mask] = sample;
            }
        }
    }
}

/// Smallest power of two that holds `requested_size` samples (at least 1)
///
/// Requests beyond [`MAX_STORAGE_SAMPLES`] are clamped to it.
pub fn capacity_for(requested_size: usize) -> usize {
    requested_size
        .clamp(1, MAX_STORAGE_SAMPLES)
        .checked_next_power_of_two()
        .unwrap_or(MAX_STORAGE_SAMPLES)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(num_channels: usize, len: usize, offset: f32) -> AudioBuffer {
        let mut buffer = AudioBuffer::new(num_channels, len);
        for ch in 0..num_channels {
            for (i, s) in buffer.channel_mut(ch).iter_mut().enumerate() {
                *s = offset + i as f32 + ch as f32 * 1000.0;
            }
        }
        buffer
    }

    #[test]
    fn test_capacity_is_next_power_of_two() {
        for (requested, expected) in [(0, 1), (1, 1), (2, 2), (3, 4), (1000, 1024), (1024, 1024), (1025, 2048)] {
            let mut ring = RingStore::new();
            ring.initialize(1, requested);
            assert_eq!(ring.capacity(), expected, "requested {}", requested);
            assert!(ring.capacity().is_power_of_two());
        }
    }

    #[test]
    fn test_capacity_request_is_capped() {
        assert_eq!(capacity_for(usize::MAX), MAX_STORAGE_SAMPLES);
        assert_eq!(capacity_for(MAX_STORAGE_SAMPLES + 1), MAX_STORAGE_SAMPLES);
        assert!(capacity_for(usize::MAX).is_power_of_two());
    }

    #[test]
    fn test_uninitialized_is_silent_noop() {
        let mut ring = RingStore::new();
        let input = ramp(2, 8, 1.0);
        ring.write(&input, 0, 8);
        assert_eq!(ring.write_position(), 0);

        let mut output = ramp(2, 8, 5.0);
        ring.read(&mut output, 0, 8, 0);
        assert_eq!(output.peak(), 0.0);
    }

    #[test]
    fn test_write_advances_cursor_with_wrap() {
        let mut ring = RingStore::new();
        ring.initialize(1, 8);
        let input = ramp(1, 6, 0.0);

        ring.write(&input, 0, 6);
        assert_eq!(ring.write_position(), 6);
        ring.write(&input, 0, 6);
        assert_eq!(ring.write_position(), 4);
    }

    #[test]
    fn test_written_samples_read_back_in_order() {
        let mut ring = RingStore::new();
        ring.initialize(2, 16);

        // Three writes totalling exactly the capacity
        let a = ramp(2, 5, 0.0);
        let b = ramp(2, 7, 5.0);
        let c = ramp(2, 4, 12.0);
        ring.write(&a, 0, 5);
        ring.write(&b, 0, 7);
        ring.write(&c, 0, 4);

        let mut output = AudioBuffer::new(2, 16);
        ring.read(&mut output, 0, 16, 16);
        for ch in 0..2 {
            for (i, &s) in output.channel(ch).iter().enumerate() {
                assert_eq!(s, i as f32 + ch as f32 * 1000.0);
            }
        }
    }

    #[test]
    fn test_read_wraps_around_ring_end() {
        let mut ring = RingStore::new();
        ring.initialize(1, 8);
        let filler = ramp(1, 6, 100.0);
        ring.write(&filler, 0, 6);
        let input = ramp(1, 5, 0.0);
        ring.write(&input, 0, 5); // occupies indices 6, 7, 0, 1, 2

        let mut output = AudioBuffer::new(1, 5);
        ring.read(&mut output, 0, 5, 5);
        assert_eq!(output.channel(0), &[0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_write_respects_input_start() {
        let mut ring = RingStore::new();
        ring.initialize(1, 8);
        let input = ramp(1, 8, 0.0);
        ring.write(&input, 4, 4);

        let mut output = AudioBuffer::new(1, 4);
        ring.read(&mut output, 0, 4, 4);
        assert_eq!(output.channel(0), &[4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_overwrite_keeps_cursor() {
        let mut ring = RingStore::new();
        ring.initialize(1, 8);
        ring.write(&ramp(1, 6, 0.0), 0, 6);

        let patch = ramp(1, 2, 50.0);
        ring.overwrite(&patch, 0, 2, 4);
        assert_eq!(ring.write_position(), 6);

        let mut output = AudioBuffer::new(1, 6);
        ring.read(&mut output, 0, 6, 6);
        assert_eq!(output.channel(0), &[0.0, 1.0, 50.0, 51.0, 4.0, 5.0]);
    }

    #[test]
    fn test_extra_output_channels_are_silenced() {
        let mut ring = RingStore::new();
        ring.initialize(1, 8);
        ring.write(&ramp(1, 4, 1.0), 0, 4);

        let mut output = ramp(2, 4, 9.0);
        ring.read(&mut output, 0, 4, 4);
        assert_eq!(output.channel(0), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(output.channel(1), &[0.0; 4]);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut ring = RingStore::new();
        ring.initialize(2, 32);
        ring.write(&ramp(2, 20, 1.0), 0, 20);

        ring.clear();
        assert_eq!(ring.write_position(), 0);
        for offset in [0, 5, 17, 31] {
            let mut output = ramp(2, 8, 3.0);
            ring.read(&mut output, 0, 8, offset);
            assert_eq!(output.peak(), 0.0);
        }

        ring.clear();
        assert_eq!(ring.write_position(), 0);
        let mut output = ramp(2, 8, 3.0);
        ring.read(&mut output, 0, 8, 11);
        assert_eq!(output.peak(), 0.0);
    }

    #[test]
    fn test_reinitialize_resets_state() {
        let mut ring = RingStore::new();
        ring.initialize(1, 8);
        ring.write(&ramp(1, 3, 1.0), 0, 3);

        ring.initialize(2, 100);
        assert_eq!(ring.write_position(), 0);
        assert_eq!(ring.capacity(), 128);
        assert_eq!(ring.num_channels(), 2);
    }
}
