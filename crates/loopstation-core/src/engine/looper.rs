//! Looper - owns the engine components and runs them once per audio block
//!
//! Per block the looper:
//!
//! 1. Polls the control source for triggers and levels
//! 2. Applies the triggers to the transport
//! 3. Processes the audio for the current state at the current playhead
//! 4. Advances the transport by the block length
//!
//! Dispatching before advancing means each block is processed at the
//! position it was scheduled for: the first block after a recording is
//! committed plays from loop offset 0.
//!
//! Everything reachable from [`Looper::process_block`] is bounded and
//! real-time safe. Scratch buffers are allocated once in
//! [`Looper::initialize`]; host blocks longer than the prepared maximum are
//! processed in chunks rather than reallocating. While overdubbing, chunks
//! also end at the loop end so each pass layers onto the previous one.

use std::sync::Arc;

use crate::config::LooperConfig;
use crate::control::{ControlSource, Triggers};
use crate::error::{LooperError, LooperResult};
use crate::types::{
    clamp_to, AudioBuffer, FEEDBACK_RANGE, MAX_LOOP_SECONDS, MAX_STORAGE_SAMPLES, VOLUME_RANGE,
};

use super::loop_store::LoopStore;
use super::overdub::OverdubEngine;
use super::transport::{Transport, TransportAtomics, TransportState};

/// Single-track looper engine
pub struct Looper {
    transport: Transport,
    loop_store: LoopStore,
    overdub: OverdubEngine,
    /// Loop content for the current chunk
    scratch: AudioBuffer,
    /// Copy of the live input for the current chunk (overdub)
    input: AudioBuffer,
    sample_rate: f64,
    max_block_size: usize,
    num_channels: usize,
    /// Output live input while recording (silence otherwise)
    monitor_while_recording: bool,
    /// Output live input while idle (silence otherwise)
    monitor_while_idle: bool,
    initialized: bool,
}

impl Looper {
    /// Create an uninitialized looper; audio passes through untouched
    pub fn new() -> Self {
        let defaults = LooperConfig::default();
        Self {
            transport: Transport::new(),
            loop_store: LoopStore::new(),
            overdub: OverdubEngine::new(),
            scratch: AudioBuffer::default(),
            input: AudioBuffer::default(),
            sample_rate: 0.0,
            max_block_size: 0,
            num_channels: 0,
            monitor_while_recording: defaults.monitor_while_recording,
            monitor_while_idle: defaults.monitor_while_idle,
            initialized: false,
        }
    }

    /// Prepare for processing with loop storage for 60 seconds
    ///
    /// Allocates everything the audio thread will use; call from the setup
    /// path before the first [`Looper::process_block`]. Any existing loop is
    /// discarded.
    pub fn initialize(
        &mut self,
        sample_rate: f64,
        max_block_size: usize,
        channels: usize,
    ) -> LooperResult<()> {
        self.initialize_with_max_loop_seconds(sample_rate, max_block_size, channels, MAX_LOOP_SECONDS)
    }

    /// Prepare for processing with loop storage for `max_loop_seconds`
    ///
    /// On error nothing changes: a looper that was never initialized keeps
    /// passing audio through, one that was keeps its previous setup.
    pub fn initialize_with_max_loop_seconds(
        &mut self,
        sample_rate: f64,
        max_block_size: usize,
        channels: usize,
        max_loop_seconds: f64,
    ) -> LooperResult<()> {
        if let Err(e) = validate_setup(sample_rate, max_block_size, channels, max_loop_seconds) {
            log::warn!("Looper initialization rejected: {}", e);
            return Err(e);
        }

        self.loop_store
            .initialize(sample_rate, channels, max_loop_seconds);
        self.transport
            .initialize(sample_rate, self.loop_store.max_buffer_size());
        self.overdub.initialize(sample_rate);
        self.scratch = AudioBuffer::new(channels, max_block_size);
        self.input = AudioBuffer::new(channels, max_block_size);

        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.num_channels = channels;
        self.initialized = true;

        log::info!(
            "Looper initialized: {} Hz, {} channels, blocks up to {} samples, max loop {:.1}s ({} samples, ring capacity {})",
            sample_rate,
            channels,
            max_block_size,
            max_loop_seconds,
            self.loop_store.max_buffer_size(),
            self.loop_store.capacity()
        );
        Ok(())
    }

    /// Apply startup settings
    ///
    /// Feedback and volume arrive from the control source every block; the
    /// config's levels only seed the engine until then. Use
    /// [`SharedControls::apply_config`](crate::control::SharedControls::apply_config)
    /// to seed the control surface as well.
    pub fn apply_config(&mut self, config: &LooperConfig) {
        let config = config.sanitized();
        self.overdub.set_feedback_level(config.feedback);
        self.overdub.set_overdub_gain(config.overdub_gain);
        self.monitor_while_recording = config.monitor_while_recording;
        self.monitor_while_idle = config.monitor_while_idle;
        log::info!(
            "Looper config applied: overdub gain {:.2}, monitor recording {}, monitor idle {}",
            config.overdub_gain,
            config.monitor_while_recording,
            config.monitor_while_idle
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────

    /// Check if the looper has been initialized
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Current transport state
    #[inline]
    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    /// Get the transport
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Get the loop store
    pub fn loop_store(&self) -> &LoopStore {
        &self.loop_store
    }

    /// Get the overdub engine
    pub fn overdub_engine(&self) -> &OverdubEngine {
        &self.overdub
    }

    /// Get the shared transport atomics for UI access
    pub fn atomics(&self) -> Arc<TransportAtomics> {
        self.transport.atomics()
    }

    /// Sample rate passed to initialize
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Largest block processed in one piece
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Channels held by the loop storage
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Set the gain for overdubbed material (clamped to 0..2)
    pub fn set_overdub_gain(&mut self, gain: f32) {
        self.overdub.set_overdub_gain(gain);
    }

    /// Choose whether recording outputs live input or silence
    pub fn set_monitor_while_recording(&mut self, enabled: bool) {
        self.monitor_while_recording = enabled;
    }

    /// Choose whether idle outputs live input or silence
    pub fn set_monitor_while_idle(&mut self, enabled: bool) {
        self.monitor_while_idle = enabled;
    }

    /// Erase the loop and stop
    ///
    /// Zeroes the whole loop storage, which is proportional to the maximum
    /// loop length; keep it off the audio thread.
    pub fn clear(&mut self) {
        if !self.initialized {
            return;
        }
        self.loop_store.clear();
        self.transport.stop_playback();
        self.transport.set_loop_length(0);
        log::info!("Looper cleared");
    }

    // ─────────────────────────────────────────────────────────────
    // Audio processing
    // ─────────────────────────────────────────────────────────────

    /// Process one host audio block in place
    ///
    /// `buffer` holds the live input on entry and the looper's output on
    /// return. Triggers are polled and applied once per call, even when the
    /// block is processed in several chunks.
    pub fn process_block<C>(&mut self, buffer: &mut AudioBuffer, controls: &C)
    where
        C: ControlSource + ?Sized,
    {
        if !self.initialized {
            return;
        }

        let frame = controls.poll();
        self.handle_triggers(frame.triggers);

        let feedback = clamp_to(frame.feedback, FEEDBACK_RANGE);
        let volume = clamp_to(frame.volume, VOLUME_RANGE);

        let total = buffer.len();
        let mut start = 0;
        while start < total {
            let num_samples = (total - start)
                .min(self.max_block_size)
                .min(self.overdub_span());
            self.process_chunk(buffer, start, num_samples, feedback, volume);
            start += num_samples;
        }
    }

    /// Samples until the loop end while overdubbing
    ///
    /// An overdub chunk must not run past the loop end, or a loop shorter
    /// than the chunk would mix every pass against the same old content.
    fn overdub_span(&self) -> usize {
        let loop_length = self.transport.loop_length();
        if self.transport.state() != TransportState::Overdubbing || loop_length == 0 {
            return usize::MAX;
        }
        loop_length - self.transport.position() % loop_length
    }

    /// Apply one block's triggers in order: record, play, stop, overdub
    fn handle_triggers(&mut self, triggers: Triggers) {
        if triggers.record {
            match self.transport.state() {
                TransportState::Idle => self.transport.start_recording(),
                TransportState::Recording => self.finish_recording(),
                TransportState::Playing | TransportState::Overdubbing => {}
            }
        }

        if triggers.play {
            if self.transport.state() == TransportState::Recording {
                self.finish_recording();
            }
            self.transport.start_playback();
        }

        if triggers.stop {
            self.transport.stop_playback();
        }

        if triggers.overdub {
            match self.transport.state() {
                TransportState::Playing => self.transport.start_overdub(),
                TransportState::Overdubbing => self.transport.stop_overdub(),
                TransportState::Idle | TransportState::Recording => {}
            }
        }
    }

    /// Commit the running take as the loop
    fn finish_recording(&mut self) {
        if let Some(length) = self.transport.stop_recording() {
            if !self.loop_store.set_loop_length(length) {
                self.transport.set_loop_length(self.loop_store.loop_length());
            }
        }
    }

    fn process_chunk(
        &mut self,
        buffer: &mut AudioBuffer,
        start: usize,
        num_samples: usize,
        feedback: f32,
        volume: f32,
    ) {
        let position = self.transport.position();

        match self.transport.state() {
            TransportState::Idle => {
                if !self.monitor_while_idle {
                    buffer.clear_range(start, num_samples);
                }
            }
            TransportState::Recording => {
                let writable = num_samples.min(self.transport.recording_remaining());
                self.loop_store.write_audio(buffer, start, writable);

                // A long take can run into the committed loop
                if self.loop_store.loop_length() != self.transport.loop_length() {
                    self.transport.set_loop_length(self.loop_store.loop_length());
                }

                if !self.monitor_while_recording {
                    buffer.clear_range(start, num_samples);
                }
            }
            TransportState::Playing => {
                self.scratch.set_len_from_capacity(num_samples);
                self.loop_store
                    .read_audio_at(&mut self.scratch, 0, num_samples, position);
                self.write_output(buffer, start, num_samples, volume);
            }
            TransportState::Overdubbing => {
                self.scratch.set_len_from_capacity(num_samples);
                self.loop_store
                    .read_audio_at(&mut self.scratch, 0, num_samples, position);

                self.input.set_len_from_capacity(num_samples);
                self.input.fill_silence();
                self.input.copy_range_from(0, buffer, start, num_samples);

                self.overdub
                    .process_overdub(&mut self.scratch, &self.input, feedback);
                self.loop_store
                    .overwrite_audio_at(&self.scratch, 0, num_samples, position);
                self.write_output(buffer, start, num_samples, volume);
            }
        }

        self.transport.process_block(num_samples);

        if self.transport.state() == TransportState::Recording
            && self.transport.recording_remaining() == 0
        {
            self.finish_recording();
        }
    }

    /// Replace the chunk in `buffer` with the scratch content at `volume`
    fn write_output(&mut self, buffer: &mut AudioBuffer, start: usize, num_samples: usize, volume: f32) {
        self.scratch.apply_gain(volume);
        buffer.clear_range(start, num_samples);
        buffer.copy_range_from(start, &self.scratch, 0, num_samples);
    }
}

impl Default for Looper {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_setup(
    sample_rate: f64,
    max_block_size: usize,
    channels: usize,
    max_loop_seconds: f64,
) -> LooperResult<()> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(LooperError::InvalidSampleRate(sample_rate));
    }
    if max_block_size == 0 {
        return Err(LooperError::InvalidBlockSize);
    }
    if channels == 0 {
        return Err(LooperError::InvalidChannelCount);
    }
    if !max_loop_seconds.is_finite() || max_loop_seconds <= 0.0 {
        return Err(LooperError::InvalidMaxLoopLength(max_loop_seconds));
    }
    let max_samples = sample_rate * max_loop_seconds;
    if !max_samples.is_finite() || max_samples > MAX_STORAGE_SAMPLES as f64 {
        return Err(LooperError::InvalidMaxLoopLength(max_loop_seconds));
    }
    Ok(())
}
