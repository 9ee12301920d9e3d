//! Transport - loop state machine and playhead
//!
//! The transport owns the looper's state (idle, recording, playing,
//! overdubbing), the loop length in samples and the playhead. It does not
//! touch audio; the orchestrator asks it where to read and write.
//!
//! Transitions requested from a state where they don't apply are ignored, as
//! is everything before [`Transport::initialize`].

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::atomic::AtomicF32;

/// Looper transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TransportState {
    /// Nothing running; input passes through
    #[default]
    Idle = 0,
    /// Capturing a new take
    Recording = 1,
    /// Looping the committed take
    Playing = 2,
    /// Looping while layering input onto the take
    Overdubbing = 3,
}

impl TransportState {
    /// Whether the loop is audible (playing or overdubbing)
    #[inline]
    pub fn is_looping(self) -> bool {
        matches!(self, TransportState::Playing | TransportState::Overdubbing)
    }
}

impl From<u8> for TransportState {
    fn from(value: u8) -> Self {
        match value {
            1 => TransportState::Recording,
            2 => TransportState::Playing,
            3 => TransportState::Overdubbing,
            _ => TransportState::Idle,
        }
    }
}

/// Lock-free transport state for UI access
///
/// The audio thread publishes here with `Release` stores after every
/// transition and every block; a UI thread reads with `Acquire` loads and
/// never blocks the audio thread.
#[derive(Debug, Default)]
pub struct TransportAtomics {
    state: AtomicU8,
    position: AtomicUsize,
    normalized_position: AtomicF32,
    loop_length: AtomicUsize,
}

impl TransportAtomics {
    /// Create atomic state with defaults (idle, empty loop)
    pub fn new() -> Self {
        Self::default()
    }

    /// Current transport state (lock-free)
    #[inline]
    pub fn state(&self) -> TransportState {
        TransportState::from(self.state.load(Ordering::Acquire))
    }

    /// Playhead in samples (lock-free)
    #[inline]
    pub fn position(&self) -> usize {
        self.position.load(Ordering::Acquire)
    }

    /// Playhead as a fraction of the loop length (lock-free)
    #[inline]
    pub fn normalized_position(&self) -> f32 {
        self.normalized_position.load(Ordering::Acquire)
    }

    /// Loop length in samples (lock-free)
    #[inline]
    pub fn loop_length(&self) -> usize {
        self.loop_length.load(Ordering::Acquire)
    }
}

/// Loop transport state machine
#[derive(Debug, Default)]
pub struct Transport {
    state: TransportState,
    /// Playhead in samples; the recording length while recording
    position: usize,
    /// Playhead as a fraction of the loop length, 0 while recording
    normalized_position: f32,
    /// Committed loop length in samples (0 = no loop)
    loop_length: usize,
    /// Longest take that can be recorded, in samples
    max_loop_length: usize,
    sample_rate: f64,
    initialized: bool,
    atomics: Arc<TransportAtomics>,
}

impl Transport {
    /// Create an uninitialized transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to idle with an empty loop
    ///
    /// `max_loop_length` caps how far a recording can run before it has to
    /// be committed.
    pub fn initialize(&mut self, sample_rate: f64, max_loop_length: usize) {
        self.sample_rate = sample_rate;
        self.max_loop_length = max_loop_length;
        self.state = TransportState::Idle;
        self.position = 0;
        self.normalized_position = 0.0;
        self.loop_length = 0;
        self.initialized = true;
        self.sync_all_atomics();
    }

    /// Get the shared atomics for UI access
    pub fn atomics(&self) -> Arc<TransportAtomics> {
        Arc::clone(&self.atomics)
    }

    // ─────────────────────────────────────────────────────────────
    // Atomic sync helpers
    // ─────────────────────────────────────────────────────────────

    #[inline]
    fn sync_state_atomic(&self) {
        self.atomics.state.store(self.state as u8, Ordering::Release);
    }

    #[inline]
    fn sync_position_atomic(&self) {
        self.atomics
            .normalized_position
            .store(self.normalized_position, Ordering::Release);
        self.atomics.position.store(self.position, Ordering::Release);
    }

    #[inline]
    fn sync_loop_atomic(&self) {
        self.atomics
            .loop_length
            .store(self.loop_length, Ordering::Release);
    }

    fn sync_all_atomics(&self) {
        self.sync_loop_atomic();
        self.sync_position_atomic();
        self.sync_state_atomic();
    }

    // ─────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────

    /// Check if the transport has been initialized
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Current state
    #[inline]
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Playhead in samples
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Playhead as a fraction of the loop length in `[0, 1)`
    #[inline]
    pub fn normalized_position(&self) -> f32 {
        self.normalized_position
    }

    /// Committed loop length in samples
    #[inline]
    pub fn loop_length(&self) -> usize {
        self.loop_length
    }

    /// Longest take that can be recorded, in samples
    #[inline]
    pub fn max_loop_length(&self) -> usize {
        self.max_loop_length
    }

    /// Samples left before a running recording hits the length cap
    #[inline]
    pub fn recording_remaining(&self) -> usize {
        self.max_loop_length.saturating_sub(self.position)
    }

    /// Committed loop length in seconds
    pub fn loop_length_seconds(&self) -> f64 {
        if self.sample_rate > 0.0 {
            self.loop_length as f64 / self.sample_rate
        } else {
            0.0
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────

    /// Idle -> Recording, playhead back to 0
    pub fn start_recording(&mut self) {
        if !self.initialized || self.state != TransportState::Idle {
            return;
        }
        self.reset_position();
        self.state = TransportState::Recording;
        self.sync_state_atomic();
    }

    /// Finish a recording
    ///
    /// With samples recorded, the recorded length becomes the loop length,
    /// the playhead returns to 0 and the transport plays; returns the new
    /// length so it can be committed to the loop store. An empty recording
    /// goes back to idle and leaves the loop length alone.
    pub fn stop_recording(&mut self) -> Option<usize> {
        if !self.initialized || self.state != TransportState::Recording {
            return None;
        }

        let recorded = self.position;
        if recorded > 0 {
            self.loop_length = recorded;
            self.reset_position();
            self.state = TransportState::Playing;
            self.sync_loop_atomic();
            self.sync_state_atomic();
            Some(recorded)
        } else {
            self.state = TransportState::Idle;
            self.sync_state_atomic();
            None
        }
    }

    /// Play the loop, if there is one
    ///
    /// Leaves overdubbing as well. A running recording is not interrupted
    /// here; it has to be stopped first.
    pub fn start_playback(&mut self) {
        if !self.initialized
            || self.loop_length == 0
            || self.state == TransportState::Recording
        {
            return;
        }
        self.state = TransportState::Playing;
        self.sync_state_atomic();
    }

    /// Any state -> Idle, playhead back to 0
    ///
    /// Stopping a recording drops the take without touching the loop length.
    pub fn stop_playback(&mut self) {
        if !self.initialized {
            return;
        }
        self.reset_position();
        self.state = TransportState::Idle;
        self.sync_state_atomic();
    }

    /// Playing -> Overdubbing, if there is a loop
    pub fn start_overdub(&mut self) {
        if !self.initialized
            || self.state != TransportState::Playing
            || self.loop_length == 0
        {
            return;
        }
        self.state = TransportState::Overdubbing;
        self.sync_state_atomic();
    }

    /// Overdubbing -> Playing
    pub fn stop_overdub(&mut self) {
        if !self.initialized || self.state != TransportState::Overdubbing {
            return;
        }
        self.state = TransportState::Playing;
        self.sync_state_atomic();
    }

    /// Set the loop length directly
    ///
    /// Lengths beyond the recording cap are ignored. Dropping the loop
    /// (length 0) while it is audible stops the transport.
    pub fn set_loop_length(&mut self, length: usize) {
        if !self.initialized || length > self.max_loop_length {
            return;
        }
        self.loop_length = length;
        if length == 0 && self.state.is_looping() {
            self.state = TransportState::Idle;
            self.reset_position();
            self.sync_state_atomic();
        } else if self.state.is_looping() {
            self.position %= length;
            self.normalized_position = self.position as f32 / length as f32;
            self.sync_position_atomic();
        }
        self.sync_loop_atomic();
    }

    // ─────────────────────────────────────────────────────────────
    // Per-block update
    // ─────────────────────────────────────────────────────────────

    /// Advance the playhead by one block of `num_samples`
    ///
    /// Recording counts up to the recording cap. Playing and overdubbing
    /// wrap at the loop length. Idle holds still.
    pub fn process_block(&mut self, num_samples: usize) {
        if !self.initialized {
            return;
        }

        match self.state {
            TransportState::Idle => return,
            TransportState::Recording => {
                self.position = self
                    .position
                    .saturating_add(num_samples)
                    .min(self.max_loop_length);
                self.normalized_position = 0.0;
            }
            TransportState::Playing | TransportState::Overdubbing => {
                if self.loop_length == 0 {
                    return;
                }
                self.position = (self.position % self.loop_length
                    + num_samples % self.loop_length)
                    % self.loop_length;
                self.normalized_position = self.position as f32 / self.loop_length as f32;
            }
        }
        self.sync_position_atomic();
    }

    fn reset_position(&mut self) {
        self.position = 0;
        self.normalized_position = 0.0;
        self.sync_position_atomic();
    }
}
