//! Looper engine - storage, transport, overdub mixing
//!
//! This module contains the real-time components of the looper:
//! - RingStore: power-of-two circular sample storage with one writer
//! - LoopStore: the committed loop window inside the ring
//! - Transport: record/play/overdub state machine and playhead
//! - OverdubEngine: feedback mixing of new input onto the loop
//! - Looper: owns the components and runs them once per block

mod looper;
mod loop_store;
mod overdub;
mod ring;
mod smoothing;
mod transport;

pub use looper::*;
pub use loop_store::*;
pub use overdub::*;
pub use ring::*;
pub use smoothing::*;
pub use transport::*;
