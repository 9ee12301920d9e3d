//! Loopstation Core - real-time audio looper engine
//!
//! Records a take into pre-allocated loop storage, plays it back in a loop
//! and layers overdubs on top with feedback decay. All processing happens on
//! the audio thread without locks or allocation; a UI thread drives it
//! through [`control::SharedControls`] and watches it through
//! [`TransportAtomics`].
//!
//! ```ignore
//! use std::sync::Arc;
//! use loopstation_core::{control::{Button, SharedControls}, AudioBuffer, Looper};
//!
//! let mut looper = Looper::new();
//! looper.initialize(48000.0, 512, 2)?;
//! let controls = Arc::new(SharedControls::new());
//!
//! // UI thread
//! controls.press(Button::Record);
//!
//! // Audio callback
//! looper.process_block(&mut block, &controls);
//! ```

pub mod atomic;
pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod types;

pub use engine::{Looper, TransportAtomics, TransportState};
pub use error::{LooperError, LooperResult};
pub use types::*;
