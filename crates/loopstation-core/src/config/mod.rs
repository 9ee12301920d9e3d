//! Looper configuration
//!
//! Startup settings are kept in a YAML file:
//!
//! ```yaml
//! feedback: 0.8
//! volume: 1.0
//! overdub_gain: 1.0
//! monitor_while_recording: true
//! monitor_while_idle: true
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use loopstation_core::config::{default_config_path, load_config};
//!
//! let config = load_config(&default_config_path());
//! looper.apply_config(&config);
//! ```
//!
//! The maximum loop duration is not configurable; storage is always sized
//! for 60 seconds.

mod io;
mod looper;
mod paths;

pub use io::{load_config, save_config};
pub use looper::LooperConfig;
pub use paths::default_config_path;
