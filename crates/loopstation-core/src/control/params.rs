//! Parameter descriptors for host registration
//!
//! A host shell registers these six parameters with its automation system
//! and forwards value changes to [`SharedControls::set_param`]. Ids are
//! stable strings so saved host sessions keep resolving.
//!
//! [`SharedControls::set_param`]: super::SharedControls::set_param

use crate::types::{DEFAULT_FEEDBACK, DEFAULT_VOLUME, FEEDBACK_RANGE, VOLUME_RANGE};

use super::Button;

/// Parameter kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// On/off button; a rising edge fires a one-shot trigger
    Button(Button),
    /// Continuous value within a range
    Continuous,
}

/// Static description of one parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamInfo {
    /// Stable id used for automation and saved sessions
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    pub kind: ParamKind,
    pub min: f32,
    pub max: f32,
    /// Step for host sliders (0 for buttons)
    pub step: f32,
    pub default: f32,
}

/// Identifies one looper parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Record,
    Play,
    Stop,
    Overdub,
    Feedback,
    Volume,
}

impl ParamId {
    /// All parameters in registration order
    pub const ALL: [ParamId; 6] = [
        ParamId::Record,
        ParamId::Play,
        ParamId::Stop,
        ParamId::Overdub,
        ParamId::Feedback,
        ParamId::Volume,
    ];

    /// Stable string id
    pub fn id(self) -> &'static str {
        self.info().id
    }

    /// Look up a parameter by its string id
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|param| param.id() == id)
    }

    /// Full descriptor
    pub fn info(self) -> ParamInfo {
        match self {
            ParamId::Record => button("record", "Record", Button::Record),
            ParamId::Play => button("play", "Play", Button::Play),
            ParamId::Stop => button("stop", "Stop", Button::Stop),
            ParamId::Overdub => button("overdub", "Overdub", Button::Overdub),
            ParamId::Feedback => ParamInfo {
                id: "feedback",
                name: "Feedback",
                kind: ParamKind::Continuous,
                min: FEEDBACK_RANGE.0,
                max: FEEDBACK_RANGE.1,
                step: 0.01,
                default: DEFAULT_FEEDBACK,
            },
            ParamId::Volume => ParamInfo {
                id: "volume",
                name: "Volume",
                kind: ParamKind::Continuous,
                min: VOLUME_RANGE.0,
                max: VOLUME_RANGE.1,
                step: 0.01,
                default: DEFAULT_VOLUME,
            },
        }
    }
}

fn button(id: &'static str, name: &'static str, button: Button) -> ParamInfo {
    ParamInfo {
        id,
        name,
        kind: ParamKind::Button(button),
        min: 0.0,
        max: 1.0,
        step: 0.0,
        default: 0.0,
    }
}

/// Descriptors for every parameter, in registration order
pub fn param_layout() -> [ParamInfo; 6] {
    ParamId::ALL.map(ParamId::info)
}
