//! Common types for Calliope
//!
//! Fundamental types shared across the control surface: the engine's fixed
//! block geometry, the tagged parameter value union, scene addressing and
//! the opaque parameter handle scripts pass back to the facade.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of samples the engine produces per render call. Fixed at build
/// time; every multi-block buffer must be a whole multiple of this.
pub const BLOCK_SIZE: usize = 32;

/// Output channel count (stereo)
pub const N_OUTPUT_CHANNELS: usize = 2;

/// Input channel count (stereo sidechain, unused by most engines)
pub const N_INPUT_CHANNELS: usize = 2;

/// Audio sample type (32-bit float, planar/channel-major everywhere)
pub type Sample = f32;

/// One rendered engine block, planar: `[0]` is left, `[1]` is right
pub type OutputBlock = [[Sample; BLOCK_SIZE]; N_OUTPUT_CHANNELS];

/// Value kind of a parameter slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Float,
    Int,
    Bool,
}

impl ValueKind {
    /// Kind name as shown to scripting hosts
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Float => "float",
            ValueKind::Int => "int",
            ValueKind::Bool => "bool",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parameter value; each slot also carries min/max/default of the same kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Float(f32),
    Int(i32),
    Bool(bool),
}

impl ParamValue {
    /// The kind tag of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            ParamValue::Float(_) => ValueKind::Float,
            ParamValue::Int(_) => ValueKind::Int,
            ParamValue::Bool(_) => ValueKind::Bool,
        }
    }

    /// Collapse to a float the way scripting hosts see every value:
    /// ints widen, bools become 0.0 / 1.0
    pub fn as_f32(&self) -> f32 {
        match *self {
            ParamValue::Float(v) => v,
            ParamValue::Int(v) => v as f32,
            ParamValue::Bool(v) => v as i32 as f32,
        }
    }
}

/// Scene a parameter belongs to. Dual-scene instruments keep two parameter
/// banks (A/B); scene-independent parameters use `None`.
///
/// The derived ordering (None < A < B) is what keeps catalog entry order
/// deterministic, so the discriminants are part of the contract.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[repr(u8)]
pub enum Scene {
    #[default]
    None = 0,
    A = 1,
    B = 2,
}

impl Scene {
    /// Convert a raw scene index (0-2) to a Scene
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Scene::None),
            1 => Some(Scene::A),
            2 => Some(Scene::B),
            _ => None,
        }
    }

    /// Raw index (0-2)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Short label for display ("" for scene-independent)
    pub fn label(&self) -> &'static str {
        match self {
            Scene::None => "",
            Scene::A => "A",
            Scene::B => "B",
        }
    }
}

/// Opaque parameter handle
///
/// `synth_side` indexes the engine's flat parameter table and is the only
/// field guaranteed valid for a headless instance. The daw-side fields are
/// populated by [`crate::engine::Engine::resolve_host_id`] when embedded in
/// a plugin host; -1 means unset. Immutable once obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamId {
    synth_side: usize,
    daw_side_index: i32,
    daw_side_id: i32,
}

impl ParamId {
    /// Wrap a raw flat-table index, daw-side fields unset.
    ///
    /// No validation happens here; an index that does not resolve to a live
    /// parameter is rejected (or silently zeroed, for value accessors) when
    /// the handle is dereferenced.
    pub fn from_synth_side(index: usize) -> Self {
        Self {
            synth_side: index,
            daw_side_index: -1,
            daw_side_id: -1,
        }
    }

    /// Build a fully populated handle (host-embedded path)
    pub fn with_daw_side(index: usize, daw_side_index: i32, daw_side_id: i32) -> Self {
        Self {
            synth_side: index,
            daw_side_index,
            daw_side_id,
        }
    }

    /// Flat index into the engine's parameter table
    pub fn synth_side(&self) -> usize {
        self.synth_side
    }

    /// Host-side parameter index, -1 when headless
    pub fn daw_side_index(&self) -> i32 {
        self.daw_side_index
    }

    /// Host-side parameter id, -1 when headless
    pub fn daw_side_id(&self) -> i32 {
        self.daw_side_id
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "param #{}", self.synth_side)
    }
}

/// Musical time pushed to the engine at construction and on tempo changes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeData {
    /// Tempo in BPM
    pub tempo: f64,
    /// Position in quarter notes
    pub ppq_pos: f64,
}

impl Default for TimeData {
    fn default() -> Self {
        Self {
            tempo: 120.0,
            ppq_pos: 0.0,
        }
    }
}
