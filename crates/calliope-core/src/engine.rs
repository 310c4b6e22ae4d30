//! Seam to the external DSP engine
//!
//! The synthesis engine proper (oscillators, filters, envelopes, the block
//! processor) lives outside this crate. [`Engine`] is the surface the
//! control layer drives: flat parameter table access, MIDI-like events,
//! modulation routes, patch IO and single-block rendering. Implementations
//! render synchronously on the calling thread.

use std::path::Path;

use crate::catalog::{ControlGroup, ModSource};
use crate::error::SynthResult;
use crate::types::{
    OutputBlock, ParamId, ParamValue, Scene, TimeData, ValueKind, N_INPUT_CHANNELS,
    N_OUTPUT_CHANNELS,
};

/// Static description of one slot in the engine's flat parameter table
///
/// `(group, group_entry, scene)` is the addressing triple the catalog
/// partitions on; it is a fixed property of the engine build, so two runs
/// against the same engine produce identical partitionings.
#[derive(Debug, Clone)]
pub struct ParamMeta {
    /// Control group this parameter belongs to
    pub group: ControlGroup,
    /// Cluster index within the group (e.g. which oscillator)
    pub group_entry: i32,
    /// Scene the parameter lives in
    pub scene: Scene,
    /// Value kind; min/max/default carry the same kind
    pub kind: ValueKind,
    pub min: ParamValue,
    pub max: ParamValue,
    pub default: ParamValue,
}

/// The external synthesis engine, as seen by the control surface
///
/// All methods run synchronously on the calling thread. Out-of-range MIDI
/// values are the engine's concern; the facade forwards them unvalidated.
pub trait Engine {
    /// Set the render sample rate
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Current render sample rate
    fn sample_rate(&self) -> f32;

    /// Push musical time (tempo, song position) to the engine
    fn set_time_data(&mut self, time: TimeData);

    /// Input channel count
    fn num_inputs(&self) -> usize {
        N_INPUT_CHANNELS
    }

    /// Output channel count
    fn num_outputs(&self) -> usize {
        N_OUTPUT_CHANNELS
    }

    /// Length of the flat parameter table
    fn param_count(&self) -> usize;

    /// Metadata for one table slot, `None` if the index holds no parameter
    fn param_meta(&self, index: usize) -> Option<&ParamMeta>;

    /// Fully-qualified display name for one table slot
    fn param_name(&self, index: usize) -> Option<String>;

    /// Current value of one table slot
    fn param_value(&self, index: usize) -> Option<ParamValue>;

    /// Store a value into one table slot. The value's kind is expected to
    /// match the slot's kind; the facade performs the float conversion.
    fn set_param_value(&mut self, index: usize, value: ParamValue);

    /// Recover the full handle (daw-side fields included) for a host-side
    /// parameter id. Only meaningful when embedded in a plugin host.
    fn resolve_host_id(&self, host_id: i32) -> ParamId;

    fn play_note(&mut self, channel: u8, note: u8, velocity: u8, detune: i32);
    fn release_note(&mut self, channel: u8, note: u8, release_velocity: u8);
    fn pitch_bend(&mut self, channel: u8, bend: i32);
    fn all_notes_off(&mut self);
    fn poly_aftertouch(&mut self, channel: u8, key: u8, value: u8);
    fn channel_aftertouch(&mut self, channel: u8, value: u8);
    fn channel_controller(&mut self, channel: u8, cc: u8, value: u8);

    /// Route `source` to the parameter at `target` with the given depth
    fn set_modulation(&mut self, target: usize, source: ModSource, depth: f32);

    /// Current depth of the route, 0.0 if none exists
    fn modulation(&self, target: usize, source: ModSource) -> f32;

    /// Whether `source` may be routed to `target` at all
    fn is_valid_modulation(&self, target: usize, source: ModSource) -> bool;

    /// Whether a nonzero route already exists
    fn is_active_modulation(&self, target: usize, source: ModSource) -> bool;

    /// Whether depth may be negative for this source class
    fn is_bipolar_modulation(&self, source: ModSource) -> bool;

    /// Load a patch file. Path existence has already been checked by the
    /// facade; this only fails on engine-side parse/IO problems.
    fn load_patch(&mut self, path: &Path) -> SynthResult<()>;

    /// Save the current state to a patch file
    fn save_patch(&mut self, path: &Path) -> SynthResult<()>;

    /// Render exactly one block into the internal output buffer
    fn process_block(&mut self);

    /// Borrow the internal output of the last rendered block. The view is
    /// only current until the next `process_block` call.
    fn output_block(&self) -> &OutputBlock;
}
