//! The `Synth` facade
//!
//! The call surface scripts drive: note and controller events, parameter
//! value access, modulation routing, patch IO and single-block rendering.
//! Each instance wraps one boxed [`Engine`] and references the shared
//! catalog runtime. Instances are independent and not safe for concurrent
//! use without external serialization; nothing here locks per-instance
//! state.

use std::path::Path;
use std::sync::Arc;

use crate::catalog::{ControlGroupBucket, ModSource, ModSourceInfo};
use crate::engine::Engine;
use crate::error::{SynthError, SynthResult};
use crate::runtime::EngineRuntime;
use crate::types::{OutputBlock, ParamId, ParamValue, TimeData, ValueKind, BLOCK_SIZE};

/// Scripting facade over one synthesis engine instance
pub struct Synth {
    engine: Box<dyn Engine>,
    runtime: Arc<EngineRuntime>,
    time: TimeData,
}

impl Synth {
    /// Wrap an engine, building the process-wide catalogs on first use.
    ///
    /// Seeds the engine with the sample rate and default musical time
    /// (120 BPM, song position 0).
    pub fn new(engine: Box<dyn Engine>, sample_rate: f32) -> Self {
        let runtime = EngineRuntime::shared(engine.as_ref());
        Self::with_runtime(engine, runtime, sample_rate)
    }

    /// Wrap an engine against an explicitly built runtime (embedders with
    /// heterogeneous engine builds)
    pub fn with_runtime(
        mut engine: Box<dyn Engine>,
        runtime: Arc<EngineRuntime>,
        sample_rate: f32,
    ) -> Self {
        engine.set_sample_rate(sample_rate);
        let time = TimeData::default();
        engine.set_time_data(time);
        Self {
            engine,
            runtime,
            time,
        }
    }

    /// Library version string
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// The engine's fixed render block size, in samples per channel
    pub fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    /// Current render sample rate
    pub fn sample_rate(&self) -> f32 {
        self.engine.sample_rate()
    }

    /// Input channel count
    pub fn num_inputs(&self) -> usize {
        self.engine.num_inputs()
    }

    /// Output channel count
    pub fn num_outputs(&self) -> usize {
        self.engine.num_outputs()
    }

    /// Current musical time
    pub fn time_data(&self) -> TimeData {
        self.time
    }

    /// Change the tempo and push it to the engine
    pub fn set_tempo(&mut self, tempo: f64) {
        self.time.tempo = tempo;
        self.engine.set_time_data(self.time);
    }

    /// The shared catalog runtime this instance references
    pub fn runtime(&self) -> &Arc<EngineRuntime> {
        &self.runtime
    }

    // ------------------------------------------------------------------
    // Catalog lookups
    // ------------------------------------------------------------------

    /// Parameter clusters for one control group id
    pub fn control_group(&self, id: i32) -> SynthResult<&ControlGroupBucket> {
        self.runtime.params().lookup_raw(id)
    }

    /// Modulation source for one mod-source id
    pub fn mod_source(&self, id: i32) -> SynthResult<&ModSourceInfo> {
        self.runtime.mod_sources().lookup_raw(id)
    }

    /// Display name of a parameter, as shown by the engine; empty for a
    /// handle that does not resolve
    pub fn parameter_name(&self, id: ParamId) -> String {
        self.engine.param_name(id.synth_side()).unwrap_or_default()
    }

    /// Recover a full handle (daw-side fields included) from a host-side
    /// parameter id; delegates to the engine's id translation
    pub fn param_id_from_host(&self, host_id: i32) -> ParamId {
        self.engine.resolve_host_id(host_id)
    }

    // ------------------------------------------------------------------
    // Note and controller events (unvalidated, engine's concern)
    // ------------------------------------------------------------------

    /// Trigger a note
    pub fn play_note(&mut self, channel: u8, note: u8, velocity: u8, detune: i32) {
        self.engine.play_note(channel, note, velocity, detune);
    }

    /// Release a note
    pub fn release_note(&mut self, channel: u8, note: u8, release_velocity: u8) {
        self.engine.release_note(channel, note, release_velocity);
    }

    /// Set the pitch bend value on a channel
    pub fn pitch_bend(&mut self, channel: u8, bend: i32) {
        self.engine.pitch_bend(channel, bend);
    }

    /// Turn off all playing notes
    pub fn all_notes_off(&mut self) {
        self.engine.all_notes_off();
    }

    /// Polyphonic aftertouch
    pub fn poly_aftertouch(&mut self, channel: u8, key: u8, value: u8) {
        self.engine.poly_aftertouch(channel, key, value);
    }

    /// Channel aftertouch
    pub fn channel_aftertouch(&mut self, channel: u8, value: u8) {
        self.engine.channel_aftertouch(channel, value);
    }

    /// Continuous controller
    pub fn channel_controller(&mut self, channel: u8, cc: u8, value: u8) {
        self.engine.channel_controller(channel, cc, value);
    }

    // ------------------------------------------------------------------
    // Parameter values
    //
    // Unlike catalog lookups, value accessors do not fail on a handle that
    // resolves to no live parameter: they return a neutral 0.0 (kind: None)
    // so a scripted sweep over stale handles cannot abort a render batch.
    // Each miss is trace-logged.
    // ------------------------------------------------------------------

    fn slot_value(&self, id: ParamId, pick: impl Fn(&crate::engine::ParamMeta) -> ParamValue) -> f32 {
        match self.engine.param_meta(id.synth_side()) {
            Some(meta) => pick(meta).as_f32(),
            None => {
                log::trace!("value accessor miss for {id}");
                0.0
            }
        }
    }

    /// Parameter minimum, as a float
    pub fn param_min(&self, id: ParamId) -> f32 {
        self.slot_value(id, |meta| meta.min)
    }

    /// Parameter maximum, as a float
    pub fn param_max(&self, id: ParamId) -> f32 {
        self.slot_value(id, |meta| meta.max)
    }

    /// Parameter default, as a float
    pub fn param_default(&self, id: ParamId) -> f32 {
        self.slot_value(id, |meta| meta.default)
    }

    /// Current parameter value, as a float
    pub fn param_value(&self, id: ParamId) -> f32 {
        match self.engine.param_value(id.synth_side()) {
            Some(value) => value.as_f32(),
            None => {
                log::trace!("value accessor miss for {id}");
                0.0
            }
        }
    }

    /// Value kind of a parameter, `None` for an unresolved handle
    pub fn param_value_kind(&self, id: ParamId) -> Option<ValueKind> {
        self.engine.param_meta(id.synth_side()).map(|meta| meta.kind)
    }

    /// Set a parameter from a float.
    ///
    /// Float slots store the value as-is; int slots round half away from
    /// zero (2.5 becomes 3, -2.5 becomes -3); bool slots are true for
    /// values strictly greater than 0.5. An unresolved handle is a no-op.
    pub fn set_value(&mut self, id: ParamId, value: f32) {
        let Some(kind) = self.param_value_kind(id) else {
            log::trace!("set_value miss for {id}");
            return;
        };
        let stored = match kind {
            ValueKind::Float => ParamValue::Float(value),
            ValueKind::Int => ParamValue::Int(value.round() as i32),
            ValueKind::Bool => ParamValue::Bool(value > 0.5),
        };
        self.engine.set_param_value(id.synth_side(), stored);
    }

    // ------------------------------------------------------------------
    // Modulation (pure delegation)
    // ------------------------------------------------------------------

    /// Route a source to a parameter with the given depth
    pub fn set_modulation(&mut self, target: ParamId, source: ModSource, depth: f32) {
        self.engine.set_modulation(target.synth_side(), source, depth);
    }

    /// Current depth of a route, 0.0 if none exists
    pub fn modulation(&self, target: ParamId, source: ModSource) -> f32 {
        self.engine.modulation(target.synth_side(), source)
    }

    /// Whether the source may be routed to the target at all
    pub fn is_valid_modulation(&self, target: ParamId, source: ModSource) -> bool {
        self.engine.is_valid_modulation(target.synth_side(), source)
    }

    /// Whether a nonzero route already exists
    pub fn is_active_modulation(&self, target: ParamId, source: ModSource) -> bool {
        self.engine.is_active_modulation(target.synth_side(), source)
    }

    /// Whether depth may be negative for this source class
    pub fn is_bipolar_modulation(&self, source: ModSource) -> bool {
        self.engine.is_bipolar_modulation(source)
    }

    // ------------------------------------------------------------------
    // Patch IO
    // ------------------------------------------------------------------

    /// Load a patch file. Fails with `PatchNotFound` before the engine is
    /// touched if the path does not exist.
    pub fn load_patch(&mut self, path: impl AsRef<Path>) -> SynthResult<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SynthError::PatchNotFound {
                path: path.to_path_buf(),
            });
        }
        log::info!("loading patch {}", path.display());
        self.engine.load_patch(path)
    }

    /// Save the current state to a patch file (no existence precondition)
    pub fn save_patch(&mut self, path: impl AsRef<Path>) -> SynthResult<()> {
        let path = path.as_ref();
        log::info!("saving patch {}", path.display());
        self.engine.save_patch(path)
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Render exactly one block into the engine's internal output
    pub fn process(&mut self) {
        self.engine.process_block();
    }

    /// Borrow the last rendered block, planar `[left, right]`.
    ///
    /// The view aliases the engine's internal output and is only current
    /// until the next render; since rendering needs `&mut self`, the borrow
    /// checker enforces that window.
    pub fn output(&self) -> &OutputBlock {
        self.engine.output_block()
    }

    pub(crate) fn engine_mut(&mut self) -> &mut dyn Engine {
        self.engine.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ControlGroup;
    use crate::engine::testing::{Recorded, ScriptedEngine};

    use std::sync::{Arc, Mutex};

    fn synth() -> Synth {
        Synth::new(Box::new(ScriptedEngine::new()), 44100.0)
    }

    fn synth_with_events() -> (Synth, Arc<Mutex<Vec<Recorded>>>) {
        let engine = ScriptedEngine::new();
        let events = engine.events_handle();
        (Synth::new(Box::new(engine), 44100.0), events)
    }

    /// Handle for a table slot of the scripted engine
    fn id(index: usize) -> ParamId {
        ParamId::from_synth_side(index)
    }

    #[test]
    fn test_construction_seeds_engine() {
        let s = synth();
        assert_eq!(s.sample_rate(), 44100.0);
        assert_eq!(s.block_size(), BLOCK_SIZE);
        assert_eq!(s.num_outputs(), 2);
        assert_eq!(s.time_data().tempo, 120.0);
        assert_eq!(s.time_data().ppq_pos, 0.0);
    }

    #[test]
    fn test_catalog_lookups() {
        let s = synth();
        let osc = s.control_group(ControlGroup::Osc.raw()).unwrap();
        assert_eq!(osc.group(), ControlGroup::Osc);
        assert!(s.control_group(99).is_err());

        assert_eq!(s.mod_source(0).unwrap().name(), "Velocity");
        assert!(s.mod_source(-2).is_err());
    }

    #[test]
    fn test_events_reach_engine() {
        let (mut s, events) = synth_with_events();
        s.play_note(0, 60, 127, 0);
        s.pitch_bend(0, 4096);
        s.channel_controller(0, 1, 64);
        s.poly_aftertouch(0, 60, 80);
        s.channel_aftertouch(0, 90);
        s.release_note(0, 60, 0);
        s.all_notes_off();

        let events = events.lock().unwrap();
        assert_eq!(
            events[0],
            Recorded::NoteOn { channel: 0, note: 60, velocity: 127, detune: 0 }
        );
        assert_eq!(events[6], Recorded::AllNotesOff);
        assert_eq!(events.len(), 7);
    }

    #[test]
    fn test_set_value_float_passthrough() {
        let mut s = synth();
        s.set_value(id(1), -7.25);
        assert_eq!(s.param_value(id(1)), -7.25);
    }

    #[test]
    fn test_set_value_int_rounds_half_away_from_zero() {
        let mut s = synth();
        s.set_value(id(2), 2.5);
        assert_eq!(s.param_value(id(2)), 3.0);
        s.set_value(id(2), 2.4);
        assert_eq!(s.param_value(id(2)), 2.0);
        s.set_value(id(2), -2.5);
        assert_eq!(s.param_value(id(2)), -3.0);
    }

    #[test]
    fn test_set_value_bool_threshold_is_strict() {
        let mut s = synth();
        s.set_value(id(5), 0.6);
        assert_eq!(s.param_value(id(5)), 1.0);
        s.set_value(id(5), 0.4);
        assert_eq!(s.param_value(id(5)), 0.0);
        // Exactly 0.5 is false: the boundary is > 0.5, not >=
        s.set_value(id(5), 0.5);
        assert_eq!(s.param_value(id(5)), 0.0);
    }

    #[test]
    fn test_unresolved_handle_is_silent_zero() {
        let mut s = synth();
        let stale = id(999);
        assert_eq!(s.param_min(stale), 0.0);
        assert_eq!(s.param_max(stale), 0.0);
        assert_eq!(s.param_default(stale), 0.0);
        assert_eq!(s.param_value(stale), 0.0);
        assert_eq!(s.param_value_kind(stale), None);
        s.set_value(stale, 1.0); // no-op, must not panic
        assert_eq!(s.parameter_name(stale), "");
    }

    #[test]
    fn test_param_metadata_accessors() {
        let s = synth();
        assert_eq!(s.param_min(id(0)), -60.0);
        assert_eq!(s.param_max(id(0)), 0.0);
        assert_eq!(s.param_default(id(0)), -10.0);
        assert_eq!(s.param_value_kind(id(2)), Some(ValueKind::Int));
        assert_eq!(s.param_value_kind(id(5)), Some(ValueKind::Bool));
        assert_eq!(s.parameter_name(id(3)), "A Osc 2 Pitch");
    }

    #[test]
    fn test_modulation_round_trip() {
        let mut s = synth();
        let target = id(1);
        assert!(s.is_valid_modulation(target, ModSource::Lfo1));
        assert!(!s.is_active_modulation(target, ModSource::Lfo1));

        s.set_modulation(target, ModSource::Lfo1, 0.3);
        assert!(s.is_active_modulation(target, ModSource::Lfo1));
        assert_eq!(s.modulation(target, ModSource::Lfo1), 0.3);

        s.set_modulation(target, ModSource::Lfo1, 0.0);
        assert!(!s.is_active_modulation(target, ModSource::Lfo1));

        assert!(s.is_bipolar_modulation(ModSource::PitchBend));
        assert!(!s.is_bipolar_modulation(ModSource::Velocity));
    }

    #[test]
    fn test_load_patch_missing_path_fails_before_engine() {
        let (mut s, events) = synth_with_events();
        let err = s.load_patch("/nonexistent/patch.cpt").unwrap_err();
        assert!(matches!(err, SynthError::PatchNotFound { .. }));
        // The engine never saw a load
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_patch_io_delegates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("init.cpt");
        std::fs::write(&path, b"patch").unwrap();

        let (mut s, events) = synth_with_events();
        s.load_patch(&path).unwrap();
        let save_path = dir.path().join("saved.cpt");
        s.save_patch(&save_path).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events[0], Recorded::PatchLoaded(path));
        assert_eq!(events[1], Recorded::PatchSaved(save_path));
    }

    #[test]
    fn test_host_id_translation() {
        let s = synth();
        let pid = s.param_id_from_host(1003);
        assert_eq!(pid.synth_side(), 3);
        assert_eq!(pid.daw_side_index(), 3);
        assert_eq!(pid.daw_side_id(), 1003);
    }

    #[test]
    fn test_single_block_render_and_output_view() {
        let mut s = synth();
        s.process();
        let out = s.output();
        assert_eq!(out[0][0], 1.0);
        assert_eq!(out[1][BLOCK_SIZE - 1], 1.5);
        s.process();
        assert_eq!(s.output()[0][0], 2.0);
    }

    #[test]
    fn test_set_tempo_pushes_time_data() {
        let mut s = synth();
        s.set_tempo(174.0);
        assert_eq!(s.time_data().tempo, 174.0);
    }
}
