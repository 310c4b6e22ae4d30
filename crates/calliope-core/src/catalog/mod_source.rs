//! Modulation sources and their catalog
//!
//! The modulation-source set is closed: performance sources (gestures the
//! player sends) and generator sources (envelopes, LFOs, macros) with
//! stable ids and display names from the engine's name table. The catalog
//! is populated by iterating the static table, never hand-unrolled.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{SynthError, SynthResult};

/// A modulation source routable to a parameter with a depth.
///
/// Discriminants are the stable ids exposed to scripting hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum ModSource {
    // Performance sources
    Velocity = 0,
    ReleaseVelocity = 1,
    Keytrack = 2,
    LowestKey = 3,
    HighestKey = 4,
    LatestKey = 5,
    PolyAftertouch = 6,
    ChannelAftertouch = 7,
    ModWheel = 8,
    Breath = 9,
    Expression = 10,
    Sustain = 11,
    PitchBend = 12,
    Timbre = 13,
    AlternateBipolar = 14,
    AlternateUnipolar = 15,
    RandomBipolar = 16,
    RandomUnipolar = 17,
    // Generator sources
    FilterEg = 18,
    AmpEg = 19,
    Lfo1 = 20,
    Lfo2 = 21,
    Lfo3 = 22,
    Lfo4 = 23,
    Lfo5 = 24,
    Lfo6 = 25,
    SceneLfo1 = 26,
    SceneLfo2 = 27,
    SceneLfo3 = 28,
    SceneLfo4 = 29,
    SceneLfo5 = 30,
    SceneLfo6 = 31,
    Macro1 = 32,
    Macro2 = 33,
    Macro3 = 34,
    Macro4 = 35,
    Macro5 = 36,
    Macro6 = 37,
    Macro7 = 38,
    Macro8 = 39,
}

/// The fixed enumeration with display names, indexed by discriminant
pub const MOD_SOURCES: [(ModSource, &str); 40] = [
    (ModSource::Velocity, "Velocity"),
    (ModSource::ReleaseVelocity, "Release Velocity"),
    (ModSource::Keytrack, "Keytrack"),
    (ModSource::LowestKey, "Lowest Key"),
    (ModSource::HighestKey, "Highest Key"),
    (ModSource::LatestKey, "Latest Key"),
    (ModSource::PolyAftertouch, "Polyphonic Aftertouch"),
    (ModSource::ChannelAftertouch, "Channel Aftertouch"),
    (ModSource::ModWheel, "Modwheel"),
    (ModSource::Breath, "Breath"),
    (ModSource::Expression, "Expression"),
    (ModSource::Sustain, "Sustain Pedal"),
    (ModSource::PitchBend, "Pitch Bend"),
    (ModSource::Timbre, "Timbre"),
    (ModSource::AlternateBipolar, "Alternate Bipolar"),
    (ModSource::AlternateUnipolar, "Alternate Unipolar"),
    (ModSource::RandomBipolar, "Random Bipolar"),
    (ModSource::RandomUnipolar, "Random Unipolar"),
    (ModSource::FilterEg, "Filter EG"),
    (ModSource::AmpEg, "Amp EG"),
    (ModSource::Lfo1, "LFO 1"),
    (ModSource::Lfo2, "LFO 2"),
    (ModSource::Lfo3, "LFO 3"),
    (ModSource::Lfo4, "LFO 4"),
    (ModSource::Lfo5, "LFO 5"),
    (ModSource::Lfo6, "LFO 6"),
    (ModSource::SceneLfo1, "Scene LFO 1"),
    (ModSource::SceneLfo2, "Scene LFO 2"),
    (ModSource::SceneLfo3, "Scene LFO 3"),
    (ModSource::SceneLfo4, "Scene LFO 4"),
    (ModSource::SceneLfo5, "Scene LFO 5"),
    (ModSource::SceneLfo6, "Scene LFO 6"),
    (ModSource::Macro1, "Macro 1"),
    (ModSource::Macro2, "Macro 2"),
    (ModSource::Macro3, "Macro 3"),
    (ModSource::Macro4, "Macro 4"),
    (ModSource::Macro5, "Macro 5"),
    (ModSource::Macro6, "Macro 6"),
    (ModSource::Macro7, "Macro 7"),
    (ModSource::Macro8, "Macro 8"),
];

impl ModSource {
    /// Convert a raw id to a source
    pub fn from_raw(id: i32) -> Option<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|i| MOD_SOURCES.get(i))
            .map(|&(source, _)| source)
    }

    /// Stable integer id exposed to scripting hosts
    pub fn raw(&self) -> i32 {
        *self as i32
    }

    /// Display name, from the engine's name table
    pub fn name(&self) -> &'static str {
        MOD_SOURCES[*self as usize].1
    }
}

impl fmt::Display for ModSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One catalog entry: source plus its display name
#[derive(Debug, Clone, Copy)]
pub struct ModSourceInfo {
    source: ModSource,
    name: &'static str,
}

impl ModSourceInfo {
    /// The source itself
    pub fn source(&self) -> ModSource {
        self.source
    }

    /// Stable integer id
    pub fn raw_id(&self) -> i32 {
        self.source.raw()
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for ModSourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The modulation-source catalog
///
/// Immutable after construction; shared read-only through the runtime.
#[derive(Debug)]
pub struct ModSourceCatalog {
    sources: BTreeMap<ModSource, ModSourceInfo>,
}

impl ModSourceCatalog {
    /// Populate from the static enumeration table
    pub fn build() -> Self {
        let sources = MOD_SOURCES
            .iter()
            .map(|&(source, name)| (source, ModSourceInfo { source, name }))
            .collect();
        log::debug!("mod-source catalog: {} sources", MOD_SOURCES.len());
        Self { sources }
    }

    /// Entry for a known source (infallible: the table covers the enum)
    pub fn lookup(&self, source: ModSource) -> &ModSourceInfo {
        &self.sources[&source]
    }

    /// Entry for a raw integer id, as passed by scripting hosts
    pub fn lookup_raw(&self, id: i32) -> SynthResult<&ModSourceInfo> {
        let source = ModSource::from_raw(id).ok_or(SynthError::NotFound {
            kind: "mod source",
            id,
        })?;
        Ok(self.lookup(source))
    }

    /// Number of sources in the fixed enumeration
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// True if the catalog holds no sources
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
