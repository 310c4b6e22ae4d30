//! Control groups and the parameter catalog
//!
//! The engine exposes its parameters as one flat table; scripts address
//! them hierarchically. The catalog partitions the table into control
//! group -> (entry, scene) cluster -> named parameter, deterministically:
//! clusters are ordered ascending by entry then scene, and parameters
//! within a cluster keep the flat table's order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::engine::Engine;
use crate::error::{SynthError, SynthResult};
use crate::types::{ParamId, Scene};

/// Top-level parameter category. The set is engine-defined and closed;
/// raw ids outside it fail catalog lookups with `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum ControlGroup {
    Global = 0,
    Osc = 1,
    Mix = 2,
    Lfo = 3,
    Fx = 4,
    Filter = 5,
    Env = 6,
}

/// The fixed enumeration, indexed by discriminant
const CONTROL_GROUPS: [(ControlGroup, &str); 7] = [
    (ControlGroup::Global, "Global"),
    (ControlGroup::Osc, "Oscillator"),
    (ControlGroup::Mix, "Mixer"),
    (ControlGroup::Lfo, "LFO"),
    (ControlGroup::Fx, "FX"),
    (ControlGroup::Filter, "Filter"),
    (ControlGroup::Env, "Envelope"),
];

impl ControlGroup {
    /// All groups, in id order
    pub const ALL: [ControlGroup; 7] = [
        ControlGroup::Global,
        ControlGroup::Osc,
        ControlGroup::Mix,
        ControlGroup::Lfo,
        ControlGroup::Fx,
        ControlGroup::Filter,
        ControlGroup::Env,
    ];

    /// Convert a raw id to a group
    pub fn from_raw(id: i32) -> Option<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|i| CONTROL_GROUPS.get(i))
            .map(|&(group, _)| group)
    }

    /// Stable integer id exposed to scripting hosts
    pub fn raw(&self) -> i32 {
        *self as i32
    }

    /// Display name of this group
    pub fn name(&self) -> &'static str {
        CONTROL_GROUPS[*self as usize].1
    }
}

impl fmt::Display for ControlGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One addressable parameter: the engine's fully-qualified display name
/// plus the opaque handle scripts pass back to the facade
#[derive(Debug, Clone)]
pub struct NamedParam {
    name: String,
    id: ParamId,
}

impl NamedParam {
    /// Display name, as shown by the engine
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle for value/modulation operations
    pub fn id(&self) -> ParamId {
        self.id
    }
}

impl fmt::Display for NamedParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({})", self.name, self.id)
    }
}

/// One `(entry, scene)` cluster of parameters inside a control group
#[derive(Debug, Clone)]
pub struct ControlGroupEntries {
    group: ControlGroup,
    entry: i32,
    scene: Scene,
    params: Vec<NamedParam>,
}

impl ControlGroupEntries {
    /// Cluster index within the group
    pub fn entry(&self) -> i32 {
        self.entry
    }

    /// Scene this cluster belongs to
    pub fn scene(&self) -> Scene {
        self.scene
    }

    /// Parameters in flat-table order
    pub fn params(&self) -> &[NamedParam] {
        &self.params
    }
}

impl fmt::Display for ControlGroupEntries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry {}", self.entry)?;
        if self.scene != Scene::None {
            write!(f, "/scene{}", self.scene.label())?;
        }
        write!(f, " in {}", self.group)
    }
}

/// All clusters of one control group, ascending by (entry, scene)
#[derive(Debug, Clone)]
pub struct ControlGroupBucket {
    group: ControlGroup,
    entries: Vec<ControlGroupEntries>,
}

impl ControlGroupBucket {
    /// The group this bucket describes
    pub fn group(&self) -> ControlGroup {
        self.group
    }

    /// Stable integer id of the group
    pub fn raw_id(&self) -> i32 {
        self.group.raw()
    }

    /// Clusters, ascending by entry then scene
    pub fn entries(&self) -> &[ControlGroupEntries] {
        &self.entries
    }
}

impl fmt::Display for ControlGroupBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} entries)", self.group, self.entries.len())
    }
}

/// The parameter catalog: one bucket per control group
///
/// Immutable after construction; shared read-only through the runtime.
#[derive(Debug)]
pub struct ParamCatalog {
    buckets: BTreeMap<ControlGroup, ControlGroupBucket>,
}

impl ParamCatalog {
    /// Partition the engine's flat parameter table.
    ///
    /// Two passes per group: first collect the distinct `(entry, scene)`
    /// pairs (the BTreeSet both collapses duplicates and yields them in
    /// ascending entry-then-scene order), then fill each cluster with the
    /// matching parameters in table order.
    pub fn build(engine: &dyn Engine) -> Self {
        let mut buckets = BTreeMap::new();
        let param_count = engine.param_count();

        for group in ControlGroup::ALL {
            let mut pairs: BTreeSet<(i32, Scene)> = BTreeSet::new();
            for index in 0..param_count {
                if let Some(meta) = engine.param_meta(index) {
                    if meta.group == group {
                        pairs.insert((meta.group_entry, meta.scene));
                    }
                }
            }

            let mut entries = Vec::with_capacity(pairs.len());
            for (entry, scene) in pairs {
                let mut params = Vec::new();
                for index in 0..param_count {
                    let matches = engine.param_meta(index).is_some_and(|meta| {
                        meta.group == group && meta.group_entry == entry && meta.scene == scene
                    });
                    if matches {
                        params.push(NamedParam {
                            name: engine.param_name(index).unwrap_or_default(),
                            id: ParamId::from_synth_side(index),
                        });
                    }
                }
                entries.push(ControlGroupEntries {
                    group,
                    entry,
                    scene,
                    params,
                });
            }

            log::debug!(
                "parameter catalog: {} -> {} entries",
                group,
                entries.len()
            );
            buckets.insert(group, ControlGroupBucket { group, entries });
        }

        Self { buckets }
    }

    /// Bucket for a known group (infallible: every enum value has one)
    pub fn lookup(&self, group: ControlGroup) -> &ControlGroupBucket {
        &self.buckets[&group]
    }

    /// Bucket for a raw integer id, as passed by scripting hosts
    pub fn lookup_raw(&self, id: i32) -> SynthResult<&ControlGroupBucket> {
        let group = ControlGroup::from_raw(id).ok_or(SynthError::NotFound {
            kind: "control group",
            id,
        })?;
        Ok(self.lookup(group))
    }
}
