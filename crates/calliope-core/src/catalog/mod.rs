//! Parameter and modulation-source catalogs
//!
//! Both catalogs are read-only views over the engine's fixed tables, built
//! once per process (see [`crate::runtime::EngineRuntime`]) and shared by
//! every facade instance:
//!
//! - the parameter catalog organizes the engine's flat parameter table into
//!   control group -> (entry, scene) cluster -> named parameter;
//! - the mod-source catalog maps the closed modulation-source enumeration to
//!   display names.

mod control_group;
mod mod_source;

pub use control_group::{
    ControlGroup, ControlGroupBucket, ControlGroupEntries, NamedParam, ParamCatalog,
};
pub use mod_source::{ModSource, ModSourceCatalog, ModSourceInfo, MOD_SOURCES};
