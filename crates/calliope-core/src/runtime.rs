//! Process-wide catalog runtime
//!
//! Both catalogs are built exactly once per process and shared read-only by
//! every facade instance. Rather than hiding them behind module-level
//! mutable statics, they live in an explicit [`EngineRuntime`] context that
//! each facade holds an `Arc` to; the process-wide copy sits behind a
//! `OnceLock`, so concurrent first use from multiple threads still results
//! in exactly one build and all later reads are lock-free.

use std::sync::{Arc, OnceLock};

use crate::catalog::{ModSourceCatalog, ParamCatalog};
use crate::engine::Engine;

static SHARED: OnceLock<Arc<EngineRuntime>> = OnceLock::new();

/// Shared, immutable catalog context
///
/// Facade instances reference the runtime without owning it; it lives for
/// the rest of the process once built.
#[derive(Debug)]
pub struct EngineRuntime {
    params: Arc<ParamCatalog>,
    mod_sources: Arc<ModSourceCatalog>,
}

impl EngineRuntime {
    /// Build a fresh runtime from an engine's tables.
    ///
    /// Exposed for embedders with heterogeneous engine builds (and tests);
    /// ordinary use goes through [`EngineRuntime::shared`].
    pub fn build(engine: &dyn Engine) -> Arc<Self> {
        let runtime = Arc::new(Self {
            params: Arc::new(ParamCatalog::build(engine)),
            mod_sources: Arc::new(ModSourceCatalog::build()),
        });
        log::debug!(
            "engine runtime built: {} parameters, {} mod sources",
            engine.param_count(),
            runtime.mod_sources.len()
        );
        runtime
    }

    /// The process-wide runtime, building it from this engine if no other
    /// thread has built it yet. Engines of one build share a flat-table
    /// layout, so whichever instance arrives first defines the catalogs.
    pub fn shared(engine: &dyn Engine) -> Arc<Self> {
        SHARED.get_or_init(|| Self::build(engine)).clone()
    }

    /// The parameter catalog
    pub fn params(&self) -> &ParamCatalog {
        &self.params
    }

    /// The modulation-source catalog
    pub fn mod_sources(&self) -> &ModSourceCatalog {
        &self.mod_sources
    }
}
