//! Calliope Core - Scripting control surface for an embeddable synthesis engine
//!
//! Hosts expose the engine to scripts through a [`synth::Synth`] facade:
//! discover parameters through the control-group catalog, route modulation,
//! inject MIDI-like events, and pull rendered audio one block at a time or
//! through the chunked [`render::RenderBuffer`] protocol.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod render;
pub mod runtime;
pub mod synth;
pub mod types;

pub use error::{SynthError, SynthResult};
pub use synth::Synth;
pub use types::*;
