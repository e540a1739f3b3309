//! Speech synthesis
//!
//! Spoken replies are delegated to a platform synthesizer behind a small
//! trait; a worker pipeline serializes utterances and reports when each one
//! has finished so the UI can leave the speaking phase.

pub mod synthesis;

pub use synthesis::{
    NullSynthesizer, SynthesisCommand, SynthesisEvent, SynthesisPipeline, Synthesizer,
};
