#![forbid(unsafe_code)]

pub mod model;
pub mod sequencer;
pub mod time;

pub use sequencer::{Cue, SequencerCommand, SequencerEffect, SequencerError, Sequencer, SessionPhase};
pub use time::Clock;
