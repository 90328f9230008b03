//! A small virtual pet: stats that drift with real time, experience and
//! levels, a five-stage evolution ladder, and a terminal front-end.

pub mod app;
pub mod chatter;
pub mod clock;
pub mod config;
pub mod error;
pub mod evolution;
pub mod expression;
pub mod input;
pub mod logging;
pub mod model;
pub mod progression;
pub mod render;
pub mod sim;
pub mod storage;

pub use clock::{apply_decay_tick, DecayConfig, StatClock, TimeSource};
pub use evolution::{
    check_requirements, current_stage as get_current_stage, evolve,
    next_stage as get_next_stage, progress_fraction, EvolutionProgress, EvolutionStage, StageId,
};
pub use expression::{resolve_expression, Expression};
pub use model::{PetRecord, Stats};
pub use progression::gain_experience;
