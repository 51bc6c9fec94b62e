pub mod engine;
pub mod points;
pub mod serialization;

pub use engine::{
    AdvanceError, BidError, BidOutcome, Decider, GameState, Phase, PlayError, PlayOutcome,
    SetStartError, SetupError,
};
