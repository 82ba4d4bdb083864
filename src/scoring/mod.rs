pub mod components;
pub mod engine;

pub use components::{compute_components, ScoreInput};
pub use engine::ScoringEngine;
