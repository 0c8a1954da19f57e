// Core algorithm exports
pub mod matcher;
pub mod network;
pub mod scoring;

pub use matcher::MatchEngine;
pub use network::NetworkWalker;
pub use scoring::{
    mutual_skills, qualitative_boost, score_pair, score_personality, score_skill_overlap,
};
