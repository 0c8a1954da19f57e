// Model exports
pub mod domain;

pub use domain::{
    pair_key, ConnectionEdge, DailyRhythm, Match, MatchCandidate, MatchStatus, MutualSkill,
    PairScores, PersonalityType, Proficiency, ProfileAnalysis, ScoringWeights, SkillDirection,
    SkillEntry, User,
};
