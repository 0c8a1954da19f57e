// Service exports
pub mod analysis_cache;
pub mod analyzer;
pub mod matches;
pub mod memory;
pub mod postgres;
pub mod store;

pub use analysis_cache::AnalysisCache;
pub use analyzer::{AnalyzerClient, AnalyzerError, CompletionClient, ProfileAnalysisService};
pub use matches::{MatchCreation, MatchService};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::{Store, StoreError};
