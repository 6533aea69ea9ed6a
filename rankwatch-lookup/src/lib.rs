pub mod client;
pub mod error;
pub mod result;

pub use client::{GeminiClient, RankLookup};
pub use error::LookupError;
pub use result::{Citation, Device, RankQuery, RankingOutcome};
