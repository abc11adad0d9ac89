//! The cross-collection activity pipeline
//!
//! User selection -> recent interaction window -> batched video join ->
//! joined records for presentation, either as a one-shot fetch or a live
//! feed. Independently, the category aggregator feeds the freshness cache.

pub mod categories;
pub mod fetcher;
pub mod join;
pub mod source;
pub mod stream;

pub use categories::{CategoryAggregator, CategorySummary};
pub use fetcher::InteractionFetcher;
pub use join::{batched_lookup, JoinedInteraction, VideoJoiner};
pub use source::{ActivitySource, InteractionChange, DEFAULT_INTERACTION_LIMIT, MAX_IN_VALUES};
pub use stream::{LiveJoinFeed, Subscription};
