//! Campus stress analysis for rinsight.
//!
//! Fetches recent posts from a university subreddit, classifies each one
//! (sentiment, category, keywords) with a lexicon or a remote model, caches
//! the classified set, and turns it into per-category stress scores,
//! keyword views and support recommendations. Also hosts the offline
//! crash-period job and its CSV persistence.

pub mod cache;
pub mod classifier;
pub mod crash;
pub mod error;
pub mod insights;
pub mod lexicon;
pub mod persist;
pub mod pipeline;
pub mod recommend;
pub mod scoring;
pub mod sources;

mod throttle;

pub use cache::{CacheBackend, CacheEntry, Clock, FileBackend, MemoryBackend, PostCache, SystemClock};
pub use classifier::{build_classifier, Classification, Classifier, Suggestion};
pub use crash::{analyze, predict_crash_periods, AnalyzedPost, CrashPrediction};
pub use error::SentimentError;
pub use insights::{keyword_frequencies, recent_insights, Insight, KeywordFrequency};
pub use lexicon::{lexicon_score, Issue};
pub use pipeline::{PostBatch, PostOrigin, PostPipeline};
pub use recommend::{keyword_recommendations, KeywordRecommendation, Recommender};
pub use scoring::{posts_in_window, score, CategoryAggregate, ScoringConfig, Status, StressReport};
pub use sources::{build_source, fixture_posts, FixtureSource, PostSource, RedditConfig, RedditSource};
pub use throttle::Throttle;
