//! Public API module

pub mod public;

pub use public::{MetricsConsumer, ScrapeController};
