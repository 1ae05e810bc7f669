pub mod keyword_sentiment;

pub use keyword_sentiment::KeywordSentimentScorer;
