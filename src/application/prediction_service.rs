//! Request-level entry point: validation, headline sentiment, then the pipeline.

use crate::application::ml::pipeline::PredictionPipeline;
use crate::domain::market::observation::PredictionRequest;
use crate::domain::ml::prediction::PerformanceMetrics;
use crate::domain::validation::data_quality::ObservationValidator;
use crate::infrastructure::sentiment::KeywordSentimentScorer;
use crate::interfaces::response::PredictionResponse;
use anyhow::{Context, Result};
use rand::Rng;
use tracing::info;

pub struct PredictionService {
    pipeline: PredictionPipeline,
    sentiment: KeywordSentimentScorer,
    metrics: PerformanceMetrics,
}

impl PredictionService {
    pub fn new(pipeline: PredictionPipeline, metrics: PerformanceMetrics) -> Self {
        Self {
            pipeline,
            sentiment: KeywordSentimentScorer::new(),
            metrics,
        }
    }

    /// Handles one request.
    ///
    /// An explicit `sentiment_score` wins over the headline; otherwise the
    /// headline is scored against the request's own bar.
    pub fn handle<R: Rng + ?Sized>(
        &self,
        request: &PredictionRequest,
        rng: &mut R,
    ) -> Result<PredictionResponse> {
        let mut observation =
            ObservationValidator::validate_request(request).context("Invalid prediction request")?;

        if request.sentiment_score.is_none() {
            if let Some(headline) = request.news_headline.as_deref() {
                observation.sentiment = self.sentiment.score(headline, &observation, rng);
                info!("Headline sentiment: {:.2}", observation.sentiment);
            }
        }

        let result = self.pipeline.run(&observation, rng)?;
        Ok(PredictionResponse::from_result(
            result,
            self.metrics,
            observation.sentiment,
        ))
    }
}
