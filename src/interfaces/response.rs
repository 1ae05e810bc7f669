use crate::domain::ml::prediction::{
    FeatureImportance, PerformanceMetrics, PredictionResult, PredictionSet,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// JSON body written for a successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub prediction: f64,
    pub confidence: f64,
    pub individual_predictions: PredictionSet,
    pub feature_importance: Vec<FeatureImportance>,
    pub model_performance: PerformanceMetrics,
    pub using_fallback: bool,
    pub calculated_sentiment: f64,
    pub status: ResponseStatus,
}

impl PredictionResponse {
    pub fn from_result(
        result: PredictionResult,
        metrics: PerformanceMetrics,
        calculated_sentiment: f64,
    ) -> Self {
        Self {
            prediction: result.prediction,
            confidence: result.confidence,
            individual_predictions: result.per_model_predictions,
            feature_importance: result.feature_importance,
            model_performance: metrics,
            using_fallback: result.using_fallback,
            calculated_sentiment,
            status: ResponseStatus::Success,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: ResponseStatus,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: ResponseStatus::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::model::ModelId;

    #[test]
    fn test_success_shape() {
        let mut predictions = PredictionSet::new();
        predictions.insert(ModelId::BaseA, 101.0);
        let result = PredictionResult {
            prediction: 101.0,
            confidence: 0.8,
            per_model_predictions: predictions,
            feature_importance: vec![FeatureImportance::new("Open", 1.0)],
            using_fallback: false,
        };
        let metrics = PerformanceMetrics {
            rmse: 1.0,
            mae: 2.0,
            r2: 0.5,
        };

        let json = serde_json::to_value(PredictionResponse::from_result(result, metrics, 0.25))
            .unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["individual_predictions"]["base_a"], 101.0);
        assert_eq!(json["feature_importance"][0]["feature"], "Open");
        assert_eq!(json["model_performance"]["r2"], 0.5);
        assert_eq!(json["calculated_sentiment"], 0.25);
        assert_eq!(json["using_fallback"], false);
    }

    #[test]
    fn test_error_shape() {
        let json = serde_json::to_value(ErrorResponse::new("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"error": "boom", "status": "error"}));
    }
}
