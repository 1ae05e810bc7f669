use serde::{Deserialize, Serialize};

/// One raw OHLCV observation plus a precomputed sentiment signal.
///
/// The pipeline trusts the caller on `high >= low` and positive prices;
/// see `ObservationValidator` for the caller-side checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketObservation {
    #[serde(rename = "open_price")]
    pub open: f64,
    #[serde(rename = "high_price")]
    pub high: f64,
    #[serde(rename = "low_price")]
    pub low: f64,
    #[serde(rename = "close_price")]
    pub close: f64,
    pub volume: f64,
    /// Normalized to [-1, 1]; 0 when no headline was scored.
    #[serde(rename = "sentiment_score", default)]
    pub sentiment: f64,
}

impl MarketObservation {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
            sentiment: 0.0,
        }
    }

    pub fn with_sentiment(mut self, sentiment: f64) -> Self {
        self.sentiment = sentiment;
        self
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Inbound request as posted by a client.
///
/// `close_price` defaults to `open_price` when omitted. `sentiment_score`
/// overrides the headline scorer when the caller already has one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub open_price: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    #[serde(default)]
    pub close_price: Option<f64>,
    pub volume: Option<f64>,
    #[serde(default)]
    pub news_headline: Option<String>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_wire_names() {
        let json = r#"{"open_price":100.0,"high_price":110.0,"low_price":95.0,"close_price":105.0,"volume":1500.0}"#;
        let obs: MarketObservation = serde_json::from_str(json).unwrap();

        assert_eq!(obs.open, 100.0);
        assert_eq!(obs.close, 105.0);
        assert_eq!(obs.sentiment, 0.0);
        assert_eq!(obs.range(), 15.0);
    }

    #[test]
    fn test_request_optional_fields() {
        let json = r#"{"open_price":100.0,"high_price":110.0,"low_price":95.0,"volume":10.0}"#;
        let req: PredictionRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.close_price, None);
        assert_eq!(req.news_headline, None);
        assert_eq!(req.volume, Some(10.0));
    }
}
