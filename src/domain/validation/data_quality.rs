use crate::domain::errors::ValidationError;
use crate::domain::market::observation::{MarketObservation, PredictionRequest};
use tracing::warn;

/// Caller-side validator for inbound observations.
///
/// Rejects data that is physically impossible before it reaches the feature
/// deriver, which has no way to signal bad input back.
pub struct ObservationValidator;

impl ObservationValidator {
    /// Validates a raw request and resolves it into an observation.
    ///
    /// `close_price` defaults to `open_price`; sentiment is taken from the
    /// request when present and otherwise left neutral.
    pub fn validate_request(
        request: &PredictionRequest,
    ) -> Result<MarketObservation, ValidationError> {
        let open = Self::required(request.open_price, "open_price")?;
        let high = Self::required(request.high_price, "high_price")?;
        let low = Self::required(request.low_price, "low_price")?;
        let volume = Self::required(request.volume, "volume")?;
        let close = match request.close_price {
            Some(c) if c.is_finite() => c,
            Some(_) => return Err(ValidationError::InvalidField { field: "close_price" }),
            None => open,
        };

        let observation = MarketObservation::new(open, high, low, close, volume)
            .with_sentiment(request.sentiment_score.unwrap_or(0.0));
        Self::validate_observation(&observation)?;
        Ok(observation)
    }

    pub fn validate_observation(obs: &MarketObservation) -> Result<(), ValidationError> {
        for (field, value) in [
            ("open_price", obs.open),
            ("high_price", obs.high),
            ("low_price", obs.low),
            ("close_price", obs.close),
        ] {
            if !value.is_finite() {
                warn!("Validation FAILED: {} is not finite", field);
                return Err(ValidationError::InvalidField { field });
            }
            if value <= 0.0 {
                warn!("Validation FAILED: non-positive {}: {}", field, value);
                return Err(ValidationError::NonPositivePrice { field, value });
            }
        }

        if !obs.volume.is_finite() {
            return Err(ValidationError::InvalidField { field: "volume" });
        }
        if obs.volume < 0.0 {
            warn!("Validation FAILED: negative volume: {}", obs.volume);
            return Err(ValidationError::NegativeVolume { value: obs.volume });
        }

        if obs.high < obs.low {
            warn!(
                "Validation FAILED: high {} < low {}",
                obs.high, obs.low
            );
            return Err(ValidationError::InvertedRange {
                high: obs.high,
                low: obs.low,
            });
        }

        if !(-1.0..=1.0).contains(&obs.sentiment) {
            warn!("Validation FAILED: sentiment out of range: {}", obs.sentiment);
            return Err(ValidationError::SentimentOutOfRange {
                value: obs.sentiment,
            });
        }

        Ok(())
    }

    fn required(value: Option<f64>, field: &'static str) -> Result<f64, ValidationError> {
        match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(ValidationError::InvalidField { field }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PredictionRequest {
        PredictionRequest {
            open_price: Some(45000.0),
            high_price: Some(46000.0),
            low_price: Some(44000.0),
            close_price: None,
            volume: Some(1500.0),
            news_headline: None,
            sentiment_score: None,
        }
    }

    #[test]
    fn test_close_defaults_to_open() {
        let obs = ObservationValidator::validate_request(&request()).unwrap();
        assert_eq!(obs.close, 45000.0);
        assert_eq!(obs.sentiment, 0.0);
    }

    #[test]
    fn test_missing_field_rejected() {
        let req = PredictionRequest {
            volume: None,
            ..request()
        };
        assert_eq!(
            ObservationValidator::validate_request(&req),
            Err(ValidationError::InvalidField { field: "volume" })
        );
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let req = PredictionRequest {
            low_price: Some(0.0),
            ..request()
        };
        assert!(matches!(
            ObservationValidator::validate_request(&req),
            Err(ValidationError::NonPositivePrice { field: "low_price", .. })
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let obs = MarketObservation::new(100.0, 99.0, 101.0, 100.0, 10.0);
        assert!(matches!(
            ObservationValidator::validate_observation(&obs),
            Err(ValidationError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_negative_volume_rejected() {
        let obs = MarketObservation::new(100.0, 101.0, 99.0, 100.0, -1.0);
        assert_eq!(
            ObservationValidator::validate_observation(&obs),
            Err(ValidationError::NegativeVolume { value: -1.0 })
        );
    }

    #[test]
    fn test_sentiment_range_enforced() {
        let obs = MarketObservation::new(100.0, 101.0, 99.0, 100.0, 1.0).with_sentiment(1.5);
        assert!(ObservationValidator::validate_observation(&obs).is_err());
    }
}
