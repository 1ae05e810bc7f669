use serde::{Deserialize, Serialize};

/// Version of the derived feature layout below.
/// Bump whenever `FEATURE_NAMES` changes; model manifests declare the
/// version they were trained against.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

pub const FEATURE_COUNT: usize = 28;

/// Ordered list of derived feature names.
/// This order MUST match the column order the array-based models were fit on.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Open",
    "High",
    "Low",
    "Close",
    "Volume",
    "Price_Change",
    "Range",
    "Range_Pct",
    "Volume_Price_Ratio",
    "Sentiment",
    "Sentiment_Strength",
    "Sentiment_Direction",
    "Sentiment_Volatility_Interaction",
    "Close_Lag_1",
    "Open_Lag_1",
    "Volume_Lag_1",
    "Sentiment_Lag_1",
    "Close_Lag_2",
    "Open_Lag_2",
    "Volume_Lag_2",
    "Sentiment_Lag_2",
    "Close_Lag_3",
    "Open_Lag_3",
    "Volume_Lag_3",
    "Sentiment_Lag_3",
    "Price_Momentum",
    "Volatility",
    "High_Low_Ratio",
];

const OPEN: usize = 0;
const HIGH: usize = 1;
const LOW: usize = 2;
const CLOSE: usize = 3;
const VOLUME: usize = 4;
const RANGE_PCT: usize = 7;
const SENTIMENT: usize = 9;

/// Immutable feature vector laid out in `FEATURE_NAMES` order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn names() -> &'static [&'static str] {
        &FEATURE_NAMES
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }

    pub fn open(&self) -> f64 {
        self.values[OPEN]
    }

    pub fn high(&self) -> f64 {
        self.values[HIGH]
    }

    pub fn low(&self) -> f64 {
        self.values[LOW]
    }

    pub fn close(&self) -> f64 {
        self.values[CLOSE]
    }

    pub fn volume(&self) -> f64 {
        self.values[VOLUME]
    }

    pub fn range_pct(&self) -> f64 {
        self.values[RANGE_PCT]
    }

    pub fn sentiment(&self) -> f64 {
        self.values[SENTIMENT]
    }

    /// Projects this vector onto a model's expected schema.
    ///
    /// Columns are emitted in the schema's order; any name the deriver does
    /// not produce takes the column's declared default.
    pub fn reindex(&self, schema: &ExpectedSchema) -> Vec<f64> {
        schema
            .columns
            .iter()
            .map(|col| self.get(&col.name).unwrap_or(col.default))
            .collect()
    }
}

/// One column of a model's expected input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedColumn {
    pub name: String,
    #[serde(default)]
    pub default: f64,
}

/// Ordered input contract declared by a model artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectedSchema {
    columns: Vec<ExpectedColumn>,
}

impl ExpectedSchema {
    /// Builds a schema whose columns all default to `0.0`.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: names
                .into_iter()
                .map(|name| ExpectedColumn {
                    name: name.into(),
                    default: 0.0,
                })
                .collect(),
        }
    }

    pub fn from_columns(columns: Vec<ExpectedColumn>) -> Self {
        Self { columns }
    }

    /// The deriver's own layout, for models fit on the full vector.
    pub fn derived() -> Self {
        Self::from_names(FEATURE_NAMES)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Names the deriver does not produce; these are default-filled on reindex.
    pub fn missing_from_derived(&self) -> Vec<&str> {
        self.names()
            .filter(|name| !FEATURE_NAMES.contains(name))
            .collect()
    }
}
