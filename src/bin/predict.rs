//! Pricecast predictor - one-shot price prediction from a JSON request.
//!
//! Reads a request from `--input` or stdin and writes a JSON response to
//! stdout. Logs go to stderr so stdout stays machine-readable.
//!
//! # Usage
//! ```sh
//! echo '{"open_price":45000,"high_price":46000,"low_price":44000,"volume":1000}' \
//!     | cargo run --bin predict -- --model-dir model
//! ```
//!
//! # Environment Variables
//! - `PRICECAST_MODEL_DIR` - Directory holding model artifacts (default: model)
//! - `PRICECAST_SEED` - Fixed RNG seed for reproducible output
//! - `RUST_LOG` - Log filter (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use pricecast::application::ml::PredictionPipeline;
use pricecast::application::prediction_service::PredictionService;
use pricecast::config::PredictorEnvConfig;
use pricecast::domain::market::observation::PredictionRequest;
use pricecast::infrastructure::models::ModelLoader;
use pricecast::interfaces::response::ErrorResponse;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the model artifacts
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Request JSON file; reads stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Fixed RNG seed
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(body) => {
            println!("{}", body);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Prediction failed: {:#}", e);
            let body = serde_json::to_string(&ErrorResponse::new(format!("{:#}", e)))
                .unwrap_or_else(|_| r#"{"error":"unknown","status":"error"}"#.to_string());
            println!("{}", body);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<String> {
    let mut config = PredictorEnvConfig::from_env()?;
    if let Some(dir) = args.model_dir {
        config.model_dir = dir;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let raw = match &args.input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read request from stdin")?;
            buf
        }
    };
    let request: PredictionRequest =
        serde_json::from_str(&raw).context("Request is not valid JSON")?;

    info!("Loading models from {:?}", config.model_dir);
    let registry = ModelLoader::new(&config.model_dir).load()?;
    let pipeline = PredictionPipeline::new(Arc::new(registry))
        .with_fallback_penalty(config.fallback_confidence_penalty);
    let service = PredictionService::new(pipeline, config.metrics);

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let response = service.handle(&request, &mut rng)?;
    info!(
        "Predicted {:.2} with confidence {:.3}",
        response.prediction, response.confidence
    );
    serde_json::to_string(&response).context("Failed to serialize response")
}
