//! Bid Anomaly - Demo Entry Point
//!
//! Bootstraps a model from a synthetic corpus (if none is published), scores
//! a mixed batch of bids and prints one JSON outcome per line.

use std::sync::Arc;

use bid_anomaly_core::api::ScoreRequest;
use bid_anomaly_core::constants::{APP_NAME, APP_VERSION};
use bid_anomaly_core::logic::synthetic::SyntheticBidGenerator;
use bid_anomaly_core::{
    EngineConfig, FeatureExtractor, ModelStore, RetrainTrigger, ScoringService,
    TrainingCoordinator,
};

/// Synthetic corpus size used when the store is empty
const BOOTSTRAP_BIDS: usize = 200;
const DEMO_BIDS: usize = 20;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    if let Err(e) = run().await {
        log::error!("{} failed: {}", APP_NAME, e);
        std::process::exit(1);
    }
}

async fn run() -> bid_anomaly_core::Result<()> {
    let config = EngineConfig::from_env();
    log::info!("Model store: {:?}", config.store_dir);

    let store = Arc::new(ModelStore::open(&config.store_dir)?);
    let extractor = FeatureExtractor::new(config.features.clone());
    let coordinator = Arc::new(TrainingCoordinator::new(
        Arc::clone(&store),
        config.forest.clone(),
        config.training.clone(),
    ));
    let service = ScoringService::new(extractor.clone(), Arc::clone(&store));

    let seed = config.forest.seed.unwrap_or(42);
    let mut generator = SyntheticBidGenerator::new(seed);

    if store.current_version().is_none() {
        log::info!("No published model, bootstrapping from {} synthetic bids", BOOTSTRAP_BIDS);
        coordinator.set_corpus(generator.typical_vectors(&extractor, BOOTSTRAP_BIDS)?)?;

        let trainer = Arc::clone(&coordinator);
        let outcome = tokio::task::spawn_blocking(move || trainer.retrain(RetrainTrigger::Manual))
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;
        log::info!("Bootstrap: {:?}", outcome);
    }

    let scheduler = Arc::clone(&coordinator).spawn_scheduler(config.training.schedule_interval);

    let tender = generator.tender().clone();
    let bids: Vec<_> = (0..DEMO_BIDS).map(|i| generator.mixed(i)).collect();
    let requests: Vec<ScoreRequest<'_>> = bids
        .iter()
        .map(|s| ScoreRequest {
            bid: &s.bid,
            tender: Some(&tender),
            history: Some(&s.history),
        })
        .collect();

    for (result, synthetic) in service.score_many(&requests)?.into_iter().zip(&bids) {
        match result {
            Ok(outcome) => {
                println!("{}", serde_json::to_string(&outcome)?);
                log::debug!("{} generated as {:?}", outcome.bid_id, synthetic.profile);
                coordinator.record(outcome.features)?;
            }
            Err(e) => log::warn!("Bid {} not scored: {} ({:?})", synthetic.bid.bid_id, e, e.kind()),
        }
    }

    let status = service.engine_status(coordinator.status());
    println!("{}", serde_json::to_string_pretty(&status)?);

    scheduler.abort();
    Ok(())
}
