//! Coordinating module for the fetch-then-publish pipeline.

use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::fetch::{self, FetchReport};
use crate::publish::{self, ObjectStore, S3Store};

/// Summary of a full pipeline run, printed by the CLI.
#[derive(Debug)]
pub struct PipelineReport {
    pub saved_path: PathBuf,
    pub bytes: usize,
    pub endpoint: String,
}

/// Entrypoint: fetch the page, and only if that produced a valid file,
/// provision the bucket and publish it.
pub async fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    config.trace_loaded();

    info!(url = %config.fetch.url, "[PIPELINE] Starting fetch stage");
    let fetched = match fetch::fetch_page(&config.fetch).await {
        Ok(report) => {
            info!(
                path = %report.path.display(),
                bytes = report.bytes,
                "[PIPELINE] Fetch succeeded"
            );
            report
        }
        Err(e) => {
            error!(error = %e, "[PIPELINE][ERROR] Fetch failed, publish stage will not run");
            return Err(e.into());
        }
    };

    // The fetch result is checked above; only now is the cloud client built.
    let store = S3Store::new_from_env(&config.publish.region, config.publish.timeout).await;
    publish_stage(&store, config, &fetched).await
}

/// Publish half of the pipeline, generic over the store so tests can drive it
/// with a mock.
pub async fn publish_stage<S: ObjectStore>(
    store: &S,
    config: &PipelineConfig,
    fetched: &FetchReport,
) -> Result<PipelineReport> {
    info!(bucket = %config.publish.bucket, "[PIPELINE] Starting publish stage");
    match publish::publish(store, &config.publish, &fetched.path).await {
        Ok(report) => {
            info!(endpoint = %report.endpoint, "[PIPELINE] Publish succeeded");
            Ok(PipelineReport {
                saved_path: fetched.path.clone(),
                bytes: report.bytes,
                endpoint: report.endpoint,
            })
        }
        Err(e) => {
            error!(error = %e, "[PIPELINE][ERROR] Publish failed");
            Err(e.into())
        }
    }
}
