use crate::config::{FetchConfig, PipelineConfig, PublishConfig};
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

const DEFAULT_OUTPUT_PATH: &str = "index.html";
const DEFAULT_OBJECT_KEY: &str = "index.html";
const DEFAULT_CONTENT_TYPE: &str = "text/html";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize)]
struct StaticConfig {
    #[serde(default)]
    fetch: FetchSection,
    publish: PublishSection,
}

#[derive(Deserialize, Default)]
struct FetchSection {
    #[serde(default)]
    output_path: Option<PathBuf>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

#[derive(Deserialize)]
struct PublishSection {
    bucket: String,
    region: String,
    #[serde(default)]
    object_key: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

/// Loads the static YAML config file and merges in the runtime-supplied URL.
/// Returns a fully merged PipelineConfig or an error.
pub fn load_config<P: AsRef<Path>>(path: P, url: String) -> Result<PipelineConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let static_conf: StaticConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if url.trim().is_empty() {
        error!("No URL supplied for the fetch stage");
        anyhow::bail!("No URL supplied for the fetch stage");
    }
    if static_conf.publish.bucket.trim().is_empty() {
        error!("publish.bucket must not be empty");
        anyhow::bail!("publish.bucket must not be empty");
    }
    if static_conf.publish.region.trim().is_empty() {
        error!("publish.region must not be empty");
        anyhow::bail!("publish.region must not be empty");
    }

    let fetch_config = FetchConfig {
        url: url.trim().to_string(),
        output_path: static_conf
            .fetch
            .output_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
        timeout: Duration::from_secs(
            static_conf.fetch.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        ),
    };

    let publish_config = PublishConfig {
        bucket: static_conf.publish.bucket,
        region: static_conf.publish.region,
        object_key: static_conf
            .publish
            .object_key
            .unwrap_or_else(|| DEFAULT_OBJECT_KEY.to_string()),
        content_type: static_conf
            .publish
            .content_type
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        timeout: Duration::from_secs(
            static_conf
                .publish
                .timeout_secs
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        ),
    };

    info!(
        bucket = %publish_config.bucket,
        region = %publish_config.region,
        output_path = %fetch_config.output_path.display(),
        "Config loaded and merged successfully"
    );

    Ok(PipelineConfig {
        fetch: fetch_config,
        publish: publish_config,
    })
}
