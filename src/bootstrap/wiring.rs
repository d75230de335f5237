//! # Dependency Injection
//!
//! The only place that depends on `ca-infra` and `ca-app` at the same time.
//! It builds adapters and hands them to the use cases as ports; it makes no
//! decisions about application state.

use std::path::PathBuf;
use std::sync::Arc;

use ca_app::{AppDeps, CompanyApplication};
use ca_core::config::AppConfig;
use ca_core::ports::SubmissionEventPort;
use ca_infra::fs::app_data_dir;
use ca_infra::{FileFragmentCache, FsAttachmentStore, HttpSubmissionTransport, InMemoryCaptcha};

const FRAGMENT_CACHE_FILE: &str = "fragments.json";
const LOGS_DIR: &str = "logs";

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Data directory resolution failed: {0}")]
    DataDir(String),

    #[error("HTTP client initialization failed: {0}")]
    TransportInit(String),
}

/// Resolved filesystem locations for one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub fragment_cache: PathBuf,
    pub logs_dir: PathBuf,
}

impl AppPaths {
    pub fn from_data_dir(data_dir: PathBuf) -> Self {
        Self {
            fragment_cache: data_dir.join(FRAGMENT_CACHE_FILE),
            logs_dir: data_dir.join(LOGS_DIR),
            data_dir,
        }
    }
}

/// `[storage] data_dir` when set, otherwise the platform data directory.
pub fn resolve_app_paths(config: &AppConfig) -> WiringResult<AppPaths> {
    let data_dir = match &config.data_dir {
        Some(dir) => dir.clone(),
        None => app_data_dir().map_err(|err| WiringError::DataDir(format!("{err:#}")))?,
    };
    Ok(AppPaths::from_data_dir(data_dir))
}

/// Assembled application plus the handles the front end drives directly.
pub struct WiredApp {
    pub app: CompanyApplication,
    /// Front end hands solved CAPTCHA tokens in here.
    pub captcha: Arc<InMemoryCaptcha>,
}

/// Build every adapter and inject them into [`CompanyApplication`].
///
/// The HTTP client is created eagerly; nothing touches the disk until the
/// first use case runs.
pub fn wire_dependencies(
    config: &AppConfig,
    paths: &AppPaths,
    submission_events: Arc<dyn SubmissionEventPort>,
) -> WiringResult<WiredApp> {
    let captcha = Arc::new(InMemoryCaptcha::new());
    let transport = create_transport(config)?;

    let deps = AppDeps {
        attachment_store: Arc::new(FsAttachmentStore::new(paths.data_dir.clone())),
        fragment_cache: Arc::new(FileFragmentCache::new(paths.fragment_cache.clone())),
        captcha: captcha.clone(),
        transport: Arc::new(transport),
        submission_events,
    };

    tracing::debug!(
        data_dir = %paths.data_dir.display(),
        endpoint = %config.submit_url(),
        "dependencies wired"
    );

    Ok(WiredApp {
        app: CompanyApplication::new(deps, config),
        captcha,
    })
}

fn create_transport(config: &AppConfig) -> WiringResult<HttpSubmissionTransport> {
    HttpSubmissionTransport::new(config.submit_url(), config.request_timeout)
        .map_err(|err| WiringError::TransportInit(err.to_string()))
}
