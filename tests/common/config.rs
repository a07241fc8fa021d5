//! Test configuration helpers for pointing the client at a mock service

use resume_optimizer::{Config, ExportLauncher, UploadWorkflow};
use std::time::Duration;
use tempfile::TempDir;

/// Config for a service at `base_url`, saving exports into `download_dir`
pub fn test_config(base_url: &str, download_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.service.base_url = base_url.to_string();
    config.service.connect_timeout = Duration::from_secs(2);
    config.export.download_dir = download_dir.to_path_buf();
    config
}

/// Workflow and export launcher against `base_url`
///
/// Returns the temp directory too (keep it alive for the test duration)
pub fn create_test_client(base_url: &str) -> (UploadWorkflow, ExportLauncher, TempDir) {
    create_test_client_with(base_url, |_| {})
}

/// Like [`create_test_client`], with a hook to adjust the config first
pub fn create_test_client_with(
    base_url: &str,
    adjust: impl FnOnce(&mut Config),
) -> (UploadWorkflow, ExportLauncher, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = test_config(base_url, &temp_dir.path().join("downloads"));
    adjust(&mut config);
    config.validate().expect("Test config must be valid");

    let workflow = UploadWorkflow::new(&config)
        .expect("Failed to create workflow")
        .with_previews(Some(temp_dir.path().to_path_buf()));
    let launcher = ExportLauncher::new(&config).expect("Failed to create launcher");
    (workflow, launcher, temp_dir)
}
