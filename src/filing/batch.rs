// src/filing/batch.rs
use std::path::PathBuf;
use std::sync::Arc;

use crate::filing::{EngineConfig, Filing};
use crate::utils::error::AppError;

/// Builds every filing on tokio's blocking pool, in parallel. Results come back
/// in the order of `paths`; one failing filing does not affect the others.
pub async fn load_all(paths: Vec<PathBuf>, config: Arc<EngineConfig>) -> Vec<(PathBuf, Result<Filing, AppError>)> {
    let handles: Vec<_> = paths
        .into_iter()
        .map(|path| {
            let config = Arc::clone(&config);
            let task_path = path.clone();
            let handle = tokio::task::spawn_blocking(move || Filing::open_with(&task_path, &config));
            (path, handle)
        })
        .collect();

    tracing::debug!("Spawned {} filing builds", handles.len());

    let mut results = Vec::with_capacity(handles.len());
    for (path, handle) in handles {
        let result = match handle.await {
            Ok(built) => built.map_err(AppError::from),
            Err(e) => Err(AppError::Processing(format!("Build task for {} failed: {}", path.display(), e))),
        };
        if result.is_ok() {
            tracing::debug!("Built filing {}", path.display());
        }
        results.push((path, result));
    }
    results
}
