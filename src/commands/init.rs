//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ledger::LedgerDb;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct InitReport {
    pub config_path: PathBuf,
    pub db_path: PathBuf,
}

/// Write the default config and create the ledger schema
pub async fn cmd_init(base_dir: Option<PathBuf>, force: bool) -> Result<InitReport> {
    let mut config = Config::default();
    config.init_paths(base_dir);

    if config.paths.config_file.exists() && !force {
        return Err(Error::AlreadyInitialized(
            config.paths.config_file.display().to_string(),
        ));
    }

    config.save()?;

    let db = LedgerDb::connect(&config).await?;
    db.init_schema().await?;

    info!("Initialized firmograph in {:?}", config.paths.base_dir);
    Ok(InitReport {
        config_path: config.paths.config_file.clone(),
        db_path: config.paths.db_file.clone(),
    })
}
