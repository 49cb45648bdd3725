mod cli;

use std::sync::Arc;

use anyhow::Context;
use aviary_core::{PhotoRetention, Repository};
use aviary_gateway::{App, AppConfig, AppState};
use aviary_storage::{default_statuses, InMemoryRepository, LocalAttachmentStore, MySqlRepository};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{StorageBackendArg, CLI};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = CLI::parse();
    let retention = PhotoRetention::from(config.photo_retention);

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        upload_dir = %config.upload_dir.display(),
        photo_retention = %retention,
        max_upload_bytes = config.max_upload_bytes,
        "starting gateway http server"
    );

    let repository: Arc<dyn Repository> = match config.storage {
        StorageBackendArg::InMemory => Arc::new(
            InMemoryRepository::with_statuses(default_statuses()).with_retention(retention),
        ),
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn)
                .await
                .context("connect to mysql")?
                .with_retention(retention);
            if config.init_schema {
                repository
                    .ensure_schema()
                    .await
                    .context("initialize mysql schema")?;
                info!("mysql schema initialized");
            }
            Arc::new(repository)
        }
    };

    let attachments = LocalAttachmentStore::new(config.upload_dir.clone());
    attachments
        .ensure_dir()
        .await
        .with_context(|| format!("create upload dir {}", config.upload_dir.display()))?;

    let app_config = AppConfig {
        upload_dir: config.upload_dir,
        max_upload_bytes: config.max_upload_bytes,
    };
    let router = App::router(AppState::new(repository, Arc::new(attachments)), &app_config);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, router).await.context("serve http")?;

    Ok(())
}
