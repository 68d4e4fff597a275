//! VnLegal: splits Vietnamese legal documents into metadata-tagged Markdown blocks.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use vnlegal_core::VnLegalConfig;
use vnlegal_server::cli::{self, SplitArgs};
use vnlegal_server::{build_router, AppState};
use vnlegal_store::SqliteStore;

fn resolve_data_dir() -> PathBuf {
    std::env::var("VNLEGAL_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "split" => {
                let split = SplitArgs::parse(&args[2..])?;
                let data_dir = resolve_data_dir();
                // LLM calls block; keep them off the runtime threads.
                tokio::task::spawn_blocking(move || cli::run_split(&split, &data_dir)).await??;
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("{}", cli::USAGE);
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'vnlegal help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = VnLegalConfig::from_env(&data_dir)?;
    let port = config.port;

    let store = SqliteStore::open(&config.data_paths.db)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;

    let state = Arc::new(AppState::new(config, store));
    info!(
        "Splitter settings: {:?}, LLM backend: {}",
        state.config.splitter,
        state.llm().name()
    );

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("VnLegal server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
