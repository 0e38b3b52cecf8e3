//! Solterra Engine - Main entry point.
//!
//! Reads one JSON command per line from stdin and writes one JSON result per
//! line to stdout.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use solterra_engine::api::{dispatch, Command};
use solterra_engine::infrastructure::config::EngineConfig;
use solterra_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solterra_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Solterra Engine");

    let config = EngineConfig::from_env();
    let app = App::from_config(&config).await;

    let loaded = app.use_cases.load.execute().await;
    tracing::info!(
        restored = loaded.restored,
        triggered = loaded.triggered.len(),
        "Game ready"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        let response = match serde_json::from_str::<Command>(line) {
            Ok(command) => match dispatch(&app, command).await {
                Ok(result) => serde_json::json!({ "ok": true, "result": result }),
                Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }),
            },
            Err(e) => serde_json::json!({ "ok": false, "error": format!("Invalid command: {e}") }),
        };

        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }

    app.use_cases.save.execute().await;
    tracing::info!("Solterra Engine stopped");
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
