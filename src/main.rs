mod ai;
mod config;
mod error;
mod momentum;
mod server;
mod store;
mod tools;
mod types;

use std::sync::Arc;

use anyhow::Result;
use rmcp::ServiceExt;
use tracing::info;

use crate::ai::{AnthropicClient, TextGenerator};
use crate::config::Config;
use crate::types::Period;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mindshift_momentum=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--summary") {
        let period = flag_value(&args, "--period")
            .map(|p| Period::from_str(&p).ok_or_else(|| anyhow::anyhow!("unknown period: {}", p)))
            .transpose()?
            .unwrap_or(Period::Week);
        return run_once(config, Mode::Summary(period)).await;
    }
    if args.iter().any(|a| a == "--weekly") {
        return run_once(config, Mode::Weekly).await;
    }

    run_mcp_server(config).await
}

enum Mode {
    Summary(Period),
    Weekly,
}

async fn build_server(config: &Config) -> Result<server::MomentumServer> {
    let store = store::Store::init(&config.store_path).await?;

    let generator: Option<Arc<dyn TextGenerator>> = match AnthropicClient::from_config(&config.ai) {
        Some(client) => {
            info!("AI reflections enabled ({})", client.model());
            Some(Arc::new(client))
        }
        None => {
            info!("ANTHROPIC_API_KEY not set, using built-in reflections");
            None
        }
    };

    Ok(server::MomentumServer {
        store_path: config.store_path.clone(),
        user_id: config.user_id.clone(),
        utc_offset: config.utc_offset,
        generator,
        store: Arc::new(tokio::sync::Mutex::new(store)),
    })
}

async fn run_mcp_server(config: Config) -> Result<()> {
    let server = build_server(&config).await?;

    let transport = rmcp::transport::io::stdio();
    info!("starting mindshift-momentum MCP server (stdio)");

    let service = server.serve(transport).await
        .map_err(|e| anyhow::anyhow!("MCP server failed: {}", e))?;

    let _ = service.waiting().await;
    Ok(())
}

async fn run_once(config: Config, mode: Mode) -> Result<()> {
    let server = build_server(&config).await?;
    let now = chrono::Utc::now();

    let output = match mode {
        Mode::Summary(period) => {
            let summary = momentum::pipeline::generate_momentum_summary(
                config.user_id.as_deref(),
                &*server.store,
                server.generator(),
                period,
                now,
                config.utc_offset,
            )
            .await?;
            serde_json::to_string_pretty(&summary)?
        }
        Mode::Weekly => {
            let weekly = momentum::pipeline::generate_weekly_reflection(
                config.user_id.as_deref(),
                &*server.store,
                server.generator(),
                now,
                config.utc_offset,
            )
            .await?;
            serde_json::to_string_pretty(&weekly)?
        }
    };
    println!("{}", output);
    Ok(())
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
