use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinical_trials_mcp::config::{find_config_file, get_config, load_config, Config};
use clinical_trials_mcp::llm::ModelClient;
use clinical_trials_mcp::mcp::{McpServer, ToolRegistry};
use clinical_trials_mcp::models::{TrialStatus, DEFAULT_STATUS_CODE, DEFAULT_TRIAL_COUNT};
use clinical_trials_mcp::registries::{CtGovClient, CtisClient};
use clinical_trials_mcp::search::RelevanceSearch;

/// Clinical Trials MCP - fetch and search clinical trials from the EU CTIS
/// registry and ClinicalTrials.gov
#[derive(Parser, Debug)]
#[command(name = "clinical-trials-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch and search clinical trials from EU CTIS and ClinicalTrials.gov", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times: -v, -vv, -vvv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch one trial by registry id
    #[command(alias = "f")]
    Fetch {
        /// EU trial identifier number (ctNumber)
        #[arg(long)]
        eu_ct_id: Option<String>,

        /// ClinicalTrials.gov NCT id
        #[arg(long)]
        nct_id: Option<String>,
    },

    /// Search both registries and rank relevance against a request
    #[command(alias = "s")]
    Search {
        /// Keywords to search for
        search_terms: String,

        /// The question the results should be ranked against
        #[arg(long, short)]
        request: String,

        /// Condition or disease filter
        #[arg(long, short)]
        condition: Option<String>,

        /// Location filter (ClinicalTrials.gov only)
        #[arg(long, short)]
        location: Option<String>,

        /// Sponsor filter
        #[arg(long)]
        sponsor: Option<String>,

        /// EU status code (8 ended, 5 recruitment ended, 1 authorised, 4 recruiting)
        #[arg(long, default_value_t = DEFAULT_STATUS_CODE)]
        status: i64,

        /// Number of trials to fetch from each registry
        #[arg(long, default_value_t = DEFAULT_TRIAL_COUNT)]
        count: usize,
    },

    /// Run the MCP server (for Claude Desktop and other MCP clients)
    Serve {
        /// Run in stdio mode (for MCP clients like Claude Desktop)
        #[arg(long, default_value_t = true)]
        stdio: bool,

        /// Run in HTTP/SSE mode (overrides --stdio)
        #[arg(long)]
        http: bool,

        /// Port for HTTP mode
        #[arg(long, short, default_value_t = 3000)]
        port: u16,

        /// Host to bind to for HTTP mode
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

/// Wire the registry clients and model client into a tool registry.
fn build_tools(config: &Config) -> Result<ToolRegistry> {
    let ctis = CtisClient::new()?;
    let ctgov = CtGovClient::new()?;

    if config.api_keys.anthropic.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY not set; relevance analysis will yield no results");
    }
    let model = ModelClient::new(config.api_keys.anthropic.clone().unwrap_or_default())?
        .with_model(config.llm.model.clone())
        .with_max_tokens(config.llm.max_tokens);

    let search = RelevanceSearch::new(ctis.clone(), ctgov.clone(), Arc::new(model));
    Ok(ToolRegistry::new(ctis, ctgov, search))
}

/// Print a tool result, unwrapping plain-text payloads.
fn print_tool_result(value: serde_json::Value) {
    match value {
        serde_json::Value::String(text) => println!("{text}"),
        other => println!("{}", serde_json::to_string_pretty(&other).unwrap_or_default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("clinical_trials_mcp={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration from file if specified or found in default locations
    let config = if let Some(config_path) = &cli.config {
        load_config(config_path)?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)?
    } else {
        get_config()
    };

    match cli.command {
        Some(Commands::Fetch { eu_ct_id, nct_id }) => {
            let tools = build_tools(&config)?;
            let mut args = serde_json::Map::new();
            if let Some(eu_id) = eu_ct_id {
                args.insert("eu_ct_id".to_string(), serde_json::Value::String(eu_id));
            }
            if let Some(nct) = nct_id {
                args.insert("trial_ct_id".to_string(), serde_json::Value::String(nct));
            }

            let result = tools
                .execute("fetch_trial", serde_json::Value::Object(args))
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            print_tool_result(result);
        }

        Some(Commands::Search {
            search_terms,
            request,
            condition,
            location,
            sponsor,
            status,
            count,
        }) => {
            if TrialStatus::from_code(status).is_none() {
                tracing::warn!(
                    "status code {status} is not a named EU filter (1, 4, 5, 8); passing through"
                );
            }

            let tools = build_tools(&config)?;
            let args = serde_json::json!({
                "user_request": request,
                "search_terms": search_terms,
                "condition": condition,
                "location": location,
                "sponsor": sponsor,
                "status": status,
                "no_of_trials": count,
            });

            let result = tools
                .execute("search_batch_trials", args)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            print_tool_result(result);
        }

        Some(Commands::Serve {
            stdio,
            http,
            port,
            host,
        }) => {
            let tools = build_tools(&config)?;
            let server = McpServer::new(tools);

            // Use HTTP mode if --http is provided, otherwise stdio
            let use_http = http || !stdio;

            if use_http {
                let addr = format!("{}:{}", host, port);
                let (bound_addr, handle) = server.run_http(&addr).await?;
                tracing::info!("MCP server listening on {}", bound_addr);

                handle
                    .await
                    .map_err(|e| anyhow::anyhow!("Server task failed: {}", e))?;
            } else {
                tracing::info!("Running MCP server in stdio mode");
                server.run().await?;
            }
        }

        None => {
            println!("No command provided. Use --help for usage information.");
            println!("Common commands:");
            println!("  fetch --nct-id <id>      - Fetch one trial");
            println!("  search <terms> -r <q>    - Search and rank both registries");
            println!("  serve                    - Run MCP server");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_version() {
        let version = env!("CARGO_PKG_VERSION");
        assert!(!version.is_empty());
        let parts: Vec<&str> = version.split('.').collect();
        assert!(parts.len() >= 2);
        assert!(parts[0].parse::<u32>().is_ok());
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["clinical-trials-mcp"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert!(cli.config.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["clinical-trials-mcp", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_fetch_command() {
        let cli = Cli::parse_from(["clinical-trials-mcp", "fetch", "--nct-id", "NCT01234567"]);
        match &cli.command {
            Some(Commands::Fetch { eu_ct_id, nct_id }) => {
                assert!(eu_ct_id.is_none());
                assert_eq!(nct_id.as_deref(), Some("NCT01234567"));
            }
            _ => panic!("Expected Fetch command"),
        }
    }

    #[test]
    fn test_cli_search_command() {
        let cli = Cli::parse_from([
            "clinical-trials-mcp",
            "search",
            "pembrolizumab melanoma",
            "--request",
            "trials with survival results",
            "--status",
            "4",
        ]);
        match &cli.command {
            Some(Commands::Search {
                search_terms,
                request,
                status,
                count,
                ..
            }) => {
                assert_eq!(search_terms, "pembrolizumab melanoma");
                assert_eq!(request, "trials with survival results");
                assert_eq!(*status, 4);
                assert_eq!(*count, DEFAULT_TRIAL_COUNT);
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_serve_command() {
        let cli = Cli::parse_from(["clinical-trials-mcp", "serve"]);
        match &cli.command {
            Some(Commands::Serve {
                stdio, port, host, ..
            }) => {
                assert!(*stdio);
                assert_eq!(*port, 3000);
                assert_eq!(host, "127.0.0.1");
            }
            _ => panic!("Expected Serve command"),
        }
    }
}
