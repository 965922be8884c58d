//! A2A bridge CLI
//!
//! Serves the built-in `echo` tool as an A2A agent, serves local and bridged
//! tools over plain HTTP, lists the skills of a remote agent, or calls one of
//! those skills as a tool.

use std::net::SocketAddr;

use a2a_bridge::{
    echo_tool, join_content, serve_tools, AgentToolset, BridgeError, ToolAgent, ToolArgs,
    ToolRegistry,
};
use a2a_server::ServerConfig;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "a2a-bridge")]
#[command(about = "Bridge local tools and A2A agents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the built-in echo tool as an A2A agent
    ServeEcho {
        /// Listen address (overrides A2A_BIND_ADDR)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Serve the echo tool and the skills of the given agents as HTTP tools
    ServeTools {
        /// Listen address (overrides A2A_BIND_ADDR)
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// Agent base URL whose skills are added as tools (repeatable)
        #[arg(short, long = "agent")]
        agents: Vec<String>,
    },

    /// Print the skills an agent advertises, as tool descriptions
    ListSkills {
        /// Agent base URL
        url: String,
    },

    /// Call one skill of an agent and print the reply
    Call {
        /// Agent base URL
        url: String,

        /// Skill id
        skill: String,

        /// Input text
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), BridgeError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ServeEcho { bind } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(addr) = bind {
                config = config.with_bind_addr(addr);
            }
            tracing::info!(addr = %config.bind_addr, "serving echo tool");
            ToolAgent::new(echo_tool()).serve(config).await?;
        }
        Commands::ServeTools { bind, agents } => {
            let config = ServerConfig::from_env()?;
            let addr = bind.unwrap_or(config.bind_addr);

            let mut registry = ToolRegistry::new();
            registry.register(echo_tool())?;
            for url in &agents {
                let toolset = AgentToolset::connect(url).await?;
                toolset.register_into(&mut registry)?;
                tracing::info!(agent = %toolset.card().name, tools = toolset.tools().len(), "bridged agent skills");
            }
            serve_tools(registry, addr).await?;
        }
        Commands::ListSkills { url } => {
            let toolset = AgentToolset::connect(&url).await?;
            println!("{} ({})", toolset.card().name, toolset.card().url);
            for tool in toolset.tools() {
                println!("  {}: {}", tool.name, tool.description);
            }
            toolset.close();
        }
        Commands::Call { url, skill, text } => {
            let toolset = AgentToolset::connect(&url).await?;
            let Some(tool) = toolset.tools().iter().find(|t| t.name == skill) else {
                return Err(a2a_bridge::ToolError::NotFound(skill).into());
            };

            let mut args = ToolArgs::new();
            args.insert("text".into(), Value::String(text));
            let contents = tool.call(args).await?;
            println!("{}", join_content(&contents, "\n"));
            toolset.close();
        }
    }

    Ok(())
}
