use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use mindmate::{
    catalog::Model,
    chat, constants,
    web_server::{self, ServerConfig},
    InferenceClient, Mood, Session,
};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Base URL of the hosted inference API (defaults to HF_INFERENCE_URL).
    #[arg(long, global = true)]
    inference_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the MindMate web UI.
    Serve {
        #[arg(long, env = "MINDMATE_HOST", default_value = "127.0.0.1", help = "Address to bind.")]
        host: String,
        #[arg(long, env = "MINDMATE_PORT", default_value_t = constants::DEFAULT_PORT, help = "Port for the web server.")]
        port: u16,
        #[arg(long, help = "Directory holding the page templates.")]
        templates: Option<PathBuf>,
        #[arg(long = "static", help = "Directory holding static assets.")]
        static_dir: Option<PathBuf>,
    },
    /// Chat with MindMate in the terminal.
    Chat {
        #[arg(long, value_enum, default_value_t = Model::default())]
        model: Model,
        #[arg(long, value_enum, default_value_t = Mood::default())]
        mood: Mood,
    },
    /// List the hosted models MindMate can use.
    Models,
}

// The main entry point of the application, using tokio's async runtime
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for HF_TOKEN and friends)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG (e.g., RUST_LOG=info,mindmate=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("MindMate starting with command: {:?}", cli.command);

    let inference_url = cli
        .inference_url
        .unwrap_or_else(|| constants::HF_INFERENCE_URL.clone());
    let client = InferenceClient::new(inference_url, constants::HF_TOKEN.as_str());

    match cli.command {
        Commands::Serve {
            host,
            port,
            templates,
            static_dir,
        } => {
            let config = ServerConfig {
                host,
                port,
                templates_dir: templates.unwrap_or_else(|| PathBuf::from(constants::TEMPLATES_DIR.as_str())),
                static_dir: static_dir.unwrap_or_else(|| PathBuf::from(constants::STATIC_DIR.as_str())),
            };
            web_server::start_web_server(config, client)
                .await
                .context("Web server failed")?;
        }
        Commands::Chat { model, mood } => {
            let mut session = Session::new();
            session.model = model;
            session.mood = mood;
            let stdin = std::io::stdin().lock();
            let mut stdout = std::io::stdout();
            chat::run_terminal_chat(&client, &mut session, stdin, &mut stdout)
                .await
                .context("Chat session failed")?;
        }
        Commands::Models => {
            for model in Model::ALL {
                println!("{:<10} {:<10} {}", model.key(), model.label(), model.repo_id());
            }
        }
    }

    Ok(())
}
