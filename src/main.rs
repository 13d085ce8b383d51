use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use docchat::connector::api::controller::AskController;
use docchat::connector::api::serve;
use docchat::{Commands, Container, ContainerConfig};

#[derive(Parser)]
#[command(name = "docchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file holding GEMINI_API_KEY (the environment takes precedence)
    #[arg(long, global = true, default_value = "secrets.toml")]
    secrets: String,

    /// Directory for transient upload copies
    #[arg(long, global = true)]
    upload_dir: Option<String>,

    /// Use an in-process mock instead of the Gemini API
    #[arg(long, global = true)]
    mock_api: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ContainerConfig {
        secrets_path: PathBuf::from(expand_tilde(&cli.secrets)),
        upload_dir: cli
            .upload_dir
            .as_deref()
            .map(|dir| PathBuf::from(expand_tilde(dir)))
            .unwrap_or_else(ContainerConfig::default_upload_dir),
        mock_api: cli.mock_api,
    };
    let container = Arc::new(Container::new(config));

    match cli.command {
        Commands::Serve {
            port,
            public,
            max_upload_mb,
        } => {
            let ip = if public {
                IpAddr::V4(Ipv4Addr::UNSPECIFIED)
            } else {
                IpAddr::V4(Ipv4Addr::LOCALHOST)
            };
            serve(
                container,
                SocketAddr::new(ip, port),
                max_upload_mb.saturating_mul(1024 * 1024),
            )
            .await?;
        }

        Commands::Ask { path, prompt } => {
            let output = AskController::new(&container).ask(path, prompt).await?;
            println!("{}", output);
        }
    }

    Ok(())
}

fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            if path == "~" {
                return home.to_string_lossy().to_string();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn serve_defaults_to_local_port() {
        let cli = Cli::try_parse_from(["docchat", "serve"]).unwrap();
        match cli.command {
            Commands::Serve {
                port,
                public,
                max_upload_mb,
            } => {
                assert_eq!(port, 8501);
                assert!(!public);
                assert_eq!(max_upload_mb, 200);
            }
            _ => panic!("expected serve"),
        }
        assert_eq!(cli.secrets, "secrets.toml");
        assert!(!cli.mock_api);
    }

    #[test]
    fn ask_requires_path_and_prompt() {
        assert!(Cli::try_parse_from(["docchat", "ask", "report.pdf"]).is_err());
        let cli =
            Cli::try_parse_from(["docchat", "--mock-api", "ask", "report.pdf", "summarize"]).unwrap();
        assert!(cli.mock_api);
        assert!(matches!(cli.command, Commands::Ask { .. }));
    }
}
