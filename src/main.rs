use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use trackdeck_lib::settings::settings::DEFAULT_SETTINGS_FILE;
use trackdeck_lib::settings::AppSettings;

#[derive(Parser)]
#[command(name = "trackdeck", version, about = "Self-hosted music dashboard")]
struct Cli {
    /// Settings file (JSON); missing files fall back to defaults
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the library root and update the track cache
    Sync {
        #[arg(long)]
        library_root: Option<PathBuf>,
    },
    /// Serve the dashboard over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        library_root: Option<PathBuf>,
        /// Sync the library before accepting requests
        #[arg(long)]
        sync: bool,
    },
    /// Write the effective settings to the settings file
    Init {
        #[arg(long)]
        library_root: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    trackdeck_lib::init_tracing();

    let cli = Cli::parse();
    let mut settings = AppSettings::load(&cli.settings)?;

    match cli.command {
        Command::Sync { library_root } => {
            if let Some(root) = library_root {
                settings.library.root = root;
            }
            let settings_path = cli.settings.clone();
            let report = tokio::task::spawn_blocking(move || {
                trackdeck_lib::run_sync(&settings, &settings_path)
            })
            .await??;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Serve {
            host,
            port,
            library_root,
            sync,
        } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            if let Some(root) = library_root {
                settings.library.root = root;
            }
            trackdeck_lib::run_server(settings, &cli.settings, sync).await?;
        }
        Command::Init { library_root } => {
            if let Some(root) = library_root {
                settings.library.root = root;
            }
            settings.save(&cli.settings)?;
            info!(path = %cli.settings.display(), "settings written");
        }
    }

    Ok(())
}
