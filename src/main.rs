use clap::Parser;
use lantern::core::config::{self, CliOverrides, LanternConfig};
use lantern::{Backend, tui};
use log::{info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "lantern", about = "Terminal home screen for a Helix server")]
struct Args {
    /// Server backend to use (defaults to config, then helix)
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    /// Helix server URL
    #[arg(short, long)]
    url: Option<String>,

    /// Model preselected in the prompt form
    #[arg(short, long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // File logger: the terminal belongs to the UI
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("lantern.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        warn!("Ignoring config file: {}", e);
        LanternConfig::default()
    });
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            backend: args.backend,
            url: args.url.as_deref(),
            model: args.model.as_deref(),
        },
    );

    info!(
        "Lantern starting up (backend={}, server={})",
        resolved.backend.as_str(), resolved.server_url
    );

    tui::run(resolved)
}
