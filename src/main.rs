use clap::{Parser, Subcommand};
use geofoto::services::location_log;
use geofoto::{AppConfig, AppError, GeoFotoApp};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "geofoto", version, about = "Geotagged photo capture")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Take a photo and store it with the current location
    Capture,
    /// Print the stored photos, newest first
    List,
    /// Export all photo locations as photo_locations.txt
    Export,
    /// Rewrite the location log from the stored photo list
    RebuildLog,
}

fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("geofoto"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .init();
    }
}

// The sink reports write failures only through the log
fn export_summary(count: usize, target: &Path) -> String {
    format!("Handed {} entries to export ({})", count, target.display())
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let app = GeoFotoApp::from_config(&config).await?;

    match cli.command {
        Command::Capture => {
            let record = app.take_photo().await?;
            print!("{}", location_log::render_line(&record));
        }
        Command::List => {
            let photos = app.photos();
            if photos.is_empty() {
                println!("No photos yet");
            }
            for photo in photos.iter() {
                print!("{}", location_log::render_line(photo));
            }
        }
        Command::Export => {
            let count = app.export_locations();
            let target = config.export_dir.join(location_log::LOCATION_LOG_FILE);
            println!("{}", export_summary(count, &target));
        }
        Command::RebuildLog => {
            let count = app.rebuild_location_log().await?;
            println!("Rebuilt location log with {} entries", count);
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_fatal_to_capture() {
                log::error!("{}", e);
            } else {
                log::warn!("{}", e);
            }
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
