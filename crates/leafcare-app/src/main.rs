#![warn(missing_docs)]
//! # leafcare binary
//!
//! Terminal front-end: submit a leaf photo from a file or camera and print the
//! diagnosis, or print the diagnosis history.

mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use leafcare_app::logging::init_logging;
use leafcare_app::{AppConfig, AppError, DiagnosisSession, load_image_file};
use leafcare_capture::{CameraBackend, SyntheticCamera, UnavailableCamera};
use leafcare_ui::HistoryView;
use leafcare_upload::HttpTransport;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "leafcare", version = leafcare_app::APP_VERSION, about = "Leaf disease diagnosis client")]
struct Cli {
    /// Diagnosis service base URL (overrides LEAFCARE_BACKEND_URL).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Request timeout in seconds (overrides LEAFCARE_REQUEST_TIMEOUT_SECS).
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload an image file for diagnosis.
    Upload {
        /// Path to a JPEG, PNG, or other still image.
        path: PathBuf,
    },
    /// Capture one photo from the camera and upload it.
    Camera {
        /// Camera device index.
        #[arg(long, default_value_t = 0)]
        device: u32,
        /// Use a generated test pattern instead of a real device.
        #[arg(long)]
        synthetic: bool,
    },
    /// Print the diagnosis history.
    History,
}

/// CLI entry point.
fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        // Already shown on the status line.
        Err(AppError::Upload(_)) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{}", error.to_string().red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = AppConfig::with_overrides(cli.backend.as_deref(), cli.timeout_secs)?;
    info!(
        version = leafcare_app::app_version(),
        backend = %config.endpoints.base(),
        timeout_secs = config.request_timeout.as_secs(),
        "leafcare starting"
    );
    let transport = Arc::new(HttpTransport::new(config.request_timeout)?);

    let camera: Box<dyn CameraBackend> = match &cli.command {
        Command::Camera { device, synthetic } => camera_backend(*device, *synthetic),
        _ => Box::new(UnavailableCamera),
    };
    let mut session = DiagnosisSession::new(&config, transport, camera);

    match cli.command {
        Command::Upload { path } => {
            let image = load_image_file(&path)?;
            session.select_file(image);
            println!("{}", render::status(&session.ui().status));
            submit_and_print(&mut session)
        }
        Command::Camera { .. } => {
            if let Err(error) = session.start_camera() {
                if let Some(alert) = session.take_alert() {
                    eprintln!("{}", alert.yellow().bold());
                }
                return Err(error);
            }
            session.capture()?;
            println!("{}", render::status(&session.ui().status));
            let outcome = submit_and_print(&mut session);
            session.stop_camera();
            outcome
        }
        Command::History => {
            let view = session.load_history();
            println!("{}", render::history(view));
            if matches!(view, HistoryView::Error) {
                return Err(AppError::History("history could not be loaded".to_string()));
            }
            Ok(())
        }
    }
}

fn submit_and_print(session: &mut DiagnosisSession) -> Result<(), AppError> {
    let outcome = session.submit();
    println!("{}", render::status(&session.ui().status));
    if let Some(prediction) = &session.ui().prediction {
        println!("{}", render::prediction(prediction));
    }
    outcome.map(|_| ())
}

fn camera_backend(device: u32, synthetic: bool) -> Box<dyn CameraBackend> {
    if synthetic {
        return Box::new(SyntheticCamera::new(320, 240));
    }

    #[cfg(feature = "webcam")]
    {
        Box::new(leafcare_capture::NokhwaCamera::new(device))
    }

    #[cfg(not(feature = "webcam"))]
    {
        let _ = device;
        Box::new(UnavailableCamera)
    }
}
