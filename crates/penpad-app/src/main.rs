//! Penpad replay shell: runs a recorded input script through a drawing
//! session and exports the result.

mod error;
mod script;

use error::{AppError, AppResult};
use penpad_core::{PenpadConfig, Session, export};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

pub(crate) const USAGE: &str =
    "Usage: penpad <script.json> [--config <config.json>] [--svg <out.svg>] [--json <out.json>]";

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
struct Options {
    script: PathBuf,
    config: Option<PathBuf>,
    svg: Option<PathBuf>,
    json: Option<PathBuf>,
}

impl Options {
    /// Parse arguments (without the program name). `Ok(None)` means help was requested.
    fn parse(args: impl IntoIterator<Item = OsString>) -> AppResult<Option<Self>> {
        let mut script = None;
        let mut options = Options::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .map(PathBuf::from)
                    .ok_or_else(|| AppError::Usage(format!("Missing value for {}", flag)))
            };
            let text = arg.to_string_lossy().into_owned();
            match text.as_str() {
                "-h" | "--help" => return Ok(None),
                "--config" => options.config = Some(value("--config")?),
                "--svg" => options.svg = Some(value("--svg")?),
                "--json" => options.json = Some(value("--json")?),
                flag if flag.starts_with("--") => {
                    return Err(AppError::Usage(format!("Unknown option {}", flag)));
                }
                _ if script.is_none() => script = Some(PathBuf::from(arg)),
                _ => return Err(AppError::Usage(format!("Unexpected argument {}", text))),
            }
        }

        options.script = script.ok_or_else(|| AppError::Usage("Missing script path".to_string()))?;
        Ok(Some(options))
    }
}

fn read(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn run(options: &Options) -> AppResult<()> {
    let config = match &options.config {
        Some(path) => PenpadConfig::from_json(&read(path)?)?,
        None => PenpadConfig::default(),
    };
    let steps = script::parse(&read(&options.script)?)?;
    log::info!("Replaying {} steps from {}", steps.len(), options.script.display());

    let mut session = Session::new(config)?;
    let summary = script::replay(&mut session, &steps, Instant::now());
    let viewport = session.viewport();
    log::info!(
        "Replay done after {} steps: {} paths ({} committed, {} abandoned, {} suppressed), {} undone, {} redone",
        summary.steps,
        session.paths().len(),
        summary.committed,
        summary.abandoned,
        summary.suppressed,
        summary.undone,
        summary.redone
    );
    log::info!(
        "Viewport: scale {:.3}, translation ({:.1}, {:.1}), {} change events",
        viewport.scale,
        viewport.translation.x,
        viewport.translation.y,
        summary.viewport_events
    );

    if let Some(path) = &options.json {
        let json = export::paths_to_json(session.paths())?;
        fs::write(path, json).map_err(|source| AppError::Write {
            path: path.clone(),
            source,
        })?;
    }

    match &options.svg {
        Some(path) => export::write_svg(path, session.paths(), &session.config().export)?,
        None => print!("{}", session.export_svg()),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let options = match Options::parse(std::env::args_os().skip(1)) {
        Ok(Some(options)) => options,
        Ok(None) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("penpad: {}", e);
            return ExitCode::from(2);
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("penpad: {}", e);
            ExitCode::FAILURE
        }
    }
}
