mod commands;

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use strata_types::ViewKind;

const USAGE: &str = "\
usage: strata [-v] [--db <path>] <command>

commands:
  list [--json]                          list stored projects
  new <name>                             create an empty project
  export <project> <view> [file]         write a view's main.caml
  import <project> <view> <file>         replace a view with a CAML file
  sweep <project>                        delete unreferenced assets
  preview <project> <view> [--seconds N] [--fps N]
                                         run the emitter preview headless

views: background, floating, wallpaper";

fn init_logging(verbose: bool) {
    use simplelog::*;

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("strata")
        .join("strata.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(file) => file,
        Err(_) => match File::create(std::env::temp_dir().join("strata.log")) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("strata: cannot create log file: {e}");
                return;
            }
        },
    };

    if WriteLogger::init(log_level, Config::default(), log_file).is_err() {
        eprintln!("strata: logger already initialized");
    }

    log::info!("strata starting (log level: {:?})", log_level);
}

/// Value following `flag`, removing both from `args`.
fn take_value(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let i = args.iter().position(|a| a == flag)?;
    if i + 1 >= args.len() {
        args.remove(i);
        return None;
    }
    let value = args.remove(i + 1);
    args.remove(i);
    Some(value)
}

fn take_flag(args: &mut Vec<String>, names: &[&str]) -> bool {
    let before = args.len();
    args.retain(|a| !names.contains(&a.as_str()));
    args.len() != before
}

fn parse_view(raw: &str) -> Result<ViewKind, String> {
    ViewKind::parse(&raw.to_ascii_lowercase()).ok_or_else(|| format!("unknown view {raw:?}"))
}

fn main() -> ExitCode {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = take_flag(&mut args, &["--verbose", "-v"]);
    init_logging(verbose);

    let db = take_value(&mut args, "--db").map(PathBuf::from);
    let json = take_flag(&mut args, &["--json"]);
    let seconds = take_value(&mut args, "--seconds").and_then(|s| s.parse::<f64>().ok());
    let fps = take_value(&mut args, "--fps").and_then(|s| s.parse::<u32>().ok());

    let command = match parse_command(&args, json, seconds, fps) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("strata: {message}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match commands::run(command, db) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("strata: {e}");
            ExitCode::FAILURE
        }
    }
}

fn parse_command(
    args: &[String],
    json: bool,
    seconds: Option<f64>,
    fps: Option<u32>,
) -> Result<commands::Command, String> {
    use commands::Command;

    let positional: Vec<&str> = args.iter().map(String::as_str).collect();
    match positional.as_slice() {
        ["list"] => Ok(Command::List { json }),
        ["new", name] => Ok(Command::New { name: name.to_string() }),
        ["export", project, view] => Ok(Command::Export {
            project: project.to_string(),
            view: parse_view(view)?,
            out: None,
        }),
        ["export", project, view, out] => Ok(Command::Export {
            project: project.to_string(),
            view: parse_view(view)?,
            out: Some(PathBuf::from(out)),
        }),
        ["import", project, view, file] => Ok(Command::Import {
            project: project.to_string(),
            view: parse_view(view)?,
            file: PathBuf::from(file),
        }),
        ["sweep", project] => Ok(Command::Sweep { project: project.to_string() }),
        ["preview", project, view] => Ok(Command::Preview {
            project: project.to_string(),
            view: parse_view(view)?,
            seconds: seconds.unwrap_or(3.0).max(0.0),
            fps: fps.unwrap_or(60).max(1),
        }),
        [] => Err("missing command".to_string()),
        [other, ..] => Err(format!("unknown or incomplete command {other:?}")),
    }
}
