use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use actor_pictures::{ActorId, ConfigEncoding, PreloadScope, StateId};
use picture_probe::{
    parse_id_list, run, CommandKind, CommonOptions, ResolveArgs, DEFAULT_FRAME_COUNT,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!(error = %message, "picture_probe_failed");
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

const DEFAULT_LOG_FILTER: &str = "info";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        print_usage();
        return Ok(());
    }

    let mut config_path: Option<PathBuf> = None;
    let mut options = CommonOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--config" => {
                let value = option_value(&args, index, "--config")?;
                config_path = Some(PathBuf::from(value));
                index += 2;
            }
            "--pictures-dir" => {
                let value = option_value(&args, index, "--pictures-dir")?;
                options.pictures_dir = Some(PathBuf::from(value));
                index += 2;
            }
            "--plugin-params" => {
                options.encoding = ConfigEncoding::PluginParameters;
                index += 1;
            }
            _ => break,
        }
    }
    options.config_path = config_path.ok_or_else(|| "missing --config <path>".to_string())?;

    let command = args
        .get(index)
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    let command_args = &args[(index + 1)..];

    let kind = match command {
        "check" => {
            if !command_args.is_empty() {
                return Err("check takes no arguments".to_string());
            }
            CommandKind::Check
        }
        "resolve" => CommandKind::Resolve(parse_resolve_args(command_args)?),
        "frames" => {
            let picture = command_args
                .first()
                .ok_or_else(|| "frames requires a picture name".to_string())?
                .clone();
            let mut frames = DEFAULT_FRAME_COUNT;
            let mut arg_index = 1usize;
            while arg_index < command_args.len() {
                match command_args[arg_index].as_str() {
                    "--count" => {
                        let value = option_value(command_args, arg_index, "--count")?;
                        frames = value.parse::<u64>().map_err(|_| {
                            format!("invalid --count value '{value}' (expected u64)")
                        })?;
                        arg_index += 2;
                    }
                    other => {
                        return Err(format!(
                            "unknown frames argument '{other}' (expected --count)"
                        ))
                    }
                }
            }
            CommandKind::Frames { picture, frames }
        }
        "preload" => {
            let mut scope = PreloadScope::All;
            let mut party = Vec::new();
            let mut arg_index = 0usize;
            while arg_index < command_args.len() {
                match command_args[arg_index].as_str() {
                    "--scope" => {
                        let value = option_value(command_args, arg_index, "--scope")?;
                        scope = value
                            .parse::<PreloadScope>()
                            .map_err(|error| error.to_string())?;
                        arg_index += 2;
                    }
                    "--party" => {
                        let value = option_value(command_args, arg_index, "--party")?;
                        party = parse_id_list(value)?.into_iter().map(ActorId).collect();
                        arg_index += 2;
                    }
                    other => {
                        return Err(format!(
                            "unknown preload argument '{other}' (expected --scope or --party)"
                        ))
                    }
                }
            }
            CommandKind::Preload { scope, party }
        }
        other => return Err(format!("unknown subcommand '{other}'")),
    };

    run(kind, options, &mut io::stdout())
}

fn parse_resolve_args(command_args: &[String]) -> Result<ResolveArgs, String> {
    let mut actor_id: Option<ActorId> = None;
    let mut resolve = ResolveArgs::new(ActorId(0));
    let mut index = 0usize;
    while index < command_args.len() {
        match command_args[index].as_str() {
            "--actor" => {
                let value = option_value(command_args, index, "--actor")?;
                actor_id = Some(ActorId(value.parse::<u32>().map_err(|_| {
                    format!("invalid --actor value '{value}' (expected u32)")
                })?));
                index += 2;
            }
            "--hp" => {
                let value = option_value(command_args, index, "--hp")?;
                let hp = value
                    .parse::<f32>()
                    .ok()
                    .filter(|hp| (0.0..=100.0).contains(hp))
                    .ok_or_else(|| format!("invalid --hp value '{value}' (expected 0-100)"))?;
                resolve.hp_percent = hp;
                index += 2;
            }
            "--states" => {
                let value = option_value(command_args, index, "--states")?;
                resolve.states = parse_id_list(value)?.into_iter().map(StateId).collect();
                index += 2;
            }
            "--costume" => {
                let value = option_value(command_args, index, "--costume")?;
                resolve.costume_index = value.parse::<usize>().map_err(|_| {
                    format!("invalid --costume value '{value}' (expected usize)")
                })?;
                index += 2;
            }
            "--width" => {
                let value = option_value(command_args, index, "--width")?;
                resolve.width = value
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --width value '{value}' (expected u32)"))?;
                index += 2;
            }
            "--height" => {
                let value = option_value(command_args, index, "--height")?;
                resolve.height = value
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --height value '{value}' (expected u32)"))?;
                index += 2;
            }
            "--align-center" => {
                resolve.alignment.center = true;
                index += 1;
            }
            "--offset-vertically" => {
                resolve.alignment.vertical_offset = true;
                index += 1;
            }
            other => return Err(format!("unknown resolve argument '{other}'")),
        }
    }
    resolve.actor_id = actor_id.ok_or_else(|| "resolve requires --actor <id>".to_string())?;
    Ok(resolve)
}

fn option_value<'a>(args: &'a [String], index: usize, flag: &str) -> Result<&'a str, String> {
    args.get(index + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("missing value for {flag}"))
}

fn print_usage() {
    println!("{}", usage_text());
}

fn usage_text() -> String {
    [
        "picture_probe - inspect actor picture configurations",
        "",
        "Usage:",
        "  picture_probe --config <path> [--plugin-params] [--pictures-dir <dir>] check",
        "  picture_probe --config <path> [--plugin-params] [--pictures-dir <dir>] resolve --actor <id> [--hp <0-100>] [--states <id,...>] [--costume <index>] [--width <px>] [--height <px>] [--align-center] [--offset-vertically]",
        "  picture_probe --config <path> [--plugin-params] frames <picture> [--count <frames>]",
        "  picture_probe --config <path> [--plugin-params] [--pictures-dir <dir>] preload [--scope all|party] [--party <id,...>]",
        "",
        "Defaults:",
        "  --hp 100",
        "  --costume 0",
        "  --count 350",
        "  --scope all",
    ]
    .join("\n")
}
