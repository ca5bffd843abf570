//! `gallery` command-line tool

mod commands;
mod logging;

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

fn view_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("version")
            .long("version")
            .short('v')
            .help("Target version, or 'latest' (defaults to [gallery] target)"),
    )
    .arg(
        Arg::new("search")
            .long("search")
            .short('s')
            .default_value("")
            .help("Case-insensitive filter on display names"),
    )
    .arg(
        Arg::new("sort")
            .long("sort")
            .default_value("name-asc")
            .help("name-asc, name-desc, display-length-desc or version-desc"),
    )
    .arg(
        Arg::new("show-removed")
            .long("show-removed")
            .action(ArgAction::SetTrue)
            .help("Include items removed before the target version"),
    )
}

fn cli() -> Command {
    Command::new("gallery")
        .version(gallery_core::VERSION)
        .about("Versioned sprite gallery: browse, diff and export image releases")
        .disable_version_flag(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .global(true)
                .help("Base URL or directory to read releases from (overrides config)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand_required(true)
        .subcommand(Command::new("versions").about("List catalog versions"))
        .subcommand(
            view_args(Command::new("list").about("List items at a version")).arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Output as JSON"),
            ),
        )
        .subcommand(
            view_args(Command::new("export").about("Write a ZIP of items at a version"))
                .arg(
                    Arg::new("select")
                        .long("select")
                        .action(ArgAction::Append)
                        .help("Export only these filenames (repeatable)"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .default_value(".")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory to write the archive into"),
                ),
        )
        .subcommand(
            view_args(Command::new("download").about("Fetch one image as of its latest change"))
                .arg(Arg::new("name").required(true).help("Image filename"))
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .default_value(".")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory to write the image into"),
                ),
        )
        .subcommand(
            Command::new("manifest")
                .about("Generate a base manifest from an image directory")
                .arg(
                    Arg::new("dir")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory of .png images"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write to a file instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("diff")
                .about("Generate the changeset between two image directories")
                .arg(
                    Arg::new("old")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Previous release images"),
                )
                .arg(
                    Arg::new("new")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("New release images"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write to a file instead of stdout"),
                ),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    logging::init(matches.get_flag("log-json"))?;

    let config = commands::load_config(
        matches.get_one::<PathBuf>("config"),
        matches.get_one::<String>("source"),
    )?;

    match matches.subcommand() {
        Some(("versions", _)) => commands::versions(&config).await,
        Some(("list", args)) => commands::list(&config, args).await,
        Some(("export", args)) => commands::export(&config, args).await,
        Some(("download", args)) => commands::download(&config, args).await,
        Some(("manifest", args)) => commands::manifest(args).await,
        Some(("diff", args)) => commands::diff(args).await,
        _ => unreachable!("subcommand required"),
    }
}
