//! Command-line interface for choicescript
//! This binary inspects ChoiceScript scenes and projects: trees, tokens, diagnostics and symbols.
//!
//! Usage:
//!   choicescript parse `<file>` [--format `<treeviz|json>`]   - Parse one scene
//!   choicescript tokens `<file>`                             - Dump the scanner tokens
//!   choicescript check `<dir>` [--config `<file>`]           - Report diagnostics for a project
//!   choicescript symbols `<dir>` `<scene>`                   - List the symbols of a scene

use choicescript::choicescript::ast::Level;
use choicescript::choicescript::config::{Loader, Settings};
use choicescript::choicescript::formats::{to_json, to_treeviz_str};
use choicescript::choicescript::parsing::parse_scene;
use choicescript::choicescript::project::ProjectIndex;
use choicescript::choicescript::scanning::tokenize;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = Command::new("choicescript")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting ChoiceScript scenes")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log project indexing")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults")
                .global(true),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse one scene and print its tree")
                .arg(Arg::new("file").help("Scene file").required(true).index(1))
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["treeviz", "json"])
                        .default_value("treeviz"),
                ),
        )
        .subcommand(
            Command::new("tokens")
                .about("Dump the tokens of one scene as JSON")
                .arg(Arg::new("file").help("Scene file").required(true).index(1)),
        )
        .subcommand(
            Command::new("check")
                .about("Index a project directory and report diagnostics")
                .arg(Arg::new("dir").help("Project directory").required(true).index(1)),
        )
        .subcommand(
            Command::new("symbols")
                .about("List the symbols of a scene")
                .arg(Arg::new("dir").help("Project directory").required(true).index(1))
                .arg(Arg::new("scene").help("Scene name").required(true).index(2)),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"));
    let settings = load_settings(&matches);

    match matches.subcommand() {
        Some(("parse", sub)) => {
            let file = sub.get_one::<String>("file").expect("file is required");
            let format = sub.get_one::<String>("format").expect("format has a default");
            handle_parse_command(file, format, &settings);
        }
        Some(("tokens", sub)) => {
            let file = sub.get_one::<String>("file").expect("file is required");
            handle_tokens_command(file);
        }
        Some(("check", sub)) => {
            let dir = sub.get_one::<String>("dir").expect("dir is required");
            let failed = handle_check_command(dir, settings);
            if failed {
                std::process::exit(1);
            }
        }
        Some(("symbols", sub)) => {
            let dir = sub.get_one::<String>("dir").expect("dir is required");
            let scene = sub.get_one::<String>("scene").expect("scene is required");
            handle_symbols_command(dir, scene, settings);
        }
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(matches: &ArgMatches) -> Settings {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    loader.build().unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    })
}

fn read_scene(file: &str) -> String {
    std::fs::read_to_string(file).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", file, e);
        std::process::exit(1);
    })
}

fn load_project(dir: &str, settings: Settings) -> ProjectIndex {
    let mut index = ProjectIndex::with_settings(settings);
    if let Err(e) = index.load_dir(Path::new(dir)) {
        eprintln!("Failed to load project: {}", e);
        std::process::exit(1);
    }
    index
}

/// Handle the parse command
fn handle_parse_command(file: &str, format: &str, settings: &Settings) {
    let source = read_scene(file);
    let name = Path::new(file).file_stem().and_then(|stem| stem.to_str());
    let tree = parse_scene(&source, name, settings.parse_options());

    let formatted = match format {
        "json" => serde_json::to_string_pretty(&to_json(&tree)).unwrap_or_else(|e| {
            eprintln!("Error formatting tree: {}", e);
            std::process::exit(1);
        }),
        _ => to_treeviz_str(&tree),
    };
    print!("{}", formatted);
}

/// Handle the tokens command
fn handle_tokens_command(file: &str) {
    let source = read_scene(file);
    let tokens = tokenize(&source);
    let formatted = serde_json::to_string_pretty(&tokens).unwrap_or_else(|e| {
        eprintln!("Error formatting tokens: {}", e);
        std::process::exit(1);
    });
    println!("{}", formatted);
}

/// Handle the check command. Returns true when an error-level marker was found.
fn handle_check_command(dir: &str, settings: Settings) -> bool {
    let index = load_project(dir, settings);
    let mut failed = false;

    for scene in index.scenes() {
        let path = scene
            .uri()
            .to_file_path()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|_| scene.uri().to_string());
        for diagnostic in scene.diagnostics() {
            failed |= diagnostic.level == Level::Error;
            println!(
                "{}:{}:{} {} [{}] {}",
                path,
                diagnostic.start.line + 1,
                diagnostic.start.column + 1,
                diagnostic.level,
                diagnostic.code,
                diagnostic.message
            );
        }
    }

    for declared in index.scene_list_declared() {
        if index.scene(&declared).is_none() {
            eprintln!("scene_list names missing scene '{}'", declared);
        }
    }
    failed
}

/// Handle the symbols command
fn handle_symbols_command(dir: &str, scene: &str, settings: Settings) {
    let index = load_project(dir, settings);
    let Some(entry) = index.scene(scene) else {
        eprintln!("No scene named '{}'", scene);
        eprintln!("\nAvailable scenes:");
        for name in index.scene_list() {
            eprintln!("  {}", name);
        }
        std::process::exit(1);
    };

    let scopes = entry.scopes();
    for (scope, symbol) in scopes.all_symbols() {
        let kind = match symbol.declaration {
            Some(declaration) => format!("{:?}", declaration).to_lowercase(),
            None => format!("{:?}", symbol.reference_type).to_lowercase(),
        };
        let position = entry.document().position_at(symbol.offset);
        print!(
            "{} {:<7} {} : {} (line {})",
            scope,
            kind,
            symbol.name,
            symbol.value_type,
            position.line + 1
        );
        match &symbol.value {
            Some(value) => println!(" = {}", value),
            None => println!(),
        }
    }
}
