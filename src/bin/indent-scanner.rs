//! Command-line interface for indent-scanner
//! Runs the reference host over a file to show the synthetic tokens the scanner produces, or the
//! scanner state it would checkpoint at a given offset.
//!
//! Usage:
//!   indent-scanner tokens `<path>` [--format `<format>`] [--grammar `<grammar>`] [--trace]
//!   indent-scanner state `<path>` [--offset `<offset>`]

use clap::{Arg, ArgAction, ArgMatches, Command};
use indent_config::{IndentConfig, Loader, OutputFormat};
use indent_scanner::host::{render_tokens, Host, Token};
use indent_scanner::settings::host_options;
use serde::Serialize;
use std::process;

fn main() {
    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .help("TOML file layered over the built-in defaults");
    let path_arg = Arg::new("path")
        .help("Path to the source file")
        .required(true)
        .index(1);
    let format_arg = Arg::new("format")
        .long("format")
        .short('f')
        .help("Output format")
        .value_parser(["text", "json", "yaml"]);

    let matches = Command::new("indent-scanner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect INDENT, DEDENT and NEWLINE tokenization of indentation-sensitive sources")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("tokens")
                .about("Print the token stream")
                .arg(path_arg.clone())
                .arg(config_arg.clone())
                .arg(format_arg.clone())
                .arg(
                    Arg::new("grammar")
                        .long("grammar")
                        .short('g')
                        .help("Valid-symbol policy the host applies")
                        .value_parser(["permissive", "colon-blocks"]),
                )
                .arg(
                    Arg::new("no-spans")
                        .long("no-spans")
                        .help("Omit byte ranges in text output")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("trace")
                        .long("trace")
                        .help("Print every scanner invocation to stderr")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("state")
                .about("Print the serialized scanner state at a byte offset")
                .arg(path_arg)
                .arg(config_arg)
                .arg(format_arg)
                .arg(
                    Arg::new("offset")
                        .long("offset")
                        .short('o')
                        .help("Byte offset to stop at (default: end of input)")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("tokens", tokens_matches)) => handle_tokens_command(tokens_matches),
        Some(("state", state_matches)) => handle_state_command(state_matches),
        _ => unreachable!(),
    }
}

fn load_config(matches: &ArgMatches, overrides: &[(&str, &str)]) -> IndentConfig {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    for (arg, key) in overrides {
        if let Some(value) = matches.get_one::<String>(arg) {
            loader = loader
                .set_override(key, value.as_str())
                .unwrap_or_else(|e| fail("Invalid option", e));
        }
    }
    loader
        .build()
        .unwrap_or_else(|e| fail("Error loading configuration", e))
}

fn read_source(matches: &ArgMatches) -> String {
    // clap enforces the argument
    let path = matches.get_one::<String>("path").unwrap();
    std::fs::read_to_string(path).unwrap_or_else(|e| fail("Error reading file", e))
}

fn fail(context: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", context, error);
    process::exit(1);
}

#[derive(Serialize)]
struct TokenRecord<'a> {
    token: &'a Token,
    start: usize,
    end: usize,
}

/// Handle the tokens command
fn handle_tokens_command(matches: &ArgMatches) {
    let config = load_config(
        matches,
        &[("format", "output.format"), ("grammar", "output.grammar")],
    );
    let source = read_source(matches);

    let mut options = host_options(&config);
    options.trace = matches.get_flag("trace");

    let host = Host::new(&source, options);
    let output = host.run().unwrap_or_else(|e| fail("Scan error", e));

    for record in &output.trace {
        eprintln!("{}", record);
    }

    let records: Vec<TokenRecord> = output
        .tokens
        .iter()
        .map(|(token, span)| TokenRecord {
            token,
            start: span.start,
            end: span.end,
        })
        .collect();

    let show_spans = config.output.show_spans && !matches.get_flag("no-spans");
    match config.output.format {
        OutputFormat::Text => print!("{}", render_tokens(&output.tokens, show_spans)),
        OutputFormat::Json => print_json(&records),
        OutputFormat::Yaml => print_yaml(&records),
    }
}

#[derive(Serialize)]
struct StateReport {
    offset: usize,
    bytes: String,
    indents: Vec<u16>,
    pending_dedents: u8,
}

/// Handle the state command
fn handle_state_command(matches: &ArgMatches) {
    let config = load_config(matches, &[("format", "output.format")]);
    let source = read_source(matches);
    let offset = matches
        .get_one::<usize>("offset")
        .copied()
        .unwrap_or(source.len());

    let mut host = Host::new(&source, host_options(&config));
    host.run_to(offset)
        .unwrap_or_else(|e| fail("Scan error", e));

    let state = host.scanner().state();
    let report = StateReport {
        offset: host.position(),
        bytes: state
            .serialize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" "),
        indents: state.indents().to_vec(),
        pending_dedents: state.pending_dedents(),
    };

    match config.output.format {
        OutputFormat::Text => {
            println!("offset: {}", report.offset);
            println!("bytes: {}", report.bytes);
            println!("indents: {:?}", report.indents);
            println!("pending_dedents: {}", report.pending_dedents);
        }
        OutputFormat::Json => print_json(&report),
        OutputFormat::Yaml => print_yaml(&report),
    }
}

fn print_json(value: &impl Serialize) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| fail("Serialization error", e));
    println!("{}", json);
}

fn print_yaml(value: &impl Serialize) {
    let yaml = serde_yaml::to_string(value).unwrap_or_else(|e| fail("Serialization error", e));
    print!("{}", yaml);
}
