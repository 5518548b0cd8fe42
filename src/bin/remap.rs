//! Command-line interface for remappers
//!
//! Evaluates a remapper against a JSON document, validates a remapper, or
//! lists the available operators.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use remapper_engine::{
    ContextBuilder, DiagnosticFormatter, FastRandSource, FixedClock, Format, MessageCatalog,
    RemapperEngine, UserInfo,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Read};
use std::process;

#[derive(Parser)]
#[command(name = "remap")]
#[command(about = "Evaluate and validate JSON remappers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a remapper against a JSON input
    Evaluate {
        /// Remapper JSON, or @FILE to read it from a file
        remapper: String,
        /// JSON input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,
        /// JSON file describing the user
        #[arg(long)]
        user: Option<String>,
        /// JSON object file with app variables
        #[arg(long)]
        variables: Option<String>,
        /// JSON object file with container params
        #[arg(long)]
        params: Option<String>,
        /// JSON message catalogue file (locale -> id -> template)
        #[arg(long)]
        messages: Option<String>,
        /// Active locale
        #[arg(short, long)]
        locale: Option<String>,
        /// Seed for the random operators
        #[arg(long)]
        seed: Option<u64>,
        /// Fixed RFC 3339 instant for date.now
        #[arg(long)]
        now: Option<String>,
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Statically validate a remapper
    Validate {
        /// Remapper JSON, or @FILE to read it from a file
        remapper: String,
        /// Diagnostic output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the built-in operators
    Operators,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Compact,
    Json,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Format::Text,
            OutputFormat::Compact => Format::Compact,
            OutputFormat::Json => Format::Json,
        }
    }
}

fn main() {
    human_panic::setup_panic!();
    env_logger::init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Evaluate {
            remapper,
            input,
            user,
            variables,
            params,
            messages,
            locale,
            seed,
            now,
            pretty,
        } => {
            let files = ContextFiles {
                user,
                variables,
                params,
                messages,
            };
            context_builder(&files, locale, seed, now.as_deref()).and_then(|builder| {
                handle_evaluate(&remapper, input.as_deref(), &builder, pretty)
            })
        }
        Commands::Validate { remapper, format } => handle_validate(&remapper, format),
        Commands::Operators => {
            handle_operators();
            Ok(true)
        }
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            process::exit(1);
        }
    }
}

struct ContextFiles {
    user: Option<String>,
    variables: Option<String>,
    params: Option<String>,
    messages: Option<String>,
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading file '{path}'"))?;
    serde_json::from_str(&content).with_context(|| format!("parsing JSON in '{path}'"))
}

fn read_remapper(argument: &str) -> Result<Value> {
    match argument.strip_prefix('@') {
        Some(path) => read_json(path),
        None => serde_json::from_str(argument).context("parsing remapper JSON"),
    }
}

fn read_input(path: Option<&str>) -> Result<Value> {
    match path {
        Some(path) => read_json(path),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading input from stdin")?;
            if buffer.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&buffer).context("parsing input JSON from stdin")
        }
    }
}

fn context_builder(
    files: &ContextFiles,
    locale: Option<String>,
    seed: Option<u64>,
    now: Option<&str>,
) -> Result<ContextBuilder> {
    let mut builder = ContextBuilder::new();
    if let Some(path) = &files.user {
        builder = builder.with_user(read_json::<UserInfo>(path)?);
    }
    if let Some(path) = &files.variables {
        builder = builder.with_variables(read_json::<Map<String, Value>>(path)?);
    }
    if let Some(path) = &files.params {
        builder = builder.with_params(read_json::<Map<String, Value>>(path)?);
    }
    if let Some(path) = &files.messages {
        builder = builder.with_messages(read_json::<MessageCatalog>(path)?);
    }
    if let Some(locale) = locale {
        builder = builder.with_locale(locale);
    }
    if let Some(seed) = seed {
        builder = builder.with_random(FastRandSource::with_seed(seed));
    }
    if let Some(now) = now {
        let instant = DateTime::parse_from_rfc3339(now)
            .with_context(|| format!("'{now}' is not an RFC 3339 date-time"))?;
        builder = builder.with_clock(FixedClock::new(instant.with_timezone(&Utc)));
    }
    Ok(builder)
}

fn handle_evaluate(
    remapper: &str,
    input: Option<&str>,
    builder: &ContextBuilder,
    pretty: bool,
) -> Result<bool> {
    let remapper = read_remapper(remapper)?;
    let input = read_input(input)?;
    let engine = RemapperEngine::standard();

    let diagnostics = engine.validate(&remapper);
    if diagnostics.iter().any(|d| d.is_error()) {
        eprintln!("{}", DiagnosticFormatter::default().format_all(&diagnostics));
        bail!("remapper is invalid");
    }

    let result = engine.evaluate(&remapper, &input, builder)?;
    let output = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{output}");
    Ok(true)
}

fn handle_validate(remapper: &str, format: OutputFormat) -> Result<bool> {
    let remapper = read_remapper(remapper)?;
    let diagnostics = RemapperEngine::standard().validate(&remapper);
    let format = Format::from(format);

    if diagnostics.is_empty() {
        match format {
            Format::Json => println!("[]"),
            _ => println!("{} Remapper is valid", "✓".green()),
        }
        return Ok(true);
    }

    println!("{}", DiagnosticFormatter::new(format).format_all(&diagnostics));
    Ok(!diagnostics.iter().any(|d| d.is_error()))
}

fn handle_operators() {
    let engine = RemapperEngine::standard();
    for operator in engine.registry().operators() {
        println!(
            "{:<18} {:<20} {}",
            operator.name().bold(),
            operator.human_friendly_name(),
            operator.shape().to_string().dimmed()
        );
        if !operator.documentation().is_empty() {
            println!("{:<18} {}", "", operator.documentation());
        }
    }
}
