//! geomeasure - Unit expression parser and formatter
//!
//! Usage:
//!   geomeasure "m/s"                     # Canonical form of one expression
//!   geomeasure -d wkt -o esri "metre"    # Translate between dialects
//!   geomeasure "km/h" --value 90 --to "m/s"
//!   echo "kg·m/s²" | geomeasure          # Pipe mode
//!   geomeasure -f units.txt --json       # File mode, JSON lines
//!   geomeasure -i                        # Interactive REPL

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use geomeasure_core::{Dialect, Unit, UnitDefinitions, UnitFormat};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "geomeasure")]
#[command(about = "Parse and format physical unit expressions", long_about = None)]
struct Args {
    /// Unit expression to parse
    expression: Option<String>,

    /// Read expressions from file, one per line
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Interactive REPL mode
    #[arg(short, long)]
    interactive: bool,

    /// Dialect used to parse input
    #[arg(short, long, default_value = "default")]
    dialect: Dialect,

    /// Dialect used to format output (defaults to the input dialect)
    #[arg(short, long)]
    output: Option<Dialect>,

    /// Value to convert from the parsed unit
    #[arg(long, requires = "to")]
    value: Option<f64>,

    /// Target unit for --value
    #[arg(long, requires = "value")]
    to: Option<String>,

    /// Custom unit definitions (defaults to units.json in the config directory)
    #[arg(long, value_name = "FILE")]
    defs: Option<PathBuf>,

    /// Print one JSON object per expression
    #[arg(long)]
    json: bool,

    /// Show only the formatted unit (no input echo)
    #[arg(short, long)]
    quiet: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Result of processing one expression
#[derive(Debug, Clone, PartialEq, Serialize)]
struct Report {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Report {
    fn failed(input: &str, error: impl ToString) -> Self {
        Self {
            input: input.to_string(),
            unit: None,
            dimension: None,
            value: None,
            error: Some(error.to_string()),
        }
    }

    fn render(&self, json: bool, quiet: bool) -> Result<String> {
        if json {
            return Ok(serde_json::to_string(self)?);
        }
        let result = match (&self.error, &self.unit, self.value) {
            (Some(error), _, _) => format!("error: {error}"),
            (None, Some(unit), Some(value)) => format!("{value} {unit}"),
            (None, Some(unit), None) => unit.clone(),
            (None, None, _) => String::new(),
        };
        if quiet {
            return Ok(result);
        }
        // Pad input to align results
        let padding = 30usize.saturating_sub(self.input.chars().count());
        Ok(format!("{}{:>width$} = {}", self.input, "", result, width = padding))
    }
}

/// Parses with one dialect and formats with another
struct Session {
    input: Arc<UnitFormat>,
    output: Arc<UnitFormat>,
    target: Option<(f64, Unit)>,
}

impl Session {
    fn new(args: &Args) -> Result<Self> {
        let input = Arc::new(UnitFormat::new(args.dialect));
        load_definitions(&input, args.defs.as_ref())?;
        let output = match args.output {
            Some(dialect) if dialect != args.dialect => Arc::new(UnitFormat::new(dialect)),
            _ => input.clone(),
        };
        let target = match (args.value, &args.to) {
            (Some(value), Some(to)) => {
                let unit = input
                    .parse(to)
                    .with_context(|| format!("Invalid target unit '{to}'"))?;
                Some((value, unit))
            }
            _ => None,
        };
        Ok(Self {
            input,
            output,
            target,
        })
    }

    fn process(&self, line: &str) -> Option<Report> {
        let input = line.trim();
        if input.is_empty() || input.starts_with('#') {
            return None;
        }
        let unit = match self.input.parse(input) {
            Ok(unit) => unit,
            Err(e) => return Some(Report::failed(input, e)),
        };
        let (formatted, value) = match &self.target {
            Some((value, target)) => match unit.convert_to(*value, target) {
                Some(converted) => (self.output.format(target), Some(converted)),
                None => {
                    let error = format!(
                        "cannot convert {} to {}",
                        self.output.format(&unit),
                        self.output.format(target)
                    );
                    return Some(Report::failed(input, error));
                }
            },
            None => (self.output.format(&unit), None),
        };
        let dimension = unit.dimension();
        Some(Report {
            input: input.to_string(),
            unit: Some(formatted),
            dimension: (!dimension.is_none()).then(|| dimension.to_string()),
            value,
            error: None,
        })
    }
}

/// Applies custom definitions from `path`, or from the default location when
/// that file exists
fn load_definitions(format: &UnitFormat, path: Option<&PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path.clone(),
        None => match UnitDefinitions::default_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(()),
        },
    };
    let defs = UnitDefinitions::load(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let applied = defs.apply(format);
    tracing::info!(path = %path.display(), applied, "loaded custom units");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let session = Session::new(&args)?;

    if let Some(expr) = &args.expression {
        // Single expression mode
        print_line(&session, expr, &args)?;
    } else if let Some(path) = &args.file {
        // File mode
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        for line in content.lines() {
            print_line(&session, line, &args)?;
        }
    } else if args.interactive {
        run_repl(&session, &args)?;
    } else if !io::stdin().is_terminal() {
        // Pipe mode
        for line in io::stdin().lock().lines() {
            print_line(&session, &line?, &args)?;
        }
    } else {
        bail!("no input: pass an expression, -f <FILE>, -i, or pipe expressions on stdin");
    }

    Ok(())
}

fn print_line(session: &Session, line: &str, args: &Args) -> Result<()> {
    if let Some(report) = session.process(line) {
        println!("{}", report.render(args.json, args.quiet)?);
    }
    Ok(())
}

fn run_repl(session: &Session, args: &Args) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("geomeasure - {} dialect", session.input.dialect());
    println!("Type unit expressions to format them. Press Ctrl+D to exit.\n");

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            println!();
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.to_lowercase().as_str() {
            "quit" | "exit" => break,
            "help" => {
                print_help();
                continue;
            }
            "labels" => {
                for (name, unit) in session.input.registry().labels() {
                    println!("{name:<20} {}", unit.dimension());
                }
                continue;
            }
            _ => {}
        }

        print_line(session, line, args)?;
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"
Commands:
  help     Show this help
  labels   List every labelled unit in the current dialect
  quit     Exit the REPL

Examples:
  km/h                 Registered label
  m·s⁻¹                Unicode product
  kg*m/s^2             ASCII product
  m^2:3                Power and root
  m*0.3048             Scaled unit
  degree minute second Multi-word alias
"#
    );
}
