//! rulepy - Command Line Entry Point
//!
//! ```text
//! rulepy rules.txt                       Python to stdout
//! rulepy rules.txt -o rules.py           Python to a file
//! rulepy rules.txt --source-map map.json Also write the source map
//! rulepy - --json < rules.txt            Whole result as JSON
//! ```
//!
//! Exit status is 0 on success, 1 when any line failed to translate and
//! 2 when the input or output could not be handled at all.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use rulepy::{tracing_config, TranslationResult, Translator, TranslatorOptions};

mod ansi {
    pub const BOLD_RED: &str = "\x1b[1;31m";
    pub const BOLD_YELLOW: &str = "\x1b[1;33m";
    pub const RESET: &str = "\x1b[0m";
}

/// Translate business rules to Python
#[derive(Parser, Debug)]
#[command(name = "rulepy", version)]
struct Args {
    /// Business rules file, or `-` to read stdin
    input: String,

    /// Write the generated Python here instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Write the source map as JSON to this file
    #[arg(long)]
    source_map: Option<PathBuf>,

    /// Print the full translation result as JSON instead of the code
    #[arg(long)]
    json: bool,

    /// Translator options as a JSON object; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Drop comments instead of converting them to `#` comments
    #[arg(long)]
    no_comments: bool,

    /// Pass strict mode to method generators
    #[arg(long)]
    strict: bool,

    /// Maximum nesting of `if any` blocks
    #[arg(long)]
    max_depth: Option<usize>,
}

impl Args {
    fn translator_options(&self) -> Result<TranslatorOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
                TranslatorOptions::from_json(&text).with_context(|| format!("invalid options in {}", path.display()))?
            }
            None => TranslatorOptions::default(),
        };

        if self.no_comments {
            options.generate_comments = false;
        }
        if self.strict {
            options.strict_mode = true;
        }
        if let Some(depth) = self.max_depth {
            options.max_nesting_depth = depth;
        }
        // the map is only built when something will print it
        options.generate_source_map = self.json || self.source_map.is_some();
        Ok(options)
    }
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source).context("cannot read stdin")?;
        Ok(source)
    } else {
        fs::read_to_string(input).with_context(|| format!("cannot read {}", input))
    }
}

fn report(result: &TranslationResult) {
    for warning in &result.warnings {
        eprintln!("{}warning{}: {}", ansi::BOLD_YELLOW, ansi::RESET, warning);
    }
    for error in &result.errors {
        eprintln!("{}error{}: {}", ansi::BOLD_RED, ansi::RESET, error);
    }
}

fn run(args: &Args) -> Result<bool> {
    let translator = Translator::new(args.translator_options()?);
    let source = read_input(&args.input)?;
    let result = translator.translate(&source);
    report(&result);

    if let (Some(path), Some(map)) = (&args.source_map, &result.source_map) {
        let json = serde_json::to_string_pretty(map).context("cannot serialize source map")?;
        fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
    }

    let mut rendered = if args.json {
        serde_json::to_string_pretty(&result).context("cannot serialize result")?
    } else {
        result.python_code.clone()
    };
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }

    match &args.output {
        Some(path) => fs::write(path, rendered).with_context(|| format!("cannot write {}", path.display()))?,
        None => io::stdout().write_all(rendered.as_bytes()).context("cannot write stdout")?,
    }

    Ok(result.success)
}

fn main() -> ExitCode {
    tracing_config::init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("{}error{}: {:#}", ansi::BOLD_RED, ansi::RESET, err);
            ExitCode::from(2)
        }
    }
}
