//! Minimal CLI: infer → (go | schema)
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::builder::RangedU64ValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use crate::codegen::DEFAULT_PACKAGE;
use crate::convert::{self, ConvertOptions, Outcome};
use crate::format::{Formatter, GoFmt, NoFormat, DEFAULT_GOFMT};
use crate::inference::{InferOptions, DEFAULT_MAX_DEPTH, MAX_DEPTH_CEILING};
use crate::ir::StructSchema;

static GO_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for",
    "func", "go", "goto", "if", "import", "interface", "map", "package", "range", "return", "select",
    "struct", "switch", "type", "var",
];

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer Go struct declarations from sample JSON documents
#[derive(Parser, Debug)]
#[command(name = "json2go")]
pub struct CommandLineInterface {
    /// more log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// infer and write one `<name>.go` file per input
    Go(GoOut),
    /// infer and print the typed schema as JSON (debug view)
    Schema(SchemaOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more `.json` inputs. May be literal paths or quoted glob patterns
    #[arg(num_args = 1.., required = true)]
    inputs: Vec<String>,

    /// run at most this many conversions at once (defaults to one per core)
    #[arg(long, short)]
    jobs: Option<usize>,
}

#[derive(Args, Debug, Clone)]
struct InferSettings {
    /// deepest nested object allowed (at most 126, the decoder's own nesting limit)
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_DEPTH,
        value_parser = RangedU64ValueParser::<usize>::new().range(0..=MAX_DEPTH_CEILING as u64),
    )]
    max_depth: usize,

    /// order fields by JSON key instead of document order
    #[arg(long, default_value_t = false)]
    sort_fields: bool,

    /// emit `interface{}` for null values instead of failing
    #[arg(long, default_value_t = false)]
    null_as_any: bool,
}

#[derive(clap::Parser, Debug)]
struct GoOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    infer_settings: InferSettings,

    /// directory for generated files
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// package clause of generated files
    #[arg(long, default_value = DEFAULT_PACKAGE)]
    package: String,

    /// skip the formatting pass
    #[arg(long)]
    no_fmt: bool,

    /// formatter program, invoked as `<program> -w <file>`
    #[arg(long, default_value = DEFAULT_GOFMT)]
    gofmt: String,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    infer_settings: InferSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn resolve(&self) -> anyhow::Result<Vec<PathBuf>> {
        resolve_file_path_patterns(&self.inputs).context("failed to resolve input file paths")
    }

    /// Run `work` in the global rayon pool, or a dedicated one when `--jobs` is set.
    fn install<R: Send>(&self, work: impl FnOnce() -> R + Send) -> anyhow::Result<R> {
        match self.jobs {
            None => Ok(work()),
            Some(0) => bail!("--jobs must be at least 1"),
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .context("failed to build worker pool")?;
                Ok(pool.install(work))
            }
        }
    }
}

impl InferSettings {
    fn options(&self) -> InferOptions {
        InferOptions {
            max_depth: self.max_depth,
            sort_fields: self.sort_fields,
            null_as_any: self.null_as_any,
        }
    }
}

impl GoOut {
    fn options(&self) -> anyhow::Result<ConvertOptions> {
        validate_package(&self.package)?;
        Ok(ConvertOptions {
            out_dir: self.out_dir.clone(),
            package: self.package.clone(),
            infer: self.infer_settings.options(),
        })
    }

    fn formatter(&self) -> Box<dyn Formatter> {
        if self.no_fmt {
            Box::new(NoFormat)
        } else {
            Box::new(GoFmt { program: self.gofmt.clone() })
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    /// Process exit status: 0 when every input succeeded, 1 otherwise.
    pub fn run(&self) -> anyhow::Result<i32> {
        match &self.cmd {
            Command::Go(target) => {
                let options = target.options()?;
                let inputs = target.input_settings.resolve()?;
                let formatter = target.formatter();
                let outcomes = target
                    .input_settings
                    .install(|| convert::convert_all(&inputs, &options, formatter.as_ref()))?;

                let mut failed = 0usize;
                for outcome in &outcomes {
                    match &outcome.result {
                        Ok(output) => eprintln!(
                            "{} {} → {}",
                            "converted".green().bold(),
                            outcome.input.display(),
                            output.display()
                        ),
                        Err(error) => {
                            failed += 1;
                            report_failure(&outcome.input, error);
                        }
                    }
                }
                Ok(exit_code(failed))
            }
            Command::Schema(target) => {
                let options = target.infer_settings.options();
                let inputs = target.input_settings.resolve()?;
                let outcomes = target
                    .input_settings
                    .install(|| convert::infer_all(&inputs, &options))?;

                for outcome in &outcomes {
                    if let Err(error) = &outcome.result {
                        report_failure(&outcome.input, error);
                    }
                }
                let report = schema_report(&outcomes)?;
                println!("{}", serde_json::to_string_pretty(&report)?);
                Ok(exit_code(outcomes.iter().filter(|o| o.result.is_err()).count()))
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn report_failure(input: &std::path::Path, error: &anyhow::Error) {
    eprintln!("{} {}: {error:#}", "error".red().bold(), input.display());
}

fn exit_code(failed: usize) -> i32 {
    if failed == 0 { 0 } else { 1 }
}

fn schema_report(outcomes: &[Outcome<StructSchema>]) -> anyhow::Result<Value> {
    let mut entries = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        let input = outcome.input.to_string_lossy();
        let entry = match &outcome.result {
            Ok(schema) => json!({ "input": input, "schema": serde_json::to_value(schema)? }),
            Err(error) => json!({ "input": input, "error": format!("{error:#}") }),
        };
        entries.push(entry);
    }
    Ok(Value::Array(entries))
}

fn validate_package(name: &str) -> anyhow::Result<()> {
    if !GO_IDENT.is_match(name) || GO_KEYWORDS.contains(&name) {
        bail!("invalid go package name: {name:?}");
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // explicit glob that matched nothing
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            // literal path, validated later per input
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
