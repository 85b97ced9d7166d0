//! Minimal CLI: declarations → (function body | pass/fail over JSON documents)
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::Value;

use shape_verify::{Options, Verifier};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile structural type declarations into runtime validators
#[derive(Parser, Debug)]
#[command(name = "shape-verify", version, about)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the validator function body for a declaration
    Emit(EmitOut),
    /// validate JSON documents against a declaration
    Check(CheckIn),
}

#[derive(Args, Debug, Clone)]
struct ProjectSettings {
    /// declaration files to load: a path or a quoted glob pattern
    #[arg(long, default_value = "")]
    sources: String,

    /// project config file (defaults to ./shape-verify.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// source unit holding the declaration
    #[arg(long)]
    file: PathBuf,

    /// interface or type alias to validate against
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct EmitOut {
    #[command(flatten)]
    project: ProjectSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckIn {
    #[command(flatten)]
    project: ProjectSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// only print failing documents
    #[arg(long, short)]
    quiet: bool,
}

/// One document to validate. `None` when a JSON pointer selects nothing.
struct Document {
    label: String,
    value: Option<Value>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl ProjectSettings {
    fn verifier(&self) -> Result<Verifier> {
        let mut options = Options::new(self.sources.clone());
        if let Some(config) = &self.config {
            options = options.with_config_file(config);
        }
        Verifier::new(options).context("failed to load declarations")
    }
}

impl InputSettings {
    fn load(&self) -> Result<Vec<Document>> {
        let source_paths = shape_verify::project::resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut out = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read input file ({source_path_str})"))?;
            if self.ndjson {
                for (line_no, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let value = serde_json::from_str::<Value>(line).with_context(|| {
                        format!("failed to parse JSON ({source_path_str}:{})", line_no + 1)
                    })?;
                    out.push(self.select(format!("{source_path_str}:{}", line_no + 1), value));
                }
            } else {
                let value = serde_json::from_str::<Value>(&source)
                    .with_context(|| format!("failed to parse JSON input file ({source_path_str})"))?;
                out.push(self.select(source_path_str, value));
            }
        }
        Ok(out)
    }

    fn select(&self, label: String, value: Value) -> Document {
        let value = match self.json_pointer.as_deref() {
            None => Some(value),
            Some(pointer) => value.pointer(pointer).cloned(),
        };
        Document { label, value }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Returns whether everything that was checked passed.
    pub fn run(&self) -> Result<bool> {
        match &self.cmd {
            Command::Emit(target) => {
                let verifier = target.project.verifier()?;
                let body = verifier.run(&target.project.file, &target.project.name);
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("failed to create {}", parent.display()))?;
                    }
                    std::fs::write(out, &body)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                } else {
                    println!("{body}");
                }
                Ok(true)
            }
            Command::Check(target) => {
                let verifier = target.project.verifier()?;
                let validator = verifier.validator(&target.project.file, &target.project.name);
                if validator.is_permissive() {
                    tracing::warn!(
                        file = %target.project.file.display(),
                        name = %target.project.name,
                        "declaration not found; every document passes"
                    );
                }

                let documents = target.input_settings.load()?;
                let results: Vec<(&str, bool)> = documents
                    .par_iter()
                    .map(|doc| (doc.label.as_str(), validator.call_optional(doc.value.as_ref())))
                    .collect();

                let mut failed = 0usize;
                for (label, ok) in &results {
                    if *ok {
                        if !target.quiet {
                            println!("{} {label}", "✅ pass".green());
                        }
                    } else {
                        failed += 1;
                        println!("{} {label}", "❌ fail".red());
                    }
                }
                eprintln!("{} checked, {} failed", results.len(), failed);
                Ok(failed == 0)
            }
        }
    }
}
