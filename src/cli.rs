//! Minimal CLI: component schema → (template | description)
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use log::{info, LevelFilter};

use cabdoc::catalog::Component;
use cabdoc::{render_template, Describe, TemplateOptions};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// write a documented JSON template for hardware component metadata
#[derive(Parser, Debug)]
#[command(version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the placeholder JSON template with field documentation
    Template(TemplateOut),
    /// print the registered type description as JSON
    Describe(DescribeOut),
}

#[derive(Args, Debug, Clone)]
struct OutputSettings {
    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TemplateOut {
    #[command(flatten)]
    output: OutputSettings,

    /// spaces per nesting level
    #[arg(long, default_value_t = 2)]
    indent: usize,
}

#[derive(Args, Debug)]
struct DescribeOut {
    #[command(flatten)]
    output: OutputSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl OutputSettings {
    fn emit(&self, text: &str) -> anyhow::Result<()> {
        match self.out.as_ref() {
            Some(out) => {
                write_file(out, text)?;
                info!("wrote {}", out.display());
            }
            None => println!("{text}"),
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn log_level_filter(&self) -> LevelFilter {
        self.verbose.log_level_filter()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Template(target) => {
                let options = TemplateOptions { indent_width: target.indent };
                let template = render_template(&Component::describe(), &options)
                    .context("failed to render the component template")?;
                target.output.emit(&template)
            }
            Command::Describe(target) => {
                let description = serde_json::to_string_pretty(&Component::describe())
                    .context("failed to serialize the component description")?;
                target.output.emit(&description)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_file(out: &Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))
}
