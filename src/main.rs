//! # certkit CLI
//!
//! ```bash
//! # Design-time preview with placeholders
//! certkit render --template template.json --preview
//!
//! # Final render for one student, saving the verification QR
//! certkit render --template template.json --instance student.json --qr-out qr.png
//!
//! # Validate and normalize a stored template
//! certkit check --template template.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use certkit::{
    exporter, load_editor_config, logging, read_template, render, CertificateInstance, RenderMode,
    RenderOptions, Template,
};

/// certkit - certificate template renderer
#[derive(Parser, Debug)]
#[command(name = "certkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bind a template to an instance and print the rendered layers as JSON
    Render {
        /// Persisted template JSON
        #[arg(long, value_name = "FILE")]
        template: PathBuf,

        /// Certificate instance JSON (studentName, courseName, issueDate, certificateId)
        #[arg(long, value_name = "FILE")]
        instance: Option<PathBuf>,

        /// Show placeholders for missing fields instead of failing
        #[arg(long)]
        preview: bool,

        /// Write the QR layer as a PNG
        #[arg(long, value_name = "FILE")]
        qr_out: Option<PathBuf>,

        /// Side length of the QR PNG in pixels
        #[arg(long, default_value = "300")]
        qr_size: u32,

        /// Override the configured verification base URL
        #[arg(long)]
        verify_base_url: Option<String>,
    },
    /// Validate a template and print its normalized JSON
    Check {
        #[arg(long, value_name = "FILE")]
        template: PathBuf,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            template,
            instance,
            preview,
            qr_out,
            qr_size,
            verify_base_url,
        } => {
            let config = load_editor_config();
            let mut options = RenderOptions::from(&config);
            if let Some(base) = verify_base_url {
                options.verify_base_url = base;
            }

            let template = load_template(&template)?;
            let instance = instance
                .map(|path| -> Result<CertificateInstance> {
                    serde_json::from_str(&read(&path)?)
                        .with_context(|| format!("invalid instance {}", path.display()))
                })
                .transpose()?;
            let mode = if preview {
                RenderMode::Preview
            } else {
                RenderMode::Final
            };

            let rendered = render(&template, instance.as_ref(), mode, &options)?;
            println!("{}", serde_json::to_string_pretty(&rendered)?);

            if let Some(path) = qr_out {
                let modules = rendered
                    .qr_modules()
                    .context("template has no resolved QR code to write")?;
                modules
                    .to_image(qr_size)
                    .save(&path)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!(path = %path.display(), "QR code written");
            }
        }
        Commands::Check { template } => {
            let template = load_template(&template)?;
            if template.is_draft() {
                tracing::warn!("template is a draft: no background image");
            }
            tracing::info!(elements = template.len(), "template is valid");
            println!("{}", exporter::to_json(&template)?);
        }
    }
    Ok(())
}

fn load_template(path: &Path) -> Result<Template> {
    read_template(path).with_context(|| format!("invalid template {}", path.display()))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
