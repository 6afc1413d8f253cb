//! # Validate Subcommand
//!
//! Validates one or more document files against a schema and prints every
//! diagnostic, either as indented `<path>: <message>` lines or as a JSON
//! report.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use shapecheck_schema::{Diagnostic, PayloadFormat, Schema, ValidatorConfig, Validator};

use crate::display_path;

/// Arguments for the `shapecheck validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// JSON schema file to validate against.
    #[arg(long, value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// YAML configuration file (uniqueness rules).
    #[arg(long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Payload format (json or yaml). Inferred from each file's extension when omitted.
    #[arg(long)]
    pub format: Option<PayloadFormat>,

    /// Print a JSON report instead of text.
    #[arg(long)]
    pub json: bool,

    /// Documents to validate.
    #[arg(value_name = "DOCUMENT", required = true)]
    pub documents: Vec<PathBuf>,
}

/// One document's entry in the JSON report.
#[derive(Debug, Serialize)]
struct DocumentReport<'a> {
    document: String,
    format: PayloadFormat,
    valid: bool,
    diagnostics: &'a [Diagnostic],
}

/// Execute the validate subcommand, writing to stdout.
///
/// Returns exit code: 0 if every document is valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_validate_to(args, &mut out)
}

/// Execute the validate subcommand, writing to `out`.
pub fn run_validate_to<W: Write>(args: &ValidateArgs, out: &mut W) -> Result<u8> {
    let schema = Schema::from_file(&args.schema)
        .with_context(|| format!("failed to load schema {}", args.schema.display()))?;
    let config = match &args.config {
        Some(path) => ValidatorConfig::from_file(path).context("failed to load validator config")?,
        None => ValidatorConfig::default(),
    };

    let validator = Validator::new(schema, config);
    tracing::info!(
        schema = %args.schema.display(),
        nodes = validator.schema().node_count(),
        rules = validator.config().uniqueness.len(),
        "loaded schema"
    );

    let mut results = Vec::with_capacity(args.documents.len());
    for document in &args.documents {
        let format = args
            .format
            .unwrap_or_else(|| PayloadFormat::from_path(document));
        let result = validator
            .validate_file_as(document, format)
            .with_context(|| format!("failed to validate {}", document.display()))?;
        tracing::info!(
            document = %document.display(),
            valid = result.is_valid(),
            diagnostics = result.diagnostics().len(),
            "validated document"
        );
        results.push((document, format, result));
    }

    if args.json {
        let report: Vec<DocumentReport<'_>> = results
            .iter()
            .map(|(document, format, result)| DocumentReport {
                document: document.display().to_string(),
                format: *format,
                valid: result.is_valid(),
                diagnostics: result.diagnostics(),
            })
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        for (document, _, result) in &results {
            if result.is_valid() {
                writeln!(out, "{}: OK", document.display())?;
                continue;
            }
            writeln!(
                out,
                "{}: {} problem(s)",
                document.display(),
                result.diagnostics().len()
            )?;
            for diagnostic in result.diagnostics() {
                writeln!(
                    out,
                    "  {}: {}",
                    display_path(diagnostic.path()),
                    diagnostic.message()
                )?;
            }
        }
    }

    let failed = results.iter().filter(|(_, _, r)| !r.is_valid()).count();
    if failed > 0 {
        tracing::warn!(failed, total = results.len(), "documents failed validation");
        Ok(1)
    } else {
        Ok(0)
    }
}
