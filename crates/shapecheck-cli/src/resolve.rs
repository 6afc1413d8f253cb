//! # Resolve Subcommand
//!
//! Prints the sub-schema a `$ref` string points to. Useful when a schema
//! fails to compile with an unresolved or cyclic reference.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use shapecheck_schema::resolve;

/// Arguments for the `shapecheck resolve` subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// JSON schema file containing the reference target.
    #[arg(long, value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Reference to resolve, e.g. `#/definitions/caseEntry`.
    #[arg(value_name = "REFERENCE")]
    pub reference: String,
}

/// Execute the resolve subcommand, writing to stdout.
pub fn run_resolve(args: &ResolveArgs) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_resolve_to(args, &mut out)
}

/// Execute the resolve subcommand, writing to `out`.
///
/// The schema is only parsed, not compiled, so a reference can be inspected
/// even when another part of the schema is broken.
pub fn run_resolve_to<W: Write>(args: &ResolveArgs, out: &mut W) -> Result<u8> {
    let content = std::fs::read_to_string(&args.schema)
        .with_context(|| format!("cannot read schema {}", args.schema.display()))?;
    let root: Value = serde_json::from_str(&content)
        .with_context(|| format!("schema {} is not valid JSON", args.schema.display()))?;

    let node = resolve(&root, &args.reference)?;
    tracing::debug!(reference = %args.reference, "resolved reference");
    writeln!(out, "{}", serde_json::to_string_pretty(node)?)?;
    Ok(0)
}
