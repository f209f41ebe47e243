use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docadmin_schema::{
    flatten, parse_schema, present, render_fields, Document, FlatForm, FormExpander, SchemaVersion,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "docadmin", version, about = "Schema-driven document field transformations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render the editable fields a schema produces for a document
    Fields {
        /// Schema text file
        #[arg(long)]
        schema: PathBuf,
        /// JSON document; omit to render a new record
        #[arg(long)]
        document: Option<PathBuf>,
        /// Schema grammar version (v1, v2, v3)
        #[arg(long, default_value = "v3")]
        version: SchemaVersion,
    },
    /// Expand a flat JSON form into a nested document
    Expand {
        /// JSON object of dotted field names to string values
        #[arg(long)]
        form: PathBuf,
        /// Prior stored document, for clearing semantics
        #[arg(long)]
        prior: Option<PathBuf>,
    },
    /// Present a document's top-level fields without a schema
    Present {
        #[arg(long)]
        document: PathBuf,
    },
    /// Flatten a nested document into dotted field names
    Flatten {
        #[arg(long)]
        document: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = run(cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run(command: Command) -> Result<Value> {
    match command {
        Command::Fields {
            schema,
            document,
            version,
        } => {
            let schema = read_text(&schema)?;
            let document = document.map(|path| read_document(&path)).transpose()?;
            fields(&schema, document.as_ref(), version)
        }
        Command::Expand { form, prior } => {
            let form: FlatForm = serde_json::from_str(&read_text(&form)?)
                .context("form must be a JSON object of strings")?;
            let prior = prior.map(|path| read_document(&path)).transpose()?;
            expand(&form, prior.as_ref())
        }
        Command::Present { document } => {
            let document = read_document(&document)?;
            Ok(serde_json::to_value(present(&document))?)
        }
        Command::Flatten { document } => {
            let document = read_document(&document)?;
            Ok(serde_json::to_value(flatten(&document)?)?)
        }
    }
}

fn fields(schema: &str, document: Option<&Document>, version: SchemaVersion) -> Result<Value> {
    let fields = parse_schema(schema, version)?;
    tracing::debug!(count = fields.len(), %version, "parsed schema");
    Ok(serde_json::to_value(render_fields(&fields, version, document))?)
}

fn expand(form: &FlatForm, prior: Option<&Document>) -> Result<Value> {
    let document = FormExpander::default().expand(form, prior)?;
    tracing::debug!(fields = form.len(), keys = document.len(), "expanded form");
    Ok(Value::Object(document))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn read_document(path: &Path) -> Result<Document> {
    serde_json::from_str(&read_text(path)?)
        .with_context(|| format!("{} is not a JSON object", path.display()))
}
