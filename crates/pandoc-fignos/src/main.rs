//! pandoc-fignos - figure numbering filter for pandoc.
//!
//! Pandoc runs the filter as `pandoc-fignos FORMAT`, with the document as
//! JSON on stdin. The filtered document is written to stdout and warnings
//! go to stderr.

mod error;
mod output;

use std::io::{self, Read, Write};

use clap::Parser;
use fignos::{Diagnostic, Filter, OutputFormat, PandocVersion};
use fignos_ast::Pandoc;
use tracing_subscriber::EnvFilter;

use error::CliError;
use output::Output;

const PROGRAM: &str = "pandoc-fignos";

/// Number figures and resolve `@fig:` references in a pandoc document.
#[derive(Parser)]
#[command(name = "pandoc-fignos", version, about)]
struct Cli {
    /// Output format pandoc is writing (latex, html5, docx, ...).
    format: String,

    /// Version of the pandoc executable running the filter.
    #[arg(long = "pandocversion", value_name = "VERSION")]
    pandoc_version: Option<String>,
}

impl Cli {
    fn filter(&self) -> Result<Filter, CliError> {
        let filter = Filter::new(OutputFormat::from_name(&self.format));
        Ok(match &self.pandoc_version {
            Some(version) => filter.with_pandoc_version(PandocVersion::parse(version)?),
            None => filter,
        })
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // RUST_LOG or WARN; logs share stderr with the diagnostics
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let result = run(&cli, io::stdin().lock(), io::stdout().lock());
    match result {
        Ok(diagnostics) => {
            for diagnostic in &diagnostics {
                output.warning(&format!("{PROGRAM}: {diagnostic}"));
            }
        }
        Err(err) => {
            output.error(&format!("{PROGRAM}: Error: {err}"));
            std::process::exit(1);
        }
    }
}

/// Filter one JSON document from `input` to `output`.
fn run(
    cli: &Cli,
    mut input: impl Read,
    mut output: impl Write,
) -> Result<Vec<Diagnostic>, CliError> {
    let filter = cli.filter()?;

    let mut json = String::new();
    input.read_to_string(&mut json)?;
    let document: Pandoc = serde_json::from_str(&json)?;
    tracing::debug!(bytes = json.len(), options = ?filter.options(), "Read document");

    let result = filter.run(document)?;
    serde_json::to_writer(&mut output, &result.document)?;
    output.flush()?;

    Ok(result.diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once(PROGRAM).chain(args.iter().copied()))
            .expect("valid arguments")
    }

    fn filter_json(args: &[&str], input: &Value) -> (Value, Vec<Diagnostic>) {
        let mut out = Vec::new();
        let diagnostics = run(&cli(args), input.to_string().as_bytes(), &mut out).unwrap();
        (serde_json::from_slice(&out).unwrap(), diagnostics)
    }

    #[test]
    fn test_parses_format_and_version() {
        let cli = cli(&["--pandocversion", "1.15.2", "html5"]);
        let options = cli.filter().unwrap().options();
        assert_eq!(options.format, OutputFormat::Html);
        assert_eq!(options.version, PandocVersion::new(1, 15, 2));
    }

    #[test]
    fn test_version_defaults_to_modern() {
        let options = cli(&["latex"]).filter().unwrap().options();
        assert_eq!(options.version, PandocVersion::default());
    }

    #[test]
    fn test_invalid_version_is_an_error() {
        let err = cli(&["--pandocversion", "two", "latex"]).filter().unwrap_err();
        assert!(matches!(err, CliError::Filter(_)));
    }

    #[test]
    fn test_document_without_figures_passes_through() {
        let doc = json!({
            "pandoc-api-version": [1, 23, 1],
            "meta": {},
            "blocks": [{"t": "Para", "c": [{"t": "Str", "c": "Hello"}]}]
        });
        let (out, diagnostics) = filter_json(&["html"], &doc);
        assert_eq!(out, doc);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unresolved_reference_reported() {
        let doc = json!({
            "pandoc-api-version": [1, 23, 1],
            "meta": {},
            "blocks": [{"t": "Para", "c": [{"t": "Cite", "c": [
                [{
                    "citationId": "fig:missing",
                    "citationPrefix": [],
                    "citationSuffix": [],
                    "citationMode": {"t": "AuthorInText"},
                    "citationNoteNum": 1,
                    "citationHash": 0
                }],
                [{"t": "Str", "c": "@fig:missing"}]
            ]}]}]
        });
        let (_, diagnostics) = filter_json(&["html"], &doc);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnresolvedReference {
                label: "fig:missing".to_owned()
            }]
        );
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let mut out = Vec::new();
        let err = run(&cli(&["html"]), &b"{not json"[..], &mut out).unwrap_err();
        assert!(matches!(err, CliError::Json(_)));
        assert!(out.is_empty());
    }
}
