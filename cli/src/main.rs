//! streamld: convert JSON-LD to N-Quads as the input streams in

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWriteExt, BufWriter};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use streamld::jsonld::{
    open_url, HttpLoader, JsonLdStreamParser, ParserOptions, ProcessingMode, RdfDirection,
};

#[derive(Parser)]
#[command(name = "streamld", version, about = "Streaming JSON-LD to N-Quads converter")]
struct Cli {
    /// Input file, URL, or `-` for stdin
    #[arg(default_value = "-")]
    input: String,

    /// Options file (YAML or JSON); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base IRI (defaults to the URL when reading from one)
    #[arg(long)]
    base: Option<String>,

    /// Initial context: a URL, a file, or inline JSON
    #[arg(long)]
    context: Option<String>,

    /// IRI of the graph receiving default-graph quads
    #[arg(long)]
    default_graph: Option<String>,

    /// Reject key orders that need lookahead
    #[arg(long)]
    streaming: bool,

    /// Accept @type after properties in streaming mode
    #[arg(long)]
    out_of_order_type: bool,

    /// Keep blank-node predicates
    #[arg(long)]
    generalized_rdf: bool,

    #[arg(long, value_enum)]
    rdf_direction: Option<DirectionArg>,

    #[arg(long, value_enum)]
    processing_mode: Option<ModeArg>,

    /// Fail on values that would otherwise be dropped
    #[arg(long)]
    strict_values: bool,

    /// Accept @list values of reverse properties
    #[arg(long)]
    allow_subject_list: bool,

    /// Disable embedded nodes and @annotation
    #[arg(long)]
    no_rdfstar: bool,

    /// Lower-case language tags
    #[arg(long)]
    normalize_language_tags: bool,

    /// Accept plain JSON from URLs without a context Link header
    #[arg(long)]
    ignore_missing_context_link: bool,

    /// Log verbosity when RUST_LOG is unset
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum DirectionArg {
    I18nDatatype,
    CompoundLiteral,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ModeArg {
    #[value(name = "1.0")]
    V10,
    #[value(name = "1.1")]
    V11,
}

fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn load_config(path: &PathBuf) -> Result<ParserOptions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let options = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text)?,
        _ => serde_yaml::from_str(&text)?,
    };
    Ok(options)
}

fn initial_context(arg: &str) -> Result<serde_json::Value> {
    if is_url(arg) {
        return Ok(serde_json::Value::String(arg.to_string()));
    }
    if arg.trim_start().starts_with(['{', '[']) {
        return serde_json::from_str(arg).context("parsing inline context");
    }
    let text = std::fs::read_to_string(arg).with_context(|| format!("reading context {}", arg))?;
    serde_json::from_str(&text).with_context(|| format!("parsing context {}", arg))
}

fn build_options(cli: &Cli) -> Result<ParserOptions> {
    let mut options = match &cli.config {
        Some(path) => load_config(path)?,
        None => ParserOptions::default(),
    };
    if let Some(base) = &cli.base {
        options.base_iri = Some(base.clone());
    }
    if let Some(context) = &cli.context {
        options.initial_context = Some(initial_context(context)?);
    }
    if let Some(graph) = &cli.default_graph {
        options.default_graph = Some(graph.clone());
    }
    if cli.streaming {
        options.streaming_profile = Some(true);
    }
    options.streaming_profile_allow_out_of_order_plain_type |= cli.out_of_order_type;
    options.produce_generalized_rdf |= cli.generalized_rdf;
    options.strict_values |= cli.strict_values;
    options.allow_subject_list |= cli.allow_subject_list;
    options.normalize_language_tags |= cli.normalize_language_tags;
    options.ignore_missing_context_link_header |= cli.ignore_missing_context_link;
    if cli.no_rdfstar {
        options.rdfstar = false;
    }
    match cli.rdf_direction {
        Some(DirectionArg::I18nDatatype) => options.rdf_direction = Some(RdfDirection::I18nDatatype),
        Some(DirectionArg::CompoundLiteral) => {
            options.rdf_direction = Some(RdfDirection::CompoundLiteral)
        }
        None => {}
    }
    match cli.processing_mode {
        Some(ModeArg::V10) => options.processing_mode = ProcessingMode::JsonLd10,
        Some(ModeArg::V11) => options.processing_mode = ProcessingMode::JsonLd11,
        None => {}
    }
    Ok(options)
}

async fn open_input(
    cli: &Cli,
    client: &reqwest::Client,
    options: ParserOptions,
) -> Result<(ParserOptions, Box<dyn AsyncRead + Unpin + Send>)> {
    if cli.input == "-" {
        return Ok((options, Box::new(tokio::io::stdin())));
    }
    if is_url(&cli.input) {
        let (mut derived, body) = open_url(client, &cli.input, &options).await?;
        // an explicit --base wins over the document URL
        if cli.base.is_some() {
            derived.base_iri = options.base_iri.clone();
        }
        return Ok((derived, Box::new(body)));
    }
    let file = tokio::fs::File::open(&cli.input)
        .await
        .with_context(|| format!("opening {}", cli.input))?;
    Ok((options, Box::new(file)))
}

async fn run(cli: Cli) -> Result<u64> {
    let options = build_options(&cli)?;
    let client = reqwest::Client::new();
    let (options, reader) = open_input(&cli, &client, options).await?;
    debug!(?options, "parser options");

    let parser = JsonLdStreamParser::new(options)
        .with_loader(Arc::new(HttpLoader::with_client(client)));
    let mut quads = parser.parse(reader);
    let mut out = BufWriter::new(tokio::io::stdout());
    let mut count = 0u64;
    while let Some(quad) = quads.next().await {
        let quad = quad?;
        out.write_all(format!("{}\n", quad).as_bytes()).await?;
        count += 1;
    }
    out.flush().await?;
    Ok(count)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(count) => info!(count, "done"),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "streamld",
            "doc.jsonld",
            "--streaming",
            "--rdf-direction",
            "compound-literal",
            "--processing-mode",
            "1.0",
            "--no-rdfstar",
            "--context",
            r#"{"@vocab": "http://schema.org/"}"#,
        ]);
        let options = build_options(&cli).unwrap();
        assert_eq!(options.streaming_profile, Some(true));
        assert_eq!(options.rdf_direction, Some(RdfDirection::CompoundLiteral));
        assert_eq!(options.processing_mode, ProcessingMode::JsonLd10);
        assert!(!options.rdfstar);
        assert_eq!(
            options.initial_context,
            Some(serde_json::json!({"@vocab": "http://schema.org/"}))
        );
    }

    #[test]
    fn test_url_context_is_kept_as_reference() {
        assert_eq!(
            initial_context("https://schema.org/").unwrap(),
            serde_json::Value::String("https://schema.org/".into())
        );
    }

    #[test]
    fn test_unknown_input_file() {
        let cli = Cli::parse_from(["streamld", "/nonexistent/doc.jsonld"]);
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(run(cli));
        assert!(result.is_err());
    }
}
