use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use apiconsole_core::{ApiDoc, CatalogLimits, Console, Endpoint, OutcomeView, ParameterEntry, UreqTransport};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "apiconsole")]
#[command(about = "Try the paste service API from the command line")]
struct Cli {
    /// Base URL of the service.
    #[arg(long, env = "APICONSOLE_BASE_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// Service version shown in the catalog.
    #[arg(long, env = "APICONSOLE_SERVICE_VERSION", default_value = "dev")]
    service_version: String,

    /// Leave the healthcheck endpoint out of the catalog.
    #[arg(long)]
    no_healthcheck: bool,

    /// Log filter directive, e.g. `debug` or `apiconsole_core=debug`.
    #[arg(long, env = "APICONSOLE_LOG", default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List documented endpoints and their parameters
    Endpoints {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send one request to a documented endpoint
    Try {
        /// Endpoint id, e.g. `create-record`
        id: String,
        /// Parameter override as name=value; repeatable
        #[arg(short, long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let doc = ApiDoc::paste_service(
        &cli.base_url,
        &cli.service_version,
        &CatalogLimits::default(),
        !cli.no_healthcheck,
    );

    match cli.command {
        Commands::Endpoints { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print_catalog(&doc);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Try { id, params } => {
            let endpoint = doc
                .endpoint(&id)
                .ok_or_else(|| anyhow!("unknown endpoint {id:?}, see `apiconsole endpoints`"))?;
            let entries = entries_with_overrides(endpoint, &params)?;

            let mut console = Console::new(endpoint.endpoint_spec(&doc.base_url));
            let spec = console.endpoint();
            tracing::debug!(endpoint = %id, overrides = params.len(), "trying endpoint");
            eprintln!("Sending {} {}{} ...", spec.method, spec.base_url, spec.path_template);
            match console.try_it(&UreqTransport::new(), &entries) {
                OutcomeView::Success(text) => {
                    println!("{text}");
                    Ok(ExitCode::SUCCESS)
                }
                OutcomeView::Failure(message) => {
                    eprintln!("Error: {message}");
                    Ok(ExitCode::FAILURE)
                }
                OutcomeView::Pending => bail!("invocation finished without an outcome"),
            }
        }
    }
}

fn print_catalog(doc: &ApiDoc) {
    println!("{} ({})", doc.title, doc.base_url);
    for section in &doc.sections {
        println!();
        println!("{}: {}", section.name, section.description);
        for endpoint in &section.endpoints {
            println!("  {:<20} {:<7} {}", endpoint.id, endpoint.method.as_str(), endpoint.path);
            for p in &endpoint.parameters {
                let required = if p.required { " required" } else { "" };
                println!("      {:<20} default={:?}{required}", p.label(), p.default);
            }
        }
    }
}

/// Documented parameter rows with `name=value` overrides applied.
fn entries_with_overrides(endpoint: &Endpoint, overrides: &[String]) -> Result<Vec<ParameterEntry>> {
    let mut values: Vec<(String, String)> = endpoint
        .parameters
        .iter()
        .map(|p| (p.label(), p.default.clone()))
        .collect();

    for raw in overrides {
        let (name, value) = raw
            .split_once('=')
            .with_context(|| format!("parameter override {raw:?} is not NAME=VALUE"))?;
        let slot = endpoint
            .parameters
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| anyhow!("endpoint {} has no parameter {name:?}", endpoint.id))?;
        values[slot].1 = value.to_string();
    }

    Ok(values
        .iter()
        .map(|(label, value)| ParameterEntry::new(label, value))
        .collect())
}
