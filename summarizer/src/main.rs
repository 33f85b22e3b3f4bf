use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use summarizer_client::{parse_indices, ApiClient, Controller, Notice, SampleSource};
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod shell;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat { Text, Json, Jsonl }

#[derive(Debug, Parser)]
#[command(name = "summarizer", version, about = "Network host security summarizer: analysis service and client")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./summarizer.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Analysis service base URL (overrides config and SUMMARIZER_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// Run the analysis service
    #[cfg(feature = "serve")]
    Serve {
        /// Listen address, e.g. 0.0.0.0:8000
        #[arg(long)]
        bind: Option<String>,
        /// Use the rule engine even when an API key is configured
        #[arg(long, default_value_t = false)]
        mock: bool,
        /// Simulated processing time per host in mock mode (ms)
        #[arg(long)]
        mock_delay_ms: Option<u64>,
        /// Serve this file at /hosts_dataset.json instead of the bundled dataset
        #[arg(long, value_name = "FILE")]
        sample_file: Option<PathBuf>,
    },
    /// Query the analysis service health endpoint
    Health {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Load hosts, analyze them once and print the results
    Summarize {
        /// Sample dataset URL or path (default: the service's /hosts_dataset.json)
        #[arg(long, conflicts_with = "file")]
        sample: Option<String>,
        /// JSON file of hosts to upload instead of the sample dataset
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
        /// Content type of --file (default: derived from the extension)
        #[arg(long, requires = "file")]
        content_type: Option<String>,
        /// Host indices to analyze, e.g. 0,2-4 (default: all)
        #[arg(long)]
        select: Option<String>,
        /// Output format: text, json, or jsonl
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Also write results to this file (JSON document, or CSV with --csv)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Write CSV (one row per risk) when --out is provided
        #[arg(long, default_value_t = false, requires = "out")]
        csv: bool,
    },
    /// Interactive session: load, select, analyze, export
    Shell {
        /// Sample dataset URL or path (default: the service's /hosts_dataset.json)
        #[arg(long)]
        sample: Option<String>,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn controller(cfg: &config::Config, sample: Option<String>) -> Result<Controller> {
    let api = ApiClient::with_timeout(&cfg.api_url(), cfg.client_timeout())?;
    Ok(match sample.or_else(|| cfg.sample()) {
        Some(loc) => Controller::new(api, SampleSource::parse(&loc)),
        None => Controller::with_service_sample(api)?,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut cfg = config::load_config(cli.config.as_deref())?;
    cfg.apply_env(|k| std::env::var(k).ok().filter(|v| !v.is_empty()));
    if let Some(url) = cli.api_url.clone() {
        cfg.client.get_or_insert_with(Default::default).api_url = Some(url);
    }

    match cli.command {
        Commands::Version => {
            println!("summarizer {} (core {})", env!("CARGO_PKG_VERSION"), summarizer_core::version());
        }
        #[cfg(feature = "serve")]
        Commands::Serve { bind, mock, mock_delay_ms, sample_file } => {
            let mut svc = cfg.service_config()?;
            if let Some(b) = bind {
                svc.bind = b.parse().map_err(|e| anyhow::anyhow!("invalid --bind {b}: {e}"))?;
            }
            if mock { svc.ai.api_key = None; }
            if let Some(ms) = mock_delay_ms { svc.mock_delay = std::time::Duration::from_millis(ms); }
            if sample_file.is_some() { svc.sample_file = sample_file; }
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(summarize_service::serve(svc))?;
        }
        Commands::Health { format } => {
            let api = ApiClient::with_timeout(&cfg.api_url(), cfg.client_timeout())?;
            let rt = tokio::runtime::Runtime::new()?;
            let started = Instant::now();
            let health = rt.block_on(api.health())?;
            let duration_ms = started.elapsed().as_millis();
            match format {
                OutputFormat::Text => println!(
                    "{} ok={} mode={}{} ({} ms)",
                    api.base_url(),
                    health.ok,
                    health.mode,
                    health.model.as_deref().map(|m| format!(" model={m}")).unwrap_or_default(),
                    duration_ms
                ),
                OutputFormat::Json | OutputFormat::Jsonl => {
                    let obj = serde_json::json!({
                        "url": api.base_url().as_str(),
                        "ok": health.ok,
                        "mode": health.mode,
                        "model": health.model,
                        "duration_ms": duration_ms,
                    });
                    println!("{}", serde_json::to_string(&obj)?);
                }
            }
        }
        Commands::Summarize { sample, file, content_type, select, format, out, csv } => {
            let indices = select.as_deref().map(parse_indices).transpose()?;
            let mut c = controller(&cfg, sample)?;
            let rt = tokio::runtime::Runtime::new()?;
            let started = Instant::now();
            rt.block_on(async {
                match &file {
                    Some(path) => c.upload(path, content_type.as_deref()).await?,
                    None => c.load_sample().await?,
                };
                if let Some(idx) = &indices {
                    c.session_mut().select_only(idx)?;
                }
                c.analyze().await
            })?;
            let duration_ms = started.elapsed().as_millis();

            let session = c.session();
            let results = session.results();
            if let Some(path) = &out {
                render::export(path, results, csv)?;
            }
            match format {
                OutputFormat::Text => {
                    for s in results {
                        println!("{}", render::summary_text(s));
                    }
                    if let Some(Notice::Advisory(msg)) = session.notice() {
                        println!("{msg}");
                    }
                    println!(
                        "{} of {} hosts analyzed ({} ms)",
                        results.len(),
                        session.selection().len(),
                        duration_ms
                    );
                }
                OutputFormat::Json => println!("{}", render::json_document(results)?),
                OutputFormat::Jsonl => {
                    for s in results {
                        println!("{}", serde_json::to_string(s)?);
                    }
                }
            }
        }
        Commands::Shell { sample } => {
            let c = controller(&cfg, sample)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(shell::run(c))?;
        }
    }
    Ok(())
}
