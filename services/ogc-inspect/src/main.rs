//! Command line inspector for OGC map service layers.
//!
//! Loads WFS features through the cached client, classifies them with a
//! remote or default legend, builds default legends for a whole layer, runs
//! WMS point queries and decodes exception reports.

mod report;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ogc_client::{ClientConfig, Session};
use ogc_common::{default_legends, LayerSource, PropertyAllowList};
use ogc_protocol::decode_exception_report;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ogc-inspect")]
#[command(about = "Inspect OGC WFS/WMS layers, legends and feature info", long_about = None)]
struct Cli {
    /// YAML client configuration (defaults and OGC_* variables otherwise)
    #[arg(long, env = "OGC_CONFIG")]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load features and show their classification
    Features {
        /// WFS endpoint
        #[arg(short, long)]
        url: String,

        /// Feature type name
        #[arg(short, long)]
        layer: String,

        /// Property to classify by
        #[arg(short, long)]
        property: Option<String>,

        /// Legend descriptor URL; a default legend is built otherwise
        #[arg(long)]
        legends: Option<String>,

        /// Extra query parameter, as key=value (repeatable)
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Print cache statistics afterwards
        #[arg(long)]
        stats: bool,
    },

    /// List the property names of the first feature
    Properties {
        /// WFS endpoint
        #[arg(short, long)]
        url: String,

        /// Feature type name
        #[arg(short, long)]
        layer: String,
    },

    /// Show the legends of a legend descriptor
    Legends {
        /// Legend descriptor URL
        #[arg(short, long)]
        url: String,
    },

    /// Build default legends for every property of a layer
    DefaultLegends {
        /// WFS endpoint
        #[arg(short, long)]
        url: String,

        /// Feature type name
        #[arg(short, long)]
        layer: String,
    },

    /// Run a GetFeatureInfo point query
    FeatureInfo {
        /// WMS endpoint
        #[arg(short, long)]
        url: String,

        /// Layer name
        #[arg(short, long)]
        layer: String,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Comma separated properties to show
        #[arg(long)]
        properties: Option<String>,

        /// Label shown instead of the layer name
        #[arg(long)]
        title: Option<String>,
    },

    /// Decode a ServiceExceptionReport file ("-" reads stdin)
    DecodeException {
        file: PathBuf,
    },
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if cli.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ClientConfig::from_env(),
    };
    config.validate().context("Invalid client configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli);

    let config = load_config(cli.config.as_ref())?;
    info!(namespace = %config.cache_namespace, "Starting ogc-inspect");

    match cli.command {
        Commands::Features {
            url,
            layer,
            property,
            legends,
            params,
            stats,
        } => {
            let session = Session::connect(config)?;
            let mut filterable = session.layer(LayerSource::wfs(url, layer));

            if let Some(legend_url) = legends {
                let catalog = session.legend_catalog();
                catalog
                    .load_legends(&legend_url)
                    .await
                    .with_context(|| format!("Failed to load legends from {}", legend_url))?;
                filterable = filterable.with_legends(catalog);
            }
            let filterable = filterable.with_default_legends();

            let count = filterable.load(&params).await.context("Failed to load features")?;
            println!("Loaded {} features", count);

            let styles = filterable.set_active_property(property.as_deref());
            println!("{}", report::styles_table(&styles, &filterable.features()));

            if stats {
                session.cache().log_stats().await;
                let cache_stats = session.cache().stats().await;
                println!(
                    "{}",
                    report::cache_stats_table(session.cache().namespace(), &cache_stats)
                );
            }
        }
        Commands::Properties { url, layer } => {
            let session = Session::connect(config)?;
            let client = session.features();
            client
                .load_features(&LayerSource::wfs(url, layer), &[])
                .await
                .context("Failed to load features")?;

            for name in client.get_property_names()? {
                println!("{}", name);
            }
        }
        Commands::Legends { url } => {
            let session = Session::connect(config)?;
            let legends = session
                .legend_catalog()
                .load_legends(&url)
                .await
                .with_context(|| format!("Failed to load legends from {}", url))?;

            if legends.is_empty() {
                println!("No legends defined");
            } else {
                println!("{}", report::legends_table(&legends));
            }
        }
        Commands::DefaultLegends { url, layer } => {
            let session = Session::connect(config)?;
            let features = session
                .features()
                .load_features(&LayerSource::wfs(url, layer), &[])
                .await
                .context("Failed to load features")?;

            let (legends, skipped) = default_legends(&features)?;
            for error in &skipped {
                warn!(error = %error, "Property skipped");
            }
            if legends.is_empty() {
                println!("No classifiable properties");
            } else {
                println!("{}", report::legends_table(&legends));
            }
        }
        Commands::FeatureInfo {
            url,
            layer,
            lat,
            lon,
            properties,
            title,
        } => {
            let session = Session::connect(config)?;
            let mut source = LayerSource::wms(url, layer);
            if let Some(properties) = properties {
                source = source.with_allow_list(PropertyAllowList::parse(&properties));
            }
            if let Some(title) = title {
                source = source.with_title(title);
            }

            let rows = session
                .feature_info()
                .query(&source, lat, lon)
                .await
                .context("GetFeatureInfo failed")?;

            if rows.is_empty() {
                println!("No data at {}, {}", lat, lon);
            } else {
                println!("{}", report::info_rows_table(&rows));
            }
        }
        Commands::DecodeException { file } => {
            let xml = if file.as_os_str() == "-" {
                std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?
            } else {
                std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?
            };

            let records = decode_exception_report(&xml)?;
            if records.is_empty() {
                bail!("Exception report present but no exceptions could be read");
            }
            println!("{}", report::exceptions_table(&records));
        }
    }

    Ok(())
}
