use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use multipinmap::config::AppConfig;
use multipinmap::database::{establish_connection, get_database_url, setup_database};
use multipinmap::geocoding::{Geocoder, HereGeocoder};
use multipinmap::server::create_app;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the map-plugin API server
    Serve {
        #[clap(short, long)]
        config: Option<String>,
        #[clap(short, long)]
        port: Option<u16>,
        #[clap(short, long)]
        database: Option<String>,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    /// Resolve a single address against the geocoding provider
    Geocode {
        #[clap(short, long)]
        street: Option<String>,
        #[clap(long)]
        postal_code: String,
        #[clap(long)]
        city: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match cli.command {
        Commands::Serve {
            config,
            port,
            database,
            cors_origin,
        } => serve(config, port, database, cors_origin).await,
        Commands::Geocode {
            street,
            postal_code,
            city,
        } => geocode(street, postal_code, city).await,
    }
}

async fn serve(
    config_path: Option<String>,
    port: Option<u16>,
    database: Option<String>,
    cors_origin: Option<String>,
) -> Result<()> {
    let config = match &config_path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {path}"))?;
            AppConfig::from_yaml(&content)
                .with_context(|| format!("failed to parse config file {path}"))?
        }
        None => AppConfig::default(),
    };

    // CLI flags override the config file.
    let port = port.unwrap_or(config.server.port);
    let database = database.unwrap_or_else(|| config.server.database.clone());
    let cors_origin = cors_origin.or_else(|| config.server.cors_origin.clone());

    let api_key = std::env::var("HERE_API_KEY")
        .ok()
        .or_else(|| config.geocoder.api_key.clone())
        .context("no HERE API key: set HERE_API_KEY or geocoder.api_key in the config file")?;

    let geocoder: Arc<dyn Geocoder> = Arc::new(match &config.geocoder.endpoint {
        Some(endpoint) => HereGeocoder::with_endpoint(api_key, endpoint.clone()),
        None => HereGeocoder::new(api_key),
    });

    let db = establish_connection(&get_database_url(Some(&database))).await?;
    setup_database(&db).await?;

    let app = create_app(db, geocoder, cors_origin.as_deref()).await?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn geocode(street: Option<String>, postal_code: String, city: String) -> Result<()> {
    let api_key = std::env::var("HERE_API_KEY").context("HERE_API_KEY must be set")?;
    let geocoder = HereGeocoder::new(api_key);

    match geocoder
        .geocode(street.as_deref().unwrap_or(""), &postal_code, &city)
        .await?
    {
        Some(coordinates) => println!("{} {}", coordinates.lat, coordinates.lng),
        None => println!("no match"),
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("handlebars=off,{}", log_level)))
        .without_time()
        .init();
}
