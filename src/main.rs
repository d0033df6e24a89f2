use anyhow::Context;
use clap::{Parser, Subcommand};
use rooftop_finder::cards::{cards_for_ranked, cards_for_venues, VenueCard};
use rooftop_finder::catalog::Catalog;
use rooftop_finder::config::Config;
use rooftop_finder::enrich::{enricher_from_config, DescriptionEnricher, PassthroughEnricher};
use rooftop_finder::error::FinderError;
use rooftop_finder::geocode::geocoder_from_config;
use rooftop_finder::links::links_for;
use rooftop_finder::server::{start_server, AppState};
use rooftop_finder::{logging, metrics, neighborhoods};
use rooftop_finder::{PriceRange, SearchCriteria, SearchSession};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "rooftop_finder")]
#[command(about = "Find rooftop venues near a New York City neighborhood")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to $ROOFTOP_FINDER_CONFIG or ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the venue catalog path from the config
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search venues near a neighborhood
    Search {
        /// Neighborhood, e.g. "West Village"
        neighborhood: String,
        /// Borough the neighborhood belongs to
        #[arg(long, default_value = neighborhoods::MANHATTAN)]
        borough: String,
        /// Search radius in miles
        #[arg(long)]
        radius: Option<f64>,
        /// Allowed price ranges, comma separated (e.g. "$,$$")
        #[arg(long)]
        prices: Option<String>,
        /// Minimum rating, 0 to 5
        #[arg(long)]
        min_rating: Option<f64>,
        /// How many results to show
        #[arg(long)]
        limit: Option<usize>,
        /// Skip description enrichment even when an API key is configured
        #[arg(long)]
        no_enrich: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the highest-rated venues
    Featured {
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        no_enrich: bool,
        #[arg(long)]
        json: bool,
    },
    /// List boroughs and their neighborhoods
    Neighborhoods {
        /// Only list this borough
        #[arg(long)]
        borough: Option<String>,
    },
    /// Print review, directions and reservation links for a venue
    Links {
        name: String,
        #[arg(long, default_value = "")]
        address: String,
    },
    /// Serve the JSON API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

fn load_catalog(config: &Config) -> (Catalog, Option<FinderError>) {
    let (catalog, error) = Catalog::load_or_empty(&config.catalog.path);
    if let Some(e) = &error {
        println!("🚨 {}. Continuing with no venues.", e);
    }
    (catalog, error)
}

fn pick_enricher(config: &Config, disabled: bool) -> Arc<dyn DescriptionEnricher> {
    if disabled {
        Arc::new(PassthroughEnricher)
    } else {
        enricher_from_config(&config.enrichment)
    }
}

fn print_card(index: usize, card: &VenueCard) {
    let distance = card
        .distance_miles
        .map(|d| format!("  🚶 {:.1} mi", d))
        .unwrap_or_default();
    println!(
        "{:>2}. {}  ⭐ {:.1}/5  {}{}",
        index + 1,
        card.venue.name,
        card.venue.rating,
        card.venue.price_range,
        distance
    );
    if !card.venue.neighborhood.is_empty() || !card.venue.borough.is_empty() {
        println!("    📍 {}, {}", card.venue.neighborhood, card.venue.borough);
    }
    if !card.description.is_empty() {
        println!("    {}", card.description);
    }
    println!("    Yelp:      {}", card.links.reviews);
    println!("    Maps:      {}", card.links.directions);
    println!("    OpenTable: {}", card.links.reservations);
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(path) = cli.catalog {
        config.catalog.path = path;
    }
    let _log_guard = logging::init_logging(&config.logging);

    match cli.command {
        Commands::Search {
            neighborhood,
            borough,
            radius,
            prices,
            min_rating,
            limit,
            no_enrich,
            json,
        } => {
            let (neighborhood, borough) = neighborhoods::require(&neighborhood, &borough)?;

            let mut criteria = SearchCriteria::new(neighborhood, borough)
                .with_max_distance(radius.unwrap_or(config.search.default_radius_miles))
                .with_min_rating(min_rating.unwrap_or(config.search.default_min_rating));
            if let Some(list) = prices {
                criteria = criteria.with_prices(PriceRange::parse_list(&list)?);
            }
            criteria.validate()?;

            let (catalog, _) = load_catalog(&config);
            let geocoder = geocoder_from_config(&config.geocoder)?;

            info!("Searching near {}", criteria.location_label());
            let session = match SearchSession::run(criteria, &catalog, geocoder.as_ref()).await {
                Ok(session) => session,
                Err(FinderError::LocationNotFound { place }) => {
                    println!("📍 Unable to locate {}. Please try another area.", place);
                    return Ok(ExitCode::from(2));
                }
                Err(e) if e.is_retryable() => {
                    println!("⚠️  Location lookup failed, please try again: {}", e);
                    return Ok(ExitCode::from(3));
                }
                Err(e) => return Err(e.into()),
            };

            let limit = limit.unwrap_or(config.search.display_limit);
            let cards =
                cards_for_ranked(pick_enricher(&config, no_enrich), session.top(limit)).await;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "location": session.location_label,
                        "origin": session.origin(),
                        "total": session.result.len(),
                        "venues": cards,
                    }))?
                );
            } else if session.is_empty() {
                println!(
                    "🔍 No venues match your criteria near {}. Try adjusting filters.",
                    session.location_label
                );
            } else {
                println!(
                    "✨ Found {} venues near {} (showing {})\n",
                    session.result.len(),
                    session.location_label,
                    cards.len()
                );
                for (i, card) in cards.iter().enumerate() {
                    print_card(i, card);
                }
            }
        }
        Commands::Featured { limit, no_enrich, json } => {
            let (catalog, _) = load_catalog(&config);
            let venues = catalog.featured(limit.unwrap_or(config.search.featured_limit));
            let cards = cards_for_venues(pick_enricher(&config, no_enrich), &venues).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&cards)?);
            } else {
                println!("🌟 Featured rooftop experiences\n");
                for (i, card) in cards.iter().enumerate() {
                    print_card(i, card);
                }
            }
        }
        Commands::Neighborhoods { borough } => {
            for (name, hoods) in neighborhoods::DIRECTORY {
                if let Some(wanted) = &borough {
                    if !name.eq_ignore_ascii_case(wanted.trim()) {
                        continue;
                    }
                }
                println!("{}", name);
                for hood in hoods.iter() {
                    println!("  {}", hood);
                }
            }
        }
        Commands::Links { name, address } => {
            let links = links_for(&name, &address);
            println!("Yelp:      {}", links.reviews);
            println!("Maps:      {}", links.directions);
            println!("OpenTable: {}", links.reservations);
        }
        Commands::Serve { host, port } => {
            metrics::init_metrics();
            let (catalog, error) = load_catalog(&config);
            let state = Arc::new(AppState {
                catalog,
                geocoder: geocoder_from_config(&config.geocoder)?,
                enricher: enricher_from_config(&config.enrichment),
                search: config.search.clone(),
                catalog_warning: error.map(|e| e.to_string()),
            });

            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let addr: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .with_context(|| format!("invalid listen address {}:{}", host, port))?;
            println!("🚀 HTTP server running on http://{}", addr);
            start_server(state, addr).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
