use anyhow::Result;
use clap::{Parser, Subcommand};
use roome_store::config::{self, Config};
use roome_store::source::MapBounds;
use roome_store::store::ApartmentsStore;
use roome_store::{Apartment, ApartmentType, LoadOutcome, MockSource, SearchFilters};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file (defaults apply when omitted and roome.yaml is absent)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and page through the home feed
    Home {
        #[arg(long, default_value_t = 2)]
        pages: usize,
    },
    /// Run one search
    Search {
        #[arg(long)]
        min_price: Option<i64>,
        #[arg(long)]
        max_price: Option<i64>,
        /// rental, shared or sublet (or 0/1/2)
        #[arg(long = "type")]
        apartment_type: Option<ApartmentType>,
        /// Earliest entry date, YYYY-MM-DD
        #[arg(long)]
        entry_date: Option<String>,
        #[arg(long = "gender")]
        genders: Vec<String>,
        #[arg(long = "feature")]
        features: Vec<String>,
        #[arg(long)]
        query: Option<String>,
    },
    /// Query the top listings for a viewport
    Map {
        #[arg(long)]
        north: f64,
        #[arg(long)]
        south: f64,
        #[arg(long)]
        east: f64,
        #[arg(long)]
        west: f64,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(config::load(Some(path))?),
        None if Path::new("roome.yaml").exists() => Ok(config::load(None)?),
        None => Ok(Config::default()),
    }
}

fn print_listings(listings: &[Apartment]) {
    for (i, apartment) in listings.iter().enumerate() {
        println!(
            "{}. {} ({} ₪)",
            i + 1,
            apartment.location.address,
            apartment.price
        );
        println!(
            "   {:?}, {} rooms, {} likes",
            apartment.apartment_type(),
            apartment.rooms,
            apartment.num_of_likes
        );
        if !apartment.labels.is_empty() {
            println!("   Labels: {}", apartment.labels.iter().collect::<Vec<_>>().join(", "));
        }
        println!("   ID: {}", apartment.id);
        println!();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = load_config(args.config.as_deref())?;

    let source = match &cfg.mock.dataset {
        Some(path) => MockSource::load_json(path).await?,
        None => MockSource::with_fixtures(),
    };
    let (min_delay, max_delay) = cfg.mock.delay_range();
    let source = source.with_delay(min_delay, max_delay);
    let store = ApartmentsStore::new(source, cfg.store.clone());

    match args.command {
        Command::Home { pages } => {
            let mut outcome = store.initialize_on_login().await;
            for _ in 1..pages {
                if outcome != LoadOutcome::Loaded {
                    break;
                }
                outcome = store.load_home_next_page().await;
            }
            if let LoadOutcome::Failed(message) = &outcome {
                anyhow::bail!("home feed failed: {message}");
            }

            let home = store.home();
            info!("🏠 {} listings in the feed (more: {})", home.ids.len(), home.has_more);
            print_listings(&store.get_apartments_by_ids(&home.ids));
        }
        Command::Search {
            min_price,
            max_price,
            apartment_type,
            entry_date,
            genders,
            features,
            query,
        } => {
            let filters = SearchFilters {
                min_price,
                max_price,
                apartment_type,
                entry_date: entry_date.as_deref().and_then(roome_store::models::raw::parse_date),
                genders,
                features,
                query_text: query,
            };
            if let LoadOutcome::Failed(message) = store.run_search(filters, true).await {
                anyhow::bail!("search failed: {message}");
            }

            let search = store.search();
            info!("🔎 {} of {} matches loaded", search.ids.len(), search.total);
            print_listings(&store.get_search_slice(0, search.ids.len()));
        }
        Command::Map {
            north,
            south,
            east,
            west,
        } => {
            store.set_map_bounds(MapBounds {
                north,
                south,
                east,
                west,
            });
            if let LoadOutcome::Failed(message) = store.refresh_map().await {
                anyhow::bail!("map refresh failed: {message}");
            }

            let map = store.map();
            info!("🗺️ {} listings in view", map.ids.len());
            print_listings(&store.get_apartments_by_ids(&map.ids));
        }
    }

    Ok(())
}
