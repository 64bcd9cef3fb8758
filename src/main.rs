use clap::Parser;
use pawwatch::{
    sdk::config::EngineConfig,
    sdk::entities::Coord,
    sdk::proximity::{build_view_model_with, CategoryFilter, FilterCriteria},
    sdk::source::{load_dogs, load_emergencies},
    sdk::util::log::init_logging,
};
use std::{error::Error, fs::File, io::Write, path::PathBuf};

/// Filter and cluster nearby dog and emergency reports for the map view
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Dog reports, as a JSON array or CSV file
    #[arg(long)]
    dogs: Option<PathBuf>,

    /// Emergency reports, as a JSON array or CSV file
    #[arg(long)]
    emergencies: Option<PathBuf>,

    /// Latitude of the reference point (requires --lon)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude of the reference point (requires --lat)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// One of: all, dogs, emergencies, stray, owned
    #[arg(short, long, default_value = "all")]
    category: String,

    /// Case-insensitive text to look for in names, breeds, owners and descriptions
    #[arg(short, long, default_value = "")]
    search: String,

    /// [Optional] Search radius in km (defaults to PAWWATCH_SEARCH_RADIUS_KM or 10)
    #[arg(long)]
    radius_km: Option<f64>,

    /// Order singletons and cluster members by distance
    #[arg(long)]
    sort: bool,

    /// Write the view model here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log engine internals
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_logging(cli.verbose);

    let config = EngineConfig::from_env()?;
    let category: CategoryFilter = cli.category.parse()?;
    let radius_km = cli.radius_km.unwrap_or(config.default_search_radius_km);
    let criteria = FilterCriteria::new(cli.search.as_str(), category, radius_km)?;

    let reference = match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => Some(Coord::new(lat, lon)),
        _ => {
            log::warn!("No reference point given; radius filter disabled");
            None
        }
    };

    let dogs = match &cli.dogs {
        Some(path) => load_dogs(path)?,
        None => Vec::new(),
    };
    let emergencies = match &cli.emergencies {
        Some(path) => load_emergencies(path)?,
        None => Vec::new(),
    };

    log::info!(
        "Filtering {} dogs and {} emergencies (category={}, radius={} km, search={:?})",
        dogs.len(),
        emergencies.len(),
        criteria.category,
        criteria.radius_km,
        criteria.search_text
    );

    let mut view = build_view_model_with(&config, &dogs, &emergencies, &criteria, reference)?;
    if cli.sort {
        view.sort_by_distance();
    }

    log::info!(
        "{} clusters, {} single dogs, {} single emergencies",
        view.clusters.len(),
        view.singleton_dogs.len(),
        view.singleton_emergencies.len()
    );

    let json_output = serde_json::to_string_pretty(&view)?;
    match &cli.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json_output.as_bytes())?;
            log::info!("View model written to {}", path.display());
        }
        None => println!("{}", json_output),
    }

    Ok(())
}
