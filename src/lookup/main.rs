//! Command line lookups against the configured upstream services.
//!
//! Runs a single city or region search and logs the places found.

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use locus::config::Config;
use locus::geomath::{box_dimensions_km, create_bounding_box, tile_bounding_box};
use locus::models::MIN_PEAK_HEIGHT;
use locus::service::{validate_regions_request, CitiesRequest, GeoService, RegionsRequest};
use locus::{FeatureMask, GeoPoint, Place, RegionPreferences};

#[derive(Parser, Debug)]
#[command(name = "lookup")]
#[command(about = "Search cities and regions from the command line")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "locus.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cities with the given name
    Name {
        name: String,

        /// Skip attached attractions
        #[arg(long)]
        no_details: bool,
    },

    /// Cities containing a position
    Position {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Skip attached attractions
        #[arg(long)]
        no_details: bool,
    },

    /// Regions with matching features around a position
    Regions {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Half width (and height) of the searched box in kilometers
        #[arg(long)]
        dist: u32,

        /// Feature bitmask: 1 peaks, 2 lakes, 4 beaches, 8 attractions
        #[arg(long, default_value = "1")]
        filter: u32,

        /// Minimum peak height in meters
        #[arg(long, default_value = "1000")]
        min_peak_height: String,
    },
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = Config::load_from_file(&args.config)?;
    let service = GeoService::from_config(&config)?;

    let places = match args.command {
        Command::Name { name, no_details } => service.get_cities(&CitiesRequest {
            position: None,
            name: Some(name),
            include_details: !no_details,
        })?,
        Command::Position {
            lat,
            lon,
            no_details,
        } => service.get_cities(&CitiesRequest {
            position: Some(GeoPoint::new(lat, lon)),
            name: None,
            include_details: !no_details,
        })?,
        Command::Regions {
            lat,
            lon,
            dist,
            filter,
            min_peak_height,
        } => {
            let request = RegionsRequest {
                position: Some(GeoPoint::new(lat, lon)),
                distance_km: dist,
                prefs: Some(
                    RegionPreferences::new(FeatureMask(filter))
                        .with_property(MIN_PEAK_HEIGHT, min_peak_height),
                ),
            };
            search_regions_with_progress(&service, &config, &request)?
        }
    };

    print_details(&places);
    info!("{} places found", places.len());

    Ok(())
}

/// Region search with one progress step per tile
fn search_regions_with_progress(
    service: &GeoService,
    config: &Config,
    request: &RegionsRequest,
) -> Result<Vec<Place>> {
    validate_regions_request(request)?;
    let (Some(position), Some(prefs)) = (request.position, request.prefs.as_ref()) else {
        return Ok(Vec::new());
    };

    let bbox = create_bounding_box(position, request.distance_km * 1000);
    let tiles = tile_bounding_box(
        &bbox,
        config.search.max_box_width,
        config.search.max_box_height,
    );
    let (width_km, height_km) = box_dimensions_km(&bbox);
    info!(
        "Searching {:.1} x {:.1} km in {} tiles",
        width_km,
        height_km,
        tiles.len()
    );

    let pb = ProgressBar::new(tiles.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tiles")?
            .progress_chars("#>-"),
    );

    let mut session = service.engine().start_region_search();
    let mut regions = Vec::new();
    for tile in &tiles {
        regions.extend(session.advance(tile, prefs));
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(regions)
}

fn print_details(places: &[Place]) {
    for place in places {
        info!(
            "Found place {}, country {} ({},{})",
            place.name, place.country, place.center.lat, place.center.lon
        );

        for feature in &place.features {
            info!(
                "   [{:?}] {} ({},{})",
                feature.kind,
                feature.name().unwrap_or(""),
                feature.position.lat,
                feature.position.lon
            );
        }
    }
}
