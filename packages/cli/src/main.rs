#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for venue profiles.
//!
//! Uses `indicatif-log-bridge` (via [`venue_profile_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the menu progress bar never fight for the terminal.

mod report;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use venue_profile::export::{read_profile, write_profile};
use venue_profile::{Credentials, ProfileBuilder, ProfileConfig, RadiusPipeline};
use venue_profile_census::IncomeAggregator;
use venue_profile_census::acs::{AcsClient, AcsConfig};
use venue_profile_cli_utils::IndicatifProgress;
use venue_profile_geocoder::census::CensusGeocoder;
use venue_profile_geocoder::nominatim::NominatimGeocoder;
use venue_profile_geocoder::service_registry;
use venue_profile_radius::{RadiusCalculator, RadiusProfileName};
use venue_profile_tract_models::SearchRadius;
use venue_profile_venues::foursquare::{FoursquareClient, FoursquareService};
use venue_profile_venues::menus::FlattenOptions;

const USER_AGENT: &str = "venue-profile/0.1";

#[derive(Parser)]
#[command(name = "venue_profile", about = "Venue and menu pricing profiles around an address")]
struct Cli {
    /// Run configuration (TOML). Defaults apply to anything unset.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Credentials file (TOML). Falls back to `FOURSQUARE_CLIENT_ID`,
    /// `FOURSQUARE_CLIENT_SECRET` and `CENSUS_API_KEY`.
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,
    /// Per-request timeout in seconds.
    #[arg(long, global = true, default_value = "30")]
    timeout: u64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an address and derive its search radius
    Radius {
        /// Street address (e.g., "1600 Pennsylvania Ave NW, Washington, DC 20500")
        address: String,
        /// Radius formula (`tau-square-root` or `pi-root-2.5`)
        #[arg(long)]
        profile: Option<RadiusProfileName>,
        /// Fail instead of falling back to the fixed radius
        #[arg(long)]
        strict: bool,
    },
    /// Build a full venue profile and write it to the output directory
    Profile {
        /// Street address
        address: String,
        /// Output directory (overrides the config)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Drop menu items with any missing field
        #[arg(long)]
        drop_na: bool,
        /// Maximum number of menu items to keep
        #[arg(long)]
        iter_limit: Option<usize>,
        /// Locate the address with Nominatim if the Census geocoder fails
        #[arg(long)]
        geocoder_fallback: bool,
    },
    /// Summarize a previously written profile
    Show {
        /// Profile JSON written by `profile`
        path: PathBuf,
        /// Recompute price statistics at this confidence
        #[arg(long)]
        confidence: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = venue_profile_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            log::debug!("Loading configuration from {}", path.display());
            ProfileConfig::from_file(path)?
        }
        None => ProfileConfig::default(),
    };

    match cli.command {
        Commands::Radius {
            address,
            profile,
            strict,
        } => {
            if let Some(profile) = profile {
                config.radius_profile = profile;
                config.custom_radius = None;
            }
            config.validate()?;

            let client = http_client(cli.timeout)?;
            let census_key = census_key(cli.credentials.as_deref())?;
            let pipeline = radius_pipeline(&client, &config, census_key)?;

            if strict {
                let (resolved, derivation, radius) = pipeline.derive(&address).await?;
                report::print_derivation(&resolved, &derivation, radius);
            } else {
                let area = pipeline.search_area(&address).await?;
                report::print_search_area(&area);
            }
        }
        Commands::Profile {
            address,
            out,
            drop_na,
            iter_limit,
            geocoder_fallback,
        } => {
            if let Some(out) = out {
                config.output_dir = out;
            }
            config.menus = FlattenOptions {
                drop_na: drop_na || config.menus.drop_na,
                iter_limit: iter_limit.or(config.menus.iter_limit),
            };
            config.geocoder_fallback |= geocoder_fallback;
            config.validate()?;

            let credentials = match &cli.credentials {
                Some(path) => Credentials::from_file(path)?,
                None => Credentials::from_env()?,
            };
            let client = http_client(cli.timeout)?;
            let pipeline = radius_pipeline(&client, &config, credentials.census_api_key.clone())?;

            let mut service = FoursquareService::embedded();
            if let Some(version) = &config.api_version {
                service.version.clone_from(version);
            }
            let directory = FoursquareClient::new(
                client,
                service,
                credentials.foursquare_client_id,
                credentials.foursquare_client_secret,
            );

            let builder = ProfileBuilder::new(pipeline, Box::new(directory))
                .search_options(config.search.clone())
                .flatten_options(config.menus)
                .confidence(config.confidence)
                .progress(IndicatifProgress::venues_bar(&multi, "Fetching menus"));

            let profile = builder.build(&address).await?;
            let labels = write_profile(&config.output_dir, &profile)?;

            report::print_profile(&profile);
            println!();
            println!("Profile:  {}", labels.profile.display());
            println!("Raw JSON: {}", labels.raw.display());
            println!("Map:      {}", labels.map.display());
        }
        Commands::Show { path, confidence } => {
            let mut profile = read_profile(&path)?;
            if let Some(confidence) = confidence {
                profile.recompute(confidence)?;
            }
            report::print_profile(&profile);
        }
    }

    Ok(())
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(30)))
        .build()
}

/// The Census key from the credentials file if given, else the environment.
fn census_key(credentials: Option<&Path>) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if let Some(path) = credentials {
        return Ok(Credentials::from_file(path)?.census_api_key);
    }
    Ok(std::env::var("CENSUS_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty()))
}

fn radius_pipeline(
    client: &reqwest::Client,
    config: &ProfileConfig,
    census_key: Option<String>,
) -> Result<RadiusPipeline, Box<dyn std::error::Error>> {
    let census = service_registry::service("census")
        .and_then(|s| CensusGeocoder::from_service(client.clone(), &s, census_key.clone()))
        .ok_or("No Census geocoder service configured")?;
    let acs = AcsClient::new(client.clone(), AcsConfig::embedded(), census_key);
    let calculator = RadiusCalculator::new(config.radius())?;

    let mut pipeline = RadiusPipeline::new(
        Box::new(census),
        IncomeAggregator::new(Box::new(acs)),
        calculator,
        SearchRadius::fixed(config.fallback_radius),
    );

    if config.geocoder_fallback {
        let nominatim = service_registry::service("nominatim")
            .and_then(|s| NominatimGeocoder::from_service(client.clone(), &s))
            .ok_or("No Nominatim service configured")?;
        pipeline = pipeline.with_fallback_geocoder(Box::new(nominatim));
    }

    Ok(pipeline)
}
