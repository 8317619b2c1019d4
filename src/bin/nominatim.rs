//! nominatim — geocoding command-line client
//!
//! Reverse geocoding, free-form and structured search, OSM object lookup
//! and service status against a Nominatim-compatible API.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args as ClapArgs, Parser, Subcommand};
use nominatim_cli::config::Config;
use nominatim_cli::{
    CommonOptions, GeocodeError, HttpTransport, LookupQuery, OutputFormat, PipelineConfig,
    RequestDescriptor, RequestPipeline, Result, ReverseQuery, SearchQuery, StatusQuery,
    StructuredQuery,
};
use tracing::debug;

/// Nominatim geocoding client
#[derive(Parser)]
#[command(name = "nominatim")]
#[command(version = nominatim_cli::PKG_VERSION)]
#[command(about = "Query a Nominatim geocoding service")]
struct Args {
    /// Config file (default: <config dir>/nominatim-cli/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Service base URL
    #[arg(long, global = true, env = "NOMINATIM_URL")]
    base_url: Option<String>,

    /// User-Agent header sent with every request
    #[arg(long, global = true, env = "NOMINATIM_USER_AGENT")]
    user_agent: Option<String>,

    /// Contact email passed to the service
    #[arg(long, global = true, env = "NOMINATIM_EMAIL")]
    email: Option<String>,

    /// Preferred result language(s), e.g. "de,en"
    #[arg(long, global = true)]
    accept_language: Option<String>,

    /// Output format requested from the service
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Re-indent JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log pipeline decisions (cache, rate limit, retries) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    pipeline: PipelineArgs,

    #[command(subcommand)]
    command: Command,
}

/// Overrides for the request pipeline.
#[derive(ClapArgs)]
struct PipelineArgs {
    /// Disable the response cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Cache entry time-to-live in milliseconds (0 = never cache)
    #[arg(long, global = true, value_name = "MS")]
    cache_ttl_ms: Option<u64>,

    /// Maximum number of cached responses
    #[arg(long, global = true, value_name = "N")]
    cache_max_entries: Option<usize>,

    /// Disable client-side rate limiting
    #[arg(long, global = true)]
    no_rate_limit: bool,

    /// Requests allowed per rate-limit window
    #[arg(long, global = true, value_name = "N")]
    rate_limit: Option<u32>,

    /// Rate-limit window length in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    rate_interval_ms: Option<u64>,

    /// Make exactly one attempt per request
    #[arg(long, global = true)]
    no_retry: bool,

    /// Maximum attempts per request, including the first
    #[arg(long, global = true, value_name = "N")]
    max_attempts: Option<u32>,

    /// Delay before the first retry in milliseconds (doubles per retry)
    #[arg(long, global = true, value_name = "MS")]
    initial_delay_ms: Option<u64>,
}

impl PipelineArgs {
    /// Layer command-line overrides over the file configuration.
    fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if self.no_cache {
            config.cache.enabled = false;
        }
        if let Some(ms) = self.cache_ttl_ms {
            config.cache.ttl = Duration::from_millis(ms);
        }
        if let Some(n) = self.cache_max_entries {
            config.cache.max_entries = n;
        }
        if self.no_rate_limit {
            config.rate_limit.enabled = false;
        }
        if let Some(n) = self.rate_limit {
            config.rate_limit.limit = n;
        }
        if let Some(ms) = self.rate_interval_ms {
            config.rate_limit.interval = Duration::from_millis(ms);
        }
        if self.no_retry {
            config.retry.enabled = false;
        }
        if let Some(n) = self.max_attempts {
            config.retry.max_attempts = n;
        }
        if let Some(ms) = self.initial_delay_ms {
            config.retry.initial_delay = Duration::from_millis(ms);
        }
        config
    }
}

/// Extra detail switches shared by the geocoding subcommands.
#[derive(ClapArgs)]
struct DetailArgs {
    /// Include a breakdown of the address into its elements
    #[arg(long)]
    addressdetails: bool,

    /// Include additional OSM tags (wikipedia, opening hours, ...)
    #[arg(long)]
    extratags: bool,

    /// Include all name variants
    #[arg(long)]
    namedetails: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Look up the address at a coordinate
    Reverse {
        /// Latitude in degrees
        #[arg(allow_negative_numbers = true)]
        lat: String,
        /// Longitude in degrees
        #[arg(allow_negative_numbers = true)]
        lon: String,
        /// Level of detail, 3 (country) to 18 (building)
        #[arg(short, long)]
        zoom: Option<u8>,
        #[command(flatten)]
        details: DetailArgs,
    },

    /// Free-form search, e.g. "Eiffel Tower, Paris"
    Search {
        /// Search terms (joined with spaces)
        #[arg(required = true)]
        query: Vec<String>,
        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,
        /// Restrict results to these ISO 3166-1 alpha-2 country codes
        #[arg(long, value_delimiter = ',')]
        countrycodes: Vec<String>,
        /// Preferred area as "x1,y1,x2,y2"
        #[arg(long, allow_hyphen_values = true)]
        viewbox: Option<String>,
        /// Only return results inside --viewbox
        #[arg(long, requires = "viewbox")]
        bounded: bool,
        #[command(flatten)]
        details: DetailArgs,
    },

    /// Search by address components
    Structured {
        #[arg(long)]
        amenity: Option<String>,
        #[arg(long)]
        street: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        county: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        postalcode: Option<String>,
        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,
        #[command(flatten)]
        details: DetailArgs,
    },

    /// Address details for OSM objects, e.g. R146656 W104393803
    Lookup {
        #[arg(required = true, value_delimiter = ',')]
        osm_ids: Vec<String>,
        #[command(flatten)]
        details: DetailArgs,
    },

    /// Check whether the service is up
    Status,
}

impl Command {
    fn descriptor(&self, common: CommonOptions) -> Result<RequestDescriptor> {
        let with_details = |details: &DetailArgs| {
            common
                .clone()
                .address_details(details.addressdetails)
                .extra_tags(details.extratags)
                .name_details(details.namedetails)
        };

        match self {
            Command::Reverse {
                lat,
                lon,
                zoom,
                details,
            } => {
                let mut query = ReverseQuery::parse(lat, lon)?;
                if let Some(zoom) = zoom {
                    query = query.zoom(*zoom);
                }
                query.to_descriptor(&with_details(details))
            }

            Command::Search {
                query,
                limit,
                countrycodes,
                viewbox,
                bounded,
                details,
            } => {
                let mut search =
                    SearchQuery::new(query.join(" ")).country_codes(countrycodes.clone());
                if let Some(limit) = limit {
                    search = search.limit(*limit);
                }
                if let Some(viewbox) = viewbox {
                    search = search.viewbox(viewbox, *bounded);
                }
                search.to_descriptor(&with_details(details))
            }

            Command::Structured {
                amenity,
                street,
                city,
                county,
                state,
                country,
                postalcode,
                limit,
                details,
            } => StructuredQuery {
                amenity: amenity.clone(),
                street: street.clone(),
                city: city.clone(),
                county: county.clone(),
                state: state.clone(),
                country: country.clone(),
                postal_code: postalcode.clone(),
                limit: *limit,
            }
            .to_descriptor(&with_details(details)),

            Command::Lookup { osm_ids, details } => {
                LookupQuery::new(osm_ids.clone()).to_descriptor(&with_details(details))
            }

            Command::Status => Ok(StatusQuery.to_descriptor(common.format)),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Default: warn for CLI, debug with --verbose; RUST_LOG overrides both.
    let default_level = if args.verbose {
        "warn,nominatim_cli=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
    debug!(version = %nominatim_cli::version_string(), "starting");

    let result = tokio::select! {
        result = run(args) => result,
        Ok(()) = tokio::signal::ctrl_c() => Err(GeocodeError::Cancelled),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let service = config.service.clone();

    let base_url = args.base_url.unwrap_or(service.base_url);
    let user_agent = args
        .user_agent
        .or(service.user_agent)
        .unwrap_or_else(nominatim_cli::default_user_agent);
    let transport = HttpTransport::with_timeout(
        base_url,
        user_agent,
        Duration::from_secs(service.timeout_secs),
    )?;

    let pipeline_config = args.pipeline.apply(config.pipeline_config());
    debug!(?pipeline_config, "pipeline configured");
    let pipeline = RequestPipeline::new(pipeline_config, Arc::new(transport))?;

    let common = CommonOptions {
        format: args.format.unwrap_or(service.format),
        accept_language: args.accept_language.or(service.accept_language),
        email: args.email.or(service.email),
        ..CommonOptions::default()
    };
    let descriptor = args.command.descriptor(common)?;
    let response = pipeline.execute(&descriptor).await?;

    let body = if args.pretty {
        response.pretty_body()?
    } else {
        response.body
    };
    println!("{}", body.trim_end());
    Ok(())
}
