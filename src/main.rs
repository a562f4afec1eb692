use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::info;

use shuttle_tracker::api;
use shuttle_tracker::display::commands::{forward_commands, HELP};
use shuttle_tracker::display::{MapSession, SessionOptions, TracingSurface, Viewport};
use shuttle_tracker::location::{Coordinate, LatLng, LocationStore};
use shuttle_tracker::realtime::{self, HttpLocationSource, LocationSource};
use shuttle_tracker::stations::{load_stations, RouteId, RouteSet, StationRegistry};
use shuttle_tracker::telemetry;

#[derive(Parser)]
#[command(name = "shuttle-tracker")]
#[command(about = "Live shuttle position service and station map tracker")]
struct Args {
    /// Station CSV (route,name,lat,lng) to use instead of the built-in list
    #[arg(long, global = true, env = "STATIONS_FILE")]
    stations: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the location endpoint
    Serve {
        /// Port to run the HTTP server on
        #[arg(short, long, env = "SERVER_PORT", default_value = "8080")]
        port: u16,
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
        bind: IpAddr,
        /// Position reported before anything has been posted
        #[arg(long, default_value_t = 14.5995, allow_negative_numbers = true)]
        default_lat: f64,
        #[arg(long, default_value_t = 120.9842, allow_negative_numbers = true)]
        default_lng: f64,
        /// Also run a tracker reading the store in-process
        #[arg(long)]
        track: bool,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Poll a location endpoint and keep the station map in sync
    Track {
        #[arg(long, env = "TRACKER_URL", default_value = "http://127.0.0.1:8080/api/update")]
        url: String,
        #[arg(long, env = "POLL_TIMEOUT_MS", default_value_t = 5000)]
        timeout_ms: u64,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Post a single position report
    Report {
        #[arg(long, env = "TRACKER_URL", default_value = "http://127.0.0.1:8080/api/update")]
        url: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Print the merged station list
    Stations,
}

#[derive(clap::Args)]
struct ViewArgs {
    /// Vehicle marker position until the first valid fix
    #[arg(long, default_value_t = 14.6394, allow_negative_numbers = true)]
    initial_lat: f64,
    #[arg(long, default_value_t = 121.0789, allow_negative_numbers = true)]
    initial_lng: f64,
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 800)]
    height: u32,
    /// Routes shown at start, comma separated
    #[arg(long, value_delimiter = ',', default_value = "a,b")]
    routes: Vec<RouteId>,
    /// Milliseconds between location polls
    #[arg(long, env = "POLL_INTERVAL_MS", default_value_t = realtime::DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    interval_ms: u64,
}

impl ViewArgs {
    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            initial_position: LatLng::new(self.initial_lat, self.initial_lng),
            viewport: Viewport::new(self.width, self.height),
            active_routes: self.routes.iter().copied().collect::<RouteSet>(),
            ..SessionOptions::default()
        }
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();
    let args = Args::parse();

    match args.command {
        Command::Serve {
            port,
            bind,
            default_lat,
            default_lng,
            track,
            view,
        } => {
            let store = Arc::new(LocationStore::new(Coordinate::now(default_lat, default_lng)));
            let addr = SocketAddr::new(bind, port);

            if !track {
                api::run_server(store, addr)
                    .await
                    .with_context(|| format!("HTTP server on {addr} failed"))?;
                return Ok(());
            }

            let registry = load_stations(args.stations.as_deref())?;
            let interval = view.poll_interval();
            tokio::select! {
                res = api::run_server(store.clone(), addr) => {
                    res.with_context(|| format!("HTTP server on {addr} failed"))?;
                }
                res = run_tracker(store, registry, view.session_options(), interval) => res?,
            }
        }
        Command::Track {
            url,
            timeout_ms,
            view,
        } => {
            let registry = load_stations(args.stations.as_deref())?;
            let source = HttpLocationSource::new(url.clone(), Duration::from_millis(timeout_ms))
                .context("failed to build HTTP client")?;
            info!(%url, "Tracking location endpoint");
            run_tracker(
                Arc::new(source),
                registry,
                view.session_options(),
                view.poll_interval(),
            )
            .await?;
        }
        Command::Report { url, lat, lng } => {
            let client = reqwest::Client::new();
            let ack = realtime::post_location(&client, &url, lat, lng)
                .await
                .with_context(|| format!("failed to report position to {url}"))?;
            info!(%ack, "Position reported");
        }
        Command::Stations => {
            let registry = load_stations(args.stations.as_deref())?;
            print_stations(&registry);
        }
    }

    Ok(())
}

/// Drive one map session from the poller and stdin until Ctrl-C.
async fn run_tracker<S: LocationSource>(
    source: Arc<S>,
    registry: StationRegistry,
    options: SessionOptions,
    interval: Duration,
) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel(64);
    let session = MapSession::new(registry, options, TracingSurface::default());

    tokio::spawn(realtime::run_poller(source, interval, tx.clone()));
    tokio::spawn(forward_commands(BufReader::new(tokio::io::stdin()), tx));
    info!("{HELP}");

    tokio::select! {
        _ = session.run(rx) => {}
        res = tokio::signal::ctrl_c() => {
            res.context("failed to listen for Ctrl-C")?;
            info!("Shutting down tracker");
        }
    }
    Ok(())
}

fn print_stations(registry: &StationRegistry) {
    for route in RouteId::ALL {
        let names: Vec<&str> = registry.on_route(route).map(|w| w.name.as_str()).collect();
        println!("Route {route}: {}", names.join(", "));
    }
    println!();
    for w in registry.iter() {
        let routes: Vec<&str> = w.routes.iter().map(|r| r.letter()).collect();
        println!("{:<20} {:>10.6} {:>11.6}  {}", w.name, w.lat, w.lng, routes.join("/"));
    }
}
