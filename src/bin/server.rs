use std::{
    env,
    fs::OpenOptions,
    net::SocketAddr,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::{Parser, ValueEnum};
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use ledgerlink::{
    AggregatorClient, AppState, PLAID_SANDBOX_BASE_URL, PlaidClient, TELLER_BASE_URL,
    TellerClient, build_router, graceful_shutdown,
};

/// Which aggregator backs the sync endpoints.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Aggregator {
    Teller,
    Plaid,
}

/// The REST API server for ledgerlink.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The aggregator to sync bank data from.
    #[arg(long, value_enum, default_value_t = Aggregator::Teller)]
    aggregator: Aggregator,

    /// The base URL for the Teller API.
    #[arg(long, default_value = TELLER_BASE_URL)]
    teller_base_url: String,

    /// The base URL for the Plaid API.
    #[arg(long, default_value = PLAID_SANDBOX_BASE_URL)]
    plaid_base_url: String,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let aggregator: Arc<dyn AggregatorClient> = match args.aggregator {
        Aggregator::Teller => Arc::new(
            TellerClient::new(&args.teller_base_url).expect("Could not create Teller client"),
        ),
        Aggregator::Plaid => {
            let client_id = env::var("PLAID_CLIENT_ID")
                .expect("The environment variable 'PLAID_CLIENT_ID' must be set");
            let secret = env::var("PLAID_SECRET")
                .expect("The environment variable 'PLAID_SECRET' must be set");

            Arc::new(
                PlaidClient::new(&args.plaid_base_url, &client_id, &secret)
                    .expect("Could not create Plaid client"),
            )
        }
    };

    let connection = Connection::open(&args.db_path).expect("Could not open database");
    let state = AppState::new(connection, aggregator).expect("Could not initialize database");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Could not start server");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
