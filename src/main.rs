use std::{env, io::BufRead, sync::Arc};

use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use anyhow::Context;
use portfolio_api::{
    auth::{oauth::UserInfoClient, password::hash_password},
    background_task::start_purge_task,
    constants::SHUTDOWN_TIMEOUT_SECS,
    db::postgres::create_pool,
    graceful_shutdown::stop_on_signal,
    relay::emailjs::EmailJsRelay,
    repositories::{
        document_store::SharedStore, memory_store::MemoryDocumentStore, pg_store::PgDocumentStore,
    },
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let production = env::var("APP_ENV").is_ok_and(|v| v.eq_ignore_ascii_case("production"));
    if production {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// `hash-password [PASSWORD]` prints an argon2 hash for `APP_ADMIN_PASSWORD_HASH`.
/// Reads the password from stdin when it is not given.
fn run_hash_password(arg: Option<String>) -> anyhow::Result<()> {
    let password = match arg {
        Some(password) => password,
        None => {
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("reading password from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }

    let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("{}", e))?;
    println!("{hash}");
    Ok(())
}

async fn build_store(config: &AppConfig) -> anyhow::Result<SharedStore> {
    match config.database_url.as_deref() {
        Some(url) => {
            let pool = create_pool(url).await.context("connecting to Postgres")?;
            let store = PgDocumentStore::new(pool);
            store.migrate().await.context("running migrations")?;
            tracing::info!("Using Postgres content store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("No database URL configured; content lives in memory and is lost on restart");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
    }
}

fn build_cors(config: &AppConfig) -> Cors {
    let origins = config.cors_origins();

    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        cors.allow_any_origin()
    } else {
        origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let mut args = env::args().skip(1);
    if args.next().as_deref() == Some("hash-password") {
        if let Err(e) = run_hash_password(args.next()) {
            tracing::error!("hash-password failed: {:#}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let store = match build_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Content store unavailable: {:#}", e);
            std::process::exit(1);
        }
    };

    let (relay, oauth) = match (
        EmailJsRelay::new(config.relay_endpoint.clone()),
        UserInfoClient::new(config.oauth_userinfo_url.clone()),
    ) {
        (Ok(relay), Ok(oauth)) => (relay, oauth),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = web::Data::new(
        AppState::new(&config, store, Arc::new(relay), Arc::new(oauth))
    );

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let server_state = app_state.clone();
    let cors_config = config.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_state.clone())
            .wrap(build_cors(&cors_config))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count.max(1))
    .shutdown_timeout(SHUTDOWN_TIMEOUT_SECS)
    .bind(server_addr)?
    .run();

    tokio::spawn(start_purge_task(app_state));
    tokio::spawn(stop_on_signal(server.handle()));

    server.await
}
