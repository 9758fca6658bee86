use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use hcv_predict::config::{LoggingSettings, Settings};
use hcv_predict::routes::{self, AppState};
use hcv_predict::services::ArtifactLoader;
use hcv_predict::Classifier;
use std::io::{Error, ErrorKind};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber; `RUST_LOG` takes precedence over the configured level
fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.json().init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_logging(&LoggingSettings::default());
            error!("Failed to load configuration: {}", e);
            return Err(Error::new(ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_logging(&settings.logging);

    info!("Starting HCV prediction service...");

    // The service never starts without a usable model
    let forest = ArtifactLoader::new(settings.model.path.clone())
        .load()
        .await
        .map_err(|e| {
            error!("Failed to load model artifact: {}", e);
            Error::new(ErrorKind::Other, e.to_string())
        })?;

    let model: Arc<dyn Classifier> = Arc::new(forest);
    let model_info = model.info();

    info!(
        "Model ready: {} with {} trees, {} features, {} classes",
        model_info.estimator, model_info.n_trees, model_info.n_features, model_info.n_classes
    );

    let app_state = AppState::new(model, settings.api.error_status);

    info!("Error status policy: {:?}", app_state.error_status);

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting HTTP server on {}:{}", host, port);

    let mut server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    });

    if let Some(workers) = settings.server.workers {
        server = server.workers(workers);
    }

    server.bind((host, port))?.run().await
}
