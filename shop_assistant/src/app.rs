use crate::{
    config::Config,
    error::AppError,
    sales::OrtSalesModel,
    server::{HttpServer, SharedState},
    telemetry::Metrics,
    vision::{LabelCatalog, OrtImageClassifier},
};
use std::sync::Arc;
use tokio::{signal, sync::broadcast};

/// Loads both models, then serves until Ctrl+C or SIGTERM.
///
/// Any model that fails to load aborts startup before the listener binds.
pub async fn start_app(config: Config) -> Result<(), AppError> {
    let sales_model = match OrtSalesModel::new(&config.sales_model) {
        Ok(model) => Arc::new(model),
        Err(e) => {
            tracing::error!("Failed to initialize sales model: {:?}", e);
            return Err(AppError::SalesModel(e));
        }
    };

    let labels = LabelCatalog::load(&config.classifier.get_labels_path())?;
    let classifier = match OrtImageClassifier::from_config(&config.classifier, labels) {
        Ok(classifier) => Arc::new(classifier),
        Err(e) => {
            tracing::error!("Failed to initialize image classifier: {:?}", e);
            return Err(AppError::Classifier(e));
        }
    };

    let metrics = Arc::new(Metrics::new().map_err(AppError::Metrics)?);

    let state = SharedState {
        sales_model,
        classifier,
        metrics,
    };
    let server = HttpServer::new(state, &config.server).await?;

    let (shutdown_tx, _) = broadcast::channel(1);
    let mut server_handle = server.run(shutdown_tx.subscribe());

    let result = tokio::select! {
        result = &mut server_handle => result,
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, starting graceful shutdown.");
            let _ = shutdown_tx.send(());
            server_handle.await
        }
    };

    result??;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
