use log::{error, info};
use orgchart_core::db::open_db;
use orgchart_core::init_logging;
use orgchart_server::{router, AppState, ServerConfig};
use std::process::ExitCode;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("orgchart-server: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.log_level, config.log_target.clone()) {
        eprintln!("orgchart-server: logging init failed: {err}");
        return ExitCode::FAILURE;
    }

    // Schema migrations run here, before the first request.
    if let Err(err) = open_db(&config.db_path) {
        error!(
            "event=server_start module=server status=error db_path={} error={}",
            config.db_path.display(),
            err
        );
        return ExitCode::FAILURE;
    }

    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(
                "event=server_start module=server status=error bind_addr={} error={}",
                config.bind_addr, err
            );
            return ExitCode::FAILURE;
        }
    };

    info!(
        "event=server_start module=server status=ok bind_addr={} db_path={}",
        config.bind_addr,
        config.db_path.display()
    );

    let app = router(AppState::new(config.db_path.clone()));
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("event=server_stop module=server status=error error={}", err);
        return ExitCode::FAILURE;
    }

    info!("event=server_stop module=server status=ok");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=server_signal module=server status=error error={}", err);
    }
}
