use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use axum::extract::{Path as AxumPath, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::ValueEnum;
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::cli::ServeArgs;
use crate::disease::DiseaseIndicator;
use crate::executor::{DuckDbExecutor, ExecutorConfig};
use crate::report::{ReportEngine, ReportKind};
use crate::storage::{StoragePaths, file_present_nonempty};

#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<DuckDbExecutor>>,
}

pub async fn run(opts: ServeArgs) -> anyhow::Result<()> {
    let paths = StoragePaths::new(&opts.data_dir);
    if !file_present_nonempty(&paths.duckdb_path) {
        return Err(anyhow!(
            "DuckDB not found at {}. Run: cms-reports load",
            paths.duckdb_path.display()
        ));
    }
    let cfg = ExecutorConfig {
        duckdb_path: paths.duckdb_path.clone(),
        read_only: true,
    };
    let db = DuckDbExecutor::open(&cfg)
        .with_context(|| format!("open duckdb at {}", paths.duckdb_path.display()))?;

    let app = router(db);
    let addr: SocketAddr = format!("{}:{}", opts.host, opts.port)
        .parse()
        .context("parse host:port")?;

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(db: DuckDbExecutor) -> Router {
    let state = AppState {
        db: Arc::new(Mutex::new(db)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/diseases", get(api_diseases))
        .route("/api/reports/:kind/:disease", get(api_report))
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct ReportDiseases {
    report: ReportKind,
    diseases: &'static [DiseaseIndicator],
}

async fn api_diseases() -> impl IntoResponse {
    let out: Vec<ReportDiseases> = ReportKind::ALL
        .iter()
        .map(|kind| ReportDiseases {
            report: *kind,
            diseases: kind.accepted(),
        })
        .collect();
    Json(out)
}

async fn api_report(
    State(st): State<AppState>,
    AxumPath((kind, disease)): AxumPath<(String, String)>,
) -> Response {
    let Ok(kind) = ReportKind::from_str(&kind, true) else {
        return (StatusCode::NOT_FOUND, format!("unknown report: {kind}")).into_response();
    };

    // Each request gets its own connection; the lock only covers the clone.
    let executor = match st.db.lock().await.try_clone() {
        Ok(v) => v,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };

    let joined = tokio::task::spawn_blocking(move || {
        ReportEngine::new(executor).run_json(kind, &disease)
    })
    .await;

    match joined {
        Ok(Ok(body)) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Ok(Err(e)) if e.is_validation() => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        Ok(Err(e)) => {
            tracing::error!(report = kind.as_str(), "report failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
