#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    config::RuntimeConfiguration,
    data::postgres_store::PostgresStudentStore,
    error::{BindListenerSnafu, RecordResult, ServeSnafu},
    routes::{
        index::get_index_route,
        students::{
            delete_student, get_student, get_student_by_email, get_student_by_student_no,
            get_students, get_students_by_course, get_students_by_section, get_students_by_year,
            patch_student, post_student, put_student,
        },
    },
    state::RecordState,
};
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use snafu::ResultExt;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod config;
mod data;
mod error;
mod routes;
mod state;

const MAX_BODY_BYTES: usize = 1024 * 1024;

async fn shutdown_signal(state: RecordState) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
    state.sensible_shutdown().await;
}

pub fn app(state: RecordState) -> Router {
    Router::new()
        .route("/", get(get_index_route))
        .route("/api/v1/students", get(get_students).post(post_student))
        .route("/api/v1/students/course/{course}", get(get_students_by_course))
        .route(
            "/api/v1/students/section/{section}",
            get(get_students_by_section),
        )
        .route("/api/v1/students/year/{year}", get(get_students_by_year))
        .route("/api/v1/students/email/{email}", get(get_student_by_email))
        .route(
            "/api/v1/students/studentNo/{student_no}",
            get(get_student_by_student_no),
        )
        .route(
            "/api/v1/students/{id}",
            get(get_student)
                .put(put_student)
                .patch(patch_student)
                .delete(delete_student),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn serve() -> RecordResult<()> {
    let config = RuntimeConfiguration::new()?;
    let db_config = config.db_config();

    let options = PgPoolOptions::new().max_connections(db_config.max_connections());
    let store = PostgresStudentStore::connect(options, &db_config).await?;
    info!("Connected to database");
    let state = RecordState::new(store);

    let server_ip = config.server_config().address();
    let listener = TcpListener::bind(&server_ip)
        .await
        .context(BindListenerSnafu {
            address: server_ip.clone(),
        })?;

    info!(?server_ip, "Listening");
    axum::serve(listener, app(state.clone()))
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .context(ServeSnafu)
}

#[tokio::main]
async fn main() {
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");

    if let Err(e) = dotenvy::dotenv() {
        debug!(?e, "No .env loaded, using the process environment");
    }

    if let Err(e) = serve().await {
        error!(?e, "Unable to start student records API");
        std::process::exit(1);
    }
}
