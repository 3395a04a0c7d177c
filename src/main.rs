use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use mortgage_intake::config::AppConfig;
use mortgage_intake::error::AppError;
use mortgage_intake::telemetry;
use mortgage_intake::workflows::intake::{
    intake_router, AggregateBuilder, ApplicationPayload, BuildError, DerivationEngine,
    LoanIntakeService, MemoryRepository,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Mortgage Intake Service",
    about = "Assemble mortgage applications and derive underwriting figures",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Build a payload from a JSON file and print the outcome
    Score(ScoreArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Path to a JSON application payload
    payload: PathBuf,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Score(args) => run_score(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let repository = Arc::new(MemoryRepository::default());
    let service = Arc::new(LoanIntakeService::new(repository));

    let infra = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state);

    let app = infra.merge(intake_router(service)).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "mortgage intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.payload)?;
    let payload: ApplicationPayload = serde_json::from_str(&raw)?;

    let builder = AggregateBuilder::new(DerivationEngine::for_today());
    match builder.build(payload) {
        Ok(aggregate) => {
            let computed = &aggregate.application.computed;
            println!("Application {} accepted", aggregate.application.application_number);
            println!("Borrowers: {}", aggregate.borrowers.len());
            println!("Loan-to-value: {}%", computed.loan_to_value_percent);
            println!("Total monthly income: {}", computed.total_monthly_income);
            println!("Total monthly debt: {}", computed.total_monthly_debt);
            println!("Debt-to-income ratio: {}", computed.debt_to_income_ratio);
            for borrower in &aggregate.borrowers {
                if let Some(declaration) = &borrower.declaration {
                    println!(
                        "Borrower {} risk score: {} ({})",
                        borrower.sequence_number,
                        declaration.computed.risk_score,
                        declaration.computed.risk_level.label()
                    );
                }
            }
        }
        Err(BuildError::Structural(violation)) => {
            println!("Payload is malformed:");
            println!("- {}: {}", violation.field_path, violation.message);
        }
        Err(BuildError::Rejected { violations, .. }) => {
            println!("Application rejected with {} violation(s):", violations.len());
            for violation in &violations {
                println!("- {}: {}", violation.field_path, violation.message);
            }
        }
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
