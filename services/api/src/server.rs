use crate::cli::{HiringArgs, ServeArgs};
use crate::infra::{AppState, ServiceMetrics};
use crate::routes::with_service_routes;
use axum::Router;
use std::sync::Arc;
use tracing::{info, warn};
use underwriting::config::AppConfig;
use underwriting::error::AppError;
use underwriting::hiring::{
    hiring_router, HiringOrchestrator, HiringRecord, HttpApprovalVerifier, StoreHiringSink,
};
use underwriting::proposals::{proposal_router, Proposal, ProposalDirectory};
use underwriting::store::open_store;
use underwriting::telemetry;

pub(crate) const PROPOSAL_COLLECTION: &str = "proposals";
pub(crate) const HIRING_COLLECTION: &str = "hiring_records";

fn load_config(mut args: ServeArgs) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    Ok(config)
}

pub(crate) async fn run_proposals(args: ServeArgs) -> Result<(), AppError> {
    let config = load_config(args)?;
    telemetry::init(&config.telemetry)?;

    let store = open_store::<Proposal>(&config.store, PROPOSAL_COLLECTION)?;
    let directory = Arc::new(ProposalDirectory::new(Arc::new(store)));

    let metrics = ServiceMetrics::install();
    let state = AppState::new("proposals", metrics.handle());
    let app = with_service_routes(proposal_router(directory), state.clone(), &metrics);

    serve(&config, app, state).await
}

pub(crate) async fn run_hiring(mut args: HiringArgs) -> Result<(), AppError> {
    let proposal_service_url = args.proposal_service_url.take();
    let mut config = load_config(args.serve)?;
    if let Some(url) = proposal_service_url {
        config.proposal_service.base_url = Some(url);
    }
    telemetry::init(&config.telemetry)?;

    let verifier = HttpApprovalVerifier::new(&config.proposal_service)?;
    match verifier.base_url() {
        Some(url) => info!(proposal_service = url, "approval checks target proposal service"),
        None => warn!("PROPOSAL_SERVICE_BASE_URL is not set; every hire will fail until it is"),
    }

    let store = open_store::<HiringRecord>(&config.store, HIRING_COLLECTION)?;
    let sink = Arc::new(StoreHiringSink::new(Arc::new(store)));
    let orchestrator = Arc::new(HiringOrchestrator::new(Arc::new(verifier), sink));

    let metrics = ServiceMetrics::install();
    let state = AppState::new("hiring", metrics.handle());
    let app = with_service_routes(hiring_router(orchestrator), state.clone(), &metrics);

    serve(&config, app, state).await
}

async fn serve(config: &AppConfig, app: Router, state: AppState) -> Result<(), AppError> {
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    state.mark_ready();
    info!(?config.environment, service = state.service, %addr, "underwriting service ready");
    axum::serve(listener, app).await?;
    Ok(())
}
