use crate::infra::{AppState, ServiceMetrics};
use crate::routes::with_service_routes;
use axum::Router;
use chrono::Utc;
use clap::Args;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::error;
use underwriting::config::ProposalServiceConfig;
use underwriting::error::AppError;
use underwriting::hiring::{
    hiring_router, HiringOrchestrator, HiringRecord, HttpApprovalVerifier, StoreHiringSink,
};
use underwriting::proposals::{proposal_router, Proposal, ProposalDirectory};
use underwriting::store::MemoryStore;

#[derive(Args, Debug, Clone)]
pub(crate) struct DemoArgs {
    /// Insured party recorded on the demo proposal
    #[arg(long, default_value = "Maria Souza")]
    pub(crate) insured_party: String,
    /// Insurance product on the demo proposal
    #[arg(long, default_value = "Residencial")]
    pub(crate) product: String,
    /// Proposal amount, as an exact decimal
    #[arg(long, default_value = "1250.00")]
    pub(crate) amount: Decimal,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            insured_party: "Maria Souza".to_string(),
            product: "Residencial".to_string(),
            amount: Decimal::new(1_250_00, 2),
        }
    }
}

struct RunningService {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl RunningService {
    fn stop(self) {
        self.handle.abort();
    }
}

/// Status codes observed while walking the demo.
#[derive(Debug)]
pub(crate) struct DemoSummary {
    pub(crate) proposal_id: Option<String>,
    pub(crate) hire_before_approval: Option<StatusCode>,
    pub(crate) hire_after_approval: Option<StatusCode>,
    pub(crate) hiring_id: Option<String>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    walk_demo(args).await.map(|_| ())
}

pub(crate) async fn walk_demo(args: DemoArgs) -> Result<DemoSummary, AppError> {
    let metrics = ServiceMetrics::install();
    let proposals = start_proposal_service(&metrics).await?;
    let proposal_url = format!("http://{}/proposals", proposals.addr);
    let hiring = start_hiring_service(&metrics, &proposal_url).await?;

    println!("Underwriting demo");
    println!(
        "- proposal service on {} | hiring service on {}",
        proposals.addr, hiring.addr
    );

    let client = reqwest::Client::new();
    let hire_url = format!("http://{}/hire", hiring.addr);
    let summary = walk_scenario(&client, &args, &proposal_url, &hire_url).await;

    proposals.stop();
    hiring.stop();
    summary
}

async fn walk_scenario(
    client: &reqwest::Client,
    args: &DemoArgs,
    proposal_url: &str,
    hire_url: &str,
) -> Result<DemoSummary, AppError> {
    let mut summary = DemoSummary {
        proposal_id: None,
        hire_before_approval: None,
        hire_after_approval: None,
        hiring_id: None,
    };

    let response = client
        .post(proposal_url)
        .json(&json!({
            "createdAt": Utc::now(),
            "insuredParty": args.insured_party,
            "product": args.product,
            "amount": args.amount,
            "status": "UnderReview",
        }))
        .send()
        .await?;
    if response.status() != StatusCode::CREATED {
        println!("  Proposal rejected with status {}", response.status());
        return Ok(summary);
    }
    let proposal: Value = response.json().await?;
    let Some(proposal_id) = proposal.get("id").and_then(Value::as_str).map(str::to_string) else {
        println!("  Proposal service returned no id");
        return Ok(summary);
    };
    println!(
        "- Created proposal {} for {} ({} {}) -> {}",
        proposal_id,
        args.insured_party,
        args.product,
        args.amount,
        proposal.get("status").and_then(Value::as_str).unwrap_or("?")
    );
    summary.proposal_id = Some(proposal_id.clone());

    let (status, body) = hire(client, hire_url, &proposal_id).await?;
    println!("- Hire while under review -> {} {}", status.as_u16(), describe(&body));
    summary.hire_before_approval = Some(status);

    let response = client
        .put(format!("{proposal_url}/{proposal_id}/status"))
        .json(&json!({ "status": "Approved" }))
        .send()
        .await?;
    println!("- Approve proposal -> {}", response.status().as_u16());
    if !response.status().is_success() {
        return Ok(summary);
    }

    let (status, body) = hire(client, hire_url, &proposal_id).await?;
    println!("- Hire once approved -> {} {}", status.as_u16(), describe(&body));
    summary.hire_after_approval = Some(status);
    summary.hiring_id = body
        .get("hiringId")
        .and_then(Value::as_str)
        .map(str::to_string);

    let listing: Value = client
        .get(proposal_url)
        .query(&[("page", "1"), ("pageSize", "10")])
        .send()
        .await?
        .json()
        .await?;
    println!(
        "- Proposal listing: {} total across {} page(s)",
        listing.get("totalCount").unwrap_or(&Value::Null),
        listing.get("totalPages").unwrap_or(&Value::Null)
    );

    Ok(summary)
}

async fn hire(
    client: &reqwest::Client,
    hire_url: &str,
    proposal_id: &str,
) -> Result<(StatusCode, Value), AppError> {
    let response = client
        .post(hire_url)
        .json(&json!({ "proposalId": proposal_id, "requestedAt": Utc::now() }))
        .send()
        .await?;
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    Ok((status, body))
}

fn describe(body: &Value) -> String {
    if let Some(message) = body.get("error").and_then(Value::as_str) {
        return format!("({message})");
    }
    match (body.get("hiringId"), body.get("hiredAt")) {
        (Some(id), Some(at)) => format!("(hiring {id} at {at})"),
        _ => String::new(),
    }
}

async fn start_proposal_service(metrics: &ServiceMetrics) -> Result<RunningService, AppError> {
    let store = Arc::new(MemoryStore::<Proposal>::default());
    let directory = Arc::new(ProposalDirectory::new(store));
    let state = AppState::new("proposals", metrics.handle());
    let app = with_service_routes(proposal_router(directory), state.clone(), metrics);
    spawn_service(app, state).await
}

async fn start_hiring_service(
    metrics: &ServiceMetrics,
    proposal_url: &str,
) -> Result<RunningService, AppError> {
    let verifier = HttpApprovalVerifier::new(&ProposalServiceConfig {
        base_url: Some(proposal_url.to_string()),
        timeout: Duration::from_secs(5),
    })?;
    let sink = Arc::new(StoreHiringSink::new(Arc::new(
        MemoryStore::<HiringRecord>::default(),
    )));
    let orchestrator = Arc::new(HiringOrchestrator::new(Arc::new(verifier), sink));
    let state = AppState::new("hiring", metrics.handle());
    let app = with_service_routes(hiring_router(orchestrator), state.clone(), metrics);
    spawn_service(app, state).await
}

async fn spawn_service(app: Router, state: AppState) -> Result<RunningService, AppError> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    state.mark_ready();
    let handle = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!(service = state.service, error = %err, "demo service stopped");
        }
    });
    Ok(RunningService { addr, handle })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_hires_only_after_approval() {
        let summary = walk_demo(DemoArgs::default()).await.expect("demo runs");

        assert!(summary.proposal_id.is_some());
        assert_eq!(summary.hire_before_approval, Some(StatusCode::BAD_REQUEST));
        assert_eq!(summary.hire_after_approval, Some(StatusCode::OK));
        assert!(summary.hiring_id.is_some());
    }
}
