//! AWS Lambda handler for forward index projections
//!
//! Accepts assumptions as JSON and returns per-sector contributions plus the
//! headline price, EPS, and P/E. Every request is independent; the reference
//! baseline is loaded once and shared read-only.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use index_projection::{
    load_baseline,
    projection::REFERENCE_HORIZON_PERIODS,
    AssumptionSet, Baseline, ProjectionEngine, ProjectionError, ProjectionResult, ProjectionSummary,
    SectorAssumption,
};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Input configuration for the projection
#[derive(Debug, Deserialize)]
pub struct ProjectionRequest {
    /// Number of annual compounding periods (default: 3)
    #[serde(default = "default_horizon")]
    pub horizon_periods: u32,

    /// Uniform annual growth (fraction) for every sector; requires `global_multiple`
    #[serde(default)]
    pub global_growth: Option<f64>,

    /// Uniform target P/E for every sector; requires `global_growth`
    #[serde(default)]
    pub global_multiple: Option<f64>,

    /// Growth applied to every sector at its current P/E when no global pair is given
    #[serde(default = "default_growth")]
    pub default_growth: f64,

    /// Per-sector assumptions, applied on top of the global/default set
    #[serde(default)]
    pub sectors: Vec<SectorAssumption>,

    /// Override the baseline index level
    #[serde(default)]
    pub base_price: Option<f64>,

    /// Override the reference multiple used to back out base EPS
    #[serde(default)]
    pub reference_multiple: Option<f64>,
}

fn default_horizon() -> u32 { REFERENCE_HORIZON_PERIODS }
fn default_growth() -> f64 { 0.08 }  // 8%

/// Output from the projection
#[derive(Debug, Serialize)]
pub struct ProjectionResponse {
    pub result: ProjectionResult,
    pub summary: ProjectionSummary,
    pub execution_time_ms: u64,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(ThisError, Debug, PartialEq)]
enum RequestError {
    /// Only one half of the global growth/multiple pair was sent
    #[error("global_growth and global_multiple must be given together")]
    IncompleteGlobal,

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

impl RequestError {
    fn status(&self) -> u16 {
        match self {
            RequestError::IncompleteGlobal => 400,
            RequestError::Projection(_) => 422,
        }
    }
}

/// Baseline for this request: the shared reference unless price or multiple is overridden
fn request_baseline(shared: &Baseline, request: &ProjectionRequest) -> Result<Option<Baseline>, ProjectionError> {
    if request.base_price.is_none() && request.reference_multiple.is_none() {
        return Ok(None);
    }

    let mut baseline = Baseline::new(
        request.base_price.unwrap_or(shared.base_index_price()),
        request.reference_multiple.unwrap_or(shared.reference_multiple()),
        shared.records().to_vec(),
    )?;
    if let Some(date) = shared.as_of() {
        baseline = baseline.with_as_of(date);
    }
    Ok(Some(baseline))
}

fn request_assumptions(baseline: &Baseline, request: &ProjectionRequest) -> Result<AssumptionSet, RequestError> {
    let mut set = match (request.global_growth, request.global_multiple) {
        (Some(growth), Some(multiple)) => AssumptionSet::uniform(baseline, growth, multiple),
        (None, None) => AssumptionSet::hold_multiples(baseline, request.default_growth),
        _ => return Err(RequestError::IncompleteGlobal),
    };
    for assumption in &request.sectors {
        set.insert(assumption.clone());
    }
    Ok(set)
}

fn run_request(shared: &Baseline, request: &ProjectionRequest) -> Result<ProjectionResult, RequestError> {
    let owned = request_baseline(shared, request)?;
    let baseline = owned.as_ref().unwrap_or(shared);
    let assumptions = request_assumptions(baseline, request)?;
    Ok(ProjectionEngine::with_horizon(request.horizon_periods).project(baseline, &assumptions)?)
}

fn with_cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

fn json_response<T: Serialize>(status: u16, body: &T) -> Result<Response<Body>, Error> {
    Ok(with_cors(Response::builder())
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::Text(serde_json::to_string(body)?))?)
}

fn error_response(status: u16, message: String) -> Result<Response<Body>, Error> {
    json_response(status, &ErrorBody { error: message })
}

/// Lambda handler function
async fn handler(baseline: &Baseline, event: Request) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(with_cors(Response::builder()).status(200).body(Body::Empty)?);
    }

    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let request: ProjectionRequest = match serde_json::from_str(&body_str) {
        Ok(r) => r,
        Err(e) => return error_response(400, format!("Invalid JSON: {e}")),
    };

    let result = match run_request(baseline, &request) {
        Ok(result) => result,
        Err(e) => {
            log::debug!("Rejected projection request: {e}");
            return error_response(e.status(), e.to_string());
        }
    };

    let response = ProjectionResponse {
        summary: result.summary(),
        result,
        execution_time_ms: start.elapsed().as_millis() as u64,
    };

    json_response(200, &response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let baseline = load_baseline();
    let shared = &baseline;
    run(service_fn(move |event: Request| async move { handler(shared, event).await })).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ProjectionRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_request_uses_defaults() {
        let request = parse("{}");
        assert_eq!(request.horizon_periods, 3);

        let result = run_request(&load_baseline(), &request).unwrap();
        assert_eq!(result.per_sector.len(), 11);
    }

    #[test]
    fn test_global_with_sector_override() {
        let request = parse(
            r#"{"global_growth": 0.07, "global_multiple": 22.0,
                "sectors": [{"sector_id": "Energy", "annual_growth_rate": -0.02, "target_multiple": 11.0}]}"#,
        );
        let baseline = load_baseline();
        let set = request_assumptions(&baseline, &request).unwrap();

        assert_eq!(set.get("Info Tech").unwrap().target_multiple, 22.0);
        assert_eq!(set.get("Energy").unwrap().annual_growth_rate, -0.02);
    }

    #[test]
    fn test_unknown_sector_is_rejected() {
        let request = parse(
            r#"{"sectors": [{"sector_id": "Crypto", "annual_growth_rate": 0.5, "target_multiple": 90.0}]}"#,
        );
        let err = run_request(&load_baseline(), &request).unwrap_err();
        assert!(matches!(err, RequestError::Projection(ProjectionError::AssumptionMismatch { .. })));
        assert_eq!(err.status(), 422);
    }

    #[test]
    fn test_half_global_pair_is_rejected() {
        for body in [r#"{"global_growth": 0.20}"#, r#"{"global_multiple": 18.0}"#] {
            let request = parse(body);
            let baseline = load_baseline();

            assert_eq!(request_assumptions(&baseline, &request).unwrap_err(), RequestError::IncompleteGlobal);
            let err = run_request(&baseline, &request).unwrap_err();
            assert_eq!(err, RequestError::IncompleteGlobal);
            assert_eq!(err.status(), 400);
        }
    }

    #[test]
    fn test_baseline_override() {
        let request = parse(r#"{"base_price": 7000.0, "reference_multiple": 20.0}"#);
        let result = run_request(&load_baseline(), &request).unwrap();

        assert_eq!(result.base_index_price, 7000.0);
        assert_eq!(result.base_index_earnings, 350.0);
    }

    #[test]
    fn test_invalid_reference_multiple() {
        let request = parse(r#"{"reference_multiple": 0.0}"#);
        let err = run_request(&load_baseline(), &request).unwrap_err();
        assert!(matches!(err, RequestError::Projection(ProjectionError::InvalidBaseline { .. })));
    }
}
