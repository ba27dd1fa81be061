//! HTTP API module for the payroll ingestion engine.
//!
//! A thin JSON adapter over the ingestion pipeline and the deduction
//! calculator. Rows arrive already parsed; no file transport happens here.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{DeductionRequest, IngestRequest, select_ruleset};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
