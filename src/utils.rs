use lambda_http::http::StatusCode;
use lambda_http::{Error, Response};
use serde::Serialize;

const ALLOW_ORIGIN: &str = "*";
const PREFLIGHT_MAX_AGE_SECS: &str = "86400";

pub fn preflight_response() -> Result<Response<String>, Error> {
    let response = Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", ALLOW_ORIGIN)
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .header("Access-Control-Max-Age", PREFLIGHT_MAX_AGE_SECS)
        .body("".to_string())
        .map_err(Box::new)?;

    Ok(response)
}

pub fn json_response(
    status: &StatusCode,
    body: &impl Serialize,
) -> Result<Response<String>, Error> {
    let response = Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", ALLOW_ORIGIN)
        .body(serde_json::to_string(&body)?)
        .map_err(Box::new)?;

    Ok(response)
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn error_response(status: &StatusCode, error: impl ToString) -> Result<Response<String>, Error> {
    json_response(
        status,
        &ErrorBody {
            error: error.to_string(),
        },
    )
}
