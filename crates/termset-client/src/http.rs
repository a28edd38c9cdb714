//! Shared reqwest helpers.

use termset_core::error::{AppError, ErrorKind};

/// Header naming the user a call is made for.
pub(crate) const ACTING_USER_HEADER: &str = "X-Acting-User";

/// Map a transport failure.
pub(crate) fn transport_error(what: &str, err: reqwest::Error) -> AppError {
    AppError::with_source(
        ErrorKind::ExternalService,
        format!("{what} failed: {err}"),
        err,
    )
}

/// Turn a non-success response into an `ExternalService` error.
pub(crate) async fn check_status(
    response: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::external(format!("{what} returned {status}: {body}")))
}

/// Decode a JSON body.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<T, AppError> {
    response.json::<T>().await.map_err(|e| {
        AppError::with_source(
            ErrorKind::ExternalService,
            format!("{what} returned an unreadable body: {e}"),
            e,
        )
    })
}
