//! Request parsing for the journal server.

use axum::http::HeaderMap;

use crate::error::{Error, Result};
use crate::model::{CORRELATION_ID_HEADER, Scope};

/// Resolves the write-side scope from the `x-correlation-id` header.
///
/// A missing header selects [`Scope::unknown`]. A header that is not valid
/// UTF-8, or not a valid scope id, is rejected.
pub fn scope_from_headers(headers: &HeaderMap) -> Result<Scope> {
    let correlation_id = headers
        .get(CORRELATION_ID_HEADER)
        .map(|value| {
            value.to_str().map_err(|_| {
                Error::InvalidScope(format!("{} is not valid UTF-8", CORRELATION_ID_HEADER))
            })
        })
        .transpose()?;
    Scope::from_correlation_id(correlation_id)
}
