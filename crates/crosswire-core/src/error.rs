//! Mapper error handling.
//!
//! Processors raise [`BidiError`]s carrying the mapped wire code; CDP
//! failures are converted at the point where their meaning is known
//! (a CDP error on a user-triggered command is usually `unknown error`,
//! unless the processor maps it to something more specific).

use crosswire_bidi::{BidiError, ErrorCode};
use crosswire_cdp::CdpError;

/// Convert a CDP failure on a user-triggered command into a wire error.
///
/// Connection loss keeps its own message so session teardown is
/// distinguishable in logs; everything else surfaces as `unknown error`
/// with the CDP message attached.
pub fn cdp_to_bidi(err: &CdpError) -> BidiError {
    match err {
        CdpError::ConnectionLost => BidiError::new(ErrorCode::UnknownError, "CDP connection lost"),
        CdpError::SessionClosed(session) => BidiError::new(
            ErrorCode::UnknownError,
            format!("CDP session {session} closed"),
        ),
        other => BidiError::unknown(other.to_string()),
    }
}

/// Shorthand used throughout the processors.
pub type Result<T> = std::result::Result<T, BidiError>;

/// Map a serde parse failure of command params to `invalid argument`.
pub fn invalid_params(err: serde_json::Error) -> BidiError {
    BidiError::invalid_argument(format!("cannot parse params: {err}"))
}
