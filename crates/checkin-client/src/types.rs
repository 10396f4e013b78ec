//! Check-in result types.

use serde::Serialize;

use crate::error::{CheckinError, Result};
use crate::geo::GeoPoint;

/// How a check-in attempt ended.
///
/// Only a 200 counts as success. Non-200 answers and network failures are
/// reported as values so the caller decides how to present them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckinOutcome {
    /// HTTP 200.
    Accepted {
        status: u16,
        body: String,
        point: GeoPoint,
    },
    /// Any other HTTP status.
    Rejected {
        status: u16,
        body: String,
        point: GeoPoint,
    },
    /// The request never produced a complete response.
    TransportError { message: String, point: GeoPoint },
}

impl CheckinOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, CheckinOutcome::Accepted { .. })
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            CheckinOutcome::Accepted { status, .. } | CheckinOutcome::Rejected { status, .. } => {
                Some(*status)
            }
            CheckinOutcome::TransportError { .. } => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            CheckinOutcome::Accepted { body, .. } | CheckinOutcome::Rejected { body, .. } => {
                Some(body)
            }
            CheckinOutcome::TransportError { .. } => None,
        }
    }

    /// The coordinate that was submitted.
    pub fn point(&self) -> GeoPoint {
        match self {
            CheckinOutcome::Accepted { point, .. }
            | CheckinOutcome::Rejected { point, .. }
            | CheckinOutcome::TransportError { point, .. } => *point,
        }
    }

    /// Convert into a `Result`, treating anything but 200 as an error.
    pub fn into_result(self) -> Result<CheckinReceipt> {
        match self {
            CheckinOutcome::Accepted {
                status,
                body,
                point,
            } => Ok(CheckinReceipt {
                status,
                body,
                point,
            }),
            CheckinOutcome::Rejected { status, body, .. } => {
                Err(CheckinError::Rejected { status, body })
            }
            CheckinOutcome::TransportError { message, .. } => Err(CheckinError::Transport(message)),
        }
    }
}

/// A successful check-in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckinReceipt {
    pub status: u16,
    pub body: String,
    pub point: GeoPoint,
}
