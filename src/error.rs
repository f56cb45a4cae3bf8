use reqwest::StatusCode;
use thiserror::Error;

use crate::models::TicketStatus;

/// Everything the backend or the local guards can throw at a caller. All of
/// these are recoverable values; library code never panics on backend
/// misbehavior.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response. `detail` is best effort: the JSON `detail` or
    /// `message` field, else the raw body, else the status line.
    #[error("{status}: {detail}")]
    Api { status: StatusCode, detail: String },

    #[error("unexpected response shape ({context})")]
    UnexpectedShape { context: String },

    #[error("not logged in")]
    NotLoggedIn,

    #[error("requested {requested} tickets, allowed 1..={max} per user")]
    BadQuantity { requested: u32, max: u32 },

    #[error("reservation succeeded but returned no tickets")]
    EmptyReservation,

    #[error("ticket {ticket_id} is {actual}, expected {expected}")]
    WrongTicketState {
        ticket_id: String,
        expected: TicketStatus,
        actual: TicketStatus,
    },

    #[error("ticket {0} is not part of this reservation")]
    UnknownTicket(String),

    #[error("host account required for this operation")]
    HostRequired,

    #[error("session storage: {0}")]
    Session(#[from] std::io::Error),
}

impl ClientError {
    pub fn shape(context: impl Into<String>) -> Self {
        ClientError::UnexpectedShape {
            context: context.into(),
        }
    }

    /// Status code of the failed request, if this error came off the wire.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
