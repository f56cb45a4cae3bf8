//! The reservation -> payment flow as an explicit object.
//!
//! Reserving and paying are separate user actions that can be minutes or
//! sessions apart. [`Reservation`] carries the rules between them as data:
//! the price snapshot taken when the activity was read, the set of pending
//! ticket ids, and a pay transition guarded by ticket id. Paying removes the
//! id from the pending set, so a double submit fails locally; the backend
//! itself has no idempotency key, and this object is where that gap shows.

use tracing::debug;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::{Activity, Ticket, TicketStatus};
use crate::session::Session;

/// A successful reservation: tickets in UNPAID status plus the activity
/// price fixed at read time.
pub struct Reservation {
    activity: Activity,
    price_each: f64,
    pending: Vec<Ticket>,
    paid: Vec<Ticket>,
}

impl Reservation {
    /// Fetch the activity, then reserve `quantity` tickets for it. The cap
    /// and the empty-response check live in [`ApiClient::reserve`].
    pub async fn create(
        client: &ApiClient,
        session: &Session,
        activity_id: &str,
        quantity: u32,
    ) -> Result<Self, ClientError> {
        let activity = client.activity(activity_id).await?;
        let price_each = activity.price;
        let pending = client.reserve(session, activity_id, quantity).await?;
        debug!(
            "reservation open: {} pending ticket(s) at {price_each} each",
            pending.len()
        );
        Ok(Self {
            activity,
            price_each,
            pending,
            paid: Vec::new(),
        })
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn pending(&self) -> &[Ticket] {
        &self.pending
    }

    pub fn paid(&self) -> &[Ticket] {
        &self.paid
    }

    /// Total for the tickets still awaiting payment, at the snapshot price.
    pub fn total_price(&self) -> f64 {
        self.price_each * self.pending.len() as f64
    }

    /// Pay one pending ticket. Guarded by ticket id before anything goes on
    /// the wire: an id outside the pending set (including one already paid
    /// through this object) and a ticket no longer UNPAID both fail locally.
    pub async fn pay(
        &mut self,
        client: &ApiClient,
        session: &Session,
        ticket_id: &str,
    ) -> Result<Ticket, ClientError> {
        let index = self
            .pending
            .iter()
            .position(|t| t.id == ticket_id)
            .ok_or_else(|| ClientError::UnknownTicket(ticket_id.to_string()))?;

        let status = self.pending[index].status;
        if status != TicketStatus::Unpaid {
            return Err(ClientError::WrongTicketState {
                ticket_id: ticket_id.to_string(),
                expected: TicketStatus::Unpaid,
                actual: status,
            });
        }

        client.buy(session, ticket_id).await?;

        // UNPAID -> SOLD, never backward; the id leaves the pending set
        let mut ticket = self.pending.remove(index);
        ticket.status = TicketStatus::Sold;
        self.paid.push(ticket.clone());
        Ok(ticket)
    }

    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Pay a ticket held from an earlier session: fetch it by id, require
/// UNPAID, then buy. Returns the ticket as SOLD.
pub async fn pay_ticket(
    client: &ApiClient,
    session: &Session,
    ticket_id: &str,
) -> Result<Ticket, ClientError> {
    let mut ticket = client.ticket(session, ticket_id).await?;
    if ticket.status != TicketStatus::Unpaid {
        return Err(ClientError::WrongTicketState {
            ticket_id: ticket_id.to_string(),
            expected: TicketStatus::Unpaid,
            actual: ticket.status,
        });
    }

    client.buy(session, ticket_id).await?;
    ticket.status = TicketStatus::Sold;
    Ok(ticket)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::Role;

    fn ticket(id: &str, status: TicketStatus) -> Ticket {
        Ticket {
            id: id.into(),
            activity_id: "a1".into(),
            seat_number: 1,
            status,
        }
    }

    fn reservation(pending: Vec<Ticket>) -> Reservation {
        Reservation {
            activity: Activity {
                id: "a1".into(),
                title: "Concert".into(),
                content: "".into(),
                price: 300.0,
                start_time: "2026-09-01T19:00:00Z".into(),
                end_time: "2026-09-01T22:00:00Z".into(),
                on_sale_date: "2026-08-01T00:00:00Z".into(),
                cover_image: "".into(),
                arena_id: "ar1".into(),
                creator_id: "u9".into(),
                is_archived: false,
            },
            price_each: 300.0,
            pending,
            paid: Vec::new(),
        }
    }

    // guards fire before anything touches the client, so a dead address works
    fn dead_client() -> ApiClient {
        ApiClient::new("http://127.0.0.1:9", Duration::from_millis(100)).unwrap()
    }

    fn session() -> Session {
        Session {
            token: "t".into(),
            user_id: "u1".into(),
            email: "a@example.com".into(),
            username: "alice".into(),
            role: Role::User,
            phone_number: "0".into(),
        }
    }

    #[test]
    fn total_price_uses_snapshot_price() {
        let r = reservation(vec![
            ticket("t1", TicketStatus::Unpaid),
            ticket("t2", TicketStatus::Unpaid),
        ]);
        assert_eq!(r.total_price(), 600.0);
        assert!(!r.is_settled());
    }

    #[tokio::test]
    async fn unknown_id_fails_locally() {
        let mut r = reservation(vec![ticket("t1", TicketStatus::Unpaid)]);
        let err = r
            .pay(&dead_client(), &session(), "t9")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::UnknownTicket(id) if id == "t9"));
    }

    #[tokio::test]
    async fn non_unpaid_ticket_fails_locally() {
        let mut r = reservation(vec![ticket("t1", TicketStatus::Sold)]);
        let err = r
            .pay(&dead_client(), &session(), "t1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::WrongTicketState {
                expected: TicketStatus::Unpaid,
                actual: TicketStatus::Sold,
                ..
            }
        ));
    }
}
