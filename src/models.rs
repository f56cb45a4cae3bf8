//! Wire types for the ticket shop backend.
//!
//! The backend speaks snake_case JSON with string ids. Older backend
//! revisions used `_id`, image byte buffers and an `is_paid` boolean; those
//! shapes are superseded and not modeled here.

use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use serde::{de, Deserialize, Deserializer, Serialize};

/// Per-user cap on reserved tickets for one activity, enforced before any
/// network call.
pub const MAX_TICKETS_PER_USER: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Host,
    Admin,
}

impl Role {
    /// Hosts and admins may manage activities and arenas.
    pub fn can_host(self) -> bool {
        matches!(self, Role::Host | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::User => "user",
            Role::Host => "host",
            Role::Admin => "admin",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "host" => Ok(Role::Host),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    Unpaid,
    Sold,
    Unsold,
}

impl TicketStatus {
    /// The backend is not consistent about casing or padding, and some
    /// revisions emit RESERVED for a fresh hold. Normalize before matching.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "UNPAID" | "RESERVED" => Some(TicketStatus::Unpaid),
            "SOLD" => Some(TicketStatus::Sold),
            "UNSOLD" => Some(TicketStatus::Unsold),
            _ => None,
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TicketStatus::Unpaid => "UNPAID",
            TicketStatus::Sold => "SOLD",
            TicketStatus::Unsold => "UNSOLD",
        };
        f.write_str(s)
    }
}

impl<'de> Deserialize<'de> for TicketStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        TicketStatus::parse(&raw)
            .ok_or_else(|| de::Error::custom(format!("unknown ticket status {raw:?}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub content: String,
    pub price: f64,
    pub start_time: String,
    pub end_time: String,
    pub on_sale_date: String,
    pub cover_image: String,
    pub arena_id: String,
    pub creator_id: String,
    pub is_archived: bool,
}

impl Activity {
    /// Total for a quantity at the price fixed when the activity was read.
    pub fn total_price(&self, quantity: u32) -> f64 {
        self.price * f64::from(quantity)
    }
}

/// Create/update payload for an activity. The server owns `id`, `creator_id`
/// and `is_archived`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDraft {
    pub title: String,
    pub content: String,
    pub price: f64,
    pub start_time: String,
    pub end_time: String,
    pub on_sale_date: String,
    pub cover_image: String,
    pub arena_id: String,
}

impl From<Activity> for ActivityDraft {
    fn from(a: Activity) -> Self {
        ActivityDraft {
            title: a.title,
            content: a.content,
            price: a.price,
            start_time: a.start_time,
            end_time: a.end_time,
            on_sale_date: a.on_sale_date,
            cover_image: a.cover_image,
            arena_id: a.arena_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub id: String,
    pub title: String,
    pub address: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaDraft {
    pub title: String,
    pub address: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub activity_id: String,
    #[serde(deserialize_with = "seat_number")]
    pub seat_number: u32,
    pub status: TicketStatus,
}

// The API returns the seat as either a number or a string depending on the
// backend revision.
fn seat_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("seat number {s:?} is not numeric"))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    pub role: Role,
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub username: String,
    pub phone_number: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveRequest {
    pub user_id: String,
    pub activity_id: String,
    pub num_tickets: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyRequest {
    pub ticket_id: String,
}

/// Render a backend timestamp for display, falling back to the raw string
/// when it is not RFC 3339.
pub fn format_time(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_normalized() {
        assert_eq!(TicketStatus::parse(" unpaid "), Some(TicketStatus::Unpaid));
        assert_eq!(TicketStatus::parse("RESERVED"), Some(TicketStatus::Unpaid));
        assert_eq!(TicketStatus::parse("Sold"), Some(TicketStatus::Sold));
        assert_eq!(TicketStatus::parse("refunded"), None);
    }

    #[test]
    fn seat_number_accepts_both_shapes() {
        let t: Ticket = serde_json::from_str(
            r#"{"id":"t1","activity_id":"a1","seat_number":12,"status":"UNPAID"}"#,
        )
        .unwrap();
        assert_eq!(t.seat_number, 12);

        let t: Ticket = serde_json::from_str(
            r#"{"id":"t2","activity_id":"a1","seat_number":"34","status":"SOLD"}"#,
        )
        .unwrap();
        assert_eq!(t.seat_number, 34);
        assert_eq!(t.status, TicketStatus::Sold);
    }

    #[test]
    fn bad_seat_number_is_a_decode_error() {
        let res: Result<Ticket, _> = serde_json::from_str(
            r#"{"id":"t3","activity_id":"a1","seat_number":"front row","status":"UNPAID"}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn total_price_is_fixed_at_read_time() {
        let activity = Activity {
            id: "a1".into(),
            title: "Concert".into(),
            content: "".into(),
            price: 1200.0,
            start_time: "2026-09-01T19:00:00Z".into(),
            end_time: "2026-09-01T22:00:00Z".into(),
            on_sale_date: "2026-08-01T00:00:00Z".into(),
            cover_image: "https://img.example/a1.jpg".into(),
            arena_id: "ar1".into(),
            creator_id: "u9".into(),
            is_archived: false,
        };
        assert_eq!(activity.total_price(4), 4800.0);
    }

    #[test]
    fn time_formatting_falls_back_to_raw() {
        assert_eq!(format_time("2026-09-01T19:30:00+08:00"), "2026-09-01 19:30");
        assert_eq!(format_time("soon"), "soon");
    }
}
