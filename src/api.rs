//! Typed client for the ticket shop REST API.
//!
//! One async method per endpoint. Every body goes through [`crate::decode`],
//! every non-2xx through [`api_error`]. Requests are strictly sequential,
//! with no retry and no deduplication, matching the behavior the backend was
//! built against.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::decode::{decode_list, decode_one, decode_wrapped};
use crate::error::ClientError;
use crate::models::{
    Activity, ActivityDraft, Arena, ArenaDraft, BuyRequest, LoginRequest, LoginResponse,
    ProfileUpdate, RegisterRequest, ReserveRequest, Ticket, User, MAX_TICKETS_PER_USER,
};
use crate::session::Session;

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // auth

    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/"))
            .json(request)
            .send()
            .await?;
        let body = read_ok(response).await?;
        decode_one(&body, "register")
    }

    /// Two-step login: fetch the token, then the profile with that token,
    /// and assemble the session from both responses.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let body = read_ok(response).await?;
        let LoginResponse { access_token } = decode_one(&body, "login")?;

        let user = self.user_info(&access_token).await?;
        info!("logged in as {} ({})", user.username, user.role);

        Ok(Session {
            token: access_token,
            user_id: user.id,
            email: user.email,
            username: user.username,
            role: user.role,
            phone_number: user.phone_number,
        })
    }

    pub async fn user_info(&self, token: &str) -> Result<User, ClientError> {
        let response = self
            .http
            .get(self.url("/auth/get_user_info"))
            .bearer_auth(token)
            .send()
            .await?;
        let body = read_ok(response).await?;
        decode_one(&body, "user info")
    }

    pub async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> Result<User, ClientError> {
        let response = self
            .http
            .put(self.url("/auth/"))
            .bearer_auth(&session.token)
            .json(update)
            .send()
            .await?;
        let body = read_ok(response).await?;
        decode_one(&body, "profile update")
    }

    // activities

    pub async fn list_activities(&self) -> Result<Vec<Activity>, ClientError> {
        let response = self.http.get(self.url("/activities/")).send().await?;
        let body = read_ok(response).await?;
        decode_list(&body, "activities", "activity list")
    }

    pub async fn activity(&self, id: &str) -> Result<Activity, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/activities/{id}")))
            .send()
            .await?;
        let body = read_ok(response).await?;
        decode_wrapped(&body, "activity", "activity")
    }

    pub async fn create_activity(
        &self,
        session: &Session,
        draft: &ActivityDraft,
    ) -> Result<Activity, ClientError> {
        let response = self
            .http
            .post(self.url("/activities/"))
            .bearer_auth(&session.token)
            .json(draft)
            .send()
            .await?;
        let body = read_ok(response).await?;
        decode_wrapped(&body, "activity", "activity create")
    }

    pub async fn update_activity(
        &self,
        session: &Session,
        id: &str,
        draft: &ActivityDraft,
    ) -> Result<Activity, ClientError> {
        let response = self
            .http
            .put(self.url(&format!("/activities/{id}")))
            .bearer_auth(&session.token)
            .json(draft)
            .send()
            .await?;
        let body = read_ok(response).await?;
        decode_wrapped(&body, "activity", "activity update")
    }

    /// Activities created by the logged-in host.
    pub async fn host_activities(&self, session: &Session) -> Result<Vec<Activity>, ClientError> {
        let response = self
            .http
            .get(self.url("/activities/list_activities/host"))
            .bearer_auth(&session.token)
            .send()
            .await?;
        let body = read_ok(response).await?;
        decode_list(&body, "activities", "host activity list")
    }

    // arenas

    pub async fn list_arenas(&self) -> Result<Vec<Arena>, ClientError> {
        let response = self.http.get(self.url("/arenas/")).send().await?;
        let body = read_ok(response).await?;
        decode_list(&body, "arenas", "arena list")
    }

    pub async fn create_arena(
        &self,
        session: &Session,
        draft: &ArenaDraft,
    ) -> Result<Arena, ClientError> {
        let response = self
            .http
            .post(self.url("/arenas/"))
            .bearer_auth(&session.token)
            .json(draft)
            .send()
            .await?;
        let body = read_ok(response).await?;
        decode_wrapped(&body, "arena", "arena create")
    }

    // tickets

    /// Reserve up to [`MAX_TICKETS_PER_USER`] tickets. The cap is checked
    /// here, before anything goes on the wire, and a 2xx carrying an empty
    /// array is an error rather than a silent success.
    pub async fn reserve(
        &self,
        session: &Session,
        activity_id: &str,
        quantity: u32,
    ) -> Result<Vec<Ticket>, ClientError> {
        if quantity == 0 || quantity > MAX_TICKETS_PER_USER {
            return Err(ClientError::BadQuantity {
                requested: quantity,
                max: MAX_TICKETS_PER_USER,
            });
        }

        let response = self
            .http
            .post(self.url("/tickets/reserve"))
            .bearer_auth(&session.token)
            .json(&ReserveRequest {
                user_id: session.user_id.clone(),
                activity_id: activity_id.to_string(),
                num_tickets: quantity,
            })
            .send()
            .await?;
        let body = read_ok(response).await?;

        let tickets: Vec<Ticket> = decode_list(&body, "tickets", "reserve")?;
        if tickets.is_empty() {
            return Err(ClientError::EmptyReservation);
        }
        info!(
            "reserved {} ticket(s) for activity {activity_id}",
            tickets.len()
        );
        Ok(tickets)
    }

    pub async fn ticket(&self, session: &Session, id: &str) -> Result<Ticket, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/tickets/{id}")))
            .bearer_auth(&session.token)
            .send()
            .await?;
        let body = read_ok(response).await?;
        decode_wrapped(&body, "ticket", "ticket")
    }

    /// All tickets held by the logged-in user. The backend signals "none"
    /// with a 404 whose body says so; that is an empty list, not a failure.
    pub async fn list_tickets(&self, session: &Session) -> Result<Vec<Ticket>, ClientError> {
        let response = self
            .http
            .get(self.url("/tickets/list_tickets"))
            .bearer_auth(&session.token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            if status == StatusCode::NOT_FOUND && body.contains("No tickets found") {
                debug!("no tickets for this user");
                return Ok(Vec::new());
            }
            return Err(api_error(status, body));
        }

        decode_list(&body, "tickets", "ticket list")
    }

    /// Pay for one reserved ticket. The confirmation body carries no receipt
    /// artifact the client uses, so success is just `Ok(())`.
    pub async fn buy(&self, session: &Session, ticket_id: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url("/tickets/buy"))
            .bearer_auth(&session.token)
            .json(&BuyRequest {
                ticket_id: ticket_id.to_string(),
            })
            .send()
            .await?;
        read_ok(response).await?;
        info!("ticket {ticket_id} paid");
        Ok(())
    }
}

/// Body on success, [`ClientError::Api`] otherwise.
async fn read_ok(response: Response) -> Result<String, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(api_error(status, body))
    }
}

/// Best-effort error detail: the JSON `detail` or `message` field, else the
/// raw body, else the status line.
fn api_error(status: StatusCode, body: String) -> ClientError {
    let detail = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("detail")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    warn!("request failed with {status}: {detail}");
    ClientError::Api { status, detail }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_prefers_detail_field() {
        let err = api_error(
            StatusCode::BAD_REQUEST,
            r#"{"detail":"sold out","message":"ignored"}"#.into(),
        );
        assert_eq!(err.to_string(), "400 Bad Request: sold out");
    }

    #[test]
    fn error_detail_falls_back_to_message_then_text() {
        let err = api_error(StatusCode::CONFLICT, r#"{"message":"already paid"}"#.into());
        assert_eq!(err.to_string(), "409 Conflict: already paid");

        let err = api_error(StatusCode::BAD_GATEWAY, "upstream down".into());
        assert_eq!(err.to_string(), "502 Bad Gateway: upstream down");
    }

    #[test]
    fn error_detail_falls_back_to_status_line() {
        let err = api_error(StatusCode::INTERNAL_SERVER_ERROR, "  ".into());
        assert_eq!(
            err.to_string(),
            "500 Internal Server Error: Internal Server Error"
        );
    }
}
