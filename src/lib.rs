//! # Boxoffice
//!
//! Client library for the ticket shop REST backend. Everything that counts
//! (inventory, seat allocation, payment settlement, authorization) lives
//! server side; this crate owns the contract with it and the client-side
//! sequencing rules around reservation and payment.
//!
//! ## Purchase flow
//!
//! 1. Fetch the activity (unauthenticated GET). The price read here is the
//!    price used for the total, fixed at read time.
//! 2. `POST /tickets/reserve` with user id, activity id and a quantity capped
//!    at 4 per user. The server allocates tickets and returns them in UNPAID
//!    status. An empty array on a 2xx is treated as a failure, never a
//!    silent success.
//! 3. Payment is a separate, later action: `POST /tickets/buy` with one
//!    ticket id. On success the ticket is SOLD. Tickets only ever move
//!    UNPAID -> SOLD.
//!
//! There is no retry, no idempotency key and no request deduplication, same
//! as the backend contract. [`flow`] makes the transition explicit so the
//! missing double-submit guard is visible instead of being implied by
//! navigation order.
//!
//! ## Session
//!
//! The session (token plus profile fields) is an explicit object behind
//! [`session::SessionStore`], with a JSON file backend for the CLI and an
//! in-memory one for tests. No expiry metadata is kept; a stale token is
//! only discovered when a guarded request comes back non-2xx.

pub mod api;
pub mod cli;
pub mod config;
pub mod decode;
pub mod error;
pub mod flow;
pub mod models;
pub mod session;
