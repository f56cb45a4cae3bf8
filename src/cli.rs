//! Command-line front end: browsing the activity listings, account and
//! profile management, host-side activity and arena administration, the
//! order list, and the reserve/pay pair.

use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;
use clap::{Parser, Subcommand};

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::ClientError;
use crate::flow::{pay_ticket, Reservation};
use crate::models::{
    format_time, Activity, ActivityDraft, ArenaDraft, ProfileUpdate, RegisterRequest, Role, Ticket,
    TicketStatus,
};
use crate::session::{FileStore, SessionManager};

#[derive(Parser)]
#[command(name = "boxoffice", version, about = "Ticket shop client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "user")]
        role: Role,
        #[arg(long)]
        phone: String,
    },
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Drop the persisted session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Update username and/or phone number
    Settings {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    #[command(subcommand)]
    Activities(ActivitiesCommand),
    #[command(subcommand)]
    Arenas(ArenasCommand),
    #[command(subcommand)]
    Tickets(TicketsCommand),
}

#[derive(Subcommand)]
pub enum ActivitiesCommand {
    /// All activities on sale
    List,
    /// One activity in full
    Show { id: String },
    /// Activities created by the logged-in host
    Mine,
    /// Create an activity (host only)
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        start_time: String,
        #[arg(long)]
        end_time: String,
        #[arg(long)]
        on_sale_date: String,
        #[arg(long)]
        cover_image: String,
        #[arg(long)]
        arena_id: String,
    },
    /// Edit an activity; unspecified fields keep their current value
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        start_time: Option<String>,
        #[arg(long)]
        end_time: Option<String>,
        #[arg(long)]
        on_sale_date: Option<String>,
        #[arg(long)]
        cover_image: Option<String>,
        #[arg(long)]
        arena_id: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ArenasCommand {
    List,
    /// Create a venue (host only)
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        capacity: u32,
    },
}

#[derive(Subcommand)]
pub enum TicketsCommand {
    /// Tickets held by the logged-in user
    List {
        #[arg(long, default_value = "all")]
        filter: TicketFilter,
    },
    Show {
        id: String,
    },
    /// Reserve tickets for an activity; payment is a separate step
    Reserve {
        activity_id: String,
        #[arg(long, default_value = "1")]
        quantity: u32,
    },
    /// Pay for one reserved ticket
    Pay {
        ticket_id: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum TicketFilter {
    All,
    Paid,
    Unpaid,
}

impl TicketFilter {
    fn keeps(self, ticket: &Ticket) -> bool {
        match self {
            TicketFilter::All => true,
            TicketFilter::Paid => ticket.status == TicketStatus::Sold,
            TicketFilter::Unpaid => ticket.status == TicketStatus::Unpaid,
        }
    }
}

impl FromStr for TicketFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TicketFilter::All),
            "paid" => Ok(TicketFilter::Paid),
            "unpaid" => Ok(TicketFilter::Unpaid),
            other => Err(format!("unknown filter {other:?}, expected all|paid|unpaid")),
        }
    }
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let client = ApiClient::new(
        config.api_url.clone(),
        Duration::from_millis(config.timeout_ms),
    )?;
    let mut manager = SessionManager::new(Box::new(FileStore::new(config.session_file.clone())));

    match dispatch(cli.command, &client, &mut manager).await {
        Ok(()) => Ok(()),
        Err(ClientError::NotLoggedIn) => Err(anyhow!(
            "you are not logged in; run `boxoffice login --email <email> --password <password>` first"
        )),
        Err(e) => Err(e.into()),
    }
}

async fn dispatch(
    command: Command,
    client: &ApiClient,
    manager: &mut SessionManager,
) -> Result<(), ClientError> {
    match command {
        Command::Register {
            email,
            password,
            username,
            role,
            phone,
        } => {
            let user = client
                .register(&RegisterRequest {
                    email,
                    password,
                    username,
                    role,
                    phone_number: phone,
                })
                .await?;
            println!("registered {} ({})", user.username, user.email);
        }

        Command::Login { email, password } => {
            let session = client.login(&email, &password).await?;
            println!("logged in as {} [{}]", session.username, session.role);
            manager.set_session(session)?;
        }

        Command::Logout => {
            manager.clear_session()?;
            println!("logged out");
        }

        Command::Whoami => {
            let session = manager.require()?;
            println!("{} <{}>", session.username, session.email);
            println!("role:  {}", session.role);
            println!("phone: {}", session.phone_number);
        }

        Command::Settings { username, phone } => {
            let session = manager.require()?.clone();
            let update = ProfileUpdate {
                username: username.unwrap_or_else(|| session.username.clone()),
                phone_number: phone.unwrap_or_else(|| session.phone_number.clone()),
                role: session.role,
            };
            client.update_profile(&session, &update).await?;

            // keep the persisted session in step with the server
            let mut updated = session;
            updated.username = update.username;
            updated.phone_number = update.phone_number;
            manager.set_session(updated)?;
            println!("profile updated");
        }

        Command::Activities(cmd) => run_activities(cmd, client, manager).await?,
        Command::Arenas(cmd) => run_arenas(cmd, client, manager).await?,
        Command::Tickets(cmd) => run_tickets(cmd, client, manager).await?,
    }

    Ok(())
}

async fn run_activities(
    command: ActivitiesCommand,
    client: &ApiClient,
    manager: &SessionManager,
) -> Result<(), ClientError> {
    match command {
        ActivitiesCommand::List => {
            let activities = client.list_activities().await?;
            if activities.is_empty() {
                println!("no activities on sale");
            }
            for a in &activities {
                print_activity_row(a);
            }
        }

        ActivitiesCommand::Show { id } => {
            let a = client.activity(&id).await?;
            println!("{} ({})", a.title, a.id);
            println!("  price:    {}", a.price);
            println!(
                "  runs:     {} to {}",
                format_time(&a.start_time),
                format_time(&a.end_time)
            );
            println!("  on sale:  {}", format_time(&a.on_sale_date));
            println!("  arena:    {}", a.arena_id);
            println!("  cover:    {}", a.cover_image);
            if a.is_archived {
                println!("  archived");
            }
            println!("{}", a.content);
        }

        ActivitiesCommand::Mine => {
            let session = require_host(manager)?;
            let activities = client.host_activities(session).await?;
            if activities.is_empty() {
                println!("you have not created any activities");
            }
            for a in &activities {
                print_activity_row(a);
            }
        }

        ActivitiesCommand::Create {
            title,
            content,
            price,
            start_time,
            end_time,
            on_sale_date,
            cover_image,
            arena_id,
        } => {
            let session = require_host(manager)?;
            let created = client
                .create_activity(
                    session,
                    &ActivityDraft {
                        title,
                        content,
                        price,
                        start_time,
                        end_time,
                        on_sale_date,
                        cover_image,
                        arena_id,
                    },
                )
                .await?;
            println!("created activity {} ({})", created.title, created.id);
        }

        ActivitiesCommand::Edit {
            id,
            title,
            content,
            price,
            start_time,
            end_time,
            on_sale_date,
            cover_image,
            arena_id,
        } => {
            let session = require_host(manager)?;
            // prefill from the current record
            let current = client.activity(&id).await?;
            let mut draft = ActivityDraft::from(current);
            if let Some(v) = title {
                draft.title = v;
            }
            if let Some(v) = content {
                draft.content = v;
            }
            if let Some(v) = price {
                draft.price = v;
            }
            if let Some(v) = start_time {
                draft.start_time = v;
            }
            if let Some(v) = end_time {
                draft.end_time = v;
            }
            if let Some(v) = on_sale_date {
                draft.on_sale_date = v;
            }
            if let Some(v) = cover_image {
                draft.cover_image = v;
            }
            if let Some(v) = arena_id {
                draft.arena_id = v;
            }
            let updated = client.update_activity(session, &id, &draft).await?;
            println!("updated activity {} ({})", updated.title, updated.id);
        }
    }

    Ok(())
}

async fn run_arenas(
    command: ArenasCommand,
    client: &ApiClient,
    manager: &SessionManager,
) -> Result<(), ClientError> {
    match command {
        ArenasCommand::List => {
            let arenas = client.list_arenas().await?;
            if arenas.is_empty() {
                println!("no arenas");
            }
            for arena in &arenas {
                println!(
                    "{}  {} ({}, capacity {})",
                    arena.id, arena.title, arena.address, arena.capacity
                );
            }
        }

        ArenasCommand::Create {
            title,
            address,
            capacity,
        } => {
            let session = require_host(manager)?;
            let created = client
                .create_arena(
                    session,
                    &ArenaDraft {
                        title,
                        address,
                        capacity,
                    },
                )
                .await?;
            println!("created arena {} ({})", created.title, created.id);
        }
    }

    Ok(())
}

async fn run_tickets(
    command: TicketsCommand,
    client: &ApiClient,
    manager: &SessionManager,
) -> Result<(), ClientError> {
    let session = manager.require()?;

    match command {
        TicketsCommand::List { filter } => {
            let tickets = client.list_tickets(session).await?;
            let shown: Vec<_> = tickets.iter().filter(|t| filter.keeps(t)).collect();
            if shown.is_empty() {
                println!("no tickets");
            }
            for t in shown {
                print_ticket_row(t);
            }
        }

        TicketsCommand::Show { id } => {
            let t = client.ticket(session, &id).await?;
            print_ticket_row(&t);
        }

        TicketsCommand::Reserve {
            activity_id,
            quantity,
        } => {
            let reservation = Reservation::create(client, session, &activity_id, quantity).await?;
            println!(
                "reserved {} ticket(s) for {} - total {}",
                reservation.pending().len(),
                reservation.activity().title,
                reservation.total_price()
            );
            for t in reservation.pending() {
                print_ticket_row(t);
            }
            println!("pay with: boxoffice tickets pay <ticket-id>");
        }

        TicketsCommand::Pay { ticket_id } => {
            let paid = pay_ticket(client, session, &ticket_id).await?;
            println!("payment accepted");
            print_ticket_row(&paid);
        }
    }

    Ok(())
}

fn require_host(manager: &SessionManager) -> Result<&crate::session::Session, ClientError> {
    let session = manager.require()?;
    if !session.role.can_host() {
        return Err(ClientError::HostRequired);
    }
    Ok(session)
}

fn print_activity_row(a: &Activity) {
    println!(
        "{}  {}  {}  price {}{}",
        a.id,
        a.title,
        format_time(&a.start_time),
        a.price,
        if a.is_archived { "  [archived]" } else { "" }
    );
}

fn print_ticket_row(t: &Ticket) {
    println!(
        "{}  activity {}  seat {}  {}",
        t.id, t.activity_id, t.seat_number, t.status
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TicketStatus;

    fn ticket(status: TicketStatus) -> Ticket {
        Ticket {
            id: "t1".into(),
            activity_id: "a1".into(),
            seat_number: 1,
            status,
        }
    }

    #[test]
    fn filter_parses_and_matches() {
        let unpaid = ticket(TicketStatus::Unpaid);
        let sold = ticket(TicketStatus::Sold);

        let f: TicketFilter = "Unpaid".parse().unwrap();
        assert!(f.keeps(&unpaid));
        assert!(!f.keeps(&sold));

        let f: TicketFilter = "paid".parse().unwrap();
        assert!(f.keeps(&sold));
        assert!(!f.keeps(&unpaid));

        assert!("everything".parse::<TicketFilter>().is_err());
    }

    #[test]
    fn cli_parses_reserve_with_quantity() {
        let cli = Cli::try_parse_from([
            "boxoffice", "tickets", "reserve", "a1", "--quantity", "3",
        ])
        .unwrap();
        match cli.command {
            Command::Tickets(TicketsCommand::Reserve {
                activity_id,
                quantity,
            }) => {
                assert_eq!(activity_id, "a1");
                assert_eq!(quantity, 3);
            }
            _ => panic!("wrong command parsed"),
        }
    }
}
