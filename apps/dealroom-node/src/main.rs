mod directory;
mod mailer;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dealroom_access::UserId;
use dealroom_service::{
    conversations_list, deals_compare, investment_track, investments_list, investments_summary,
    message_send, messages_fetch, messages_mark_read, messages_unread_count, notes_save,
    watchlist_add, watchlist_contains, watchlist_list, watchlist_remove, watchlist_toggle,
    DealRequest, DealRoomState, ErrorResponse, FetchMessagesRequest, MarkReadRequest,
    SaveNotesRequest, SendMessageRequest, ServiceConfig, TrackInvestmentRequest, WatchlistView,
};
use dealroom_store::{ActivityLog, DealId, MessageId, PersistenceConfig};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::directory::Directory;
use crate::mailer::LogMailer;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database
    #[arg(long, default_value = "dealroom.db")]
    db: PathBuf,

    /// JSON file listing users and deals
    #[arg(long)]
    directory: Option<PathBuf>,

    /// Base URL used in reply links
    #[arg(long, default_value = "http://localhost")]
    site_url: String,

    /// Seconds between polls when following a thread (default: 30)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval: Option<u64>,

    /// Id of the user performing the operation
    #[arg(short, long)]
    user: UserId,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a message
    Send {
        #[arg(long)]
        to: UserId,
        #[arg(long)]
        deal: Option<DealId>,
        body: String,
    },
    /// Show the thread with a user and mark it read
    Fetch {
        #[arg(long)]
        with: UserId,
        #[arg(long)]
        deal: Option<DealId>,
        #[arg(long)]
        since: Option<MessageId>,
        /// Keep polling for new messages until interrupted
        #[arg(long)]
        follow: bool,
    },
    /// Mark messages read
    MarkRead { ids: Vec<MessageId> },
    /// Number of unread messages
    Unread,
    /// List conversations
    Conversations,
    /// List the watchlist
    Watchlist {
        /// Apply the public listing policy
        #[arg(long)]
        public: bool,
    },
    /// Add or remove a deal from the watchlist
    Toggle { deal: DealId },
    /// Add a deal to the watchlist
    Add { deal: DealId },
    /// Remove a deal from the watchlist
    Remove { deal: DealId },
    /// Whether a deal is in the watchlist
    Contains { deal: DealId },
    /// Track an investment
    Track {
        deal: DealId,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List tracked investments
    Investments,
    /// Pipeline summary
    Summary,
    /// Save private notes on a deal
    Notes { deal: DealId, text: String },
    /// Compare deals side by side
    Compare { deals: Vec<DealId> },
    /// Recent activity of the user
    Activity {
        #[arg(long)]
        limit: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let args = Args::parse();

    let mut persistence = PersistenceConfig {
        db_path: args.db.clone(),
        ..Default::default()
    };
    if let Some(seconds) = args.poll_interval {
        persistence.poll_interval_seconds = seconds;
    }
    let db = dealroom_store::connect(&persistence).await?;

    let directory = Arc::new(match &args.directory {
        Some(path) => Directory::load(path)?,
        None => Directory::default(),
    });

    let config = ServiceConfig {
        site_url: args.site_url.clone(),
        ..Default::default()
    };
    let state = DealRoomState::new(
        db.clone(),
        config,
        directory.clone(),
        directory,
        Arc::new(LogMailer),
    );

    let caller = args.user;
    let code = match args.command {
        Command::Send { to, deal, body } => {
            let request = SendMessageRequest {
                recipient_id: to,
                body,
                deal_id: deal,
            };
            print(message_send(caller, request, &state).await)?
        }
        Command::Fetch {
            with,
            deal,
            since,
            follow,
        } => {
            let request = FetchMessagesRequest {
                counterparty_id: with,
                deal_id: deal,
                since_id: since,
            };
            if follow {
                follow_thread(caller, request, &state, persistence.poll_interval()).await?
            } else {
                print(messages_fetch(caller, request, &state).await)?
            }
        }
        Command::MarkRead { ids } => {
            let request = MarkReadRequest { message_ids: ids };
            print(messages_mark_read(caller, request, &state).await)?
        }
        Command::Unread => print(messages_unread_count(caller, &state).await)?,
        Command::Conversations => print(conversations_list(caller, &state).await)?,
        Command::Watchlist { public } => {
            let view = if public {
                WatchlistView::Public
            } else {
                WatchlistView::Investor
            };
            print(watchlist_list(caller, view, &state).await)?
        }
        Command::Toggle { deal } => {
            print(watchlist_toggle(caller, DealRequest { deal_id: deal }, &state).await)?
        }
        Command::Add { deal } => {
            print(watchlist_add(caller, DealRequest { deal_id: deal }, &state).await)?
        }
        Command::Remove { deal } => {
            print(watchlist_remove(caller, DealRequest { deal_id: deal }, &state).await)?
        }
        Command::Contains { deal } => {
            print(watchlist_contains(caller, DealRequest { deal_id: deal }, &state).await)?
        }
        Command::Track {
            deal,
            status,
            amount,
            notes,
        } => {
            let request = TrackInvestmentRequest {
                deal_id: deal,
                status,
                amount,
                notes,
            };
            print(investment_track(caller, request, &state).await)?
        }
        Command::Investments => print(investments_list(caller, &state).await)?,
        Command::Summary => print(investments_summary(caller, &state).await)?,
        Command::Notes { deal, text } => {
            let request = SaveNotesRequest {
                deal_id: deal,
                notes: text,
            };
            print(notes_save(caller, request, &state).await)?
        }
        Command::Compare { deals } => print(deals_compare(caller, &deals, &state).await)?,
        Command::Activity { limit } => {
            let limit = limit.unwrap_or(persistence.activity_page_size);
            let entries = ActivityLog::new(db).for_user(caller, limit).await?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
            ExitCode::SUCCESS
        }
    };

    state.notifications.drain().await;
    Ok(code)
}

/// Poll a thread every `every`, printing each new message as one JSON line,
/// until Ctrl+C.
async fn follow_thread(
    caller: UserId,
    mut request: FetchMessagesRequest,
    state: &DealRoomState,
    every: Duration,
) -> anyhow::Result<ExitCode> {
    let mut ticker = tokio::time::interval(every);
    info!("Following thread with {} every {:?}", request.counterparty_id, every);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let batch = match messages_fetch(caller, request.clone(), state).await {
                    Ok(batch) => batch,
                    Err(e) => {
                        println!("{}", serde_json::to_string(&ErrorResponse::from(&e))?);
                        return Ok(ExitCode::FAILURE);
                    }
                };
                for message in &batch {
                    println!("{}", serde_json::to_string(message)?);
                }
                if let Some(last_id) = batch.iter().map(|m| m.id).max() {
                    request.since_id = Some(last_id);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopped following");
                return Ok(ExitCode::SUCCESS);
            }
        }
    }
}

/// Print the result as JSON on stdout. Errors are printed as an
/// [`ErrorResponse`] and turn into a failing exit code.
fn print<T: Serialize>(result: dealroom_service::Result<T>) -> anyhow::Result<ExitCode> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&ErrorResponse::from(&e))?);
            Ok(ExitCode::FAILURE)
        }
    }
}
