use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use tempmail_client::auth::session::SessionManager;
use tempmail_client::config::{bundled_store_template, load_config, resolve_store_path};
use tempmail_client::daemon::{StartWith, WatchConfig, run_watch};
use tempmail_client::domain::account::SavedAddress;
use tempmail_client::mail::mailtm::MailTmClient;
use tempmail_client::store::order::{commit_order, matches_filter, move_address, reorder_allowed};
use tempmail_client::store::{AddressRepository, JsonAddressStore};

#[derive(Parser)]
#[command(name = "tempmail")]
#[command(about = "Disposable mailbox client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a fresh random mailbox
    New {
        /// Add it to the saved addresses
        #[arg(long)]
        save: bool,
    },

    /// List the messages of a saved mailbox
    Inbox { address: String },

    /// Print one message and mark it read
    Read { address: String, id: String },

    /// Poll a mailbox and print messages as they arrive
    Watch {
        /// Saved address to watch
        address: Option<String>,

        /// Create a new mailbox instead
        #[arg(long, conflicts_with = "address")]
        new: bool,

        /// Save the new mailbox once it is created
        #[arg(long, requires = "new")]
        save: bool,

        /// Desktop notification for each new unread message
        #[arg(long)]
        notify: bool,
    },

    /// Manage saved addresses
    Saved {
        #[command(subcommand)]
        cmd: SavedCommand,
    },
}

#[derive(Subcommand)]
enum SavedCommand {
    List {
        #[arg(long)]
        filter: Option<String>,
    },
    Add {
        address: String,
        password: String,
    },
    /// Set the stage/prod/name fields; omitted flags keep their value,
    /// an empty value clears the field
    Edit {
        address: String,
        #[arg(long)]
        stage: Option<String>,
        #[arg(long)]
        prod: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    Rm {
        address: String,
    },
    /// Move an address to a 1-based position
    Move {
        address: String,
        position: usize,
        /// Filter the list is being viewed with; moving is refused while set
        #[arg(long)]
        filter: Option<String>,
    },
    /// Save a new order; every saved address must be listed exactly once
    Reorder {
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// Open the folder holding the saved addresses
    Folder,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
    let store_path = resolve_store_path(&cfg);
    let store = JsonAddressStore::open_seeded(&store_path, bundled_store_template().as_deref());

    match cli.cmd {
        Command::Saved { cmd } => run_saved(&store, cmd),

        Command::New { save } => {
            let sessions = SessionManager::new(MailTmClient::from_config(&cfg)?);
            let s = sessions.create_new_account()?;
            println!("Address:  {}", s.address);
            println!("Password: {}", s.password);
            if save {
                save_session(&store, &s.address, &s.password);
            }
            Ok(())
        }

        Command::Inbox { address } => {
            let creds = saved_credentials(&store, &address)?;
            let sessions = SessionManager::new(MailTmClient::from_config(&cfg)?);
            let s = sessions.login(&creds.address, &creds.password)?;
            let msgs = sessions
                .poll_messages(&s)
                .ok_or_else(|| anyhow!("a listing is already running"))??;
            if msgs.is_empty() {
                println!("No messages for {}", s.address);
            }
            for m in &msgs {
                println!("{}", m.list_line());
            }
            Ok(())
        }

        Command::Read { address, id } => {
            let creds = saved_credentials(&store, &address)?;
            let sessions = SessionManager::new(MailTmClient::from_config(&cfg)?);
            let s = sessions.login(&creds.address, &creds.password)?;
            let msg = sessions.fetch_message(&s, &id)?;
            if let Err(e) = sessions.mark_seen(&s, &id) {
                log::warn!("{e}");
            }
            println!("FROM: {} <{}>", msg.from.name, msg.from.address);
            println!("SUBJECT: {}", msg.subject);
            println!("DATE: {}", msg.short_date());
            println!("{}\n", "_".repeat(50));
            println!("{}", msg.display_text());
            Ok(())
        }

        Command::Watch {
            address,
            new,
            save,
            notify,
        } => {
            let start = if new {
                StartWith::NewAccount
            } else {
                let address =
                    address.ok_or_else(|| anyhow!("give a saved address or --new"))?;
                let creds = saved_credentials(&store, &address)?;
                StartWith::Login {
                    address: creds.address,
                    password: creds.password,
                }
            };
            let sessions = Arc::new(SessionManager::new(MailTmClient::from_config(&cfg)?));
            run_watch(
                sessions,
                start,
                WatchConfig {
                    poll_interval: cfg.poll_interval(),
                    notify,
                },
                |s| {
                    if save {
                        save_session(&store, &s.address, &s.password);
                    }
                },
            )?;
            Ok(())
        }
    }
}

fn saved_credentials(store: &JsonAddressStore, address: &str) -> Result<SavedAddress> {
    store
        .find(address)
        .ok_or_else(|| anyhow!("{address} is not in the saved addresses"))
}

fn save_session(store: &JsonAddressStore, address: &str, password: &str) {
    match store.save(address, password) {
        Ok(true) => println!("Saved {address}"),
        Ok(false) => println!("{address} was already saved"),
        Err(e) => eprintln!("Warning: couldn't save {address}: {e}"),
    }
}

fn run_saved(store: &JsonAddressStore, cmd: SavedCommand) -> Result<()> {
    match cmd {
        SavedCommand::List { filter } => {
            let query = filter.unwrap_or_default();
            for (i, r) in store.load().iter().enumerate() {
                if !matches_filter(r, &query) {
                    continue;
                }
                println!(
                    "{:>3}. {:<40} stage={:<10} prod={:<10} {}",
                    i + 1,
                    r.address,
                    r.stage_id.as_deref().unwrap_or("-"),
                    r.prod_id.as_deref().unwrap_or("-"),
                    r.name.as_deref().unwrap_or("")
                );
            }
            Ok(())
        }
        SavedCommand::Add { address, password } => {
            if !store.save(&address, &password)? {
                return Err(anyhow!("{address} is already saved"));
            }
            println!("Saved {address}");
            Ok(())
        }
        SavedCommand::Edit {
            address,
            stage,
            prod,
            name,
        } => {
            if !store.edit_metadata(
                &address,
                stage.as_deref(),
                prod.as_deref(),
                name.as_deref(),
            )? {
                return Err(anyhow!("{address} is not in the saved addresses"));
            }
            println!("Updated {address}");
            Ok(())
        }
        SavedCommand::Rm { address } => {
            if !store.delete(&address)? {
                return Err(anyhow!("Could not delete {address}: not saved"));
            }
            println!("Deleted {address}");
            Ok(())
        }
        SavedCommand::Move {
            address,
            position,
            filter,
        } => {
            if !reorder_allowed(filter.as_deref()) {
                return Err(anyhow!("Clear the filter before moving addresses"));
            }
            let to = move_address(store, &address, position.saturating_sub(1))?
                .ok_or_else(|| anyhow!("{address} is not in the saved addresses"))?;
            println!("Moved {address} to position {}", to + 1);
            Ok(())
        }
        SavedCommand::Reorder { addresses } => {
            if !commit_order(store, addresses.as_slice())? {
                return Err(anyhow!(
                    "Order not saved: list every saved address exactly once"
                ));
            }
            println!("Saved the new order");
            Ok(())
        }
        SavedCommand::Folder => {
            tempmail_client::open_storage_folder(store.path())?;
            Ok(())
        }
    }
}
