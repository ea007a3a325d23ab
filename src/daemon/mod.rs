pub mod controller;
pub mod notifier;
pub mod poller;

use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use crate::auth::session::SessionManager;
use crate::daemon::controller::{Controller, Outcome};
use crate::daemon::notifier::Notifier;
use crate::daemon::poller::Poller;
use crate::domain::account::AccountSession;
use crate::error::Result;
use crate::inbox::state::InboxChange;
use crate::mail::provider::MailProvider;

pub enum StartWith {
    NewAccount,
    Login { address: String, password: String },
}

pub struct WatchConfig {
    pub poll_interval: Duration,
    pub notify: bool,
}

/// Opens a session and keeps its inbox in sync until Ctrl-C. New messages are
/// printed (and optionally notified) as they arrive.
pub fn run_watch<P: MailProvider + 'static>(
    sessions: Arc<SessionManager<P>>,
    start: StartWith,
    cfg: WatchConfig,
    mut on_session: impl FnMut(&AccountSession),
) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r2 = running.clone();
    ctrlc::set_handler(move || {
        r2.store(false, Ordering::SeqCst);
    })?;

    let mut controller = Controller::new(sessions);
    match start {
        StartWith::NewAccount => controller.spawn_generate(),
        StartWith::Login { address, password } => controller.spawn_login(address, password),
    }
    let mut poller = Poller::start(controller.sender(), cfg.poll_interval);
    let mut notifier: Option<Notifier> = None;

    while running.load(Ordering::SeqCst) {
        let Some(event) = controller.next_event(Duration::from_millis(200)) else {
            continue;
        };

        match controller.handle(event) {
            Outcome::SessionChanged(session) => {
                println!("Watching {} (Ctrl-C to stop)", session.address);
                on_session(&session);
                notifier = cfg.notify.then(|| Notifier::new(&session.address));
            }
            Outcome::SessionFailed(e) => {
                poller.stop();
                return Err(e);
            }
            Outcome::Inbox(InboxChange::Initial(n)) => {
                println!("{n} message(s)");
                for m in &controller.inbox().items {
                    println!("{}", m.list_line());
                }
            }
            Outcome::Inbox(InboxChange::Replaced { added }) => {
                for id in added {
                    let Some(m) = controller.inbox().get(&id) else {
                        continue;
                    };
                    println!("{}", m.list_line());
                    if !m.seen
                        && let Some(n) = &notifier
                    {
                        n.notify_email(m);
                    }
                }
            }
            Outcome::PollFailed(e) => log::debug!("tick skipped: {e}"),
            _ => {}
        }
    }

    poller.stop();
    controller.sessions().end_session();
    Ok(())
}
