use std::fmt::Write as _;
use std::io;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::adapter::StoreAdapter;
use crate::command::{self, Command, ReserveArgs};
use crate::config::Config;
use crate::engine::{self, Engine};
use crate::model::{FormInput, Navigation};
use crate::notify::NotifyHub;
use crate::observability;
use crate::pages::{render, PlanPage, PlanView, SelectionPage, SubmitOutcome, SummaryPage};
use crate::repository::ReservationRepository;
use crate::store::{FileStore, KeyValueStore, MemoryStore};

/// Text to show for one command, and whether the session should end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}

/// One user's page state: the three pages over a shared store.
pub struct Session {
    engine: Arc<Engine>,
    selection: SelectionPage,
    plan: PlanPage,
    summary: SummaryPage,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>, email_domain: &str) -> Self {
        let adapter = StoreAdapter::new(store);
        let repo = Arc::new(ReservationRepository::new(adapter.clone(), Arc::new(NotifyHub::new())));
        let engine = Arc::new(Engine::new(repo, email_domain));
        Self {
            selection: SelectionPage::new(adapter),
            plan: PlanPage::new(engine.clone()),
            summary: SummaryPage::new(engine.clone()),
            engine,
        }
    }

    /// Open the configured store: a JSON file, or memory when none is set.
    pub fn open(config: &Config) -> io::Result<Self> {
        let store: Arc<dyn KeyValueStore> = match &config.data_file {
            Some(path) => {
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir)?;
                }
                Arc::new(FileStore::open(path)?)
            }
            None => Arc::new(MemoryStore::new()),
        };
        Ok(Self::new(store, &config.email_domain))
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Parse and execute one input line at `now`.
    pub fn handle_line(&mut self, line: &str, now: DateTime<Utc>) -> Reply {
        let cmd = match command::parse_command(line) {
            Ok(cmd) => cmd,
            Err(command::CommandError::Empty) => return Reply::text(""),
            Err(e) => {
                metrics::counter!(observability::COMMANDS_TOTAL, "command" => "unknown", "status" => "error")
                    .increment(1);
                return Reply::text(format!("error: {e}"));
            }
        };
        let label = observability::command_label(&cmd);
        let started = std::time::Instant::now();
        let (reply, ok) = self.execute(cmd, now);
        metrics::histogram!(observability::COMMAND_DURATION_SECONDS, "command" => label)
            .record(started.elapsed().as_secs_f64());
        let status = if ok { "ok" } else { "error" };
        metrics::counter!(observability::COMMANDS_TOTAL, "command" => label, "status" => status).increment(1);
        reply
    }

    /// Execute a parsed command. The flag is false when the command failed.
    pub fn execute(&mut self, cmd: Command, now: DateTime<Utc>) -> (Reply, bool) {
        match cmd {
            Command::Buildings => (Reply::text(self.selection.buildings().join("\n")), true),
            Command::Select { building } => match self.selection.pick_building(&building) {
                Ok(nav) => (Reply::text(self.navigate(nav, now)), true),
                Err(e) => (Reply::text(format!("error: {e}")), false),
            },
            Command::Plan => (Reply::text(render_plan(&self.plan.open())), true),
            Command::ChangeBuilding { building } => match self.plan.change_building(&building) {
                Ok(rooms) => (Reply::text(format!("rooms: {}", rooms.join(", "))), true),
                Err(e) => (Reply::text(format!("error: {e}")), false),
            },
            Command::Counter { text } => (Reply::text(PlanPage::notes_counter(&text)), true),
            Command::Reserve(args) => self.reserve(args, now),
            Command::Manage => {
                let nav = self.plan.manage();
                (Reply::text(self.navigate(nav, now)), true)
            }
            Command::Summary => (Reply::text(self.summary.open(now).to_string()), true),
            Command::Refresh => match self.summary.refresh(now) {
                Some(view) => (Reply::text(view.to_string()), true),
                None => (Reply::text("no changes"), true),
            },
            Command::List { email } => {
                let active = self.summary.list_active(&email, now);
                (Reply::text(render::reservation_list(&active)), true)
            }
            Command::Delete { id } => match self.summary.delete(&id, now) {
                Ok((Some(_), view)) => (Reply::text(format!("deleted {id}\n{view}")), true),
                Ok((None, _)) => (Reply::text(format!("no reservation {id}")), true),
                Err(e) => (Reply::text(format!("error: {e}")), false),
            },
            Command::Theme => match self.selection.toggle_theme() {
                Ok(dark) => (Reply::text(format!("theme: {}", if dark { "dark" } else { "light" })), true),
                Err(e) => (Reply::text(format!("error: {e}")), false),
            },
            Command::Help => (Reply::text(command::HELP), true),
            Command::Quit => (
                Reply {
                    text: String::new(),
                    quit: true,
                },
                true,
            ),
        }
    }

    fn reserve(&mut self, args: ReserveArgs, now: DateTime<Utc>) -> (Reply, bool) {
        let input = form_input(args, &self.plan.open());
        match self.plan.submit(&input, now) {
            SubmitOutcome::Created { reservation, navigate } => {
                let text = format!("reservation {} created\n{}", reservation.id, self.navigate(navigate, now));
                (Reply::text(text), true)
            }
            SubmitOutcome::Invalid(errors) => {
                let mut text = String::from("please fix:");
                for e in &errors {
                    let _ = write!(text, "\n  {}: {}", e.field, e.message);
                }
                (Reply::text(text), false)
            }
            SubmitOutcome::Rejected { alert, navigate } => {
                let mut text = format!("alert: {alert}");
                if let Some(nav) = navigate {
                    let _ = write!(text, "\n{}", self.navigate(nav, now));
                }
                (Reply::text(text), false)
            }
        }
    }

    /// Render the destination page, as a browser redirect would.
    fn navigate(&mut self, nav: Navigation, now: DateTime<Utc>) -> String {
        let page = match nav {
            Navigation::Plan => render_plan(&self.plan.open()),
            Navigation::Summary => self.summary.open(now).to_string(),
            Navigation::Current => {
                let email = self.engine.repository().adapter().saved_email();
                render::reservation_list(&self.summary.list_active(&email, now))
            }
        };
        format!("-> {nav}\n{page}")
    }
}

/// Fill absent `reserve` fields from the pre-filled form.
fn form_input(args: ReserveArgs, view: &PlanView) -> FormInput {
    FormInput {
        fullname: args.name.unwrap_or_else(|| view.fullname.clone()),
        email: args.email.unwrap_or_else(|| view.email.clone()),
        building: view.building.clone(),
        room: args
            .room
            .or_else(|| view.rooms.first().map(|r| r.to_string()))
            .unwrap_or_default(),
        title: args.title.unwrap_or_default(),
        datetime: args.datetime.unwrap_or_default(),
        notes: args.notes.unwrap_or_default(),
    }
}

fn render_plan(view: &PlanView) -> String {
    let building = if view.building.is_empty() {
        render::EMPTY
    } else {
        view.building.as_str()
    };
    format!(
        "Plan a reservation\n  Name: {}\n  Email: {}\n  Building: {building}\n  Rooms: {}\n  Notes: {}",
        view.fullname,
        view.email,
        view.rooms.join(", "),
        view.notes_counter
    )
}

/// Read commands line by line until `quit` or end of input.
pub async fn run<R, W>(mut session: Session, reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let reply = session.handle_line(&line, engine::now());
        if !reply.text.is_empty() {
            writer.write_all(reply.text.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        if reply.quit {
            info!("session ended by user");
            return Ok(());
        }
    }
    info!("input closed, ending session");
    Ok(())
}
