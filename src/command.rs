/// Field values given to `reserve`. Absent fields fall back to the plan
/// page's pre-filled values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReserveArgs {
    pub name: Option<String>,
    pub email: Option<String>,
    pub title: Option<String>,
    pub datetime: Option<String>,
    pub room: Option<String>,
    pub notes: Option<String>,
}

/// Parsed session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Buildings,
    Select { building: String },
    Plan,
    ChangeBuilding { building: String },
    Counter { text: String },
    Reserve(ReserveArgs),
    Manage,
    Summary,
    Refresh,
    List { email: String },
    Delete { id: String },
    Theme,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  buildings                     list buildings
  select <building>             pick a building and open the plan page
  plan                          show the plan form
  building <name>               change building on the plan page
  counter <text>                preview the notes character counter
  reserve key=value ...         submit (name, email, title, datetime, room, notes)
  manage                        open the current-reservations view
  summary                       show the last reservation
  refresh                       re-render the summary if reservations changed
  list <email>                  list active reservations for an email
  delete <id>                   delete a reservation
  theme                         toggle dark theme
  quit                          leave the session";

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(CommandError::Empty);
    }
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (trimmed, ""),
    };

    match word.to_lowercase().as_str() {
        "buildings" => Ok(Command::Buildings),
        "select" => Ok(Command::Select {
            building: required_rest(rest, "building")?,
        }),
        "plan" => Ok(Command::Plan),
        "building" => Ok(Command::ChangeBuilding {
            building: required_rest(rest, "building")?,
        }),
        "counter" => Ok(Command::Counter {
            text: unquote(rest).to_string(),
        }),
        "reserve" => parse_reserve(rest).map(Command::Reserve),
        "manage" | "current" => Ok(Command::Manage),
        "summary" => Ok(Command::Summary),
        "refresh" => Ok(Command::Refresh),
        "list" => Ok(Command::List {
            email: required_rest(rest, "email")?,
        }),
        "delete" => Ok(Command::Delete {
            id: required_rest(rest, "id")?,
        }),
        "theme" => Ok(Command::Theme),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn required_rest(rest: &str, what: &'static str) -> Result<String, CommandError> {
    let value = unquote(rest);
    if value.is_empty() {
        return Err(CommandError::MissingArgument(what));
    }
    Ok(value.to_string())
}

/// Strip one pair of surrounding double quotes.
fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

fn parse_reserve(rest: &str) -> Result<ReserveArgs, CommandError> {
    let mut args = ReserveArgs::default();
    for token in tokenize(rest)? {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| CommandError::Malformed(token.clone()))?;
        let slot = match key.to_lowercase().as_str() {
            "name" | "fullname" => &mut args.name,
            "email" => &mut args.email,
            "title" => &mut args.title,
            "datetime" | "date" => &mut args.datetime,
            "room" => &mut args.room,
            "notes" => &mut args.notes,
            _ => return Err(CommandError::UnknownField(key.to_string())),
        };
        *slot = Some(value.to_string());
    }
    Ok(args)
}

/// Whitespace-separated tokens; double quotes group, backslash escapes.
fn tokenize(input: &str) -> Result<Vec<String>, CommandError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_token = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_quotes {
        return Err(CommandError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[derive(Debug, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    UnknownField(String),
    Malformed(String),
    UnterminatedQuote,
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Empty => write!(f, "empty command"),
            CommandError::Unknown(w) => write!(f, "unknown command: {w} (try `help`)"),
            CommandError::MissingArgument(what) => write!(f, "missing argument: {what}"),
            CommandError::UnknownField(k) => write!(f, "unknown field: {k}"),
            CommandError::Malformed(t) => write!(f, "expected key=value, got: {t}"),
            CommandError::UnterminatedQuote => write!(f, "unterminated quote"),
        }
    }
}

impl std::error::Error for CommandError {}
