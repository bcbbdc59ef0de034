use crate::limits::MAX_ACTIVE_PER_USER;
use crate::store::StoreError;

/// Form field a validation message is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Fullname,
    Email,
    Title,
    Datetime,
    Room,
    Notes,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Fullname => "name",
            Field::Email => "email",
            Field::Title => "title",
            Field::Datetime => "date",
            Field::Room => "room",
            Field::Notes => "notes",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum EngineError {
    /// One entry per failing field, in form order.
    Invalid(Vec<FieldError>),
    QuotaExceeded,
    /// Id of the active reservation the request collides with.
    Overlap(String),
    Store(StoreError),
}

impl EngineError {
    /// Short label for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            EngineError::Invalid(_) => "invalid",
            EngineError::QuotaExceeded => "quota",
            EngineError::Overlap(_) => "overlap",
            EngineError::Store(_) => "store",
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Invalid(errors) => {
                write!(f, "invalid form:")?;
                for e in errors {
                    write!(f, " {}: {}", e.field, e.message)?;
                }
                Ok(())
            }
            EngineError::QuotaExceeded => {
                write!(f, "You already have {MAX_ACTIVE_PER_USER} active reservations.")
            }
            EngineError::Overlap(_) => {
                write!(f, "This reservation overlaps with one of your existing reservations.")
            }
            EngineError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::Store(e)
    }
}
