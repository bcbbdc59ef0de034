mod plan;
pub mod render;
mod selection;
mod summary;

pub use plan::{PlanPage, PlanView, SubmitOutcome};
pub use selection::SelectionPage;
pub use summary::{SummaryPage, SummaryView};
