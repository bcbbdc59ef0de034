use tracing::debug;

use crate::adapter::StoreAdapter;
use crate::directory;
use crate::model::Navigation;
use crate::store::StoreError;

/// Building picker (the campus map page).
pub struct SelectionPage {
    store: StoreAdapter,
}

impl SelectionPage {
    pub fn new(store: StoreAdapter) -> Self {
        Self { store }
    }

    pub fn buildings(&self) -> Vec<&'static str> {
        directory::buildings().collect()
    }

    /// Remember the building and go to the plan page. Names outside the
    /// directory are kept; the plan page offers the default rooms for them.
    pub fn pick_building(&self, building: &str) -> Result<Navigation, StoreError> {
        let building = building.trim();
        if !directory::is_known_building(building) {
            debug!("building {building:?} not in directory, default rooms apply");
        }
        self.store.set_selected_building(building)?;
        Ok(Navigation::Plan)
    }

    pub fn toggle_theme(&self) -> Result<bool, StoreError> {
        self.store.toggle_theme()
    }
}
