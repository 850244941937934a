//! Shared application state.

use perkscan_store::PerkStore;

pub struct AppState {
    pub store: PerkStore,
}
