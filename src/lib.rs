pub mod actions;
pub mod config;
pub mod error;
pub mod input_validation;
pub mod logging;
pub mod reconciler;
pub mod store;
pub mod system_integration;
pub mod tags;

#[cfg(test)]
mod lib_tests;

use actions::ActionRouter;
use config::TaggerConfig;
use reconciler::SelectionReconciler;
use store::{TagBackend, TagStore, XattrBackend};
use tags::LocalizationTable;

pub use error::{Result, TagError};

/// Wires a router over `backend`. The localization table is loaded once
/// here and shared by every later action.
pub fn build_router_with<B: TagBackend>(
    backend: B,
    config: &TaggerConfig,
    localization: LocalizationTable,
) -> ActionRouter<B> {
    let store = TagStore::new(backend, localization).with_localization_on_write(config.localize);
    ActionRouter::new(SelectionReconciler::new(store), config.palette_tags())
}

/// Router over the real filesystem.
pub fn build_router(config: &TaggerConfig) -> ActionRouter<XattrBackend> {
    build_router_with(XattrBackend, config, config.localization_table())
}
