//! Job handler implementations.

pub mod assign;
pub mod batch_translate;
pub mod create;
pub mod delete;

use std::sync::Arc;

use termset_client::traits::ClientFactory;
use termset_core::config::ProcessingConfig;

use crate::executor::JobExecutor;

pub use assign::AssignWorkHandler;
pub use batch_translate::BatchTranslateHandler;
pub use create::CreateSetHandler;
pub use delete::DeleteSetHandler;

/// Platform state of units nobody has translated yet.
pub const UNTRANSLATED_STATE: &str = "empty";

/// Register every translation set handler on `executor`.
pub fn register_all(
    executor: &mut JobExecutor,
    clients: Arc<dyn ClientFactory>,
    config: &ProcessingConfig,
) {
    executor.register(Arc::new(CreateSetHandler::new(
        Arc::clone(&clients),
        config.label_batch_size,
    )));
    executor.register(Arc::new(AssignWorkHandler::new(
        Arc::clone(&clients),
        config.assign_page_size,
        config.assignment_progress_cap,
    )));
    executor.register(Arc::new(BatchTranslateHandler::new(
        Arc::clone(&clients),
        config.ai_page_size,
    )));
    executor.register(Arc::new(DeleteSetHandler::new(clients)));
}
