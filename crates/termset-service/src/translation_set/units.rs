//! Read-only unit queries on a set's platform label.

use termset_core::error::AppError;
use termset_entity::platform::{Unit, UnitQuery};

use super::service::TranslationSetService;
use crate::context::RequestContext;

impl TranslationSetService {
    /// Number of the set's units in platform `state`, e.g. `translated`.
    pub async fn state_count(
        &self,
        ctx: &RequestContext,
        codesystem: &str,
        refset: &str,
        label: &str,
        state: &str,
    ) -> Result<u64, AppError> {
        let set = self.find_set(codesystem, refset, label).await?;
        let platform = self.clients.platform(&ctx.username)?;
        let query = UnitQuery::new(set.language_code_with_refset())
            .label(set.composite_label())
            .state(state)
            .page_size(1);
        Ok(platform.get_unit_page(&query).await?.count)
    }

    /// First page of the set's units.
    pub async fn sample_units(
        &self,
        ctx: &RequestContext,
        codesystem: &str,
        refset: &str,
        label: &str,
        page_size: u32,
    ) -> Result<Vec<Unit>, AppError> {
        let set = self.find_set(codesystem, refset, label).await?;
        let platform = self.clients.platform(&ctx.username)?;
        let query = UnitQuery::new(set.language_code_with_refset())
            .label(set.composite_label())
            .page_size(page_size);
        Ok(platform.get_unit_page(&query).await?.results)
    }
}
