//! Shared read-only state threaded through one generation pass.

use crate::catalog::ItemCatalog;
use crate::config::GeneratorConfig;
use crate::ids::IdGenerator;

/// Borrowed collaborators every builder needs.
#[derive(Clone, Copy)]
pub struct GenerationContext<'a> {
    /// Item templates and prices.
    pub catalog: &'a dyn ItemCatalog,
    /// Id source for new inventory items.
    pub ids: &'a dyn IdGenerator,
    /// Tuning.
    pub config: &'a GeneratorConfig,
}

impl<'a> GenerationContext<'a> {
    /// Bundle the collaborators.
    pub const fn new(
        catalog: &'a dyn ItemCatalog,
        ids: &'a dyn IdGenerator,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            catalog,
            ids,
            config,
        }
    }
}

impl core::fmt::Debug for GenerationContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GenerationContext")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
