//! Shared application state.

use std::sync::Arc;

use parking_lot::RwLock;
use vnlegal_core::{LlmCapability, VnLegalConfig};
use vnlegal_llm::{create_llm, LLMConfig};
use vnlegal_splitter::LegalSplitter;
use vnlegal_store::SqliteStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: VnLegalConfig,
    pub store: SqliteStore,
    pub llm_config: RwLock<LLMConfig>,
    llm: RwLock<Arc<dyn LlmCapability>>,
}

impl AppState {
    /// State with the LLM configuration loaded from the data directory.
    pub fn new(config: VnLegalConfig, store: SqliteStore) -> Self {
        let llm_config = LLMConfig::load(&config.data_paths.llm_config_file);
        let llm = create_llm(&llm_config);
        Self::with_llm(config, store, llm_config, llm)
    }

    pub fn with_llm(
        config: VnLegalConfig,
        store: SqliteStore,
        llm_config: LLMConfig,
        llm: Arc<dyn LlmCapability>,
    ) -> Self {
        Self {
            config,
            store,
            llm_config: RwLock::new(llm_config),
            llm: RwLock::new(llm),
        }
    }

    pub fn llm(&self) -> Arc<dyn LlmCapability> {
        self.llm.read().clone()
    }

    /// A splitter for one request. Each has its own keyword cache.
    pub fn splitter(&self) -> LegalSplitter {
        LegalSplitter::new(self.llm(), self.config.splitter)
    }

    /// Rebuild the LLM capability after a config change.
    pub fn reload_llm(&self) {
        let llm = create_llm(&self.llm_config.read());
        *self.llm.write() = llm;
    }
}
