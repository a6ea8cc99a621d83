//! Fixed reward configuration held in memory.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::foundation::DomainError;
use crate::domain::rewards::RewardConfig;
use crate::ports::RewardConfigReader;

/// `RewardConfigReader` over documents supplied at construction.
#[derive(Debug, Clone, Default)]
pub struct StaticRewardConfigReader {
    documents: HashMap<String, RewardConfig>,
}

impl StaticRewardConfigReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config_id: impl Into<String>, config: RewardConfig) -> Self {
        self.documents.insert(config_id.into(), config);
        self
    }
}

#[async_trait]
impl RewardConfigReader for StaticRewardConfigReader {
    async fn load(&self, config_id: &str) -> Result<Option<RewardConfig>, DomainError> {
        Ok(self.documents.get(config_id).cloned())
    }
}
