use crate::features::compute_directory::repo::ComputeApi;
use crate::shared::error::{BotError, BotResult};
use crate::shared::types::Instance;
use std::sync::Arc;
use tracing::{debug, error};

/// Looks up instances by name tag and forwards transition requests
pub struct DirectoryService {
    api: Arc<dyn ComputeApi>,
}

impl DirectoryService {
    pub fn new(api: Arc<dyn ComputeApi>) -> Self {
        Self { api }
    }

    /// Find the single instance carrying `name`.
    ///
    /// `Ok(None)` when nothing carries the tag. More than one match means the
    /// tagging is broken outside this process and is reported as
    /// `InvariantViolation`. Never cached, never retried.
    pub async fn lookup(&self, name: &str) -> BotResult<Option<Instance>> {
        if name.is_empty() {
            return Err(BotError::InvalidRequest(
                "Instance name cannot be empty".to_string(),
            ));
        }

        let mut matches = self.api.describe_by_name(name).await?;

        match matches.len() {
            0 => {
                debug!(instance = %name, "No instance carries this name tag");
                Ok(None)
            }
            1 => Ok(matches.pop()),
            count => {
                error!(instance = %name, count, "Name tag is not unique");
                Err(BotError::InvariantViolation(format!(
                    "{count} instances are tagged '{name}'"
                )))
            }
        }
    }

    pub async fn request_start(&self, instance_id: &str) -> BotResult<()> {
        self.api.start_instance(instance_id).await
    }

    pub async fn request_stop(&self, instance_id: &str) -> BotResult<()> {
        self.api.stop_instance(instance_id).await
    }
}
