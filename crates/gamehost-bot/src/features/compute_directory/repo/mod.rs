pub mod ec2;

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::shared::error::{BotError, BotResult};
use crate::shared::types::Instance;

/// Cloud compute API as consumed by the bot
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Every record whose name tag equals `name` exactly
    async fn describe_by_name(&self, name: &str) -> BotResult<Vec<Instance>>;

    /// Fire a start transition
    async fn start_instance(&self, instance_id: &str) -> BotResult<()>;

    /// Fire a stop transition
    async fn stop_instance(&self, instance_id: &str) -> BotResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Describe(String),
    Start(String),
    Stop(String),
}

#[derive(Default)]
struct Failures {
    describe: Option<String>,
    start: Option<String>,
    stop: Option<String>,
}

/// In-memory compute API.
///
/// Each name maps to a queue of describe responses. A describe pops the
/// front response while more than one is queued; the last one sticks.
#[derive(Clone, Default)]
pub struct InMemoryComputeApi {
    responses: Arc<RwLock<HashMap<String, VecDeque<Vec<Instance>>>>>,
    failures: Arc<RwLock<Failures>>,
    calls: Arc<RwLock<Vec<ProviderCall>>>,
}

impl InMemoryComputeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single record under its own name tag
    pub async fn insert(&self, instance: Instance) {
        let name = instance.name.clone();
        self.set_matches(&name, vec![instance]).await;
    }

    /// Fix the describe result for `name`
    pub async fn set_matches(&self, name: &str, matches: Vec<Instance>) {
        self.script(name, vec![matches]).await;
    }

    /// Queue successive describe results for `name`
    pub async fn script(&self, name: &str, sequence: Vec<Vec<Instance>>) {
        let mut responses = self.responses.write().await;
        responses.insert(name.to_string(), sequence.into_iter().collect());
    }

    pub async fn fail_describe(&self, detail: impl Into<String>) {
        self.failures.write().await.describe = Some(detail.into());
    }

    pub async fn fail_start(&self, detail: impl Into<String>) {
        self.failures.write().await.start = Some(detail.into());
    }

    pub async fn fail_stop(&self, detail: impl Into<String>) {
        self.failures.write().await.stop = Some(detail.into());
    }

    pub async fn calls(&self) -> Vec<ProviderCall> {
        self.calls.read().await.clone()
    }

    pub async fn describe_count(&self, name: &str) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|call| matches!(call, ProviderCall::Describe(n) if n == name))
            .count()
    }

    /// Number of start/stop requests issued so far
    pub async fn transition_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|call| !matches!(call, ProviderCall::Describe(_)))
            .count()
    }
}

#[async_trait]
impl ComputeApi for InMemoryComputeApi {
    async fn describe_by_name(&self, name: &str) -> BotResult<Vec<Instance>> {
        self.calls
            .write()
            .await
            .push(ProviderCall::Describe(name.to_string()));

        if let Some(detail) = &self.failures.read().await.describe {
            return Err(BotError::ProviderCallFailed(detail.clone()));
        }

        let mut responses = self.responses.write().await;
        let Some(queue) = responses.get_mut(name) else {
            return Ok(Vec::new());
        };

        let matches = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        Ok(matches.unwrap_or_default())
    }

    async fn start_instance(&self, instance_id: &str) -> BotResult<()> {
        self.calls
            .write()
            .await
            .push(ProviderCall::Start(instance_id.to_string()));

        match &self.failures.read().await.start {
            Some(detail) => Err(BotError::ProviderCallFailed(detail.clone())),
            None => Ok(()),
        }
    }

    async fn stop_instance(&self, instance_id: &str) -> BotResult<()> {
        self.calls
            .write()
            .await
            .push(ProviderCall::Stop(instance_id.to_string()));

        match &self.failures.read().await.stop {
            Some(detail) => Err(BotError::ProviderCallFailed(detail.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::InstanceState;

    fn instance(id: &str, name: &str) -> Instance {
        Instance::new(id, name, InstanceState::Stopped).unwrap()
    }

    #[tokio::test]
    async fn test_describe_unknown_name_is_empty() {
        let api = InMemoryComputeApi::new();
        let result = api.describe_by_name("nonexistent").await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_describe() {
        let api = InMemoryComputeApi::new();
        api.insert(instance("i-1", "Foo")).await;

        let result = api.describe_by_name("Foo").await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].instance_id, "i-1");
        assert!(api.describe_by_name("foo").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_script_pops_until_last() {
        let api = InMemoryComputeApi::new();
        api.script(
            "Foo",
            vec![vec![], vec![instance("i-1", "Foo")], vec![instance("i-2", "Foo")]],
        )
        .await;

        assert!(api.describe_by_name("Foo").await.unwrap().is_empty());
        assert_eq!(api.describe_by_name("Foo").await.unwrap()[0].instance_id, "i-1");
        assert_eq!(api.describe_by_name("Foo").await.unwrap()[0].instance_id, "i-2");
        assert_eq!(api.describe_by_name("Foo").await.unwrap()[0].instance_id, "i-2");
        assert_eq!(api.describe_count("Foo").await, 4);
    }

    #[tokio::test]
    async fn test_failures_are_provider_errors() {
        let api = InMemoryComputeApi::new();
        api.fail_describe("throttled").await;
        api.fail_start("UnauthorizedOperation").await;
        api.fail_stop("IncorrectInstanceState").await;

        assert!(matches!(
            api.describe_by_name("Foo").await,
            Err(BotError::ProviderCallFailed(_))
        ));
        assert!(api.start_instance("i-1").await.is_err());
        assert!(api.stop_instance("i-1").await.is_err());
    }

    #[tokio::test]
    async fn test_calls_are_recorded_in_order() {
        let api = InMemoryComputeApi::new();
        api.describe_by_name("Foo").await.unwrap();
        api.start_instance("i-1").await.unwrap();
        api.stop_instance("i-1").await.unwrap();

        assert_eq!(
            api.calls().await,
            vec![
                ProviderCall::Describe("Foo".to_string()),
                ProviderCall::Start("i-1".to_string()),
                ProviderCall::Stop("i-1".to_string()),
            ]
        );
        assert_eq!(api.transition_count().await, 2);
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let api = InMemoryComputeApi::new();
        let clone = api.clone();
        clone.insert(instance("i-1", "Foo")).await;
        assert_eq!(api.describe_by_name("Foo").await.unwrap().len(), 1);
        assert_eq!(clone.describe_count("Foo").await, 1);
    }
}
