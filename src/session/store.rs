use crate::error::StoreError;
use crate::serialization::WorkflowRule;
use ahash::AHashMap;
use async_trait::async_trait;
use std::sync::Mutex;

/// Durable storage for workflow rules.
///
/// The builder never talks to a database directly; the host injects an implementation of
/// this trait (typically a thin wrapper around an HTTP client).
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn load_rule(&self, rule_id: &str) -> Result<WorkflowRule, StoreError>;

    /// Writes `rule`, replacing any stored rule with the same id.
    async fn save_rule(&self, rule: &WorkflowRule) -> Result<(), StoreError>;
}

/// A `WorkflowStore` kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rules: Mutex<AHashMap<String, WorkflowRule>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `rules`.
    pub fn with_rules(rules: impl IntoIterator<Item = WorkflowRule>) -> Self {
        let rules = rules.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            rules: Mutex::new(rules),
        }
    }

    /// Returns a copy of the stored rule, if any.
    pub fn get(&self, rule_id: &str) -> Option<WorkflowRule> {
        self.rules.lock().ok()?.get(rule_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rules.lock().map(|rules| rules.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl WorkflowStore for InMemoryStore {
    async fn load_rule(&self, rule_id: &str) -> Result<WorkflowRule, StoreError> {
        let rules = self
            .rules
            .lock()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))?;
        rules
            .get(rule_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(rule_id.to_string()))
    }

    async fn save_rule(&self, rule: &WorkflowRule) -> Result<(), StoreError> {
        let mut rules = self
            .rules
            .lock()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))?;
        rules.insert(rule.id.clone(), rule.clone());
        Ok(())
    }
}
