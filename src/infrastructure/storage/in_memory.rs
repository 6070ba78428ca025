//! In-memory storage implementation

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::storage::{Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

/// Thread-safe in-memory storage keyed by the entity key
///
/// Data is lost when the process terminates.
#[derive(Debug)]
pub struct InMemoryStorage<E>
where
    E: StorageEntity,
{
    entities: RwLock<HashMap<E::Key, E>>,
}

impl<E> Default for InMemoryStorage<E>
where
    E: StorageEntity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStorage<E>
where
    E: StorageEntity,
{
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
        }
    }

    /// Creates storage pre-populated with entities; later duplicates win
    pub fn with_entities(entities: impl IntoIterator<Item = E>) -> Self {
        let map = entities
            .into_iter()
            .map(|entity| (entity.key().clone(), entity))
            .collect();

        Self {
            entities: RwLock::new(map),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<E::Key, E>>, DomainError> {
        self.entities
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<E::Key, E>>, DomainError> {
        self.entities
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl<E> Storage<E> for InMemoryStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        Ok(self.read()?.get(key).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let mut entities: Vec<E> = self.read()?.values().cloned().collect();
        entities.sort_by(|a, b| a.key().as_str().cmp(b.key().as_str()));
        Ok(entities)
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let mut entities = self.write()?;

        if entities.contains_key(entity.key()) {
            return Err(DomainError::conflict(format!(
                "Entity with key '{}' already exists",
                entity.key().as_str()
            )));
        }

        entities.insert(entity.key().clone(), entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let mut entities = self.write()?;

        match entities.get_mut(entity.key()) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(DomainError::not_found(format!(
                "Entity with key '{}' not found",
                entity.key().as_str()
            ))),
        }
    }

    async fn save(&self, entity: E) -> Result<E, DomainError> {
        self.write()?.insert(entity.key().clone(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.write()?.remove(key).is_some())
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.read()?.contains_key(key))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Chatbot, ChatbotId, ProviderId};

    fn bot(id: &str) -> Chatbot {
        Chatbot::new(ChatbotId::new(id), format!("Bot {}", id), ProviderId::OpenAi, "gpt-4o")
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let storage = InMemoryStorage::<Chatbot>::new();
        storage.create(bot("bot1")).await.unwrap();

        let found = storage.get(&ChatbotId::new("bot1")).await.unwrap().unwrap();
        assert_eq!(found.name(), "Bot bot1");
        assert!(storage.get(&ChatbotId::new("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let storage = InMemoryStorage::<Chatbot>::new();
        storage.create(bot("bot1")).await.unwrap();

        let err = storage.create(bot("bot1")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_update_requires_existing() {
        let storage = InMemoryStorage::<Chatbot>::new();

        let err = storage.update(bot("bot1")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        storage.create(bot("bot1")).await.unwrap();
        storage
            .update(bot("bot1").with_active(false))
            .await
            .unwrap();

        let found = storage.get(&ChatbotId::new("bot1")).await.unwrap().unwrap();
        assert!(!found.is_active());
    }

    #[tokio::test]
    async fn test_save_upserts() {
        let storage = InMemoryStorage::<Chatbot>::new();

        storage.save(bot("bot1")).await.unwrap();
        storage.save(bot("bot1").with_max_tokens(10)).await.unwrap();

        assert_eq!(storage.count().await.unwrap(), 1);
        let found = storage.get(&ChatbotId::new("bot1")).await.unwrap().unwrap();
        assert_eq!(found.max_tokens(), Some(10));
    }

    #[tokio::test]
    async fn test_with_entities_list_and_delete() {
        let storage = InMemoryStorage::with_entities(vec![bot("b"), bot("a")]);

        let ids: Vec<String> = storage
            .list()
            .await
            .unwrap()
            .iter()
            .map(|b| b.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(storage.delete(&ChatbotId::new("a")).await.unwrap());
        assert!(!storage.delete(&ChatbotId::new("a")).await.unwrap());
        assert!(!storage.exists(&ChatbotId::new("a")).await.unwrap());
    }
}
