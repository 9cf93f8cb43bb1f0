use super::ResourceKey;
use crate::error::{ResourceError, Result};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Slot {
    Type(TypeId),
    Key(String),
}

#[derive(Clone)]
struct Entry {
    type_name: &'static str,
    instance: Arc<dyn Any + Send + Sync>,
}

impl Entry {
    fn new<T: Send + Sync + 'static>(instance: Arc<T>) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            instance,
        }
    }
}

/// Thread-safe, cancellable resource store shared between plugins
///
/// Values are stored either by type (one value per type, like a DI
/// container) or under a typed [`ResourceKey`]. Cloning a `Resources`
/// yields another handle to the same store; [`Resources::derive`] creates a
/// child that starts with a copy of the parent's values and whose
/// cancellation follows the parent's.
#[derive(Clone)]
pub struct Resources {
    entries: Arc<DashMap<Slot, Entry>>,
    token: CancellationToken,
}

impl Resources {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            token: CancellationToken::new(),
        }
    }

    /// Child store: inherits current values and cancellation, but writes
    /// to it are not visible to the parent.
    pub fn derive(&self) -> Self {
        Self {
            entries: Arc::new((*self.entries).clone()),
            token: self.token.child_token(),
        }
    }

    /// Store `value` as the single instance of its type
    pub fn insert<T: Send + Sync + 'static>(&self, value: T) -> &Self {
        self.insert_arc(Arc::new(value))
    }

    pub fn insert_arc<T: Send + Sync + 'static>(&self, value: Arc<T>) -> &Self {
        self.entries
            .insert(Slot::Type(TypeId::of::<T>()), Entry::new(value));
        self
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.resolve::<T>().ok()
    }

    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.fetch(&Slot::Type(TypeId::of::<T>()), || {
            std::any::type_name::<T>().to_string()
        })
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn set<T: Send + Sync + 'static>(&self, key: &ResourceKey<T>, value: T) -> &Self {
        self.set_arc(key, Arc::new(value))
    }

    pub fn set_arc<T: Send + Sync + 'static>(&self, key: &ResourceKey<T>, value: Arc<T>) -> &Self {
        self.entries
            .insert(Slot::Key(key.to_string()), Entry::new(value));
        self
    }

    pub fn value<T: Send + Sync + 'static>(&self, key: &ResourceKey<T>) -> Option<Arc<T>> {
        self.lookup(key).ok()
    }

    pub fn lookup<T: Send + Sync + 'static>(&self, key: &ResourceKey<T>) -> Result<Arc<T>> {
        let name = key.to_string();
        self.fetch(&Slot::Key(name.clone()), || name.clone())
    }

    fn fetch<T: Send + Sync + 'static>(
        &self,
        slot: &Slot,
        name: impl Fn() -> String,
    ) -> Result<Arc<T>> {
        let (instance, found) = {
            let entry = self
                .entries
                .get(slot)
                .ok_or_else(|| ResourceError::NotFound { name: name() })?;
            (entry.instance.clone(), entry.type_name)
        };

        instance
            .downcast::<T>()
            .map_err(|_| ResourceError::TypeMismatch {
                name: name(),
                expected: std::any::type_name::<T>(),
                found,
            })
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&Slot::Type(TypeId::of::<T>()))
    }

    pub fn contains_key<T>(&self, key: &ResourceKey<T>) -> bool {
        self.entries.contains_key(&Slot::Key(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A token cancelled when this store is; hand it to background work
    pub fn token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once the store has been cancelled
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::new()
    }
}
