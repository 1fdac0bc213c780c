//! In-memory cache holding values of one declared type

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::domain::cache::{AnyCache, Duplicable, DuplicationEngine, ValueType};
use crate::domain::CacheError;
use crate::infrastructure::metrics::{record_copy, CopyMechanism};

/// Thread-safe string-keyed cache for values of type `V`
///
/// Values are held as `Arc<V>`. `get`/`put` hand out and store the exact
/// `Arc` (reference semantics); the `*_copy`/`*_bean_*` accessors go through
/// the [`DuplicationEngine`] so the caller and the cache never alias a
/// mutable value (copy semantics).
pub struct TypedCache<V> {
    name: String,
    value_type: ValueType,
    entries: RwLock<HashMap<String, Arc<V>>>,
    engine: DuplicationEngine,
}

impl<V> TypedCache<V>
where
    V: Send + Sync + 'static,
{
    /// Creates an empty cache
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: ValueType::of::<V>(),
            entries: RwLock::new(HashMap::new()),
            engine: DuplicationEngine::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    // Every critical section leaves the map consistent, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<V>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<V>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the stored value itself
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.read().get(key).cloned()
    }

    /// Stores `value` itself, replacing any previous value for `key`
    pub fn put(&self, key: impl Into<String>, value: Arc<V>) {
        self.write().insert(key.into(), value);
    }

    /// Removes `key`, returning the value it held
    pub fn remove(&self, key: &str) -> Option<Arc<V>> {
        self.write().remove(key)
    }

    /// Removes every key
    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn size(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns the current keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn copy_out<F>(
        &self,
        key: &str,
        mechanism: CopyMechanism,
        dup: F,
    ) -> Result<Option<Arc<V>>, CacheError>
    where
        F: FnOnce(&Arc<V>) -> Result<Arc<V>, CacheError>,
    {
        let Some(stored) = self.get(key) else {
            return Ok(None);
        };

        let copy = dup(&stored)?;
        debug!(cache = %self.name, key, mechanism = mechanism.as_str(), "Copied value out of cache");
        record_copy(&self.name, mechanism);

        Ok(Some(copy))
    }

    fn copy_in<F>(
        &self,
        key: String,
        value: &Arc<V>,
        mechanism: CopyMechanism,
        dup: F,
    ) -> Result<(), CacheError>
    where
        F: FnOnce(&Arc<V>) -> Result<Arc<V>, CacheError>,
    {
        // Duplicate before locking so a failure leaves the map untouched
        let copy = dup(value)?;
        debug!(cache = %self.name, key = %key, mechanism = mechanism.as_str(), "Copied value into cache");
        record_copy(&self.name, mechanism);

        self.put(key, copy);
        Ok(())
    }
}

impl<V> TypedCache<V>
where
    V: Duplicable + Send + Sync + 'static,
{
    /// Returns a duplicate of the stored value
    pub fn get_copy(&self, key: &str) -> Result<Option<Arc<V>>, CacheError> {
        let engine = self.engine;
        self.copy_out(key, CopyMechanism::Duplicate, |v| engine.dup(v))
    }

    /// Stores a duplicate of `value`; later changes to `value` do not reach the cache
    pub fn put_copy(&self, key: impl Into<String>, value: &Arc<V>) -> Result<(), CacheError> {
        let engine = self.engine;
        self.copy_in(key.into(), value, CopyMechanism::Duplicate, |v| engine.dup(v))
    }
}

impl<V> TypedCache<V>
where
    V: Duplicable + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Returns a property-wise copy of the stored value
    pub fn get_bean_copy(&self, key: &str) -> Result<Option<Arc<V>>, CacheError> {
        let engine = self.engine;
        self.copy_out(key, CopyMechanism::BeanCopy, |v| engine.dup_serialized(v))
    }

    /// Stores a property-wise copy of `value`
    pub fn put_bean_copy(&self, key: impl Into<String>, value: &Arc<V>) -> Result<(), CacheError> {
        let engine = self.engine;
        self.copy_in(key.into(), value, CopyMechanism::BeanCopy, |v| {
            engine.dup_serialized(v)
        })
    }
}

impl<V> TypedCache<V>
where
    V: Duplicable + Clone + Send + Sync + 'static,
{
    /// Returns a clone of the stored value
    pub fn get_bean_clone(&self, key: &str) -> Result<Option<Arc<V>>, CacheError> {
        let engine = self.engine;
        self.copy_out(key, CopyMechanism::BeanClone, |v| engine.dup_cloned(v))
    }

    /// Stores a clone of `value`
    pub fn put_bean_clone(&self, key: impl Into<String>, value: &Arc<V>) -> Result<(), CacheError> {
        let engine = self.engine;
        self.copy_in(key.into(), value, CopyMechanism::BeanClone, |v| engine.dup_cloned(v))
    }
}

impl<V> fmt::Debug for TypedCache<V>
where
    V: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedCache")
            .field("name", &self.name)
            .field("value_type", &self.value_type.name())
            .field("size", &self.size())
            .finish()
    }
}

impl<V> AnyCache for TypedCache<V>
where
    V: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        TypedCache::name(self)
    }

    fn value_type(&self) -> ValueType {
        TypedCache::value_type(self)
    }

    fn size(&self) -> usize {
        TypedCache::size(self)
    }

    fn clear(&self) {
        TypedCache::clear(self)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::duplicate_via_serde;
    use serde::Deserialize;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestSerializable {
        name: String,
    }

    impl TestSerializable {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
            })
        }
    }

    impl Duplicable for TestSerializable {
        fn duplicate(&self) -> Result<Self, CacheError> {
            duplicate_via_serde(self)
        }
    }

    /// Value with interior mutability, so aliasing is observable
    #[derive(Debug)]
    struct Note {
        text: Mutex<String>,
    }

    impl Note {
        fn new(text: &str) -> Arc<Self> {
            Arc::new(Self {
                text: Mutex::new(text.to_string()),
            })
        }

        fn text(&self) -> String {
            self.text.lock().unwrap().clone()
        }

        fn set(&self, text: &str) {
            *self.text.lock().unwrap() = text.to_string();
        }
    }

    impl Duplicable for Note {
        fn duplicate(&self) -> Result<Self, CacheError> {
            Ok(Self {
                text: Mutex::new(self.text()),
            })
        }
    }

    /// Cloneable value whose `Clone` shares its inner state
    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Draft {
        body: Arc<Mutex<String>>,
    }

    impl Draft {
        fn new(body: &str) -> Arc<Self> {
            Arc::new(Self {
                body: Arc::new(Mutex::new(body.to_string())),
            })
        }

        fn body(&self) -> String {
            self.body.lock().unwrap().clone()
        }

        fn set(&self, body: &str) {
            *self.body.lock().unwrap() = body.to_string();
        }
    }

    impl Duplicable for Draft {
        fn duplicate(&self) -> Result<Self, CacheError> {
            Ok(Self {
                body: Arc::new(Mutex::new(self.body())),
            })
        }
    }

    #[test]
    fn test_get_missing_is_none() {
        let cache: TypedCache<String> = TypedCache::new("myCache");

        assert!(cache.get("bla").is_none());
        assert!(cache.get_copy("bla").unwrap().is_none());
        assert!(cache.get_bean_clone("bla").unwrap().is_none());
        assert!(cache.get_bean_copy("bla").unwrap().is_none());
    }

    #[test]
    fn test_put_get_remove() {
        let cache: TypedCache<String> = TypedCache::new("myCache");
        let value = Arc::new("First Put".to_string());

        cache.put("bla", value.clone());
        assert!(Arc::ptr_eq(&value, &cache.get("bla").unwrap()));
        assert_eq!(cache.size(), 1);

        let removed = cache.remove("bla").unwrap();
        assert!(Arc::ptr_eq(&value, &removed));
        assert!(cache.get("bla").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_two_puts_and_clear() {
        let cache: TypedCache<String> = TypedCache::new("myCache");
        let first = Arc::new("First Put".to_string());
        let second = Arc::new("Second Put".to_string());

        cache.put("1", first.clone());
        cache.put("2", second.clone());
        assert_eq!(cache.size(), 2);
        assert!(Arc::ptr_eq(&second, &cache.get("2").unwrap()));
        assert!(Arc::ptr_eq(&first, &cache.get("1").unwrap()));
        assert_eq!(cache.keys(), vec!["1".to_string(), "2".to_string()]);

        cache.clear();
        assert_eq!(cache.size(), 0);
        assert!(cache.get("1").is_none());
        assert!(cache.get("2").is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let cache: TypedCache<i32> = TypedCache::new("ints");

        cache.put("k", Arc::new(1));
        cache.put("k", Arc::new(2));

        assert_eq!(cache.size(), 1);
        assert_eq!(*cache.get("k").unwrap(), 2);
    }

    #[test]
    fn test_put_copy_of_string_shares_it() {
        let cache: TypedCache<String> = TypedCache::new("myCache");
        let value = Arc::new("First Put".to_string());

        cache.put_copy("bla", &value).unwrap();
        assert!(Arc::ptr_eq(&value, &cache.get_bean_clone("bla").unwrap().unwrap()));
        assert!(Arc::ptr_eq(&value, &cache.get_copy("bla").unwrap().unwrap()));
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_put_shares_mutations_with_caller() {
        let cache: TypedCache<Note> = TypedCache::new("notes");
        let note = Note::new("draft");

        cache.put("n", note.clone());
        note.set("edited");

        assert_eq!(cache.get("n").unwrap().text(), "edited");
    }

    #[test]
    fn test_put_copy_isolates_cache_from_caller() {
        let cache: TypedCache<Note> = TypedCache::new("notes");
        let note = Note::new("draft");

        cache.put_copy("n", &note).unwrap();
        note.set("edited");

        assert_eq!(cache.get("n").unwrap().text(), "draft");
    }

    #[test]
    fn test_get_copy_isolates_caller_from_cache() {
        let cache: TypedCache<Note> = TypedCache::new("notes");
        cache.put("n", Note::new("draft"));

        let copy = cache.get_copy("n").unwrap().unwrap();
        copy.set("edited");

        assert_eq!(cache.get("n").unwrap().text(), "draft");
    }

    #[test]
    fn test_put_accessors_isolate_shared_inner_state() {
        let cache: TypedCache<Draft> = TypedCache::new("drafts");
        let draft = Draft::new("draft");

        cache.put_copy("copy", &draft).unwrap();
        cache.put_bean_copy("bean", &draft).unwrap();
        cache.put_bean_clone("clone", &draft).unwrap();
        draft.set("edited");

        assert_eq!(cache.get("copy").unwrap().body(), "draft");
        assert_eq!(cache.get("bean").unwrap().body(), "draft");
        assert_eq!(cache.get("clone").unwrap().body(), "draft");
    }

    #[test]
    fn test_get_accessors_isolate_shared_inner_state() {
        let cache: TypedCache<Draft> = TypedCache::new("drafts");
        cache.put("d", Draft::new("draft"));

        cache.get_copy("d").unwrap().unwrap().set("via copy");
        cache.get_bean_copy("d").unwrap().unwrap().set("via bean copy");
        cache.get_bean_clone("d").unwrap().unwrap().set("via bean clone");

        assert_eq!(cache.get("d").unwrap().body(), "draft");
    }

    #[test]
    fn test_copy_accessors_store_distinct_values() {
        let cache: TypedCache<TestSerializable> = TypedCache::new("myCache");
        let ta = [
            TestSerializable::new("First Put"),
            TestSerializable::new("Second Put"),
            TestSerializable::new("Third Put"),
        ];

        cache.put_copy("1", &ta[0]).unwrap();
        assert!(!Arc::ptr_eq(&ta[0], &cache.get("1").unwrap()));
        assert_eq!(ta[0], cache.get("1").unwrap());

        cache.put_bean_copy("2", &ta[1]).unwrap();
        assert!(!Arc::ptr_eq(&ta[1], &cache.get("2").unwrap()));
        assert_eq!(ta[1], cache.get("2").unwrap());

        cache.put_bean_clone("2a", &ta[1]).unwrap();
        assert!(!Arc::ptr_eq(&ta[1], &cache.get("2a").unwrap()));
        assert_eq!(ta[1], cache.get("2a").unwrap());

        cache.put("3", ta[2].clone());
        assert_eq!(cache.size(), 4);
    }

    #[test]
    fn test_copy_accessors_return_fresh_values() {
        let cache: TypedCache<TestSerializable> = TypedCache::new("myCache");
        let stored = TestSerializable::new("Third Put");
        cache.put("3", stored.clone());

        assert!(Arc::ptr_eq(&stored, &cache.get("3").unwrap()));

        let clone = cache.get_bean_clone("3").unwrap().unwrap();
        let bean = cache.get_bean_copy("3").unwrap().unwrap();
        let copy = cache.get_copy("3").unwrap().unwrap();
        let again = cache.get_copy("3").unwrap().unwrap();

        for fresh in [&clone, &bean, &copy, &again] {
            assert!(!Arc::ptr_eq(&stored, fresh));
            assert_eq!(&stored, fresh);
        }
        assert!(!Arc::ptr_eq(&copy, &again));
    }

    #[test]
    fn test_failed_copy_leaves_cache_unchanged() {
        #[derive(Debug)]
        struct Sealed;

        impl Duplicable for Sealed {
            fn duplicate(&self) -> Result<Self, CacheError> {
                Err(CacheError::not_duplicable::<Self>("sealed handle"))
            }
        }

        let cache: TypedCache<Sealed> = TypedCache::new("sealed");
        let original = Arc::new(Sealed);
        cache.put("k", original.clone());

        let err = cache.put_copy("k", &Arc::new(Sealed)).unwrap_err();
        assert!(err.is_not_duplicable());
        assert!(Arc::ptr_eq(&original, &cache.get("k").unwrap()));

        let err = cache.put_copy("other", &Arc::new(Sealed)).unwrap_err();
        assert!(err.is_not_duplicable());
        assert_eq!(cache.size(), 1);

        assert!(cache.get_copy("k").unwrap_err().is_not_duplicable());
    }

    #[test]
    fn test_erased_view_reports_type_and_size() {
        let cache = Arc::new(TypedCache::<TestSerializable>::new("myCache"));
        cache.put("a", TestSerializable::new("a"));

        let erased: Arc<dyn AnyCache> = cache.clone();
        assert_eq!(erased.name(), "myCache");
        assert!(erased.value_type().is::<TestSerializable>());
        assert_eq!(erased.size(), 1);

        erased.clear();
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_concurrent_puts_are_not_lost() {
        let cache = Arc::new(TypedCache::<usize>::new("concurrent"));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        cache.put(format!("{}-{}", t, i), Arc::new(i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.size(), 800);
    }
}
