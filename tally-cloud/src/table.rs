use {
    std::sync::Arc,
    serde_json::Value,
    tally_core::Record,
    crate::storage::{KVStorage, StorageError},
};

/// Record-level view over a key-value store: the three operations the
/// counter consumes. `update` sets a single field on an existing record and
/// fails if there is nothing stored under the key; `put` is an unconditional
/// create-or-overwrite.
pub trait Table {
    fn get(&self, key: &str) -> Result<Option<Record>, StorageError>;
    fn put(&self, record: &Record) -> Result<(), StorageError>;
    fn update(&self, key: &str, field: &str, value: Value) -> Result<(), StorageError>;
}

/// A table storing records as json documents in a byte-oriented kv storage,
/// keyed by the record's `id` field.
pub struct KvTable<T> {
    storage: T,
}

impl<T: KVStorage> KvTable<T> {
    pub fn new(storage: T) -> Self {
        Self {
            storage,
        }
    }

    fn read_record(&self, key: &str) -> Result<Option<Record>, StorageError> {
        let encoded = match self.storage.get(key.as_bytes())? {
            Some(v) => v,
            None => return Ok(None),
        };

        serde_json::from_slice(&encoded)
            .map(Some)
            .map_err(|err| StorageError::InternalError { description: format!("failed to decode stored record: {err:?}") })
    }

    fn write_record(&self, key: &str, record: &Record) -> Result<(), StorageError> {
        let encoded = serde_json::to_vec(record)
            .map_err(|err| StorageError::InternalError { description: format!("failed to encode record: {err:?}") })?;
        self.storage.set(key.as_bytes(), &encoded)
    }
}

impl<T: KVStorage> Table for KvTable<T> {
    fn get(&self, key: &str) -> Result<Option<Record>, StorageError> {
        self.read_record(key)
    }

    fn put(&self, record: &Record) -> Result<(), StorageError> {
        let key = record.id()
            .map_err(|err| StorageError::KeyConstraintError { description: err.to_string() })?
            .to_owned();
        self.write_record(&key, record)
    }

    fn update(&self, key: &str, field: &str, value: Value) -> Result<(), StorageError> {
        let mut record = self.read_record(key)?
            .ok_or_else(|| StorageError::KeyConstraintError { description: format!("no record to update for key: {key}") })?;
        record.set_field(field, value);
        self.write_record(key, &record)
    }
}

#[derive(Clone)]
pub struct BoxedTable {
    inner: Arc<Box<dyn Table + Send + Sync>>,
}

impl BoxedTable {
    pub fn new<T: Table + Send + Sync + 'static>(inner: T) -> Self {
        Self {
            inner: Arc::new(Box::new(inner)),
        }
    }
}

impl Table for BoxedTable {
    fn get(&self, key: &str) -> Result<Option<Record>, StorageError> {
        self.inner.get(key)
    }

    fn put(&self, record: &Record) -> Result<(), StorageError> {
        self.inner.put(record)
    }

    fn update(&self, key: &str, field: &str, value: Value) -> Result<(), StorageError> {
        self.inner.update(key, field, value)
    }
}

pub trait WithRecord: Sized {
    fn with_record(self, record: &Record) -> Result<Self, StorageError>;
}

impl<T: Table> WithRecord for T {
    fn with_record(self, record: &Record) -> Result<Self, StorageError> {
        self.put(record)?;
        Ok(self)
    }
}
