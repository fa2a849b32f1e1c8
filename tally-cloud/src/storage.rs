use {
    std::{collections::HashMap, sync::{Arc, Mutex}},
    thiserror::Error,
    rusqlite::Connection,
};

pub trait KVStorage {
    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;
}

#[derive(Error, Debug)]
pub enum StorageError {
    /// Storage operation failed because of an internal error in the storage
    /// implementation (connectivity, io, corrupt data).
    #[error("internal storage error: {description}")]
    InternalError {
        description: String,
    },

    /// Key or record used in this operation violates one of the constraints
    /// set by this storage backend.
    #[error("constraint violated: {description}")]
    KeyConstraintError {
        description: String,
    },
}

#[derive(Clone)]
pub struct SqliteStorage {
    // todo: make connection thread local?
    connection: Arc<Mutex<Connection>>,
}

#[derive(Error, Debug)]
pub enum SqliteStorageConnectionError {
    #[error("failed to open connection: {0:?}")]
    ConnectionOpenError(rusqlite::Error),

    #[error("failed to init database: {0:?}")]
    DatabaseInitError(rusqlite::Error),
}

impl SqliteStorage {
    pub fn new(path: impl AsRef<std::path::Path>) -> Result<Self, SqliteStorageConnectionError> {
        Self::from_connection(
            Connection::open(path)
                .map_err(SqliteStorageConnectionError::ConnectionOpenError)?
        )
    }

    pub fn in_memory() -> Result<Self, SqliteStorageConnectionError> {
        Self::from_connection(
            Connection::open_in_memory()
                .map_err(SqliteStorageConnectionError::ConnectionOpenError)?
        )
    }

    fn from_connection(connection: Connection) -> Result<Self, SqliteStorageConnectionError> {
        connection.execute("create table if not exists kv (key blob primary key, value blob)", ())
            .map_err(SqliteStorageConnectionError::DatabaseInitError)?;
        Ok(Self { connection: Arc::new(Mutex::new(connection)) })
    }
}

impl KVStorage for SqliteStorage {
    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let connection = self.connection.lock()
            .map_err(|err| StorageError::InternalError { description: format!("failed to acquire sqlite connection: {err:?}") })?;
        connection.execute("insert or replace into kv (key, value) values (?1, ?2)", (&key, &value))
            .map_err(|err| StorageError::InternalError { description: format!("failed to execute sqlite query: {err:?}") })
            .map(|_| ())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let connection = self.connection.lock()
            .map_err(|err| StorageError::InternalError { description: format!("failed to acquire sqlite connection: {err:?}") })?;
        let mut stmt = connection.prepare("select value from kv where key = ?1")
            .map_err(|err| StorageError::InternalError { description: format!("failed to prepare sqlite query: {err:?}") })?;
        let mut rows = stmt.query([(key)])
            .map_err(|err| StorageError::InternalError { description: format!("failed to map sqlite result to value: {err:?}") })?;

        let res = rows.next()
            .map_err(|err| StorageError::InternalError { description: format!("failed to read row from sqlite result: {err:?}") })?
            .map(|v| v.get(0));

        match res {
            Some(Ok(v)) => Ok(Some(v)),
            Some(Err(err)) => Err(StorageError::InternalError { description: format!("failed to decode sqlite result: {err:?}") }),
            None => Ok(None)
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl KVStorage for MemoryStorage {
    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock()
            .map_err(|err| StorageError::InternalError { description: format!("failed to lock entries: {err:?}") })?;
        entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let entries = self.entries.lock()
            .map_err(|err| StorageError::InternalError { description: format!("failed to lock entries: {err:?}") })?;
        Ok(entries.get(key).cloned())
    }
}

pub struct NamespacedStorage<T> {
    namespace: Vec<u8>,
    inner: T,
}

impl<T> NamespacedStorage<T> {
    pub fn new(namespace: impl Into<Vec<u8>>, inner: T) -> Self {
        Self {
            namespace: namespace.into(),
            inner,
        }
    }

    fn namespaced_key(&self, key: &[u8]) -> Vec<u8> {
        let mut namespaced_key = Vec::with_capacity(self.namespace.len() + key.len() + 1);
        namespaced_key.extend_from_slice(&self.namespace);
        namespaced_key.push(b'/');
        namespaced_key.extend_from_slice(key);
        namespaced_key
    }
}

impl<T: KVStorage> KVStorage for NamespacedStorage<T> {
    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> { self.inner.set(&self.namespaced_key(key), value) }
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> { self.inner.get(&self.namespaced_key(key)) }
}

#[derive(Clone)]
pub struct BoxedStorage {
    inner: Arc<Box<dyn KVStorage + Send + Sync>>,
}

impl BoxedStorage {
    pub fn new<T: KVStorage + Send + Sync + 'static>(inner: T) -> Self {
        Self {
            inner: Arc::new(Box::new(inner)),
        }
    }
}

impl KVStorage for BoxedStorage {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.inner.set(key, value)
    }
}

pub trait WithKey: Sized {
    fn with_key(self, key: &[u8], value: &[u8]) -> Result<Self, StorageError>;
}

impl<S: KVStorage> WithKey for S {
    fn with_key(self, key: &[u8], value: &[u8]) -> Result<Self, StorageError> {
        self.set(key, value)?;
        Ok(self)
    }
}
