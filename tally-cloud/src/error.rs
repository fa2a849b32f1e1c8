use {
    thiserror::Error,
    crate::storage::StorageError,
};

/// Everything that can go wrong inside one counter invocation. The handler
/// maps every variant to the same opaque 500 response; callers cannot tell a
/// store outage from a malformed record, and that is part of the contract.
#[derive(Error, Debug)]
pub enum CounterError {
    /// Failure signaled by the backing key-value store during fetch,
    /// initialize-write or update-write.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The stored record does not carry a usable count.
    #[error("counter record is malformed: {reason}")]
    RecordMalformed { reason: String },
}
