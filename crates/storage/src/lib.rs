#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    AccountRecord, AccountRepository, InMemoryRepository, PersistedState, STATE_KEY,
    StateRepository, Storage, StorageError,
};
