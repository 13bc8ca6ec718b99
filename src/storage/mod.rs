pub mod kv_store;
pub mod persistence;

pub use kv_store::{FileKvStore, KvStore, MemoryKvStore};
pub use persistence::{PersistenceAdapter, ACTIVE_QUESTION_KEY, QUESTIONS_KEY};
