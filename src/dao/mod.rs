/// Key-value backends holding the persisted blobs.
pub mod kv_store;
/// Persisted blob layouts and storage keys.
pub mod models;
/// Fail-soft load/save adapter and ordered background writer.
pub mod persistence;
/// Storage error types shared by every backend.
pub mod storage;
