use crate::{
    data::student::{NewStudent, Student, StudentFilter, UniqueKey},
    error::RecordResult,
};
use async_trait::async_trait;
use std::fmt::Debug;
use uuid::Uuid;

#[cfg(test)]
pub mod memory_store;
pub mod postgres_store;
pub mod student;

/// Persistence for the student collection.
///
/// Implementations enforce uniqueness of `email` and `studentNo`, assign ids and timestamps,
/// and surface violations as [`crate::error::RecordError::DuplicateField`].
#[async_trait]
pub trait StudentStore: Debug + Send + Sync {
    async fn insert(&self, student: NewStudent) -> RecordResult<Student>;
    /// Newest-created first.
    async fn list(&self, filter: Option<StudentFilter>) -> RecordResult<Vec<Student>>;
    async fn find_by_id(&self, id: Uuid) -> RecordResult<Option<Student>>;
    async fn find_by_key(&self, key: &UniqueKey) -> RecordResult<Option<Student>>;
    /// Overwrites every mutable field, returning `None` if no student has that id.
    async fn replace(&self, id: Uuid, student: NewStudent) -> RecordResult<Option<Student>>;
    /// Returns whether anything was removed.
    async fn remove(&self, id: Uuid) -> RecordResult<bool>;

    async fn close(&self) {}
}
