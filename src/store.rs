use crate::{
    data::student::{NewStudent, Student},
    error::RosterResult,
};
use async_trait::async_trait;
use std::fmt::Debug;
use uuid::Uuid;

#[cfg(test)]
pub mod memory;
pub mod postgres;

/// Everything we ask of the `alunos` collection. Uniqueness of enrollment numbers is the store's
/// job, and a violation comes back as [`crate::error::RosterError::DuplicateEnrollmentNumber`].
#[async_trait]
pub trait StudentStore: Debug + Send + Sync {
    /// All students, ordered by name using the store's collation.
    async fn get_all(&self) -> RosterResult<Vec<Student>>;
    async fn insert_into_database(&self, to_be_added: NewStudent) -> RosterResult<Uuid>;
    async fn update_in_database(&self, id: Uuid, updated: NewStudent) -> RosterResult<()>;
    async fn remove_from_database(&self, id: Uuid) -> RosterResult<()>;

    async fn sensible_shutdown(&self) {}
}
