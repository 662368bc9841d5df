use crate::{
    config::RuntimeConfiguration,
    data::directory::Directory,
    error::{MigrateSnafu, OpenDatabaseSnafu, RosterResult},
    store::{StudentStore, postgres::PostgresStudentStore},
};
use maud::{DOCTYPE, Markup, html};
use snafu::ResultExt;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};

#[derive(Clone, Debug)]
pub struct RosterState {
    store: Arc<dyn StudentStore>,
    directory: Arc<RwLock<Directory>>,
}

impl RosterState {
    pub async fn new(options: PgPoolOptions, config: &RuntimeConfiguration) -> RosterResult<Self> {
        let pool = options
            .connect(&config.db_config().get_db_path())
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self::from_store(Arc::new(PostgresStudentStore::new(pool))))
    }

    pub fn from_store(store: Arc<dyn StudentStore>) -> Self {
        Self {
            store,
            directory: Arc::new(RwLock::new(Directory::default())),
        }
    }

    #[allow(clippy::unused_self)] //in case self is ever needed, and to allow direct html! usage
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Student Roster" }
                }
                body class="bg-gray-900 min-h-screen text-white" {
                    (markup)
                    div id="modal" {}
                    div id="toasts" class="fixed bottom-4 right-4 flex flex-col space-y-2 z-50" {}
                }
            }
        }
    }

    pub fn store(&self) -> &dyn StudentStore {
        self.store.as_ref()
    }

    pub async fn directory(&self) -> RwLockReadGuard<'_, Directory> {
        self.directory.read().await
    }

    /// Re-fetch the whole collection. On failure the previous copy stays in place.
    pub async fn reload_directory(&self) -> RosterResult<()> {
        match self.store.get_all().await {
            Ok(students) => {
                debug!(count = students.len(), "Fetched students");
                *self.directory.write().await = Directory::from_fetch(students);
                Ok(())
            }
            Err(e) => {
                self.directory.write().await.fetch_failed();
                Err(e)
            }
        }
    }

    pub async fn sensible_shutdown(&self) {
        self.store.sensible_shutdown().await;
    }
}

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::{data::student::Student, store::memory::InMemoryStudentStore};
    use jiff::civil::date;
    use uuid::Uuid;

    pub fn student(name: &str, course: &str, enrollment_number: &str) -> Student {
        Student {
            id: Uuid::new_v4(),
            name: name.into(),
            birth_date: date(2004, 3, 15),
            course: course.into(),
            enrollment_number: enrollment_number.into(),
        }
    }

    /// A state over an in-memory store. The directory is not loaded yet.
    pub fn test_state(students: Vec<Student>) -> (RosterState, Arc<InMemoryStudentStore>) {
        let store = Arc::new(InMemoryStudentStore::with_students(students));
        (RosterState::from_store(store.clone()), store)
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;

    #[tokio::test]
    async fn reload_orders_by_name_and_derives_courses() {
        let (state, store) = test_state(vec![
            student("Caio", "CS", "3"),
            student("Ana", "Law", "1"),
            student("Bea", "CS", "2"),
        ]);

        state.reload_directory().await.unwrap();
        let directory = state.directory().await;

        let names: Vec<_> = directory.students().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Ana", "Bea", "Caio"]);
        assert_eq!(directory.courses(), ["Law", "CS"]);
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_collection() {
        let (state, store) = test_state(vec![student("Ana", "CS", "1")]);
        state.reload_directory().await.unwrap();

        store.fail_next_call();
        assert!(state.reload_directory().await.is_err());

        let directory = state.directory().await;
        assert_eq!(directory.students().len(), 1);
        assert!(!directory.is_loading());
    }

    #[tokio::test]
    async fn reloading_twice_without_writes_is_idempotent() {
        let (state, _store) = test_state(vec![student("Ana", "CS", "1"), student("Bea", "Law", "2")]);

        state.reload_directory().await.unwrap();
        let first = state.directory().await.students().to_vec();
        state.reload_directory().await.unwrap();
        let second = state.directory().await.students().to_vec();

        assert_eq!(first, second);
    }
}
