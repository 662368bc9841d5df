use crate::{
    data::student::{NewStudent, Student},
    error::{RosterError, RosterResult},
    store::StudentStore,
};
use async_trait::async_trait;
use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use uuid::Uuid;

/// Stand-in for the hosted database in tests: same ordering and uniqueness rules, plus counters so
/// tests can assert how many round-trips happened.
#[derive(Debug, Default)]
pub struct InMemoryStudentStore {
    students: Mutex<Vec<Student>>,
    fail_next: AtomicBool,
    pub fetches: AtomicUsize,
    pub inserts: AtomicUsize,
    pub updates: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl InMemoryStudentStore {
    pub fn with_students(students: Vec<Student>) -> Self {
        Self {
            students: Mutex::new(students),
            ..Self::default()
        }
    }

    pub fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
            + self.updates.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<Student> {
        self.students.lock().unwrap().clone()
    }

    fn check_failure(&self) -> RosterResult<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(RosterError::MakeQuery {
                source: sqlx::Error::PoolTimedOut,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StudentStore for InMemoryStudentStore {
    async fn get_all(&self) -> RosterResult<Vec<Student>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let mut students = self.snapshot();
        students.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(students)
    }

    async fn insert_into_database(&self, to_be_added: NewStudent) -> RosterResult<Uuid> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let mut students = self.students.lock().unwrap();
        if students
            .iter()
            .any(|s| s.enrollment_number == to_be_added.enrollment_number)
        {
            return Err(RosterError::DuplicateEnrollmentNumber {
                enrollment_number: to_be_added.enrollment_number,
            });
        }

        let id = Uuid::new_v4();
        students.push(to_be_added.with_id(id));
        Ok(id)
    }

    async fn update_in_database(&self, id: Uuid, updated: NewStudent) -> RosterResult<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let mut students = self.students.lock().unwrap();
        if students
            .iter()
            .any(|s| s.id != id && s.enrollment_number == updated.enrollment_number)
        {
            return Err(RosterError::DuplicateEnrollmentNumber {
                enrollment_number: updated.enrollment_number,
            });
        }

        let existing = students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RosterError::MissingStudent { id })?;
        *existing = updated.with_id(id);
        Ok(())
    }

    async fn remove_from_database(&self, id: Uuid) -> RosterResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let mut students = self.students.lock().unwrap();
        let before = students.len();
        students.retain(|s| s.id != id);
        if students.len() == before {
            return Err(RosterError::MissingStudent { id });
        }
        Ok(())
    }
}
