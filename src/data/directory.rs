use crate::data::student::Student;
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use uuid::Uuid;

/// The last fetched copy of the whole collection, plus what we derive from it.
#[derive(Debug, Clone)]
pub struct Directory {
    students: Vec<Student>,
    courses: Vec<String>,
    loading: bool,
}

impl Default for Directory {
    fn default() -> Self {
        Self {
            students: vec![],
            courses: vec![],
            loading: true,
        }
    }
}

impl Directory {
    /// `students` must already be in display order (by name).
    pub fn from_fetch(students: Vec<Student>) -> Self {
        let courses = distinct_courses(&students);
        Self {
            students,
            courses,
            loading: false,
        }
    }

    /// A fetch failed: keep whatever we had, but stop showing the loading indicator.
    pub fn fetch_failed(&mut self) {
        self.loading = false;
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn courses(&self) -> &[String] {
        &self.courses
    }

    pub fn find(&self, id: Uuid) -> Option<&Student> {
        self.students.iter().find(|student| student.id == id)
    }

    pub fn filtered(&self, filter: &ViewFilter) -> Vec<&Student> {
        self.students
            .iter()
            .filter(|student| filter.matches(student))
            .collect()
    }

    pub fn summary(&self, filter: &ViewFilter) -> Summary {
        Summary {
            total: self.students.len(),
            courses: self.courses.len(),
            results: self.filtered(filter).len(),
        }
    }
}

/// Courses in order of first appearance, without duplicates.
pub fn distinct_courses(students: &[Student]) -> Vec<String> {
    let mut seen = HashSet::new();
    students
        .iter()
        .filter(|student| seen.insert(student.course.as_str()))
        .map(|student| student.course.clone())
        .collect()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub courses: usize,
    pub results: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CourseFilter {
    #[default]
    All,
    Only(String),
}

impl CourseFilter {
    /// The `<option>` value. Courses are at least two characters, so the empty string can't collide.
    pub fn as_value(&self) -> &str {
        match self {
            Self::All => "",
            Self::Only(course) => course,
        }
    }
}

impl<'de> Deserialize<'de> for CourseFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw {
            Some(course) if !course.is_empty() => Self::Only(course),
            _ => Self::All,
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ViewFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub course: CourseFilter,
}

impl ViewFilter {
    pub fn matches(&self, student: &Student) -> bool {
        let matches_search = self.search.is_empty() || {
            let needle = self.search.to_lowercase();
            student.name.to_lowercase().contains(&needle)
                || student.enrollment_number.to_lowercase().contains(&needle)
        };

        let matches_course = match &self.course {
            CourseFilter::All => true,
            CourseFilter::Only(course) => &student.course == course,
        };

        matches_search && matches_course
    }
}
