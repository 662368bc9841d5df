use crate::error::{ConvertDateSnafu, RosterError, RosterResult};
use jiff::civil::Date;
use serde::Deserialize;
use snafu::OptionExt;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub const NAME_LENGTH: (usize, usize) = (3, 100);
pub const COURSE_LENGTH: (usize, usize) = (2, 100);
pub const ENROLLMENT_NUMBER_LENGTH: (usize, usize) = (3, 50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub birth_date: Date,
    pub course: String,
    pub enrollment_number: String,
}

impl Student {
    pub fn birth_date_dmy(&self) -> String {
        self.birth_date.strftime("%d/%m/%Y").to_string()
    }
}

impl Display for Student {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.enrollment_number)
    }
}

/// A row as it comes back from `public.alunos`.
#[derive(Debug, sqlx::FromRow)]
pub struct StudentRow {
    pub id: Uuid,
    pub nome: String,
    pub data_nascimento: time::Date,
    pub curso: String,
    pub matricula: String,
}

impl TryFrom<StudentRow> for Student {
    type Error = RosterError;

    fn try_from(
        StudentRow {
            id,
            nome,
            data_nascimento,
            curso,
            matricula,
        }: StudentRow,
    ) -> Result<Self, Self::Error> {
        Ok(Self {
            id,
            name: nome,
            birth_date: from_sql_date(data_nascimento)?,
            course: curso,
            enrollment_number: matricula,
        })
    }
}

/// Postgres dates go over the wire as `time::Date`; everything above the store works in `jiff`.
pub fn from_sql_date(sql: time::Date) -> RosterResult<Date> {
    let (year, month, day) = sql.to_calendar_date();
    let civil = || {
        Date::new(
            i16::try_from(year).ok()?,
            i8::try_from(u8::from(month)).ok()?,
            i8::try_from(day).ok()?,
        )
        .ok()
    };
    civil().context(ConvertDateSnafu {
        original: sql.to_string(),
    })
}

pub fn to_sql_date(date: Date) -> RosterResult<time::Date> {
    u8::try_from(date.month())
        .ok()
        .and_then(|month| time::Month::try_from(month).ok())
        .zip(u8::try_from(date.day()).ok())
        .and_then(|(month, day)| {
            time::Date::from_calendar_date(i32::from(date.year()), month, day).ok()
        })
        .context(ConvertDateSnafu {
            original: date.to_string(),
        })
}

/// Validated payload for inserts and updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub birth_date: Date,
    pub course: String,
    pub enrollment_number: String,
}

#[cfg(test)]
impl NewStudent {
    pub fn with_id(self, id: Uuid) -> Student {
        Student {
            id,
            name: self.name,
            birth_date: self.birth_date,
            course: self.course,
            enrollment_number: self.enrollment_number,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    BirthDate,
    Course,
    EnrollmentNumber,
}

impl Field {
    pub const fn input_name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::BirthDate => "birth_date",
            Self::Course => "course",
            Self::EnrollmentNumber => "enrollment_number",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Full Name",
            Self::BirthDate => "Birth Date",
            Self::Course => "Course",
            Self::EnrollmentNumber => "Enrollment Number",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(Vec<(Field, &'static str)>);

impl FieldErrors {
    fn push(&mut self, field: Field, message: &'static str) {
        self.0.push((field, message));
    }

    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0
            .iter()
            .find_map(|(f, message)| (*f == field).then_some(*message))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Raw form input, exactly as the browser sent it. `id` is only present when editing.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct StudentFields {
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub enrollment_number: String,
}

impl From<&Student> for StudentFields {
    fn from(student: &Student) -> Self {
        Self {
            id: Some(student.id),
            name: student.name.clone(),
            birth_date: student.birth_date.to_string(),
            course: student.course.clone(),
            enrollment_number: student.enrollment_number.clone(),
        }
    }
}

fn check_length(
    errors: &mut FieldErrors,
    field: Field,
    value: &str,
    (min, max): (usize, usize),
    messages: (&'static str, &'static str),
) {
    let len = value.chars().count();
    if len < min {
        errors.push(field, messages.0);
    } else if len > max {
        errors.push(field, messages.1);
    }
}

impl StudentFields {
    pub fn validate(&self) -> Result<NewStudent, FieldErrors> {
        let mut errors = FieldErrors::default();

        check_length(
            &mut errors,
            Field::Name,
            &self.name,
            NAME_LENGTH,
            (
                "Name must have at least 3 characters",
                "Name must have at most 100 characters",
            ),
        );

        let birth_date = if self.birth_date.is_empty() {
            errors.push(Field::BirthDate, "Birth date is required");
            None
        } else if let Ok(date) = self.birth_date.parse::<Date>() {
            Some(date)
        } else {
            errors.push(Field::BirthDate, "Birth date must be a valid date");
            None
        };

        check_length(
            &mut errors,
            Field::Course,
            &self.course,
            COURSE_LENGTH,
            (
                "Course must have at least 2 characters",
                "Course must have at most 100 characters",
            ),
        );
        check_length(
            &mut errors,
            Field::EnrollmentNumber,
            &self.enrollment_number,
            ENROLLMENT_NUMBER_LENGTH,
            (
                "Enrollment number must have at least 3 characters",
                "Enrollment number must have at most 50 characters",
            ),
        );

        match birth_date {
            Some(birth_date) if errors.is_empty() => Ok(NewStudent {
                name: self.name.clone(),
                birth_date,
                course: self.course.clone(),
                enrollment_number: self.enrollment_number.clone(),
            }),
            _ => Err(errors),
        }
    }
}
