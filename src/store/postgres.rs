use crate::{
    data::student::{NewStudent, Student, StudentRow, to_sql_date},
    error::{
        GetDatabaseConnectionSnafu, MakeQuerySnafu, MissingStudentSnafu, RosterError, RosterResult,
    },
    store::StudentStore,
};
use async_trait::async_trait;
use snafu::ResultExt;
use sqlx::{Pool, Postgres, pool::PoolConnection};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct PostgresStudentStore {
    pool: Pool<Postgres>,
}

impl PostgresStudentStore {
    pub const fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn get_connection(&self) -> RosterResult<PoolConnection<Postgres>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }
}

/// Turns a unique-constraint violation (SQLSTATE 23505) into its own error, so callers can tell it
/// apart from everything else that can go wrong.
fn map_write_error(source: sqlx::Error, enrollment_number: &str) -> RosterError {
    let is_unique_violation = source
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());

    if is_unique_violation {
        RosterError::DuplicateEnrollmentNumber {
            enrollment_number: enrollment_number.to_string(),
        }
    } else {
        RosterError::MakeQuery { source }
    }
}

#[async_trait]
impl StudentStore for PostgresStudentStore {
    async fn get_all(&self) -> RosterResult<Vec<Student>> {
        let mut conn = self.get_connection().await?;

        let rows: Vec<StudentRow> = sqlx::query_as(
            "SELECT id, nome, data_nascimento, curso, matricula FROM public.alunos ORDER BY nome",
        )
        .fetch_all(&mut *conn)
        .await
        .context(MakeQuerySnafu)?;

        rows.into_iter().map(Student::try_from).collect()
    }

    async fn insert_into_database(&self, to_be_added: NewStudent) -> RosterResult<Uuid> {
        let NewStudent {
            name,
            birth_date,
            course,
            enrollment_number,
        } = to_be_added;
        let mut conn = self.get_connection().await?;

        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO public.alunos (nome, data_nascimento, curso, matricula) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&name)
        .bind(to_sql_date(birth_date)?)
        .bind(&course)
        .bind(&enrollment_number)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, &enrollment_number))?;

        Ok(id)
    }

    async fn update_in_database(&self, id: Uuid, updated: NewStudent) -> RosterResult<()> {
        let NewStudent {
            name,
            birth_date,
            course,
            enrollment_number,
        } = updated;
        let mut conn = self.get_connection().await?;

        let result = sqlx::query(
            "UPDATE public.alunos SET nome = $2, data_nascimento = $3, curso = $4, matricula = $5 WHERE id = $1",
        )
        .bind(id)
        .bind(&name)
        .bind(to_sql_date(birth_date)?)
        .bind(&course)
        .bind(&enrollment_number)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, &enrollment_number))?;

        snafu::ensure!(
            result.rows_affected() > 0,
            MissingStudentSnafu { id }
        );
        Ok(())
    }

    async fn remove_from_database(&self, id: Uuid) -> RosterResult<()> {
        let mut conn = self.get_connection().await?;

        let result = sqlx::query("DELETE FROM public.alunos WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .context(MakeQuerySnafu)?;

        snafu::ensure!(
            result.rows_affected() > 0,
            MissingStudentSnafu { id }
        );
        Ok(())
    }

    async fn sensible_shutdown(&self) {
        self.pool.close().await;
    }
}
