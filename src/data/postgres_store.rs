use crate::{
    config::DbConfig,
    data::{
        StudentStore,
        student::{NewStudent, Student, StudentFilter, UniqueKey},
    },
    error::{MakeQuerySnafu, MigrateSnafu, OpenDatabaseSnafu, RecordError, RecordResult},
};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use snafu::ResultExt;
use sqlx::{Pool, Postgres, postgres::PgPoolOptions};
use uuid::Uuid;

const COLUMNS: &str = "id, first_name, last_name, middle_initial, email, course, section, \
                       student_no, year, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresStudentStore {
    pool: Pool<Postgres>,
}

impl PostgresStudentStore {
    pub async fn connect(options: PgPoolOptions, config: &DbConfig) -> RecordResult<Self> {
        let pool = options
            .connect(config.url().expose_secret())
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self { pool })
    }

    fn write_error(source: sqlx::Error, student: &NewStudent) -> RecordError {
        if let sqlx::Error::Database(db_error) = &source {
            if db_error.is_unique_violation() {
                let key = db_error
                    .constraint()
                    .and_then(|constraint| student.key_for_constraint(constraint));
                if let Some(key) = key {
                    return RecordError::DuplicateField {
                        field: key.field(),
                        value: key.value().to_owned(),
                    };
                }
            }
        }

        RecordError::MakeQuery { source }
    }
}

#[async_trait]
impl StudentStore for PostgresStudentStore {
    async fn insert(&self, student: NewStudent) -> RecordResult<Student> {
        let query = format!(
            "INSERT INTO public.students (id, first_name, last_name, middle_initial, email, course, section, student_no, year) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, Student>(&query)
            .bind(Uuid::new_v4())
            .bind(&student.first_name)
            .bind(&student.last_name)
            .bind(&student.middle_initial)
            .bind(&student.email)
            .bind(&student.course)
            .bind(&student.section)
            .bind(&student.student_no)
            .bind(student.year)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::write_error(e, &student))
    }

    async fn list(&self, filter: Option<StudentFilter>) -> RecordResult<Vec<Student>> {
        let fetched = match filter {
            None => {
                sqlx::query_as::<_, Student>(&format!(
                    "SELECT {COLUMNS} FROM public.students ORDER BY created_at DESC, id DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
            Some(StudentFilter::Course(course)) => {
                sqlx::query_as::<_, Student>(&format!(
                    "SELECT {COLUMNS} FROM public.students WHERE course = $1 ORDER BY created_at DESC, id DESC"
                ))
                .bind(course)
                .fetch_all(&self.pool)
                .await
            }
            Some(StudentFilter::Section(section)) => {
                sqlx::query_as::<_, Student>(&format!(
                    "SELECT {COLUMNS} FROM public.students WHERE section = $1 ORDER BY created_at DESC, id DESC"
                ))
                .bind(section)
                .fetch_all(&self.pool)
                .await
            }
            Some(StudentFilter::Year(year)) => {
                sqlx::query_as::<_, Student>(&format!(
                    "SELECT {COLUMNS} FROM public.students WHERE year = $1 ORDER BY created_at DESC, id DESC"
                ))
                .bind(year)
                .fetch_all(&self.pool)
                .await
            }
        };

        fetched.context(MakeQuerySnafu)
    }

    async fn find_by_id(&self, id: Uuid) -> RecordResult<Option<Student>> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {COLUMNS} FROM public.students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context(MakeQuerySnafu)
    }

    async fn find_by_key(&self, key: &UniqueKey) -> RecordResult<Option<Student>> {
        let column = match key {
            UniqueKey::Email(_) => "email",
            UniqueKey::StudentNo(_) => "student_no",
        };

        sqlx::query_as::<_, Student>(&format!(
            "SELECT {COLUMNS} FROM public.students WHERE {column} = $1"
        ))
        .bind(key.value())
        .fetch_optional(&self.pool)
        .await
        .context(MakeQuerySnafu)
    }

    async fn replace(&self, id: Uuid, student: NewStudent) -> RecordResult<Option<Student>> {
        let query = format!(
            "UPDATE public.students SET first_name = $2, last_name = $3, middle_initial = $4, email = $5, course = $6, section = $7, student_no = $8, year = $9, updated_at = now() WHERE id = $1 RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .bind(&student.first_name)
            .bind(&student.last_name)
            .bind(&student.middle_initial)
            .bind(&student.email)
            .bind(&student.course)
            .bind(&student.section)
            .bind(&student.student_no)
            .bind(student.year)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::write_error(e, &student))
    }

    async fn remove(&self, id: Uuid) -> RecordResult<bool> {
        let result = sqlx::query("DELETE FROM public.students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context(MakeQuerySnafu)?;

        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
