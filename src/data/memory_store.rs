use crate::{
    data::{
        StudentStore,
        student::{NewStudent, Student, StudentField, StudentFilter, UniqueKey},
    },
    error::{DuplicateFieldSnafu, RecordResult},
};
use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Keeps students in creation order, mirroring the constraints of the SQL schema.
#[derive(Debug, Default)]
pub struct MemoryStudentStore {
    students: RwLock<Vec<Student>>,
}

impl MemoryStudentStore {
    fn ensure_unique(
        students: &[Student],
        candidate: &NewStudent,
        ignoring: Option<Uuid>,
    ) -> RecordResult<()> {
        for other in students.iter().filter(|s| Some(s.id) != ignoring) {
            if other.email == candidate.email {
                return DuplicateFieldSnafu {
                    field: StudentField::Email,
                    value: candidate.email.clone(),
                }
                .fail();
            }
            if other.student_no == candidate.student_no {
                return DuplicateFieldSnafu {
                    field: StudentField::StudentNo,
                    value: candidate.student_no.clone(),
                }
                .fail();
            }
        }
        Ok(())
    }
}

fn filter_matches(filter: &StudentFilter, student: &Student) -> bool {
    match filter {
        StudentFilter::Course(course) => &student.course == course,
        StudentFilter::Section(section) => &student.section == section,
        StudentFilter::Year(year) => student.year == Some(*year),
    }
}

fn key_matches(key: &UniqueKey, student: &Student) -> bool {
    match key {
        UniqueKey::Email(email) => &student.email == email,
        UniqueKey::StudentNo(student_no) => &student.student_no == student_no,
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn insert(&self, student: NewStudent) -> RecordResult<Student> {
        let mut students = self.students.write().await;
        Self::ensure_unique(&students, &student, None)?;

        let now = OffsetDateTime::now_utc();
        let NewStudent {
            first_name,
            last_name,
            middle_initial,
            email,
            course,
            section,
            student_no,
            year,
        } = student;
        let created = Student {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            middle_initial,
            email,
            course,
            section,
            student_no,
            year,
            created_at: now,
            updated_at: now,
        };
        students.push(created.clone());
        Ok(created)
    }

    async fn list(&self, filter: Option<StudentFilter>) -> RecordResult<Vec<Student>> {
        Ok(self
            .students
            .read()
            .await
            .iter()
            .rev()
            .filter(|s| filter.as_ref().is_none_or(|f| filter_matches(f, s)))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> RecordResult<Option<Student>> {
        Ok(self.students.read().await.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_key(&self, key: &UniqueKey) -> RecordResult<Option<Student>> {
        Ok(self
            .students
            .read()
            .await
            .iter()
            .find(|s| key_matches(key, s))
            .cloned())
    }

    async fn replace(&self, id: Uuid, student: NewStudent) -> RecordResult<Option<Student>> {
        let mut students = self.students.write().await;
        let Some(index) = students.iter().position(|s| s.id == id) else {
            return Ok(None);
        };
        Self::ensure_unique(&students, &student, Some(id))?;

        let existing = &mut students[index];
        existing.first_name = student.first_name;
        existing.last_name = student.last_name;
        existing.middle_initial = student.middle_initial;
        existing.email = student.email;
        existing.course = student.course;
        existing.section = student.section;
        existing.student_no = student.student_no;
        existing.year = student.year;
        existing.updated_at = OffsetDateTime::now_utc();

        Ok(Some(existing.clone()))
    }

    async fn remove(&self, id: Uuid) -> RecordResult<bool> {
        let mut students = self.students.write().await;
        let before = students.len();
        students.retain(|s| s.id != id);
        Ok(students.len() != before)
    }
}
