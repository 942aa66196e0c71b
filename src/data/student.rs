use crate::error::{MissingFieldSnafu, RecordResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use time::OffsetDateTime;
use uuid::Uuid;

/// A stored student, as returned by every read and write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_initial: Option<String>,
    pub email: String,
    pub course: String,
    pub section: String,
    pub student_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Every mutable field of a student, with the required ones known to be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub middle_initial: Option<String>,
    pub email: String,
    pub course: String,
    pub section: String,
    pub student_no: String,
    pub year: Option<i32>,
}

impl NewStudent {
    /// The unique value guarded by a constraint on `public.students`, if it is one of ours.
    pub fn key_for_constraint(&self, constraint: &str) -> Option<UniqueKey> {
        match constraint {
            "students_email_key" => Some(UniqueKey::Email(self.email.clone())),
            "students_student_no_key" => Some(UniqueKey::StudentNo(self.student_no.clone())),
            _ => None,
        }
    }
}

/// Body of a create or full update. Nothing is trusted until [`StudentDraft::validate`].
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_initial: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
    pub section: Option<String>,
    pub student_no: Option<String>,
    pub year: Option<i32>,
}

impl StudentDraft {
    pub fn validate(self) -> RecordResult<NewStudent> {
        fn required(value: Option<String>, field: StudentField) -> RecordResult<String> {
            match value {
                Some(value) if !value.is_empty() => Ok(value),
                _ => MissingFieldSnafu { field }.fail(),
            }
        }

        Ok(NewStudent {
            first_name: required(self.first_name, StudentField::FirstName)?,
            last_name: required(self.last_name, StudentField::LastName)?,
            middle_initial: self.middle_initial,
            email: required(self.email, StudentField::Email)?,
            course: required(self.course, StudentField::Course)?,
            section: required(self.section, StudentField::Section)?,
            student_no: required(self.student_no, StudentField::StudentNo)?,
            year: self.year,
        })
    }
}

impl From<Student> for StudentDraft {
    fn from(student: Student) -> Self {
        Self {
            first_name: Some(student.first_name),
            last_name: Some(student.last_name),
            middle_initial: student.middle_initial,
            email: Some(student.email),
            course: Some(student.course),
            section: Some(student.section),
            student_no: Some(student.student_no),
            year: student.year,
        }
    }
}

/// Body of a partial update.
///
/// The outer `Option` is whether the key was sent at all, the inner one whether it was `null`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    #[serde(default, deserialize_with = "present")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub middle_initial: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub course: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub section: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub student_no: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub year: Option<Option<i32>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl StudentPatch {
    /// Merges the supplied keys over `existing` and re-validates the result.
    pub fn apply_to(self, existing: Student) -> RecordResult<NewStudent> {
        fn merge<T>(current: &mut Option<T>, incoming: Option<Option<T>>) {
            if let Some(incoming) = incoming {
                *current = incoming;
            }
        }

        let mut draft = StudentDraft::from(existing);
        merge(&mut draft.first_name, self.first_name);
        merge(&mut draft.last_name, self.last_name);
        merge(&mut draft.middle_initial, self.middle_initial);
        merge(&mut draft.email, self.email);
        merge(&mut draft.course, self.course);
        merge(&mut draft.section, self.section);
        merge(&mut draft.student_no, self.student_no);
        merge(&mut draft.year, self.year);
        draft.validate()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StudentField {
    FirstName,
    LastName,
    Email,
    Course,
    Section,
    StudentNo,
}

impl StudentField {
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Course => "course",
            Self::Section => "section",
            Self::StudentNo => "studentNo",
        }
    }
}

impl Display for StudentField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Exact-match filters for the list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentFilter {
    Course(String),
    Section(String),
    Year(i32),
}

/// Lookups by one of the fields that is unique across all students.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniqueKey {
    Email(String),
    StudentNo(String),
}

impl UniqueKey {
    pub const fn field(&self) -> StudentField {
        match self {
            Self::Email(_) => StudentField::Email,
            Self::StudentNo(_) => StudentField::StudentNo,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Email(value) | Self::StudentNo(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordError;
    use serde_json::json;

    fn juan() -> StudentDraft {
        serde_json::from_value(json!({
            "firstName": "Juan",
            "lastName": "Dela Cruz",
            "email": "juan@example.com",
            "course": "BSIT",
            "section": "A",
            "studentNo": "2025-0001",
            "year": 2
        }))
        .unwrap()
    }

    fn stored(new: NewStudent) -> Student {
        let now = OffsetDateTime::now_utc();
        Student {
            id: Uuid::new_v4(),
            first_name: new.first_name,
            last_name: new.last_name,
            middle_initial: new.middle_initial,
            email: new.email,
            course: new.course,
            section: new.section,
            student_no: new.student_no,
            year: new.year,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn complete_draft_validates() {
        let new = juan().validate().unwrap();
        assert_eq!(new.first_name, "Juan");
        assert_eq!(new.student_no, "2025-0001");
        assert_eq!(new.year, Some(2));
        assert_eq!(new.middle_initial, None);
    }

    #[test]
    fn missing_required_field_is_named() {
        let mut draft = juan();
        draft.course = None;
        match draft.validate() {
            Err(RecordError::MissingField { field }) => assert_eq!(field, StudentField::Course),
            other => panic!("expected missing course, got {other:?}"),
        }
    }

    #[test]
    fn empty_string_counts_as_missing() {
        let mut draft = juan();
        draft.email = Some(String::new());
        assert!(matches!(
            draft.validate(),
            Err(RecordError::MissingField {
                field: StudentField::Email
            })
        ));
    }

    #[test]
    fn wrongly_typed_year_is_rejected_by_serde() {
        let result = serde_json::from_value::<StudentDraft>(json!({ "year": "two" }));
        assert!(result.is_err());
    }

    #[test]
    fn patch_only_touches_supplied_keys() {
        let existing = stored(juan().validate().unwrap());
        let patch: StudentPatch = serde_json::from_value(json!({ "year": 3 })).unwrap();

        let merged = patch.apply_to(existing.clone()).unwrap();
        assert_eq!(merged.year, Some(3));
        assert_eq!(merged.first_name, existing.first_name);
        assert_eq!(merged.email, existing.email);
    }

    #[test]
    fn patch_null_clears_optional_but_not_required() {
        let mut draft = juan();
        draft.middle_initial = Some("P".into());
        let existing = stored(draft.validate().unwrap());

        let clear_initial: StudentPatch =
            serde_json::from_value(json!({ "middleInitial": null })).unwrap();
        assert_eq!(
            clear_initial.apply_to(existing.clone()).unwrap().middle_initial,
            None
        );

        let clear_name: StudentPatch =
            serde_json::from_value(json!({ "firstName": null })).unwrap();
        assert!(matches!(
            clear_name.apply_to(existing),
            Err(RecordError::MissingField {
                field: StudentField::FirstName
            })
        ));
    }

    #[test]
    fn serialised_student_uses_camel_case_and_skips_absent_optionals() {
        let value = serde_json::to_value(stored(juan().validate().unwrap())).unwrap();
        assert_eq!(value["studentNo"], "2025-0001");
        assert_eq!(value["lastName"], "Dela Cruz");
        assert!(value.get("middleInitial").is_none());
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn constraint_names_map_to_unique_keys() {
        let new = juan().validate().unwrap();
        assert_eq!(
            new.key_for_constraint("students_email_key"),
            Some(UniqueKey::Email("juan@example.com".into()))
        );
        assert_eq!(
            new.key_for_constraint("students_student_no_key"),
            Some(UniqueKey::StudentNo("2025-0001".into()))
        );
        assert_eq!(new.key_for_constraint("students_pkey"), None);
    }
}
