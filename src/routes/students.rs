use crate::{
    data::student::{Student, StudentDraft, StudentFilter, StudentPatch, UniqueKey},
    error::{
        Message, MissingStudentBySnafu, MissingStudentSnafu, ParseIdSnafu, ParseUpdateIdSnafu,
        RecordResult,
    },
    state::RecordState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use snafu::{OptionExt, ResultExt};
use uuid::Uuid;

fn parse_id(raw: &str) -> RecordResult<Uuid> {
    Uuid::try_parse(raw).context(ParseIdSnafu { original: raw })
}

fn parse_update_id(raw: &str) -> RecordResult<Uuid> {
    Uuid::try_parse(raw).context(ParseUpdateIdSnafu { original: raw })
}

pub async fn post_student(
    State(state): State<RecordState>,
    body: Result<Json<StudentDraft>, JsonRejection>,
) -> RecordResult<(StatusCode, Json<Student>)> {
    let Json(draft) = body?;
    let student = state.insert(draft.validate()?).await?;

    info!(id = %student.id, student_no = %student.student_no, "Created student");
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn get_students(State(state): State<RecordState>) -> RecordResult<Json<Vec<Student>>> {
    Ok(Json(state.list(None).await?))
}

pub async fn get_students_by_course(
    State(state): State<RecordState>,
    Path(course): Path<String>,
) -> RecordResult<Json<Vec<Student>>> {
    Ok(Json(state.list(Some(StudentFilter::Course(course))).await?))
}

pub async fn get_students_by_section(
    State(state): State<RecordState>,
    Path(section): Path<String>,
) -> RecordResult<Json<Vec<Student>>> {
    Ok(Json(state.list(Some(StudentFilter::Section(section))).await?))
}

/// `year` is stored as an integer, so anything that doesn't parse can't match.
pub async fn get_students_by_year(
    State(state): State<RecordState>,
    Path(year): Path<String>,
) -> RecordResult<Json<Vec<Student>>> {
    let Ok(year) = year.trim().parse::<i32>() else {
        debug!(?year, "Non-numeric year filter");
        return Ok(Json(Vec::new()));
    };

    Ok(Json(state.list(Some(StudentFilter::Year(year))).await?))
}

pub async fn get_student(
    State(state): State<RecordState>,
    Path(id): Path<String>,
) -> RecordResult<Json<Student>> {
    let id = parse_id(&id)?;
    let student = state
        .find_by_id(id)
        .await?
        .context(MissingStudentSnafu { id })?;
    Ok(Json(student))
}

async fn get_student_by_key(state: &RecordState, key: UniqueKey) -> RecordResult<Json<Student>> {
    let student = state
        .find_by_key(&key)
        .await?
        .context(MissingStudentBySnafu {
            field: key.field(),
            value: key.value(),
        })?;
    Ok(Json(student))
}

pub async fn get_student_by_email(
    State(state): State<RecordState>,
    Path(email): Path<String>,
) -> RecordResult<Json<Student>> {
    get_student_by_key(&state, UniqueKey::Email(email)).await
}

pub async fn get_student_by_student_no(
    State(state): State<RecordState>,
    Path(student_no): Path<String>,
) -> RecordResult<Json<Student>> {
    get_student_by_key(&state, UniqueKey::StudentNo(student_no)).await
}

pub async fn put_student(
    State(state): State<RecordState>,
    Path(id): Path<String>,
    body: Result<Json<StudentDraft>, JsonRejection>,
) -> RecordResult<Json<Student>> {
    let id = parse_update_id(&id)?;
    let Json(draft) = body?;

    let student = state
        .replace(id, draft.validate()?)
        .await?
        .context(MissingStudentSnafu { id })?;

    info!(%id, "Replaced student");
    Ok(Json(student))
}

pub async fn patch_student(
    State(state): State<RecordState>,
    Path(id): Path<String>,
    body: Result<Json<StudentPatch>, JsonRejection>,
) -> RecordResult<Json<Student>> {
    let id = parse_update_id(&id)?;
    let Json(patch) = body?;

    let existing = state
        .find_by_id(id)
        .await?
        .context(MissingStudentSnafu { id })?;
    let merged = patch.apply_to(existing)?;

    let student = state
        .replace(id, merged)
        .await?
        .context(MissingStudentSnafu { id })?;

    info!(%id, "Patched student");
    Ok(Json(student))
}

pub async fn delete_student(
    State(state): State<RecordState>,
    Path(id): Path<String>,
) -> RecordResult<Json<Message>> {
    let id = parse_id(&id)?;
    snafu::ensure!(state.remove(id).await?, MissingStudentSnafu { id });

    info!(%id, "Deleted student");
    Ok(Json(Message::new("Student deleted")))
}
