//! Read-model persistence for the course catalog.
//!
//! The content service owns courses; it pushes lesson and block rows here
//! so the engine can resolve lesson structure without a cross-service
//! call. Block content is stored as JSONB in the tagged wire shape of
//! [`BlockContent`].

use questline_types::{BlockContent, ContentBlock, ContentBlockId, CourseId, LessonId, LessonRef};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::DbError;

/// Insert or update a catalog lesson row.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the upsert fails.
pub async fn upsert_lesson(
    conn: &mut PgConnection,
    lesson_id: LessonId,
    course_id: CourseId,
    title: &str,
) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO catalog_lessons (lesson_id, course_id, title)
          VALUES ($1, $2, $3)
          ON CONFLICT (lesson_id) DO UPDATE
          SET course_id = EXCLUDED.course_id, title = EXCLUDED.title",
    )
    .bind(lesson_id.into_inner())
    .bind(course_id.into_inner())
    .bind(title)
    .execute(conn)
    .await?;
    Ok(())
}

/// Insert or update a catalog block row.
///
/// # Errors
///
/// Returns [`DbError::Serialization`] if the content cannot be encoded,
/// or [`DbError::Postgres`] if the upsert fails.
pub async fn upsert_block(
    conn: &mut PgConnection,
    lesson_id: LessonId,
    block: &ContentBlock,
) -> Result<(), DbError> {
    let content = serde_json::to_value(&block.content)?;
    sqlx::query(
        r"INSERT INTO catalog_blocks (block_id, lesson_id, position, content)
          VALUES ($1, $2, $3, $4)
          ON CONFLICT (block_id) DO UPDATE
          SET lesson_id = EXCLUDED.lesson_id, position = EXCLUDED.position,
              content = EXCLUDED.content",
    )
    .bind(block.id.into_inner())
    .bind(lesson_id.into_inner())
    .bind(i32::try_from(block.position).unwrap_or(i32::MAX))
    .bind(content)
    .execute(conn)
    .await?;
    Ok(())
}

/// Resolve a lesson's linkage and gating structure.
///
/// Returns `None` for lessons the catalog has never seen.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if a query fails, or
/// [`DbError::Serialization`] if stored block content cannot be decoded.
pub async fn lesson_ref(
    conn: &mut PgConnection,
    lesson_id: LessonId,
) -> Result<Option<LessonRef>, DbError> {
    let lesson: Option<(Uuid, String)> = sqlx::query_as(
        r"SELECT course_id, title FROM catalog_lessons WHERE lesson_id = $1",
    )
    .bind(lesson_id.into_inner())
    .fetch_optional(&mut *conn)
    .await?;

    let Some((course_id, title)) = lesson else {
        return Ok(None);
    };

    let block_rows: Vec<(Uuid, serde_json::Value)> = sqlx::query_as(
        r"SELECT block_id, content
          FROM catalog_blocks
          WHERE lesson_id = $1
          ORDER BY position",
    )
    .bind(lesson_id.into_inner())
    .fetch_all(conn)
    .await?;

    let mut required_block_ids = Vec::new();
    let mut quiz_block_ids = Vec::new();
    for (block_id, content) in block_rows {
        let content: BlockContent = serde_json::from_value(content)?;
        let id = ContentBlockId::from(block_id);
        if content.is_interactive() {
            required_block_ids.push(id);
        }
        if content.is_quiz() {
            quiz_block_ids.push(id);
        }
    }

    Ok(Some(LessonRef {
        lesson_id,
        course_id: CourseId::from(course_id),
        title,
        required_block_ids,
        quiz_block_ids,
    }))
}

/// Fetch a single block with its owning lesson.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails, or
/// [`DbError::Serialization`] if stored block content cannot be decoded.
pub async fn block(
    conn: &mut PgConnection,
    block_id: ContentBlockId,
) -> Result<Option<(LessonId, ContentBlock)>, DbError> {
    let row: Option<(Uuid, i32, serde_json::Value)> = sqlx::query_as(
        r"SELECT lesson_id, position, content FROM catalog_blocks WHERE block_id = $1",
    )
    .bind(block_id.into_inner())
    .fetch_optional(conn)
    .await?;

    let Some((lesson_id, position, content)) = row else {
        return Ok(None);
    };
    let content: BlockContent = serde_json::from_value(content)?;
    Ok(Some((
        LessonId::from(lesson_id),
        ContentBlock {
            id: block_id,
            position: u32::try_from(position).unwrap_or(0),
            content,
        },
    )))
}

/// Fetch the ids of every lesson in a course.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] if the query fails.
pub async fn course_lesson_ids(
    conn: &mut PgConnection,
    course_id: CourseId,
) -> Result<Vec<LessonId>, DbError> {
    let rows: Vec<(Uuid,)> =
        sqlx::query_as(r"SELECT lesson_id FROM catalog_lessons WHERE course_id = $1")
            .bind(course_id.into_inner())
            .fetch_all(conn)
            .await?;
    Ok(rows.into_iter().map(|(id,)| LessonId::from(id)).collect())
}
