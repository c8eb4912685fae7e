//! The course catalog seam.
//!
//! Questline consumes course structure but does not own it. The
//! [`CourseCatalog`] trait is the engine's only view of that structure:
//! lesson-to-course linkage, the interactive blocks that gate lesson
//! completion, and the lesson set of a course. Production uses the
//! Postgres-backed read model; tests use the in-memory implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use questline_db::{PostgresPool, catalog_store};
use questline_types::{ContentBlock, ContentBlockId, CourseId, LessonId, LessonRef};

use crate::error::EngineError;

/// Read access to course structure.
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    /// Resolve a lesson's linkage and gating structure.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Db`] if the lookup fails.
    async fn lesson_ref(&self, lesson_id: LessonId) -> Result<Option<LessonRef>, EngineError>;

    /// Fetch a single block with its owning lesson.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Db`] if the lookup fails.
    async fn block(
        &self,
        block_id: ContentBlockId,
    ) -> Result<Option<(LessonId, ContentBlock)>, EngineError>;

    /// Fetch the ids of every lesson in a course.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Db`] if the lookup fails.
    async fn course_lesson_ids(&self, course_id: CourseId) -> Result<Vec<LessonId>, EngineError>;
}

/// Catalog backed by the thin `catalog_lessons` / `catalog_blocks` read
/// model in `PostgreSQL`.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PostgresPool,
}

impl PgCatalog {
    /// Create a catalog over the given pool.
    pub const fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseCatalog for PgCatalog {
    async fn lesson_ref(&self, lesson_id: LessonId) -> Result<Option<LessonRef>, EngineError> {
        let mut conn = self.pool.pool().acquire().await.map_err(questline_db::DbError::from)?;
        Ok(catalog_store::lesson_ref(&mut conn, lesson_id).await?)
    }

    async fn block(
        &self,
        block_id: ContentBlockId,
    ) -> Result<Option<(LessonId, ContentBlock)>, EngineError> {
        let mut conn = self.pool.pool().acquire().await.map_err(questline_db::DbError::from)?;
        Ok(catalog_store::block(&mut conn, block_id).await?)
    }

    async fn course_lesson_ids(&self, course_id: CourseId) -> Result<Vec<LessonId>, EngineError> {
        let mut conn = self.pool.pool().acquire().await.map_err(questline_db::DbError::from)?;
        Ok(catalog_store::course_lesson_ids(&mut conn, course_id).await?)
    }
}

/// In-memory catalog for tests.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    lessons: RwLock<HashMap<LessonId, LessonRef>>,
    blocks: RwLock<HashMap<ContentBlockId, (LessonId, ContentBlock)>>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lesson with its gating structure.
    pub fn put_lesson(&self, lesson: LessonRef) {
        if let Ok(mut lessons) = self.lessons.write() {
            lessons.insert(lesson.lesson_id, lesson);
        }
    }

    /// Register a block under its owning lesson.
    pub fn put_block(&self, lesson_id: LessonId, block: ContentBlock) {
        if let Ok(mut blocks) = self.blocks.write() {
            blocks.insert(block.id, (lesson_id, block));
        }
    }
}

#[async_trait]
impl CourseCatalog for MemoryCatalog {
    async fn lesson_ref(&self, lesson_id: LessonId) -> Result<Option<LessonRef>, EngineError> {
        Ok(self
            .lessons
            .read()
            .ok()
            .and_then(|lessons| lessons.get(&lesson_id).cloned()))
    }

    async fn block(
        &self,
        block_id: ContentBlockId,
    ) -> Result<Option<(LessonId, ContentBlock)>, EngineError> {
        Ok(self
            .blocks
            .read()
            .ok()
            .and_then(|blocks| blocks.get(&block_id).cloned()))
    }

    async fn course_lesson_ids(&self, course_id: CourseId) -> Result<Vec<LessonId>, EngineError> {
        Ok(self
            .lessons
            .read()
            .ok()
            .map(|lessons| {
                lessons
                    .values()
                    .filter(|l| l.course_id == course_id)
                    .map(|l| l.lesson_id)
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questline_types::BlockContent;

    fn lesson(course_id: CourseId) -> LessonRef {
        LessonRef {
            lesson_id: LessonId::new(),
            course_id,
            title: String::from("Intro"),
            required_block_ids: Vec::new(),
            quiz_block_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn memory_catalog_resolves_lessons() {
        let catalog = MemoryCatalog::new();
        let course = CourseId::new();
        let entry = lesson(course);
        let id = entry.lesson_id;
        catalog.put_lesson(entry);

        let found = catalog.lesson_ref(id).await.ok().flatten();
        assert_eq!(found.map(|l| l.course_id), Some(course));
        let missing = catalog.lesson_ref(LessonId::new()).await.ok().flatten();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn memory_catalog_lists_course_lessons() {
        let catalog = MemoryCatalog::new();
        let course = CourseId::new();
        let other = CourseId::new();
        catalog.put_lesson(lesson(course));
        catalog.put_lesson(lesson(course));
        catalog.put_lesson(lesson(other));

        let ids = catalog.course_lesson_ids(course).await.unwrap_or_default();
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn memory_catalog_resolves_blocks() {
        let catalog = MemoryCatalog::new();
        let lesson_id = LessonId::new();
        let block = ContentBlock {
            id: ContentBlockId::new(),
            position: 0,
            content: BlockContent::Text {
                body: String::from("Welcome"),
            },
        };
        let block_id = block.id;
        catalog.put_block(lesson_id, block);

        let found = catalog.block(block_id).await.ok().flatten();
        assert_eq!(found.map(|(l, _)| l), Some(lesson_id));
    }
}
