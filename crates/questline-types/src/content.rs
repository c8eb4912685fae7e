//! Lesson content blocks as a closed tagged union.
//!
//! Lesson bodies arrive from the content collaborator as JSON. Instead of
//! threading loosely-typed payloads through the pipeline, every block is
//! parsed exactly once at the system boundary into [`ContentBlock`], a
//! closed enum keyed by a `kind` tag. Each variant carries its own
//! strongly-typed content schema; anything that does not match fails
//! validation at the boundary and never reaches the engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::ContentBlockId;

/// The typed payload of a single content block within a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockContent {
    /// Prose content rendered as-is.
    Text {
        /// Markdown body.
        body: String,
    },
    /// Embedded video.
    Video {
        /// Playback URL (object storage is an external collaborator).
        url: String,
        /// Duration in whole seconds.
        duration_secs: u32,
    },
    /// A single-question quiz.
    Quiz {
        /// The question text.
        question: String,
        /// Answer options, in display order.
        options: Vec<String>,
        /// Index of the correct option within `options`.
        correct_index: u32,
        /// Maximum score for a correct answer.
        max_score: u32,
    },
    /// A fill-in-the-blank exercise.
    FillInBlank {
        /// Prompt text containing the blank.
        prompt: String,
        /// Accepted answers (case-insensitive match at grading time).
        accepted_answers: Vec<String>,
    },
}

impl BlockContent {
    /// Whether this block requires user interaction before the lesson
    /// can be marked complete.
    pub const fn is_interactive(&self) -> bool {
        matches!(self, Self::Quiz { .. } | Self::FillInBlank { .. })
    }

    /// Whether this block is a quiz (eligible for quiz XP and the
    /// perfect-score badge predicate).
    pub const fn is_quiz(&self) -> bool {
        matches!(self, Self::Quiz { .. })
    }
}

/// A content block with its identity and lesson position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ContentBlock {
    /// Block identifier.
    pub id: ContentBlockId,
    /// Position within the lesson, ascending.
    pub position: u32,
    /// The typed payload.
    pub content: BlockContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_union_roundtrip() {
        let block = BlockContent::Quiz {
            question: String::from("2 + 2?"),
            options: vec![String::from("3"), String::from("4")],
            correct_index: 1,
            max_score: 10,
        };
        let json = serde_json::to_string(&block).ok();
        assert!(json.as_deref().is_some_and(|j| j.contains("\"kind\":\"quiz\"")));
        let back: Result<BlockContent, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(back.ok(), Some(block));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let raw = r#"{"kind":"hologram","body":"nope"}"#;
        let parsed: Result<BlockContent, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn interactivity_classification() {
        let text = BlockContent::Text {
            body: String::from("intro"),
        };
        let fill = BlockContent::FillInBlank {
            prompt: String::from("Rust is ___"),
            accepted_answers: vec![String::from("fast")],
        };
        assert!(!text.is_interactive());
        assert!(fill.is_interactive());
        assert!(!fill.is_quiz());
    }
}
