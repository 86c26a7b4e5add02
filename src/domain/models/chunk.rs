//! Indexed lesson chunks and the shapes they take on their way in and out
//! of the vector store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LessonId;

/// One indexed segment of a lesson's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: i64,
    pub lesson_id: LessonId,
    /// Position of the chunk within its lesson's chunk sequence
    pub chunk_index: u32,
    pub content: String,
    pub embedding: Vec<f32>,
    /// Approximate token count (characters / 4)
    pub token_count: u32,
    pub created_at: DateTime<Utc>,
}

/// A chunk ready to be written for a lesson.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChunk {
    pub content: String,
    pub embedding: Vec<f32>,
    pub token_count: u32,
}

impl NewChunk {
    pub fn new(content: impl Into<String>, embedding: Vec<f32>, token_count: u32) -> Self {
        Self {
            content: content.into(),
            embedding,
            token_count,
        }
    }
}

/// Which lessons a nearest-neighbour query may draw chunks from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonScope {
    All,
    Only(LessonId),
    Except(LessonId),
}

/// A nearest-neighbour hit joined with its owning lesson.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk_id: i64,
    pub lesson_id: LessonId,
    pub lesson_code: String,
    pub lesson_title: String,
    pub content: String,
    /// Cosine distance to the query: 0 is identical direction
    pub distance: f32,
}

/// Retrieved context handed to prompt composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextChunk {
    pub content: String,
    pub lesson_title: String,
    pub lesson_code: String,
}

impl ContextChunk {
    /// `CODE - Title`, used both in prompts and in response sources.
    pub fn lesson_label(&self) -> String {
        format!("{} - {}", self.lesson_code, self.lesson_title)
    }
}

impl From<ScoredChunk> for ContextChunk {
    fn from(hit: ScoredChunk) -> Self {
        Self {
            content: hit.content,
            lesson_title: hit.lesson_title,
            lesson_code: hit.lesson_code,
        }
    }
}

/// Result of writing one lesson's chunks to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IndexOutcome {
    /// The lesson had no chunks; these were inserted.
    Inserted { chunks: usize },
    /// Forced re-index: prior chunks were removed and the new set inserted.
    Replaced { removed: usize, chunks: usize },
    /// The lesson already had chunks and force was not requested.
    Skipped { existing: usize },
}

impl IndexOutcome {
    pub fn chunks_written(&self) -> usize {
        match self {
            Self::Inserted { chunks } | Self::Replaced { chunks, .. } => *chunks,
            Self::Skipped { .. } => 0,
        }
    }
}

/// Chunk boundary parameters, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    #[serde(default = "default_target_size")]
    pub target_size: usize,

    /// Overlap budget: a trailing paragraph shorter than this is carried into
    /// the next chunk
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

const fn default_target_size() -> usize {
    1200
}

const fn default_overlap() -> usize {
    200
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_size: default_target_size(),
            overlap: default_overlap(),
        }
    }
}

impl ChunkingConfig {
    pub fn new(target_size: usize, overlap: usize) -> Self {
        Self {
            target_size,
            overlap,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.target_size == 0 {
            return Err("target_size must be greater than 0".to_string());
        }
        if self.overlap >= self.target_size {
            return Err(format!(
                "overlap ({}) must be smaller than target_size ({})",
                self.overlap, self.target_size
            ));
        }
        Ok(())
    }
}
