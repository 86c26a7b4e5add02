//! Lessons as the indexer sees them.
//!
//! Lessons are owned by the surrounding learning platform; this crate only
//! reads them to assemble the text that gets chunked and embedded.

use serde::{Deserialize, Serialize};

use super::LessonId;

/// Publication state of a lesson. Only published lessons are indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
    Draft,
    Published,
    Archived,
}

impl LessonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// A reading-list entry attached to a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingItem {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub unit_code: String,
    pub title: String,
    pub description: String,
    pub objectives: String,
    pub status: LessonStatus,
    pub reading_list: Vec<ReadingItem>,
}

impl Lesson {
    /// Concatenate the lesson's text fields into blank-line separated
    /// paragraphs for chunking.
    pub fn index_text(&self) -> String {
        let mut parts = vec![
            format!("Unit Code: {}", self.unit_code),
            format!("Title: {}", self.title),
        ];

        if !self.description.trim().is_empty() {
            parts.push(format!("Description: {}", self.description.trim()));
        }
        if !self.objectives.trim().is_empty() {
            parts.push(format!("Learning Objectives: {}", self.objectives.trim()));
        }
        for item in &self.reading_list {
            parts.push(format!("Reading: {} - {}", item.title, item.description));
        }

        parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson() -> Lesson {
        Lesson {
            id: 1,
            unit_code: "CS101".to_string(),
            title: "Intro to Python".to_string(),
            description: "Basics of the language.".to_string(),
            objectives: String::new(),
            status: LessonStatus::Published,
            reading_list: vec![ReadingItem {
                title: "Think Python".to_string(),
                description: "Chapters 1-3".to_string(),
            }],
        }
    }

    #[test]
    fn test_index_text_skips_blank_fields() {
        let text = lesson().index_text();
        assert_eq!(
            text,
            "Unit Code: CS101\n\nTitle: Intro to Python\n\nDescription: Basics of the language.\n\nReading: Think Python - Chapters 1-3"
        );
        assert!(!text.contains("Learning Objectives"));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [LessonStatus::Draft, LessonStatus::Published, LessonStatus::Archived] {
            assert_eq!(LessonStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(LessonStatus::from_str("PUBLISHED"), Some(LessonStatus::Published));
        assert_eq!(LessonStatus::from_str("deleted"), None);
    }
}
