//! Static quiz content and concept tags.
//!
//! Content is a pure lookup keyed by class/subject/chapter/quiz-set; the
//! adaptive behavior on top of it lives in the session controller.

use std::fmt;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::models::{Question, Subject};

const CONTENT_JSON: &str = include_str!("content.json");

/// Lookup failure for a composite content key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound {
    pub class_level: u8,
    pub subject: Subject,
    pub chapter_id: String,
    pub quiz_set_id: String,
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no quiz set {}/{} for class {} {}",
            self.chapter_id, self.quiz_set_id, self.class_level, self.subject
        )
    }
}

impl std::error::Error for NotFound {}

/// A named group of questions inside a chapter.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizSet {
    pub id: String,
    pub name: String,
    pub questions: Vec<Question>,
}

/// A chapter of a subject, holding its quiz sets.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub difficulty: crate::models::Difficulty,
    pub quiz_sets: Vec<QuizSet>,
}

#[derive(Debug, Clone, Deserialize)]
struct ClassContent {
    #[serde(rename = "class")]
    class_level: u8,
    subject: Subject,
    chapters: Vec<Chapter>,
}

fn content() -> &'static [ClassContent] {
    static CONTENT: OnceLock<Vec<ClassContent>> = OnceLock::new();
    CONTENT.get_or_init(|| {
        serde_json::from_str(CONTENT_JSON).expect("embedded quiz content must be valid JSON")
    })
}

/// Chapters available for a class and subject.
pub fn chapters(class_level: u8, subject: Subject) -> &'static [Chapter] {
    content()
        .iter()
        .find(|c| c.class_level == class_level && c.subject == subject)
        .map(|c| c.chapters.as_slice())
        .unwrap_or(&[])
}

/// Look up one quiz set. Pure, no side effects; fails with [`NotFound`]
/// when any part of the composite key is absent.
pub fn quiz_set(
    class_level: u8,
    subject: Subject,
    chapter_id: &str,
    quiz_set_id: &str,
) -> Result<&'static QuizSet, NotFound> {
    chapters(class_level, subject)
        .iter()
        .find(|ch| ch.id == chapter_id)
        .and_then(|ch| ch.quiz_sets.iter().find(|s| s.id == quiz_set_id))
        .ok_or_else(|| NotFound {
            class_level,
            subject,
            chapter_id: chapter_id.to_string(),
            quiz_set_id: quiz_set_id.to_string(),
        })
}

/// Concept tags scoping AI-generated questions to a chapter's topic.
pub fn concept_tags(chapter_id: &str) -> Vec<String> {
    let tags: &[&str] = match chapter_id {
        "class1-math-shapes-and-space" => {
            &["shapes", "geometry", "visual-recognition", "spatial-awareness"]
        }
        "class1-math-numbers-from-1-to-9" => {
            &["counting", "numbers", "basic-math", "number-recognition"]
        }
        "class1-science-living-and-non-living" => {
            &["classification", "observation", "living-things", "biology"]
        }
        "class1-science-my-body" => &["anatomy", "body-parts", "health", "human-body"],
        "class2-math-numbers-up-to-100" => {
            &["counting", "numbers", "place-value", "number-sense"]
        }
        "class2-math-addition-subtraction" => {
            &["addition", "subtraction", "arithmetic", "basic-operations"]
        }
        "class2-science-plants-around-us" => &["plants", "nature", "observation", "botany"],
        "class2-science-animals" => &["animals", "habitats", "classification", "zoology"],
        "class3-math-multiplication" => &["multiplication", "tables", "arithmetic", "times-tables"],
        "class3-math-division" => &["division", "arithmetic", "problem-solving", "sharing"],
        "class3-science-water" => &["water", "states-of-matter", "science", "chemistry"],
        "class3-science-air" => &["air", "atmosphere", "science", "physics"],
        _ => &["general-knowledge"],
    };
    tags.iter().map(|t| t.to_string()).collect()
}
