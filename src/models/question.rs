use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Question difficulty tier used both in quiz content and on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        write!(f, "{}", label)
    }
}

/// Subject a chapter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Math,
    Science,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Math => write!(f, "math"),
            Subject::Science => write!(f, "science"),
        }
    }
}

/// Question identifier. Static content uses numeric ids; generated practice
/// questions may carry string ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Num(i64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Num(n) => write!(f, "{}", n),
            QuestionId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for QuestionId {
    fn from(n: i64) -> Self {
        QuestionId::Num(n)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        QuestionId::Text(s.to_string())
    }
}

/// A single answer option. The `correct` flag travels with the option, so
/// reordering the list never changes which answer is right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    pub correct: bool,
}

/// One quiz question, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concept_tags: Vec<String>,
}

impl Question {
    /// Index of the option with `correct = true`.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.correct)
    }

    /// Text of the correct option.
    pub fn correct_text(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.correct)
            .map(|o| o.text.as_str())
    }

    /// Uniformly permute the option order in place. Option order carries no
    /// meaning; only the `correct` flag does.
    pub fn shuffle_options<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.options.shuffle(rng);
    }

    /// Clone with shuffled options; used when a question enters a session.
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Question {
        let mut q = self.clone();
        q.shuffle_options(rng);
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_question() -> Question {
        Question {
            id: QuestionId::Num(1),
            prompt: "Which shape has 3 sides?".to_string(),
            options: vec![
                AnswerOption {
                    text: "Triangle".to_string(),
                    emoji: Some("🔺".to_string()),
                    correct: true,
                },
                AnswerOption {
                    text: "Circle".to_string(),
                    emoji: None,
                    correct: false,
                },
                AnswerOption {
                    text: "Square".to_string(),
                    emoji: None,
                    correct: false,
                },
                AnswerOption {
                    text: "Star".to_string(),
                    emoji: None,
                    correct: false,
                },
            ],
            difficulty: Difficulty::Easy,
            explanation: Some("A triangle has 3 sides.".to_string()),
            hint: None,
            concept_tags: vec!["shapes".to_string()],
        }
    }

    #[test]
    fn shuffle_preserves_options_and_correct_answer() {
        let original = sample_question();
        let before = original.correct_text().unwrap().to_string();

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let shuffled = original.shuffled(&mut rng);

            assert_eq!(shuffled.options.len(), original.options.len());
            for option in &original.options {
                assert!(shuffled.options.contains(option));
            }
            assert_eq!(
                shuffled.options.iter().filter(|o| o.correct).count(),
                1,
                "shuffling must keep exactly one correct option"
            );
            assert_eq!(shuffled.correct_text().unwrap(), before);
        }
    }

    #[test]
    fn question_id_accepts_numbers_and_strings() {
        let num: QuestionId = serde_json::from_str("3").unwrap();
        assert_eq!(num, QuestionId::Num(3));

        let text: QuestionId = serde_json::from_str("\"practice_2_medium\"").unwrap();
        assert_eq!(text, QuestionId::Text("practice_2_medium".to_string()));
    }

    #[test]
    fn question_wire_format_is_camel_case() {
        let q = sample_question();
        let json = serde_json::to_string(&q).unwrap();
        assert!(json.contains("\"question\":"));
        assert!(json.contains("\"conceptTags\":"));
        assert!(json.contains("\"correct\":true"));
    }
}
