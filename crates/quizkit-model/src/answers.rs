//! Correct answers, keyed by question id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::{OptionId, Question, QuestionId, QuestionType};

/// Mapping of question id to its ordered list of correct values.
///
/// Select questions store option ids; fill-in-the-blank stores a single
/// literal string. Lists keep insertion order, not option order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(BTreeMap<QuestionId, Vec<String>>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question: &QuestionId) -> Option<&[String]> {
        self.0.get(question).map(Vec::as_slice)
    }

    pub fn contains(&self, question: &QuestionId) -> bool {
        self.0.contains_key(question)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &[String])> {
        self.0.iter().map(|(id, values)| (id, values.as_slice()))
    }

    /// Insert a raw answer list without validation.
    ///
    /// Used when reassembling records; run [`Answers::prune`] afterwards.
    pub fn insert_raw(&mut self, question: QuestionId, values: Vec<String>) {
        self.0.insert(question, values);
    }

    pub fn remove(&mut self, question: &QuestionId) -> Option<Vec<String>> {
        self.0.remove(question)
    }

    /// Drop a single option id from a question's answer list.
    pub fn remove_option(&mut self, question: &QuestionId, option: &OptionId) {
        if let Some(values) = self.0.get_mut(question) {
            values.retain(|value| value != option.as_str());
            if values.is_empty() {
                self.0.remove(question);
            }
        }
    }

    /// Apply an answer edit with the type-specific semantics.
    ///
    /// - single-select: `value` must be an option id and replaces the list
    /// - multi-select: `value` must be an option id and is toggled
    /// - fill-in-the-blank: `value` replaces the list; an empty string clears it
    ///
    /// Returns whether `value` is part of the answer afterwards.
    pub fn set(&mut self, question: &Question, value: &str) -> Result<bool> {
        let id = question.id().clone();
        match question.kind() {
            QuestionType::SingleSelect => {
                require_option(question, value)?;
                self.0.insert(id, vec![value.to_string()]);
                Ok(true)
            }
            QuestionType::MultiSelect => {
                require_option(question, value)?;
                let values = self.0.entry(id.clone()).or_default();
                let present = if let Some(index) = values.iter().position(|v| v == value) {
                    values.remove(index);
                    false
                } else {
                    values.push(value.to_string());
                    true
                };
                if values.is_empty() {
                    self.0.remove(&id);
                }
                Ok(present)
            }
            QuestionType::FillInBlank => {
                if value.is_empty() {
                    self.0.remove(&id);
                    Ok(false)
                } else {
                    self.0.insert(id, vec![value.to_string()]);
                    Ok(true)
                }
            }
        }
    }

    /// Drop answers that no longer fit `questions`.
    ///
    /// Removes entries for unknown questions and option ids that are not on
    /// the question, truncates single-select and fill-in-the-blank lists to
    /// one value, and removes emptied entries. Returns the number of entries
    /// changed or removed.
    pub fn prune(&mut self, questions: &[Question]) -> usize {
        let mut changed = 0;
        self.0.retain(|id, values| {
            let Some(question) = questions.iter().find(|q| q.id() == id) else {
                changed += 1;
                return false;
            };
            let before = values.len();
            if question.kind().has_options() {
                values.retain(|value| question.has_option(&OptionId::from(value.as_str())));
                dedup_in_order(values);
            }
            if question.kind() != QuestionType::MultiSelect {
                values.truncate(1);
            }
            if values.len() != before {
                changed += 1;
            }
            !values.is_empty()
        });
        changed
    }

    /// Answers restricted to the given questions.
    pub fn restricted_to<'a>(&self, questions: impl IntoIterator<Item = &'a QuestionId>) -> Self {
        let mut scoped = Self::new();
        for id in questions {
            if let Some(values) = self.0.get(id) {
                scoped.0.insert(id.clone(), values.clone());
            }
        }
        scoped
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&QuestionId) -> bool) {
        self.0.retain(|id, _| keep(id));
    }
}

fn require_option(question: &Question, value: &str) -> Result<()> {
    let option = OptionId::from(value);
    if question.has_option(&option) {
        Ok(())
    } else {
        Err(ModelError::UnknownOption {
            question: question.id().clone(),
            option,
        })
    }
}

fn dedup_in_order(values: &mut Vec<String>) {
    let mut seen = Vec::with_capacity(values.len());
    values.retain(|value| {
        if seen.contains(value) {
            false
        } else {
            seen.push(value.clone());
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QuizOption;

    fn options() -> Vec<QuizOption> {
        vec![
            QuizOption::new("o1", "a"),
            QuizOption::new("o2", "b"),
            QuizOption::new("o3", "c"),
        ]
    }

    #[test]
    fn test_single_select_replaces() {
        let question = Question::single_select("q1", "?", options()).unwrap();
        let mut answers = Answers::new();
        answers.set(&question, "o1").unwrap();
        answers.set(&question, "o2").unwrap();
        assert_eq!(answers.get(question.id()), Some(&["o2".to_string()][..]));
    }

    #[test]
    fn test_multi_select_toggles_in_insertion_order() {
        let question = Question::multi_select("q1", "?", options()).unwrap();
        let mut answers = Answers::new();
        assert!(answers.set(&question, "o3").unwrap());
        assert!(answers.set(&question, "o1").unwrap());
        assert_eq!(
            answers.get(question.id()).unwrap(),
            &["o3".to_string(), "o1".to_string()]
        );

        assert!(!answers.set(&question, "o3").unwrap());
        assert!(!answers.set(&question, "o1").unwrap());
        assert!(!answers.contains(question.id()));
    }

    #[test]
    fn test_unknown_option_rejected() {
        let question = Question::single_select("q1", "?", options()).unwrap();
        let mut answers = Answers::new();
        let err = answers.set(&question, "nope").unwrap_err();
        assert!(matches!(err, ModelError::UnknownOption { .. }));
    }

    #[test]
    fn test_fill_in_blank_literal() {
        let question = Question::fill_in_blank("q1", "Capital of France?");
        let mut answers = Answers::new();
        answers.set(&question, "Paris").unwrap();
        assert_eq!(answers.get(question.id()).unwrap(), &["Paris".to_string()]);
        answers.set(&question, "").unwrap();
        assert!(answers.is_empty());
    }

    #[test]
    fn test_prune_drops_stale_entries() {
        let single = Question::single_select("q1", "?", options()).unwrap();
        let fill = Question::fill_in_blank("q2", "?");
        let mut answers = Answers::new();
        answers.insert_raw("q1".into(), vec!["gone".into(), "o2".into(), "o3".into()]);
        answers.insert_raw("q2".into(), vec!["x".into(), "y".into()]);
        answers.insert_raw("ghost".into(), vec!["o1".into()]);

        let changed = answers.prune(&[single, fill]);
        assert_eq!(changed, 3);
        assert_eq!(answers.get(&"q1".into()).unwrap(), &["o2".to_string()]);
        assert_eq!(answers.get(&"q2".into()).unwrap(), &["x".to_string()]);
        assert!(!answers.contains(&"ghost".into()));
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut answers = Answers::new();
        answers.insert_raw("q1".into(), vec!["o1".into()]);
        assert_eq!(serde_json::to_string(&answers).unwrap(), r#"{"q1":["o1"]}"#);
    }
}
