//! Questions and their options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::reorder::{Identified, move_item};
use crate::{AssetRef, OptionId, QuestionId};

/// Minimum option count for select questions.
pub const MIN_SELECT_OPTIONS: usize = 2;

/// Question variant discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    /// Exactly one correct option.
    #[serde(rename = "multiple-choice", alias = "multipleChoice")]
    SingleSelect,
    /// One or more correct options.
    #[serde(rename = "multiple-response", alias = "multipleResponse")]
    MultiSelect,
    /// One literal answer string, no options.
    #[serde(rename = "fill-in-the-blank", alias = "fillInTheBlank")]
    FillInBlank,
}

impl QuestionType {
    /// Wire name used in page records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleSelect => "multiple-choice",
            Self::MultiSelect => "multiple-response",
            Self::FillInBlank => "fill-in-the-blank",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SingleSelect => "Multiple choice",
            Self::MultiSelect => "Multiple response",
            Self::FillInBlank => "Fill in the blank",
        }
    }

    #[inline]
    pub fn has_options(&self) -> bool {
        !matches!(self, Self::FillInBlank)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = ModelError;

    /// Accepts the wire names, the legacy camelCase names, and the short
    /// forms `single`, `multi`, `fill`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multiple-choice" | "multiplechoice" | "single" | "single-select" => {
                Ok(Self::SingleSelect)
            }
            "multiple-response" | "multipleresponse" | "multi" | "multi-select" => {
                Ok(Self::MultiSelect)
            }
            "fill-in-the-blank" | "fillintheblank" | "fill" | "fill-in-blank" => {
                Ok(Self::FillInBlank)
            }
            _ => Err(ModelError::UnknownQuestionType(s.to_string())),
        }
    }
}

/// An answer option. Correctness is stored in [`crate::Answers`], not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: OptionId,
    pub text: String,
}

impl QuizOption {
    pub fn new(id: impl Into<OptionId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// An empty option with a generated id.
    pub fn blank() -> Self {
        Self::new(OptionId::generate(), String::new())
    }
}

impl Identified for QuizOption {
    type Id = OptionId;

    fn id(&self) -> &OptionId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum QuestionBody {
    SingleSelect(Vec<QuizOption>),
    MultiSelect(Vec<QuizOption>),
    FillInBlank,
}

impl QuestionBody {
    fn kind(&self) -> QuestionType {
        match self {
            Self::SingleSelect(_) => QuestionType::SingleSelect,
            Self::MultiSelect(_) => QuestionType::MultiSelect,
            Self::FillInBlank => QuestionType::FillInBlank,
        }
    }

    fn options(&self) -> &[QuizOption] {
        match self {
            Self::SingleSelect(options) | Self::MultiSelect(options) => options,
            Self::FillInBlank => &[],
        }
    }

    fn options_mut(&mut self) -> Option<&mut Vec<QuizOption>> {
        match self {
            Self::SingleSelect(options) | Self::MultiSelect(options) => Some(options),
            Self::FillInBlank => None,
        }
    }
}

/// A quiz question.
///
/// The variant-specific invariants (select questions have at least two
/// options with unique ids, fill-in-the-blank has none) are checked when the
/// question is built or deserialized and maintained by every mutator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord", into = "QuestionRecord")]
pub struct Question {
    id: QuestionId,
    text: String,
    body: QuestionBody,
    image: Option<AssetRef>,
}

impl Question {
    /// Create a question the way the builder does: select types start with
    /// two empty options.
    pub fn new(id: impl Into<QuestionId>, kind: QuestionType, text: impl Into<String>) -> Self {
        let body = match kind {
            QuestionType::SingleSelect => {
                QuestionBody::SingleSelect(vec![QuizOption::blank(), QuizOption::blank()])
            }
            QuestionType::MultiSelect => {
                QuestionBody::MultiSelect(vec![QuizOption::blank(), QuizOption::blank()])
            }
            QuestionType::FillInBlank => QuestionBody::FillInBlank,
        };
        Self {
            id: id.into(),
            text: text.into(),
            body,
            image: None,
        }
    }

    /// Build a question from explicit options, validating the variant.
    pub fn with_options(
        id: impl Into<QuestionId>,
        kind: QuestionType,
        text: impl Into<String>,
        options: Vec<QuizOption>,
    ) -> Result<Self> {
        let id = id.into();
        let body = match kind {
            QuestionType::FillInBlank => {
                if !options.is_empty() {
                    return Err(ModelError::OptionsNotAllowed { question: id });
                }
                QuestionBody::FillInBlank
            }
            QuestionType::SingleSelect | QuestionType::MultiSelect => {
                validate_options(&id, &options)?;
                if kind == QuestionType::SingleSelect {
                    QuestionBody::SingleSelect(options)
                } else {
                    QuestionBody::MultiSelect(options)
                }
            }
        };
        Ok(Self {
            id,
            text: text.into(),
            body,
            image: None,
        })
    }

    pub fn single_select(
        id: impl Into<QuestionId>,
        text: impl Into<String>,
        options: Vec<QuizOption>,
    ) -> Result<Self> {
        Self::with_options(id, QuestionType::SingleSelect, text, options)
    }

    pub fn multi_select(
        id: impl Into<QuestionId>,
        text: impl Into<String>,
        options: Vec<QuizOption>,
    ) -> Result<Self> {
        Self::with_options(id, QuestionType::MultiSelect, text, options)
    }

    pub fn fill_in_blank(id: impl Into<QuestionId>, text: impl Into<String>) -> Self {
        Self::new(id, QuestionType::FillInBlank, text)
    }

    /// Builder-style image setter.
    #[must_use]
    pub fn with_image(mut self, image: AssetRef) -> Self {
        self.image = Some(image);
        self
    }

    #[inline]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[inline]
    pub fn kind(&self) -> QuestionType {
        self.body.kind()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn image(&self) -> Option<&AssetRef> {
        self.image.as_ref()
    }

    /// Replace the image, returning the previous reference.
    pub fn set_image(&mut self, image: Option<AssetRef>) -> Option<AssetRef> {
        std::mem::replace(&mut self.image, image)
    }

    pub fn options(&self) -> &[QuizOption] {
        self.body.options()
    }

    pub fn option(&self, id: &OptionId) -> Option<&QuizOption> {
        self.options().iter().find(|option| &option.id == id)
    }

    pub fn has_option(&self, id: &OptionId) -> bool {
        self.option(id).is_some()
    }

    pub fn add_option(&mut self, option: QuizOption) -> Result<()> {
        let question = self.id.clone();
        let Some(options) = self.body.options_mut() else {
            return Err(ModelError::OptionsNotAllowed { question });
        };
        if options.iter().any(|existing| existing.id == option.id) {
            return Err(ModelError::DuplicateOptionId {
                question,
                option: option.id,
            });
        }
        options.push(option);
        Ok(())
    }

    pub fn update_option(&mut self, id: &OptionId, text: impl Into<String>) -> Result<()> {
        let question = self.id.clone();
        let option = self
            .body
            .options_mut()
            .and_then(|options| options.iter_mut().find(|option| &option.id == id))
            .ok_or_else(|| ModelError::UnknownOption {
                question,
                option: id.clone(),
            })?;
        option.text = text.into();
        Ok(())
    }

    /// Remove an option. Refused when it would leave fewer than two.
    pub fn remove_option(&mut self, id: &OptionId) -> Result<QuizOption> {
        let question = self.id.clone();
        let Some(options) = self.body.options_mut() else {
            return Err(ModelError::UnknownOption {
                question,
                option: id.clone(),
            });
        };
        let Some(index) = options.iter().position(|option| &option.id == id) else {
            return Err(ModelError::UnknownOption {
                question,
                option: id.clone(),
            });
        };
        if options.len() <= MIN_SELECT_OPTIONS {
            return Err(ModelError::TooFewOptions {
                question,
                found: options.len() - 1,
                min: MIN_SELECT_OPTIONS,
            });
        }
        Ok(options.remove(index))
    }

    /// Move an option within this question. Returns `false` for a no-op.
    pub fn reorder_options(&mut self, source: &OptionId, target: &OptionId) -> bool {
        self.body
            .options_mut()
            .is_some_and(|options| move_item(options, source, target))
    }

    /// Convert to another question type.
    ///
    /// Select-to-select keeps the options; converting to fill-in-the-blank
    /// drops them; converting from fill-in-the-blank seeds two empty options.
    /// Answer cleanup is the caller's job (see [`crate::Answers::prune`]).
    pub fn change_kind(&mut self, kind: QuestionType) {
        if kind == self.kind() {
            return;
        }
        let options = match std::mem::replace(&mut self.body, QuestionBody::FillInBlank) {
            QuestionBody::SingleSelect(options) | QuestionBody::MultiSelect(options) => options,
            QuestionBody::FillInBlank => vec![QuizOption::blank(), QuizOption::blank()],
        };
        self.body = match kind {
            QuestionType::SingleSelect => QuestionBody::SingleSelect(options),
            QuestionType::MultiSelect => QuestionBody::MultiSelect(options),
            QuestionType::FillInBlank => QuestionBody::FillInBlank,
        };
    }
}

impl Identified for Question {
    type Id = QuestionId;

    fn id(&self) -> &QuestionId {
        &self.id
    }
}

fn validate_options(question: &QuestionId, options: &[QuizOption]) -> Result<()> {
    if options.len() < MIN_SELECT_OPTIONS {
        return Err(ModelError::TooFewOptions {
            question: question.clone(),
            found: options.len(),
            min: MIN_SELECT_OPTIONS,
        });
    }
    for (index, option) in options.iter().enumerate() {
        if options[..index].iter().any(|prior| prior.id == option.id) {
            return Err(ModelError::DuplicateOptionId {
                question: question.clone(),
                option: option.id.clone(),
            });
        }
    }
    Ok(())
}

/// Wire shape of a question inside page config and cache records.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuestionRecord {
    id: QuestionId,
    #[serde(rename = "type")]
    kind: QuestionType,
    #[serde(default)]
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<QuizOption>>,
    #[serde(default)]
    image: Option<AssetRef>,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = ModelError;

    fn try_from(record: QuestionRecord) -> Result<Self> {
        let mut question = Question::with_options(
            record.id,
            record.kind,
            record.text,
            record.options.unwrap_or_default(),
        )?;
        question.image = record.image;
        Ok(question)
    }
}

impl From<Question> for QuestionRecord {
    fn from(question: Question) -> Self {
        let kind = question.kind();
        let options = match question.body {
            QuestionBody::SingleSelect(options) | QuestionBody::MultiSelect(options) => {
                Some(options)
            }
            QuestionBody::FillInBlank => None,
        };
        Self {
            id: question.id,
            kind,
            text: question.text,
            options,
            image: question.image,
        }
    }
}
