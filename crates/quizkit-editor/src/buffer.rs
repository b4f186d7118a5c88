//! The active page buffer.

use quizkit_model::{
    AssetRef, OptionId, PageContent, PageData, PageId, Question, QuestionId, QuestionType,
    QuizOption, move_item,
};

use crate::error::{EditorError, Result};

/// The single page that is fully resident and mutable.
///
/// Every other page lives only in the page cache. Mutations here never
/// touch storage; the editor decides when the buffer is flushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePage {
    content: PageContent,
}

impl ActivePage {
    pub fn new(content: PageContent) -> Self {
        Self { content }
    }

    #[inline]
    pub fn id(&self) -> &PageId {
        &self.content.id
    }

    pub fn content(&self) -> &PageContent {
        &self.content
    }

    pub fn to_data(&self) -> PageData {
        self.content.to_data()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.content.title = title.into();
    }

    pub fn set_time_limit(&mut self, minutes: Option<u32>) {
        self.content.time_limit = minutes;
    }

    pub fn question_count(&self) -> usize {
        self.content.questions.len()
    }

    pub fn question(&self, id: &QuestionId) -> Result<&Question> {
        self.content
            .question(id)
            .ok_or_else(|| EditorError::UnknownQuestion(id.clone()))
    }

    fn question_mut(&mut self, id: &QuestionId) -> Result<&mut Question> {
        self.content
            .question_mut(id)
            .ok_or_else(|| EditorError::UnknownQuestion(id.clone()))
    }

    /// Append a new question. Select types start with two empty options.
    pub fn add_question(&mut self, kind: QuestionType, text: impl Into<String>) -> QuestionId {
        let question = Question::new(QuestionId::generate(), kind, text);
        let id = question.id().clone();
        self.content.questions.push(question);
        id
    }

    pub fn update_question(&mut self, id: &QuestionId, text: impl Into<String>) -> Result<()> {
        self.question_mut(id)?.set_text(text);
        Ok(())
    }

    /// Change a question's type, resetting data that no longer fits.
    ///
    /// Converting between select types keeps the options and trims a
    /// multi-select answer to its first choice. Converting to or from
    /// fill-in-the-blank drops the answer.
    pub fn change_question_type(&mut self, id: &QuestionId, kind: QuestionType) -> Result<()> {
        let question = self.question_mut(id)?;
        let previous = question.kind();
        if previous == kind {
            return Ok(());
        }
        question.change_kind(kind);

        if previous == QuestionType::FillInBlank || kind == QuestionType::FillInBlank {
            self.content.answers.remove(id);
        } else {
            self.content.prune_answers();
        }
        Ok(())
    }

    /// Remove a question and its answer. The removed question is returned
    /// so the caller can release its image.
    pub fn delete_question(&mut self, id: &QuestionId) -> Result<Question> {
        let index = self
            .content
            .questions
            .iter()
            .position(|question| question.id() == id)
            .ok_or_else(|| EditorError::UnknownQuestion(id.clone()))?;
        self.content.answers.remove(id);
        Ok(self.content.questions.remove(index))
    }

    pub fn reorder_questions(&mut self, source: &QuestionId, target: &QuestionId) -> bool {
        move_item(&mut self.content.questions, source, target)
    }

    /// Replace a question's image, returning the previous reference.
    pub fn set_image(
        &mut self,
        id: &QuestionId,
        image: Option<AssetRef>,
    ) -> Result<Option<AssetRef>> {
        Ok(self.question_mut(id)?.set_image(image))
    }

    pub fn add_option(
        &mut self,
        question: &QuestionId,
        text: impl Into<String>,
    ) -> Result<OptionId> {
        let option = QuizOption::new(OptionId::generate(), text);
        let id = option.id.clone();
        self.question_mut(question)?.add_option(option)?;
        Ok(id)
    }

    pub fn update_option(
        &mut self,
        question: &QuestionId,
        option: &OptionId,
        text: impl Into<String>,
    ) -> Result<()> {
        self.question_mut(question)?.update_option(option, text)?;
        Ok(())
    }

    /// Remove an option and drop it from the question's answer.
    pub fn delete_option(&mut self, question: &QuestionId, option: &OptionId) -> Result<()> {
        self.question_mut(question)?.remove_option(option)?;
        self.content.answers.remove_option(question, option);
        Ok(())
    }

    pub fn reorder_options(
        &mut self,
        question: &QuestionId,
        source: &OptionId,
        target: &OptionId,
    ) -> Result<bool> {
        Ok(self.question_mut(question)?.reorder_options(source, target))
    }

    /// Apply an answer edit. Returns whether `value` is now part of the
    /// answer.
    pub fn set_answer(&mut self, question: &QuestionId, value: &str) -> Result<bool> {
        let PageContent {
            questions, answers, ..
        } = &mut self.content;
        let target = questions
            .iter()
            .find(|candidate| candidate.id() == question)
            .ok_or_else(|| EditorError::UnknownQuestion(question.clone()))?;
        Ok(answers.set(target, value)?)
    }
}

#[cfg(test)]
mod tests {
    use quizkit_model::{AssetHandle, ModelError, PageRef};

    use super::*;

    fn buffer() -> ActivePage {
        ActivePage::new(PageContent::empty(&PageRef::new("page-1", "Page 1")))
    }

    fn option_ids(page: &ActivePage, question: &QuestionId) -> Vec<OptionId> {
        page.question(question)
            .unwrap()
            .options()
            .iter()
            .map(|option| option.id.clone())
            .collect()
    }

    #[test]
    fn test_add_question_seeds_options() {
        let mut page = buffer();
        let select = page.add_question(QuestionType::SingleSelect, "Pick");
        let fill = page.add_question(QuestionType::FillInBlank, "Type");
        assert_eq!(page.question(&select).unwrap().options().len(), 2);
        assert!(page.question(&fill).unwrap().options().is_empty());
        assert_ne!(select, fill);
    }

    #[test]
    fn test_delete_option_updates_answer_and_keeps_minimum() {
        let mut page = buffer();
        let q = page.add_question(QuestionType::MultiSelect, "Pick");
        let third = page.add_option(&q, "C").unwrap();
        let ids = option_ids(&page, &q);

        page.set_answer(&q, ids[0].as_str()).unwrap();
        page.set_answer(&q, third.as_str()).unwrap();
        page.delete_option(&q, &third).unwrap();
        assert_eq!(
            page.content().answers.get(&q),
            Some(&[ids[0].as_str().to_string()][..])
        );

        let err = page.delete_option(&q, &ids[0]).unwrap_err();
        assert!(matches!(
            err,
            EditorError::Model(ModelError::TooFewOptions { .. })
        ));
        assert_eq!(option_ids(&page, &q).len(), 2);
    }

    #[test]
    fn test_deleting_last_option_in_answer_removes_entry() {
        let mut page = buffer();
        let q = page.add_question(QuestionType::SingleSelect, "Pick");
        let extra = page.add_option(&q, "C").unwrap();
        page.set_answer(&q, extra.as_str()).unwrap();
        page.delete_option(&q, &extra).unwrap();
        assert!(!page.content().answers.contains(&q));
    }

    #[test]
    fn test_change_type_resets_answers() {
        let mut page = buffer();
        let q = page.add_question(QuestionType::MultiSelect, "Pick");
        let ids = option_ids(&page, &q);
        page.set_answer(&q, ids[1].as_str()).unwrap();
        page.set_answer(&q, ids[0].as_str()).unwrap();

        page.change_question_type(&q, QuestionType::SingleSelect).unwrap();
        assert_eq!(option_ids(&page, &q), ids);
        assert_eq!(
            page.content().answers.get(&q),
            Some(&[ids[1].as_str().to_string()][..])
        );

        page.change_question_type(&q, QuestionType::FillInBlank).unwrap();
        assert!(page.question(&q).unwrap().options().is_empty());
        assert!(!page.content().answers.contains(&q));

        page.set_answer(&q, "Paris").unwrap();
        page.change_question_type(&q, QuestionType::SingleSelect).unwrap();
        assert_eq!(option_ids(&page, &q).len(), 2);
        assert!(!page.content().answers.contains(&q));
    }

    #[test]
    fn test_delete_question_purges_answer_and_returns_image() {
        let mut page = buffer();
        let q = page.add_question(QuestionType::FillInBlank, "Capital?");
        page.set_answer(&q, "Paris").unwrap();
        let handle = AssetHandle::generate();
        page.set_image(&q, Some(handle.into())).unwrap();

        let removed = page.delete_question(&q).unwrap();
        assert_eq!(removed.image().and_then(AssetRef::session), Some(handle));
        assert!(page.content().answers.is_empty());
        assert_eq!(page.question_count(), 0);
        assert!(matches!(
            page.delete_question(&q),
            Err(EditorError::UnknownQuestion(_))
        ));
    }

    #[test]
    fn test_reorder_within_question_only() {
        let mut page = buffer();
        let q1 = page.add_question(QuestionType::SingleSelect, "One");
        let q2 = page.add_question(QuestionType::SingleSelect, "Two");
        let a = option_ids(&page, &q1);
        let b = option_ids(&page, &q2);

        assert!(page.reorder_options(&q1, &a[1], &a[0]).unwrap());
        assert_eq!(option_ids(&page, &q1), vec![a[1].clone(), a[0].clone()]);

        // An option from another question is not a valid target
        assert!(!page.reorder_options(&q1, &a[0], &b[0]).unwrap());

        assert!(page.reorder_questions(&q2, &q1));
        assert_eq!(
            page.content().question_ids().cloned().collect::<Vec<_>>(),
            vec![q2, q1]
        );
    }
}
