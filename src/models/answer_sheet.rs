use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::question_id::QuestionId;

/// 学生答卷：题号 → 作答文本
///
/// 同一题号重复写入时后写覆盖先写。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    answers: BTreeMap<QuestionId, String>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入作答文本，返回被覆盖的旧值
    pub fn insert(&mut self, question: QuestionId, answer: impl Into<String>) -> Option<String> {
        self.answers.insert(question, answer.into())
    }

    pub fn get(&self, question: QuestionId) -> Option<&str> {
        self.answers.get(&question).map(String::as_str)
    }

    pub fn contains(&self, question: QuestionId) -> bool {
        self.answers.contains_key(&question)
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &str)> {
        self.answers.iter().map(|(id, text)| (*id, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// 以 `answer{n}` 为键的映射
    pub fn to_keyed_map(&self) -> BTreeMap<String, String> {
        self.answers
            .iter()
            .map(|(id, text)| (id.key(), text.clone()))
            .collect()
    }
}

impl FromIterator<(QuestionId, String)> for AnswerSheet {
    fn from_iter<T: IntoIterator<Item = (QuestionId, String)>>(iter: T) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}
