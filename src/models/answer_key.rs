use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AnswerKeyError;
use crate::models::question_id::QuestionId;

/// 单题标准答案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerKeyEntry {
    /// 参考答案文本
    #[serde(rename = "Answer")]
    pub reference_text: String,
    /// 满分
    #[serde(rename = "Max Marks")]
    pub max_marks: f64,
}

impl AnswerKeyEntry {
    pub fn new(reference_text: impl Into<String>, max_marks: f64) -> Self {
        Self {
            reference_text: reference_text.into(),
            max_marks,
        }
    }
}

/// 标准答案表
///
/// JSON 形式：`{"answer1": {"Answer": "...", "Max Marks": 10}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerKey {
    entries: BTreeMap<QuestionId, AnswerKeyEntry>,
}

impl AnswerKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文本解析（不含满分校验，见 [`AnswerKey::validate`]）
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn insert(&mut self, question: QuestionId, entry: AnswerKeyEntry) -> Option<AnswerKeyEntry> {
        self.entries.insert(question, entry)
    }

    pub fn get(&self, question: QuestionId) -> Option<&AnswerKeyEntry> {
        self.entries.get(&question)
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &AnswerKeyEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 满分之和
    pub fn total_marks(&self) -> f64 {
        self.entries.values().map(|entry| entry.max_marks).sum()
    }

    /// 满分必须是非负有限数，且不超过单题得分的表示范围 `u32::MAX`
    pub fn validate(&self) -> Result<(), AnswerKeyError> {
        for (question, entry) in &self.entries {
            let max_marks = entry.max_marks;
            if !max_marks.is_finite() || max_marks < 0.0 || max_marks > f64::from(u32::MAX) {
                return Err(AnswerKeyError::InvalidMaxMarks {
                    question: question.key(),
                    max_marks: entry.max_marks,
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<(QuestionId, AnswerKeyEntry)> for AnswerKey {
    fn from_iter<T: IntoIterator<Item = (QuestionId, AnswerKeyEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
