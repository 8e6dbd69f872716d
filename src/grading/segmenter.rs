//! 答案切分器 - 核心判分层
//!
//! 把 OCR 得到的原始文本切分为"题号 → 作答文本"。
//!
//! 切分过程：
//! 1. 按题目标记（`Question No 3`、`Ques. 3`、`questin number 3` …）扫描出
//!    有序的 [`Marker`] 序列
//! 2. 相邻两个标记之间的文本即为前一题的作答区间（最后一题到文末）
//! 3. 去掉区间开头的一个 `Answer` 类前缀
//!
//! 拼写变体集中放在 [`MarkerVocabulary`] 中，新增 OCR 噪声拼写不需要改动切分逻辑。

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::models::{AnswerSheet, QuestionId};

/// 默认的"题目"拼写变体
pub const DEFAULT_QUESTION_WORDS: &[&str] =
    &["question", "questi0n", "qustion", "questin", "ques.", "ques"];

/// 默认的"编号"拼写变体
pub const DEFAULT_NUMBER_WORDS: &[&str] = &["number", "no.", "no"];

/// 默认的"答案"拼写变体
pub const DEFAULT_ANSWER_WORDS: &[&str] = &[
    "answer", "anser", "answ3r", "ansr", "asnwer", "ans.", "ans:", "ans",
];

/// 答案前缀后允许跟随的分隔符
const ANSWER_SEPARATORS: &str = r"[\s.:;,\-]+";

static DEFAULT_SEGMENTER: LazyLock<Segmenter> = LazyLock::new(|| {
    Segmenter::new(&MarkerVocabulary::default()).expect("默认词表均经过转义，正则必然可编译")
});

/// 标记词表
///
/// 所有词按字面匹配（不区分大小写），内部会做正则转义。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerVocabulary {
    pub question_words: Vec<String>,
    pub number_words: Vec<String>,
    pub answer_words: Vec<String>,
}

impl Default for MarkerVocabulary {
    fn default() -> Self {
        Self {
            question_words: to_owned(DEFAULT_QUESTION_WORDS),
            number_words: to_owned(DEFAULT_NUMBER_WORDS),
            answer_words: to_owned(DEFAULT_ANSWER_WORDS),
        }
    }
}

impl MarkerVocabulary {
    /// 追加"题目"拼写变体
    pub fn with_question_word(mut self, word: impl Into<String>) -> Self {
        self.question_words.push(word.into());
        self
    }

    /// 追加"答案"拼写变体
    pub fn with_answer_word(mut self, word: impl Into<String>) -> Self {
        self.answer_words.push(word.into());
        self
    }
}

/// 文本中的一个题目标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub question: QuestionId,
    /// 标记起始字节偏移
    pub start: usize,
    /// 标记结束字节偏移（不含）
    pub end: usize,
}

/// 一题的作答区间
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSpan {
    pub question: QuestionId,
    /// 题目标记所在区间
    pub marker: Range<usize>,
    /// 未裁剪的作答区间：本标记结束到下一标记开始（或文末）
    pub body: Range<usize>,
    /// 裁剪空白并去掉答案前缀后的作答文本
    pub answer: String,
}

/// 答案切分器
#[derive(Debug, Clone)]
pub struct Segmenter {
    question_marker: Regex,
    answer_prefix: Regex,
}

impl Segmenter {
    /// 由词表编译切分器
    pub fn new(vocabulary: &MarkerVocabulary) -> Result<Self, regex::Error> {
        let question_marker = Regex::new(&format!(
            r"(?i)(?:{})\s*(?:(?:{})\s*)?([0-9]+)",
            alternation(&vocabulary.question_words),
            alternation(&vocabulary.number_words),
        ))?;

        let answer_prefix = Regex::new(&format!(
            r"(?i)^(?:{})(?:{}|\b|$)",
            alternation(&vocabulary.answer_words),
            ANSWER_SEPARATORS,
        ))?;

        Ok(Self {
            question_marker,
            answer_prefix,
        })
    }

    /// 扫描所有题目标记，按出现位置排序，互不重叠
    ///
    /// 题目词前面不能紧跟字母（`techniques 5` 不是标记，`42Question 2` 是），
    /// 数字超出 `u32` 范围的候选不视为标记。
    pub fn markers(&self, raw_text: &str) -> Vec<Marker> {
        self.question_marker
            .captures_iter(raw_text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                if follows_letter(raw_text, whole.start()) {
                    return None;
                }
                let digits = caps.get(1)?.as_str();
                match digits.parse::<u32>() {
                    Ok(number) => Some(Marker {
                        question: QuestionId(number),
                        start: whole.start(),
                        end: whole.end(),
                    }),
                    Err(_) => {
                        debug!("忽略超长题号: {}", whole.as_str());
                        None
                    }
                }
            })
            .collect()
    }

    /// 计算每个标记对应的作答区间
    pub fn spans(&self, raw_text: &str) -> Vec<AnswerSpan> {
        let markers = self.markers(raw_text);

        markers
            .iter()
            .enumerate()
            .map(|(i, marker)| {
                let body_end = markers
                    .get(i + 1)
                    .map_or(raw_text.len(), |next| next.start);
                let body = marker.end..body_end;
                let answer = self.strip_answer_prefix(raw_text[body.clone()].trim());

                AnswerSpan {
                    question: marker.question,
                    marker: marker.start..marker.end,
                    body,
                    answer: answer.to_string(),
                }
            })
            .collect()
    }

    /// 切分为答卷；重复题号后者覆盖前者
    pub fn segment(&self, raw_text: &str) -> AnswerSheet {
        let mut sheet = AnswerSheet::new();

        for span in self.spans(raw_text) {
            if sheet.insert(span.question, span.answer).is_some() {
                warn!("⚠️ 题号 {} 重复出现，保留后出现的作答", span.question);
            }
        }

        debug!("切分完成，共 {} 题", sheet.len());
        sheet
    }

    /// 去掉开头的一个答案前缀（仅一次）
    ///
    /// 前缀必须位于开头且不是更长单词的一部分，`Answering` 不会被截断。
    pub fn strip_answer_prefix<'a>(&self, span: &'a str) -> &'a str {
        match self.answer_prefix.find(span) {
            Some(prefix) => span[prefix.end()..].trim_start(),
            None => span,
        }
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        DEFAULT_SEGMENTER.clone()
    }
}

/// 使用默认词表切分原始文本
pub fn segment(raw_text: &str) -> AnswerSheet {
    DEFAULT_SEGMENTER.segment(raw_text)
}

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// `pos` 之前紧邻的字符是否为字母
fn follows_letter(text: &str, pos: usize) -> bool {
    text[..pos].chars().next_back().is_some_and(char::is_alphabetic)
}

/// 按长度降序拼接转义后的候选词，保证较长的拼写优先匹配
fn alternation(words: &[String]) -> String {
    let mut sorted: Vec<&str> = words
        .iter()
        .map(String::as_str)
        .filter(|w| !w.is_empty())
        .collect();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    sorted.dedup();

    sorted
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|")
}
