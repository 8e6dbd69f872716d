use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 键名前缀，题号 3 对应 `"answer3"`
pub const KEY_PREFIX: &str = "answer";

/// 题号
///
/// 学生答卷与标准答案之间的连接键。文本形式为 `answer{n}`，
/// 反序列化时同时接受裸数字（`"3"`），前缀不区分大小写。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuestionId(pub u32);

impl QuestionId {
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// 输出映射中使用的键名
    pub fn key(self) -> String {
        format!("{}{}", KEY_PREFIX, self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", KEY_PREFIX, self.0)
    }
}

/// 题号解析失败
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("无法解析题号: {0:?}")]
pub struct ParseQuestionIdError(pub String);

impl FromStr for QuestionId {
    type Err = ParseQuestionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = match trimmed.get(..KEY_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(KEY_PREFIX) => &trimmed[KEY_PREFIX.len()..],
            _ => trimmed,
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseQuestionIdError(s.to_string()));
        }

        digits
            .parse::<u32>()
            .map(QuestionId)
            .map_err(|_| ParseQuestionIdError(s.to_string()))
    }
}

impl Serialize for QuestionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QuestionIdVisitor;

        impl<'de> Visitor<'de> for QuestionIdVisitor {
            type Value = QuestionId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a question key such as \"answer3\" or a question number")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.parse().map_err(E::custom)
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u32::try_from(value)
                    .map(QuestionId)
                    .map_err(|_| E::custom(format!("题号超出范围: {}", value)))
            }
        }

        deserializer.deserialize_any(QuestionIdVisitor)
    }
}
