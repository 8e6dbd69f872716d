//! 端到端批改流程测试
//!
//! 外部服务全部替换为固定实现：
//! - 渲染器把预设文本写成页面文件
//! - OCR 直接读取页面文件内容
//! - 向量化按固定词表计词频

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use answer_sheet_grader::error::{EmbeddingError, OcrError, RasterizeError};
use answer_sheet_grader::infrastructure::RenderedPages;
use answer_sheet_grader::{
    AnswerKey, AnswerKeyEntry, App, Collaborators, Config, Embedder, GradingFlow, PageRenderer,
    QuestionId, SubmissionCtx, TextExtractor,
};
use async_trait::async_trait;
use tokio_test::{assert_err, assert_ok};

const UNREADABLE: &str = "UNREADABLE";
const VOCABULARY: [&str; 5] = ["gradient", "descent", "overfitting", "noise", "data"];

/// 按答卷名返回预设页面
struct ScriptedRenderer {
    pages: HashMap<String, Vec<String>>,
}

impl ScriptedRenderer {
    fn new(pages: &[(&str, &[&str])]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(name, texts)| {
                    (
                        name.to_string(),
                        texts.iter().map(|t| t.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

#[async_trait]
impl PageRenderer for ScriptedRenderer {
    async fn render(&self, pdf_path: &Path, name: &str) -> Result<RenderedPages, RasterizeError> {
        let texts = self.pages.get(name).ok_or_else(|| RasterizeError::NoPages {
            path: pdf_path.display().to_string(),
        })?;

        let io_error = |source| RasterizeError::Io {
            path: pdf_path.display().to_string(),
            source,
        };

        let dir = tempfile::tempdir().map_err(io_error)?;
        let mut pages = Vec::new();
        for (index, text) in texts.iter().enumerate() {
            let page = dir.path().join(format!("page-{}.jpg", index + 1));
            std::fs::write(&page, text).map_err(io_error)?;
            pages.push(page);
        }

        Ok(RenderedPages::temporary(dir, pages))
    }
}

/// 页面文件内容即识别结果
struct FileTextExtractor;

#[async_trait]
impl TextExtractor for FileTextExtractor {
    async fn extract(&self, image_path: &Path) -> Result<String, OcrError> {
        let text = tokio::fs::read_to_string(image_path)
            .await
            .map_err(|source| OcrError::ImageReadFailed {
                path: image_path.display().to_string(),
                source,
            })?;

        if text == UNREADABLE {
            return Err(OcrError::EmptyResponse);
        }
        Ok(text)
    }
}

/// 固定词表的词频向量，文本含 "poison" 时失败
struct BagOfWordsEmbedder;

#[async_trait]
impl Embedder for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let lower = text.to_lowercase();
        if lower.contains("poison") {
            return Err(EmbeddingError::EmptyResponse {
                model: "bag-of-words".to_string(),
            });
        }

        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        Ok(VOCABULARY
            .iter()
            .map(|term| words.iter().filter(|w| *w == term).count() as f32)
            .collect())
    }
}

fn answer_key() -> AnswerKey {
    [
        (
            QuestionId(1),
            AnswerKeyEntry::new("gradient descent minimizes the loss", 10.0),
        ),
        (
            QuestionId(2),
            AnswerKeyEntry::new("overfitting memorizes noise in the training data", 5.0),
        ),
    ]
    .into_iter()
    .collect()
}

fn flow(config: &Config, renderer: ScriptedRenderer) -> GradingFlow {
    let collaborators = Collaborators {
        renderer: Arc::new(renderer),
        extractor: Arc::new(FileTextExtractor),
        embedder: Arc::new(BagOfWordsEmbedder),
    };
    GradingFlow::new(config, collaborators, Arc::new(answer_key()))
}

#[tokio::test]
async fn test_grade_raw_text() {
    let flow = flow(&Config::default(), ScriptedRenderer::new(&[]));
    let ctx = SubmissionCtx::new("inline", 1);

    let (sheet, report) = assert_ok!(
        flow.grade_text(
            "Qustion no. 1 Answer: gradient descent\nQuestion 2 Ans overfitting",
            &ctx,
        )
        .await
    );

    assert_eq!(sheet.get(QuestionId(1)), Some("gradient descent"));
    assert_eq!(sheet.get(QuestionId(2)), Some("overfitting"));

    // 1/sqrt(3) * 5 = 2.89 → 3
    assert_eq!(report.mark(QuestionId(1)), Some(10));
    assert_eq!(report.mark(QuestionId(2)), Some(3));
    assert_eq!(report.obtained(), 13);
    assert_eq!(report.attainable, 15.0);
}

#[tokio::test]
async fn test_embedding_failure_fails_submission() {
    let flow = flow(&Config::default(), ScriptedRenderer::new(&[]));
    let ctx = SubmissionCtx::new("poisoned", 1);

    let err = assert_err!(
        flow.grade_text("Question 1 Answer poison gradient", &ctx)
            .await
    );
    assert!(format!("{:#}", err).contains("判分失败"));
}

#[tokio::test]
async fn test_batch_run_writes_reports_and_counts_failures() {
    let submissions = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();

    for name in ["alice.pdf", "bob.PDF", "broken.pdf"] {
        std::fs::write(submissions.path().join(name), b"%PDF-1.4").unwrap();
    }

    let config = Config {
        submissions_folder: submissions.path().display().to_string(),
        results_folder: results.path().join("out").display().to_string(),
        max_concurrent_submissions: 2,
        ..Config::default()
    };

    let renderer = ScriptedRenderer::new(&[
        (
            "alice",
            &[
                "Question No 1 Answer gradient descent",
                "Question No 2 Answer overfitting",
            ],
        ),
        (
            "bob",
            &[
                "Question 2 Answer: noise and data overfitting; Question 7 Answer extra",
                UNREADABLE,
            ],
        ),
    ]);

    let app = App::with_flow(config.clone(), flow(&config, renderer));
    let stats = assert_ok!(app.run().await);

    assert_eq!(stats.total, 3);
    assert_eq!(stats.success, 2);
    assert_eq!(stats.failed, 1);

    let out = results.path().join("out");
    assert!(!out.join("broken.json").exists());

    let alice: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("alice.json")).unwrap()).unwrap();
    assert_eq!(alice["marks"]["answer1"], 10);
    assert_eq!(alice["marks"]["answer2"], 3);
    assert_eq!(alice["obtained"], 13);
    assert_eq!(alice["failed_pages"], serde_json::json!([]));

    let bob: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("bob.json")).unwrap()).unwrap();
    assert_eq!(bob["marks"]["answer2"], 5);
    assert!(bob["marks"].get("answer1").is_none());
    assert_eq!(bob["unmatched_answers"], serde_json::json!(["answer7"]));
    assert_eq!(bob["unanswered_questions"], serde_json::json!(["answer1"]));
    assert_eq!(bob["failed_pages"], serde_json::json!([1]));
}

#[tokio::test]
async fn test_missing_submissions_folder_is_error() {
    let config = Config {
        submissions_folder: "/nonexistent/submissions".to_string(),
        ..Config::default()
    };

    let app = App::with_flow(config.clone(), flow(&config, ScriptedRenderer::new(&[])));
    assert_err!(app.run().await);
}
