pub mod answer_key;
pub mod answer_sheet;
pub mod grade_report;
pub mod loaders;
pub mod question_id;
pub mod submission;

pub use answer_key::{AnswerKey, AnswerKeyEntry};
pub use answer_sheet::AnswerSheet;
pub use grade_report::GradeReport;
pub use loaders::{load_all_submissions, load_answer_key};
pub use question_id::QuestionId;
pub use submission::Submission;
