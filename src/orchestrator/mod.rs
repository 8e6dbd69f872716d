//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量批改和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量答卷处理器
//! - 管理应用生命周期（初始化、运行）
//! - 扫描待批改的答卷（Vec<Submission>）
//! - 控制并发数量（Semaphore）
//! - 持有共享的 GradingFlow（标准答案 + 外部服务客户端）
//! - 输出全局统计信息
//!
//! ### `submission_processor` - 单份答卷处理器
//! - 调用 GradingFlow 批改一份答卷
//! - 写出批改结果 JSON
//! - 输出单份答卷的统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Submission>)
//!     ↓
//! submission_processor (处理单个 Submission)
//!     ↓
//! workflow::GradingFlow (渲染 → OCR → 切分 → 判分)
//!     ↓
//! services / grading (能力层：ocr / embedding / 判分核心)
//!     ↓
//! infrastructure (基础设施：PdfRasterizer)
//! ```

pub mod batch_processor;
pub mod submission_processor;

// 重新导出主要类型
pub use batch_processor::{App, ProcessingStats};
pub use submission_processor::{process_submission, SubmissionRecord};
