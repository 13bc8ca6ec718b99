pub mod analysis;
pub mod attachment;
pub mod question;
pub mod report;

pub use analysis::{AnalysisResult, CodeGeneration, LogicEvaluation, LogicalAnalysis};
pub use attachment::{FileItem, Side, CONTEXT_PRIMARY_NAME, PSEUDOCODE_PRIMARY_NAME};
pub use question::{Question, QuestionStatus, QuestionUpdate};
pub use report::{CrashInfo, ExecutionReport, RawReport, TestOutcome, TestScore, TestSummary};
