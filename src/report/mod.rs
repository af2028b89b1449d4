pub mod llm;
pub mod pdf;
pub mod writer;

pub use llm::{CompletionClient, TogetherClient};
pub use pdf::{PdfRenderer, ReportDocument};
pub use writer::{ReportWriter, Verdict};
