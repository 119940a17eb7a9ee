pub mod db;
pub mod qa_llm;
pub mod summary_llm;

pub use db::DbAdapter;
pub use qa_llm::OpenAiQaAdapter;
pub use summary_llm::OpenAiSummaryAdapter;
