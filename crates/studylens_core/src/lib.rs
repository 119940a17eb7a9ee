pub mod domain;
pub mod extract;
pub mod ports;
pub mod youtube;

pub use domain::{
    AiSession, NewAiSession, NewQa, NewSource, Qa, QaResult, SessionUpdate, Source, SourceType,
    SourceUpdate, SummaryResult, ThemePreference, UpsertUser, User,
};
pub use extract::{FileProcessor, UploadedFile, MAX_UPLOAD_BYTES};
pub use ports::{
    PortError, PortResult, QuestionAnsweringService, StorageService, SummarizationService,
};
pub use youtube::YoutubeResolver;
