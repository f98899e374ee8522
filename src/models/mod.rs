pub mod job;
pub mod lesson;
pub mod loaders;
pub mod question;

pub use job::GenerationJob;
pub use lesson::{ContentKind, ContentRequest, ContentSource, LessonContent, StoredLesson};
pub use loaders::{load_all_jobs, load_job, load_stored_lesson};
pub use question::GeneratedQuestion;
