pub mod catalog;
pub mod check;
pub mod lms;
pub mod loaders;

pub use catalog::{LecturerLink, LmsCatalog, SubmissionBatch};
pub use check::{CheckHandle, CheckReport, CheckRequest, CheckStatus, MIN_TEXT_LENGTH};
pub use lms::{
    Assignment, AssignmentSubmission, Course, CourseModule, Lecturer, Lesson, LessonType,
    Notification, NotificationType, Role, SubmissionStatus, User,
};
pub use loaders::{load_all_submission_files, load_catalog, load_submission_batch};
