pub mod assignment_directory;
pub mod check_queue;
pub mod notification_sink;
pub mod plagiarism_checker;

pub use assignment_directory::AssignmentDirectory;
pub use check_queue::{CheckQueue, CheckTicket};
pub use notification_sink::{FileNotificationSink, InMemoryNotificationStore, NotificationSink};
pub use plagiarism_checker::PlagiarismChecker;
