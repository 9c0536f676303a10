pub mod plagiarism_client;

pub use plagiarism_client::{PlagiarismApi, PlagiarismClient, TOKEN_HEADER};
