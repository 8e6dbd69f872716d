pub mod answer_key_loader;
pub mod submission_loader;

pub use answer_key_loader::load_answer_key;
pub use submission_loader::load_all_submissions;
