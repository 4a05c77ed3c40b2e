mod locate;

pub use locate::{locate_result_files, source_name_for};
