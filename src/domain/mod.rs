pub mod problem_record;

pub use problem_record::*;
