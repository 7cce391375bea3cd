mod common;
mod matrix_tests;
mod merge_tests;
mod project_tests;
