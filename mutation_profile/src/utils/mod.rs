pub mod get_args;
pub mod inputs;
pub mod profile_alignment;
pub mod report;
