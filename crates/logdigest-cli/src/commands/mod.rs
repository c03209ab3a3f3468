pub mod report;
pub mod show;
