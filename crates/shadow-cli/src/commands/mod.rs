pub mod provision;
pub mod report;
pub mod status;
