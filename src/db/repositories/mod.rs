pub mod entry;
pub mod topic;
pub mod user;
