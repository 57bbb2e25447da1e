pub mod entry;
pub mod topic;
pub mod user;

pub use entry::Entry;
pub use topic::{Topic, TopicPage};
pub use user::User;
