pub use super::entries::Entity as Entries;
pub use super::topics::Entity as Topics;
pub use super::users::Entity as Users;
