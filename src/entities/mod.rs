pub mod prelude;

pub mod entries;
pub mod topics;
pub mod users;
