mod init;
mod users;

pub use init::cmd_init;
pub use users::{cmd_user_delete, cmd_user_list};
