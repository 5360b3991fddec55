mod init;
mod lookup;
mod serve;

pub use init::cmd_init;
pub use lookup::cmd_lookup;
pub use serve::serve;
