pub mod avatar;
pub mod config;
pub mod init;
pub mod session;
