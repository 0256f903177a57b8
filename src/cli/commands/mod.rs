pub mod add;
pub mod config;
pub mod del;
pub mod edit;
pub mod export;
pub mod init;
pub mod list;
pub mod log;
pub mod server;
pub mod sync;
pub mod timer;
