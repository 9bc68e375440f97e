pub mod local;
pub mod server;
