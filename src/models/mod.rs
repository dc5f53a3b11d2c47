pub mod region;
pub mod server;
