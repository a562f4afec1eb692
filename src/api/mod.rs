pub mod server;

pub use server::{router, run_server, serve};
