// Blog automation - server core
//
// Daily blog generation runs: a batch drain over a queue of topics, a
// stuck-run sweep and an operator terminate switch, exposed over HTTP,
// cron and a CLI.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
