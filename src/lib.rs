mod board;
mod common;
mod config;
mod coord;
mod game;
mod logging;
mod observer;
pub mod protocol;
mod server;
mod session;
mod ship;

pub use board::*;
pub use common::*;
pub use config::*;
pub use coord::*;
pub use game::*;
pub use logging::init_logging;
pub use observer::*;
pub use protocol::*;
pub use server::*;
pub use session::*;
pub use ship::*;
