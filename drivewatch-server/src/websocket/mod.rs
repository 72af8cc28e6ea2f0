pub mod connection;
pub mod handler;
pub mod messages;

pub use connection::*;
pub use handler::*;
pub use messages::*;
