pub mod connection;
pub mod handler;
pub mod server;

pub use connection::ConnectionHandler;
pub use handler::MessageHandler;
pub use server::WebsocketServer;
