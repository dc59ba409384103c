pub mod console;
pub mod link;
pub mod session_loop;

pub use console::TerminalConsole;
pub use link::WebsocketLink;
pub use session_loop::{
    run_client, ClientSession, ClientView, CoordinatorLink, GameOutcome, PlayerConsole,
};
