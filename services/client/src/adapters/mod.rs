pub mod http;
pub mod terminal;
pub mod token_store;

pub use http::HttpBackend;
pub use terminal::{TerminalNavigator, TerminalNotifier};
pub use token_store::{FileTokenStore, MemoryTokenStore};
