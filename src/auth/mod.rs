pub mod session;

pub use session::SessionManager;
