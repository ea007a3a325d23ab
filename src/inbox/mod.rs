pub mod state;

pub use state::{BodyView, InboxChange, InboxState};
