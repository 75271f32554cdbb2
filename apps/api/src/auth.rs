mod login;
mod session;

pub use login::login_handler;
pub use session::{logout_handler, me_handler, refresh_handler};

/// Session key holding the [`portico_application::SessionSnapshot`].
pub const SESSION_USER_KEY: &str = "session_snapshot";
