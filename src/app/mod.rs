//! View/state controller.

mod busy;
mod controller;
mod session;

pub use busy::{BusyFlag, BusyGuard};
pub use controller::{AppController, AppMode};
pub use session::{Session, SessionError};
