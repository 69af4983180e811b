pub mod envelope;
pub mod notify;
pub mod routes;

pub use envelope::{call, Envelope};
pub use notify::{Notice, NoticeKind, Notifier, Toasts};
pub use routes::{Navigator, Route};
