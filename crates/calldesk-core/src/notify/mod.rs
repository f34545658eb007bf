//! User-facing notifications (the toast layer of the admin client).

pub mod memory;
pub mod port;
pub mod types;

pub use memory::MemoryNotifier;
pub use port::Notifier;
pub use types::{Notice, NoticeLevel};
