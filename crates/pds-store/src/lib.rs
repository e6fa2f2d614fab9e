pub mod config;
pub mod datadir;
pub mod draw;
pub mod error;
pub mod journal;
pub mod roster;
pub mod schema;
pub mod store;

pub use config::Config;
pub use datadir::{DataDir, default_base_dir};
pub use draw::Draw;
pub use error::{Result, StoreError};
pub use journal::{JournalEntry, JournalInput, Mood};
pub use roster::{RosterEntry, Tab};
pub use store::{Account, Profile, ProfileInput, Store};
