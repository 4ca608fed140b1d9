pub mod adapters;
pub mod config;
pub mod core;
pub mod utils;

pub use adapters::{PostgrestStore, RealtimeChannel, Subscription};
pub use config::SupabaseConfig;
pub use core::{RosterData, RosterStore, SyncService};
pub use utils::error::{Result, SyncError};
