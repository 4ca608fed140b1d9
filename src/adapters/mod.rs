pub mod postgrest;
pub mod realtime;

pub use postgrest::PostgrestStore;
pub use realtime::{RealtimeChannel, Subscription};
