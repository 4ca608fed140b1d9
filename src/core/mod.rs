pub mod model;
pub mod ports;
pub mod sync;

pub use model::RosterData;
pub use ports::RosterStore;
pub use sync::SyncService;
