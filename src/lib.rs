pub mod app;
pub mod attribution;
pub mod config;
pub mod context;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod identity;
pub mod links;
pub mod models;
pub mod observers;
pub mod outbox;
pub mod page;
pub mod session;
pub mod state;
pub mod stats;
pub mod storage;
pub mod tracker;
pub mod transport;

pub use app::router;
pub use errors::{AppError, TrackError};
pub use events::{BehaviorEvent, EventKind};
pub use identity::{Identity, KeyValueStore, MemoryStore};
pub use outbox::{DeliveryFailure, Outbox, OutboxConfig};
pub use page::PageSession;
pub use session::{ClientEnvironment, PageLoad, SessionContext};
pub use state::AppState;
pub use storage::{load_data, resolve_data_path};
pub use tracker::Tracker;
pub use transport::{MemoryTransport, RestConfig, RestTransport, Transport};
