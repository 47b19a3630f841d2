use mongodb::bson::{doc, Document};
use mongodb::event::{sdam::SdamEvent, EventHandler};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Database used when the connection string does not name one.
const DEFAULT_DATABASE: &str = "helloworld";

/// Lifecycle of the single MongoDB session owned by the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connected = 1,
    Connecting = 2,
    Disconnecting = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connected,
            2 => ConnectionState::Connecting,
            3 => ConnectionState::Disconnecting,
            _ => ConnectionState::Disconnected,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connected => "connected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Disconnecting => "disconnecting",
        };
        f.write_str(label)
    }
}

/// Read-only view of the connection state, used by the health check.
pub trait ConnectionStatus: Send + Sync {
    fn current_state(&self) -> ConnectionState;
}

#[derive(Debug)]
pub struct ConnectionError(mongodb::error::Error);

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MongoDB connection error: {}", self.0)
    }
}

impl std::error::Error for ConnectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<mongodb::error::Error> for ConnectionError {
    fn from(err: mongodb::error::Error) -> Self {
        ConnectionError(err)
    }
}

/// Connection state shared between the client's monitor and the health check.
///
/// Heartbeats move the state between `Connected` and `Disconnected` until
/// `begin_close` is called; after that only the close sequence writes it.
#[derive(Debug)]
pub struct ConnectionTracker {
    state: AtomicU8,
    closing: AtomicBool,
}

impl ConnectionTracker {
    pub fn new(initial: ConnectionState) -> Self {
        Self {
            state: AtomicU8::new(initial as u8),
            closing: AtomicBool::new(false),
        }
    }

    pub fn current(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Records a server heartbeat outcome. Ignored once closing has begun.
    pub fn heartbeat(&self, healthy: bool) {
        let next = if healthy {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        };

        let _ = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if self.closing.load(Ordering::Acquire) || current == next as u8 {
                    None
                } else {
                    Some(next as u8)
                }
            });
    }

    fn set(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Returns `false` when another caller already started closing.
    fn begin_close(&self) -> bool {
        if self.closing.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.set(ConnectionState::Disconnecting);
        true
    }

    fn finish_close(&self) {
        self.set(ConnectionState::Disconnected);
    }
}

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
    state: Arc<ConnectionTracker>,
}

impl MongoDB {
    /// Opens the client, pings the server and prepares the indexes.
    ///
    /// There is no retry: a failure here is reported to the caller, which
    /// treats it as fatal.
    pub async fn connect(uri: &str) -> Result<Self, ConnectionError> {
        let state = Arc::new(ConnectionTracker::new(ConnectionState::Connecting));

        let mut client_options = ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(Duration::from_secs(300));

        // Timeouts
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        // Follow the driver's server monitor for the rest of the process
        let monitor = Arc::clone(&state);
        client_options.sdam_event_handler = Some(EventHandler::callback(move |event: SdamEvent| {
            observe_sdam_event(&monitor, &event)
        }));

        let db_name = client_options
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&db_name);

        log::info!(database:% = db_name; "🔌 Connecting to MongoDB...");

        // Test connection
        db.run_command(doc! { "ping": 1 }).await?;

        let mongodb = Self { client, db, state };
        mongodb.ensure_indexes().await?;
        mongodb.state.set(ConnectionState::Connected);

        Ok(mongodb)
    }

    /// The unique index on `users.email` is what turns a second insert of the
    /// same address into a duplicate-key error.
    async fn ensure_indexes(&self) -> Result<(), ConnectionError> {
        let users = self.collection::<Document>(crate::services::user_service::COLLECTION);

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        users.create_index(email_index).await?;
        log::info!("   ✅ Index ready: users(email) unique");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// Shuts the client down without waiting for in-flight operations.
    /// Only the first call has any effect.
    pub async fn close(&self) {
        if !self.state.begin_close() {
            log::debug!(state:% = self.current_state(); "MongoDB close skipped");
            return;
        }

        self.client.clone().shutdown().immediate(true).await;
        self.state.finish_close();
        log::info!("🔌 MongoDB connection closed");
    }
}

impl ConnectionStatus for MongoDB {
    fn current_state(&self) -> ConnectionState {
        self.state.current()
    }
}

fn observe_sdam_event(tracker: &ConnectionTracker, event: &SdamEvent) {
    match event {
        SdamEvent::ServerHeartbeatSucceeded(_) => tracker.heartbeat(true),
        SdamEvent::ServerHeartbeatFailed(failure) => {
            if tracker.current() == ConnectionState::Connected {
                log::warn!(
                    server:% = failure.server_address,
                    error:% = failure.failure;
                    "⚠️ MongoDB heartbeat failed"
                );
            }
            tracker.heartbeat(false);
        }
        _ => {}
    }
}
