// Platform library root: the host capabilities (timers, storage, HTTP) and the services
// built directly on them, plus settings, logging and the error type.

pub mod clock;
pub mod config;
pub mod debounce;
pub mod error;
pub mod fetch;
pub mod http;
pub mod logging;
pub mod notify;
pub mod storage;

pub use clock::{Scheduler, Task, TimerId, TokioScheduler, VirtualClock};
pub use config::AppSettings;
pub use debounce::{debounce, Debouncer};
pub use error::PlatformError;
pub use fetch::{FetchClient, RequestOptions};
pub use http::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
pub use notify::Notifier;
pub use storage::{backend_from_settings, FileStorage, KeyValueStore, MemoryStorage, StorageBackend, StorageObserver, StorageOp};
