// Web library root: the rendering surface and the UI components of the admin pages.
pub mod app;
pub mod chart;
pub mod csv_export;
pub mod dialog;
pub mod dom;
pub mod download;
pub mod error;
pub mod forms;
pub mod notifications;
pub mod page;

pub use app::{ComsultingUtils, HostCapabilities};
pub use chart::BarChartRenderer;
pub use csv_export::CsvExporter;
pub use dialog::{Dialog, StaticDialog};
pub use dom::{Document, MemoryDocument, NodeId};
pub use download::{Blob, DirectoryDownloader, Downloader, RecordingDownloader};
pub use error::UiError;
pub use forms::FormValidator;
pub use notifications::{NotificationCenter, NotificationId, NotificationPhase, NotificationTimings};
pub use page::{PageInitializer, PageReport};
