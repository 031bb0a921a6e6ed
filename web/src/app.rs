// The `ComsultingUtils` service object.
//
// Built once per page from the settings and the host's capabilities, it wires the
// individual components together and exposes them under the names the admin pages
// use (`format_currency`, `show_notification`, `export_table_to_csv`, ...).

use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use shared::formatting::Formatters;
use shared::models::{ChartDatum, NotificationKind};
use shared::pagination::Paginator;

use platform::clock::Scheduler;
use platform::config::AppSettings;
use platform::debounce::Debouncer;
use platform::error::PlatformError;
use platform::fetch::{FetchClient, RequestOptions};
use platform::http::HttpTransport;
use platform::storage::{KeyValueStore, StorageBackend, StorageObserver};

use crate::chart::BarChartRenderer;
use crate::csv_export::CsvExporter;
use crate::dialog::Dialog;
use crate::dom::Document;
use crate::download::Downloader;
use crate::error::UiError;
use crate::forms::FormValidator;
use crate::notifications::{NotificationCenter, NotificationId, NotificationTimings};
use crate::page::{PageInitializer, PageReport};

/// Everything the host environment provides.
pub struct HostCapabilities<T> {
    pub document: Arc<dyn Document>,
    pub scheduler: Arc<dyn Scheduler>,
    pub storage: Arc<dyn StorageBackend>,
    pub transport: T,
    pub downloader: Arc<dyn Downloader>,
    pub dialog: Arc<dyn Dialog>,
    pub storage_observer: Option<Arc<dyn StorageObserver>>,
}

pub struct ComsultingUtils<T> {
    settings: AppSettings,
    formatters: Formatters,
    document: Arc<dyn Document>,
    scheduler: Arc<dyn Scheduler>,
    dialog: Arc<dyn Dialog>,
    notifications: NotificationCenter,
    forms: FormValidator,
    exporter: CsvExporter,
    charts: BarChartRenderer,
    fetch: FetchClient<T>,
    storage: KeyValueStore,
    page: PageInitializer,
}

impl<T: HttpTransport> ComsultingUtils<T> {
    pub fn new(settings: AppSettings, host: HostCapabilities<T>) -> Self {
        let HostCapabilities {
            document,
            scheduler,
            storage,
            transport,
            downloader,
            dialog,
            storage_observer,
        } = host;

        let notifications = NotificationCenter::new(
            Arc::clone(&document),
            Arc::clone(&scheduler),
            NotificationTimings::from(&settings.notifications),
        );
        let fetch = FetchClient::new(
            transport,
            Arc::new(notifications.clone()),
            settings.fetch.error_message.clone(),
        );
        let mut storage = KeyValueStore::new(storage);
        if let Some(observer) = storage_observer {
            storage = storage.with_observer(observer);
        }

        tracing::info!(
            version = %settings.version,
            locale = %settings.locale.tag,
            "Comsulting utilities loaded"
        );

        Self {
            formatters: Formatters::new(settings.locale_format()),
            forms: FormValidator::new(Arc::clone(&document)),
            exporter: CsvExporter::new(
                Arc::clone(&document),
                downloader,
                settings.export.default_filename.clone(),
            ),
            charts: BarChartRenderer::new(Arc::clone(&document)),
            page: PageInitializer::new(
                Arc::clone(&document),
                Arc::clone(&scheduler),
                settings.page.clone(),
            ),
            settings,
            document,
            scheduler,
            dialog,
            notifications,
            fetch,
            storage,
        }
    }

    /// Loads the settings file at `path` and builds the service object from it.
    pub fn from_settings_file(
        path: impl AsRef<std::path::Path>,
        host: HostCapabilities<T>,
    ) -> Result<Self, UiError> {
        let settings = AppSettings::load_from_path(path)?;
        Ok(Self::new(settings, host))
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn document(&self) -> &Arc<dyn Document> {
        &self.document
    }

    pub fn formatters(&self) -> &Formatters {
        &self.formatters
    }

    pub fn format_number(&self, value: f64) -> String {
        self.formatters.format_number(value)
    }

    pub fn format_currency(&self, amount: f64) -> String {
        self.formatters.format_currency(amount)
    }

    pub fn format_date(&self, input: &str) -> String {
        self.formatters.format_date(input)
    }

    pub fn show_notification(&self, message: &str, kind: NotificationKind) -> NotificationId {
        self.notifications.show(message, kind)
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn confirm_action(&self, message: &str) -> bool {
        self.dialog.confirm(message)
    }

    pub fn validate_form(&self, form_id: &str) -> Result<bool, UiError> {
        self.forms.validate(form_id)
    }

    /// Debounces `callback` with the search wait from settings.
    pub fn debounce<A, F>(&self, callback: F) -> Debouncer<A>
    where
        A: Send + 'static,
        F: Fn(A) + Send + Sync + 'static,
    {
        Debouncer::new(
            Arc::clone(&self.scheduler),
            self.settings.search.debounce_wait(),
            callback,
        )
    }

    pub fn export_table_to_csv(
        &self,
        table_id: &str,
        filename: Option<&str>,
    ) -> Result<String, UiError> {
        self.exporter.export_table_to_csv(table_id, filename)
    }

    pub async fn fetch_with_error_handling<R: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<R, PlatformError> {
        self.fetch.fetch_json(url, options).await
    }

    pub fn create_simple_bar_chart(&self, data: &[ChartDatum], container_id: &str) -> bool {
        self.charts.render(data, container_id)
    }

    pub fn paginate<I>(&self, items: Vec<I>) -> Paginator<I> {
        Paginator::new(items, self.settings.pagination.items_per_page)
    }

    pub fn storage(&self) -> &KeyValueStore {
        &self.storage
    }

    pub fn on_page_ready(&self, today: NaiveDate) -> Result<PageReport, UiError> {
        self.page.on_ready(today)
    }
}
