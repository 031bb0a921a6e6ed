// Renders a bar chart from a JSON data file into a headless document and prints it.
//
// Usage: chart-preview <data.json> [settings.json]
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use shared::calculator::Calculator;
use shared::models::ChartDatum;

use platform::clock::VirtualClock;
use platform::config::AppSettings;
use platform::http::ReqwestTransport;
use platform::logging::init_tracing;
use platform::storage::backend_from_settings;
use web::{ComsultingUtils, DirectoryDownloader, Document, HostCapabilities, MemoryDocument, StaticDialog};

const CONTAINER_ID: &str = "chart";

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(data_path) = args.next() else {
        bail!("usage: chart-preview <data.json> [settings.json]");
    };
    let settings = match args.next() {
        Some(path) => AppSettings::load_from_path(&path)
            .with_context(|| format!("loading settings from {}", path))?,
        None => AppSettings::load_default().context("loading bundled settings")?,
    };
    init_tracing(&settings.logging.filter);

    let raw = std::fs::read_to_string(&data_path)
        .with_context(|| format!("reading {}", data_path))?;
    let data: Vec<ChartDatum> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", data_path))?;
    tracing::info!(path = %data_path, bars = data.len(), "Loaded chart data");

    let document = Arc::new(MemoryDocument::new());
    document.append_element(document.body(), "div", Some(CONTAINER_ID))?;
    let host = HostCapabilities {
        document: document.clone(),
        scheduler: Arc::new(VirtualClock::new()),
        storage: backend_from_settings(&settings.storage),
        transport: ReqwestTransport::new(),
        downloader: Arc::new(DirectoryDownloader::new(std::env::temp_dir())),
        dialog: Arc::new(StaticDialog(true)),
        storage_observer: None,
    };
    let utils = ComsultingUtils::new(settings, host);

    if !utils.create_simple_bar_chart(&data, CONTAINER_ID) {
        bail!("chart container #{} is missing", CONTAINER_ID);
    }
    let container = document
        .get_element_by_id(CONTAINER_ID)
        .context("chart container disappeared")?;
    println!("{}", document.inner_html(container));

    let total: f64 = data.iter().map(|d| d.value).sum();
    println!("Total: {}", utils.format_currency(total));
    let formatters = utils.formatters();
    for item in &data {
        let share = Calculator::round2(Calculator::percentage(item.value, total));
        println!(
            "  {:<24} {:>16} {:>8}",
            item.label,
            utils.format_currency(item.value),
            formatters.format_percent(share, 2)
        );
    }
    Ok(())
}
