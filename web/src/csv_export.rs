// Table to CSV export.
use std::sync::Arc;

use csv::{Terminator, WriterBuilder};

use crate::dom::{elements_by_tag, Document};
use crate::download::{Blob, Downloader};
use crate::error::UiError;

pub const CSV_MIME_TYPE: &str = "text/csv";

pub struct CsvExporter {
    document: Arc<dyn Document>,
    downloader: Arc<dyn Downloader>,
    default_filename: String,
}

impl CsvExporter {
    pub fn new(
        document: Arc<dyn Document>,
        downloader: Arc<dyn Downloader>,
        default_filename: impl Into<String>,
    ) -> Self {
        Self {
            document,
            downloader,
            default_filename: default_filename.into(),
        }
    }

    pub fn default_filename(&self) -> &str {
        &self.default_filename
    }

    /// Trimmed cell text of every `tr` in the table. Rows without cells are skipped.
    pub fn table_rows(&self, table_id: &str) -> Result<Vec<Vec<String>>, UiError> {
        let document = self.document.as_ref();
        let table = document
            .get_element_by_id(table_id)
            .ok_or_else(|| UiError::ElementNotFound(table_id.to_string()))?;

        let rows = elements_by_tag(document, table, &["tr"])
            .into_iter()
            .map(|row| {
                elements_by_tag(document, row, &["td", "th"])
                    .into_iter()
                    .map(|cell| document.text_content(cell).trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|cells| !cells.is_empty())
            .collect();
        Ok(rows)
    }

    pub fn table_to_csv(&self, table_id: &str) -> Result<String, UiError> {
        encode_rows(&self.table_rows(table_id)?)
    }

    /// Encodes the table and hands it to the downloader. Returns the file name used.
    pub fn export_table_to_csv(
        &self,
        table_id: &str,
        filename: Option<&str>,
    ) -> Result<String, UiError> {
        let csv = self.table_to_csv(table_id)?;
        let filename = filename.unwrap_or(&self.default_filename).to_string();
        tracing::info!(table_id, filename = %filename, bytes = csv.len(), "Exporting table");
        self.downloader
            .download(Blob::new(filename.clone(), CSV_MIME_TYPE, csv.into_bytes()))?;
        Ok(filename)
    }
}

/// Rows joined by `\n` without a trailing newline. Fields are quoted only when needed.
pub fn encode_rows(rows: &[Vec<String>]) -> Result<String, UiError> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| UiError::DomError(format!("could not flush CSV: {}", e.error())))?;
    let mut text = String::from_utf8(bytes)
        .map_err(|e| UiError::DomError(format!("CSV is not UTF-8: {}", e)))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, NodeId};
    use crate::download::RecordingDownloader;

    fn table(doc: &MemoryDocument, id: &str, rows: &[&[&str]], header: bool) -> NodeId {
        let table = doc.append_element(doc.body(), "table", Some(id)).unwrap();
        let body = doc.append_element(table, "tbody", None).unwrap();
        for (i, row) in rows.iter().enumerate() {
            let tr = doc.append_element(body, "tr", None).unwrap();
            let tag = if header && i == 0 { "th" } else { "td" };
            for cell in row.iter() {
                let td = doc.append_element(tr, tag, None).unwrap();
                doc.set_text_content(td, cell).unwrap();
            }
        }
        table
    }

    fn exporter(doc: Arc<MemoryDocument>) -> (CsvExporter, Arc<RecordingDownloader>) {
        let downloader = Arc::new(RecordingDownloader::new());
        (CsvExporter::new(doc, downloader.clone(), "data.csv"), downloader)
    }

    #[test]
    fn test_simple_table() {
        let doc = Arc::new(MemoryDocument::new());
        table(&doc, "t", &[&["a", "b"], &["c", "d"]], false);
        let (exporter, _) = exporter(doc);
        assert_eq!(exporter.table_to_csv("t").unwrap(), "a,b\nc,d");
    }

    #[test]
    fn test_cells_are_trimmed_and_quoted() {
        let doc = Arc::new(MemoryDocument::new());
        table(
            &doc,
            "clientes",
            &[&["Cliente", "Monto"], &["  Pérez, Juan ", "1.500"], &["Dice \"hola\"", "2"]],
            true,
        );
        let (exporter, _) = exporter(doc);
        assert_eq!(
            exporter.table_to_csv("clientes").unwrap(),
            "Cliente,Monto\n\"Pérez, Juan\",1.500\n\"Dice \"\"hola\"\"\",2"
        );
    }

    #[test]
    fn test_rows_without_cells_are_skipped() {
        let doc = Arc::new(MemoryDocument::new());
        let t = table(&doc, "t", &[&["x", "y"]], false);
        doc.append_element(t, "tr", None).unwrap();
        let (exporter, _) = exporter(doc);
        assert_eq!(exporter.table_rows("t").unwrap(), vec![vec!["x".to_string(), "y".to_string()]]);
        assert_eq!(exporter.table_to_csv("t").unwrap(), "x,y");
    }

    #[test]
    fn test_empty_table_is_empty_text() {
        let doc = Arc::new(MemoryDocument::new());
        doc.append_element(doc.body(), "table", Some("vacia")).unwrap();
        let (exporter, _) = exporter(doc);
        assert_eq!(exporter.table_to_csv("vacia").unwrap(), "");
    }

    #[test]
    fn test_export_downloads_blob() {
        let doc = Arc::new(MemoryDocument::new());
        table(&doc, "t", &[&["a", "b"]], false);
        let (exporter, downloader) = exporter(doc);

        assert_eq!(exporter.export_table_to_csv("t", None).unwrap(), "data.csv");
        assert_eq!(exporter.export_table_to_csv("t", Some("ingresos.csv")).unwrap(), "ingresos.csv");

        let blobs = downloader.blobs();
        assert_eq!(blobs.len(), 2);
        assert_eq!(blobs[0].filename, "data.csv");
        assert_eq!(blobs[0].mime_type, "text/csv");
        assert_eq!(blobs[0].text(), Some("a,b"));
        assert_eq!(blobs[1].filename, "ingresos.csv");
    }

    #[test]
    fn test_missing_table_is_an_error() {
        let doc = Arc::new(MemoryDocument::new());
        let (exporter, downloader) = exporter(doc);
        let err = exporter.export_table_to_csv("nope", None).unwrap_err();
        assert!(matches!(err, UiError::ElementNotFound(_)));
        assert!(downloader.blobs().is_empty());
    }
}
