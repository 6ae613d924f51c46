//! Async façade over the synchronous exporter/importer
//!
//! Conversion runs on tokio's blocking pool. Every entry point takes a
//! `CancellationToken` that is checked between rows; a cancelled call ends
//! with `TabulaError::Cancelled`, never with a data error.

use super::importer::ExcelImporter;
use super::options::{ExportOptions, ImportOptions};
use super::ExcelExporter;
use crate::cancel::CancellationToken;
use crate::error::{TabulaError, TabulaResult};
use crate::schema::SheetRecord;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing::debug;

/// Default channel capacity for `import_stream`.
pub const DEFAULT_STREAM_BUFFER: usize = 64;

fn join_error(e: JoinError) -> TabulaError {
    if e.is_cancelled() {
        TabulaError::Cancelled
    } else {
        TabulaError::Export(format!("conversion task panicked: {}", e))
    }
}

pub async fn export_bytes_async<T>(
    records: Vec<T>,
    options: ExportOptions,
    cancel: CancellationToken,
) -> TabulaResult<Vec<u8>>
where
    T: SheetRecord + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        ExcelExporter::new(options)
            .with_cancellation(cancel)
            .export_bytes(&records)
    })
    .await
    .map_err(join_error)?
}

/// Lenient like `ExcelImporter::import_bytes`.
pub async fn import_bytes_async<T>(
    bytes: Vec<u8>,
    options: ImportOptions,
    cancel: CancellationToken,
) -> TabulaResult<Vec<T>>
where
    T: SheetRecord + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        ExcelImporter::new(options)
            .with_cancellation(cancel)
            .import_bytes(&bytes)
    })
    .await
    .map_err(join_error)?
}

/// Stream records in sheet order over a bounded channel.
///
/// A failure (unreadable workbook, conversion error, cancellation) arrives as
/// the last item. Dropping the receiver stops the producer at the next row.
pub fn import_stream<T>(
    bytes: Vec<u8>,
    options: ImportOptions,
    cancel: CancellationToken,
    buffer: usize,
) -> mpsc::Receiver<TabulaResult<T>>
where
    T: SheetRecord + Send + 'static,
{
    let (tx, rx) = mpsc::channel(buffer.max(1));

    tokio::task::spawn_blocking(move || {
        let importer = ExcelImporter::new(options.clone());
        let produced = importer.read_bytes(&bytes).and_then(|sheet| {
            options
                .model_parser(Some(&cancel))
                .parse_each(&sheet, |record: T| {
                    tx.blocking_send(Ok(record))
                        .map_err(|_| TabulaError::Cancelled)
                })
        });

        match produced {
            Ok(count) => debug!(rows = count, "import stream finished"),
            Err(e) => {
                debug!(error = %e, "import stream stopped");
                // receiver may already be gone
                let _ = tx.blocking_send(Err(e));
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stream_reports_unreadable_workbook() {
        #[derive(Default)]
        struct Nothing;
        impl SheetRecord for Nothing {
            fn schema() -> &'static crate::schema::SheetSchema {
                static SCHEMA: std::sync::OnceLock<crate::schema::SheetSchema> =
                    std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| crate::schema::SheetSchema::builder("Nothing").build())
            }
            fn field_value(&self, _: &str) -> crate::types::CellValue {
                crate::types::CellValue::Empty
            }
            fn set_field(&mut self, _: &str, _: crate::types::CellValue) -> TabulaResult<()> {
                Ok(())
            }
        }

        let mut rx = import_stream::<Nothing>(
            b"junk".to_vec(),
            ImportOptions::new(),
            CancellationToken::new(),
            DEFAULT_STREAM_BUFFER,
        );
        let first = rx.recv().await.unwrap();
        assert!(matches!(first, Err(TabulaError::InvalidWorkbook(_))));
        assert!(rx.recv().await.is_none());
    }
}
