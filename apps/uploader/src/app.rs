//! Application orchestrator: wires config, collaborators and the engine.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use pixdrop_protocol::format_bytes;
use pixdrop_transfer::HttpTransmitter;
use pixdrop_uploads::{SourceFile, UploadEngine, UploadRecord, UploadStatus, UploadSummary};

use crate::adapters::{HttpUploader, ImageCompressor};
use crate::config::Config;

/// Final tally of a batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub succeeded: usize,
    pub failed: usize,
    pub canceled: usize,
}

impl Report {
    fn from_records(records: &[UploadRecord]) -> Self {
        records.iter().fold(Self::default(), |mut report, rec| {
            match rec.status {
                UploadStatus::Succeeded => report.succeeded += 1,
                UploadStatus::Failed => report.failed += 1,
                UploadStatus::Canceled => report.canceled += 1,
                UploadStatus::Pending => {}
            }
            report
        })
    }
}

/// Builds the engine from `config`.
pub fn build_engine(config: &Config) -> anyhow::Result<UploadEngine> {
    let transmitter =
        HttpTransmitter::new(config.endpoint.clone())?.with_chunk_size(config.chunk_size);
    let engine = UploadEngine::new(
        Arc::new(ImageCompressor),
        Arc::new(HttpUploader::new(transmitter)),
    )
    .with_options(config.compress_options());
    Ok(engine)
}

/// Uploads `paths` and renders progress until every record settles.
///
/// `interrupt` resolving cancels every pending record.
pub async fn run(
    config: Config,
    paths: Vec<PathBuf>,
    interrupt: impl Future<Output = ()>,
) -> anyhow::Result<Report> {
    let files = load_sources(&paths).await;
    if files.is_empty() {
        anyhow::bail!("none of the {} given paths could be read", paths.len());
    }

    let engine = build_engine(&config)?;
    info!(endpoint = %config.endpoint, files = files.len(), "starting uploads");

    drive(&engine, files, interrupt, &mut std::io::stdout()).await
}

/// Submits `files` and renders one block per store change.
pub async fn drive(
    engine: &UploadEngine,
    files: Vec<SourceFile>,
    interrupt: impl Future<Output = ()>,
    out: &mut impl Write,
) -> anyhow::Result<Report> {
    let mut changes = engine.subscribe();
    engine.submit(files);

    tokio::pin!(interrupt);
    let mut interrupted = false;

    loop {
        let summary = engine.summary();
        render(out, &engine.all(), summary)?;
        if !summary.has_pending_uploads {
            break;
        }

        tokio::select! {
            biased;
            _ = &mut interrupt, if !interrupted => {
                interrupted = true;
                let count = engine.cancel_all();
                info!(count, "interrupted, canceling pending uploads");
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    let report = Report::from_records(&engine.all());
    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        canceled = report.canceled,
        "uploads finished"
    );
    Ok(report)
}

/// Reads every path into a [`SourceFile`], skipping unreadable ones.
pub async fn load_sources(paths: &[PathBuf]) -> Vec<SourceFile> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match tokio::fs::read(path).await {
            Ok(data) => files.push(SourceFile::new(display_name(path), data)),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable file"),
        }
    }
    files
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn render(
    out: &mut impl Write,
    records: &[UploadRecord],
    summary: UploadSummary,
) -> std::io::Result<()> {
    if summary.has_pending_uploads {
        writeln!(out, "[{:>3}%] {} pending", summary.percentage, summary.pending)?;
    } else {
        writeln!(out, "[done]")?;
    }
    for record in records {
        writeln!(out, "  {}", record_line(record))?;
    }
    out.flush()
}

/// `name  size -> compressed  percent  status`
fn record_line(record: &UploadRecord) -> String {
    let compressed = match (record.compressed_size_bytes, record.size_reduction_percent()) {
        (Some(bytes), Some(saved)) => format!(" -> {} ({:+}%)", format_bytes(bytes), -saved),
        (Some(bytes), None) => format!(" -> {}", format_bytes(bytes)),
        _ => String::new(),
    };
    let mut line = format!(
        "{}  {}{}  {:>3}%  {}",
        record.name,
        format_bytes(record.original_size_bytes),
        compressed,
        record.progress_percent(),
        record.status,
    );
    if let Some(url) = &record.remote_url {
        line.push_str("  ");
        line.push_str(url);
    }
    if let Some(err) = &record.error {
        line.push_str("  ");
        line.push_str(err);
    }
    line
}
