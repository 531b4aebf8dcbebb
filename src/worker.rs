use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use tracing::{info, warn};

use crate::codec::{self, ParsedCsv};
use crate::export::ExportFormat;

#[derive(Debug)]
pub enum WorkerRequest {
    /// Read and parse a sheet from disk
    Load { path: PathBuf },
    /// Write an export payload that was built on the UI thread
    Write {
        path: PathBuf,
        format: ExportFormat,
        contents: String,
    },
}

#[derive(Debug)]
pub enum WorkerResponse {
    Loaded {
        path: PathBuf,
        parsed: ParsedCsv,
    },
    Written {
        ok: bool,
        path: PathBuf,
        format: ExportFormat,
        message: Option<String>,
    },
    Error(String),
}

/// File I/O loop. Runs until the request channel closes.
pub fn start_file_worker(req_rx: Receiver<WorkerRequest>, resp_tx: Sender<WorkerResponse>) {
    while let Ok(req) = req_rx.recv() {
        let resp = match req {
            WorkerRequest::Load { path } => match load_sheet(&path) {
                Ok(parsed) => WorkerResponse::Loaded { path, parsed },
                Err(e) => {
                    warn!("loading {} failed: {e:#}", path.display());
                    WorkerResponse::Error(format!("{e:#}"))
                }
            },
            WorkerRequest::Write {
                path,
                format,
                contents,
            } => match write_export(&path, &contents) {
                Ok(()) => {
                    info!(
                        "wrote {} export ({}) to {}",
                        format.label(),
                        format.media_type(),
                        path.display()
                    );
                    WorkerResponse::Written {
                        ok: true,
                        path,
                        format,
                        message: None,
                    }
                }
                Err(e) => {
                    warn!("writing {} failed: {e:#}", path.display());
                    WorkerResponse::Written {
                        ok: false,
                        path,
                        format,
                        message: Some(format!("{e:#}")),
                    }
                }
            },
        };

        if resp_tx.send(resp).is_err() {
            break;
        }
    }
}

fn load_sheet(path: &Path) -> Result<ParsedCsv> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let parsed = codec::parse(&text)?;
    Ok(parsed)
}

fn write_export(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn() -> (Sender<WorkerRequest>, Receiver<WorkerResponse>) {
        let (req_tx, req_rx) = crossbeam_channel::unbounded();
        let (resp_tx, resp_rx) = crossbeam_channel::unbounded();
        std::thread::spawn(move || start_file_worker(req_rx, resp_tx));
        (req_tx, resp_rx)
    }

    #[test]
    fn loads_and_parses_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(&path, "key,common\napp.a,1\n").unwrap();

        let (tx, rx) = spawn();
        tx.send(WorkerRequest::Load { path: path.clone() }).unwrap();
        match rx.recv().unwrap() {
            WorkerResponse::Loaded { path: p, parsed } => {
                assert_eq!(p, path);
                assert_eq!(parsed.header, vec!["key", "common"]);
                assert_eq!(parsed.rows, vec![vec!["app.a", "1"]]);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn missing_file_reports_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = spawn();
        tx.send(WorkerRequest::Load {
            path: dir.path().join("missing.csv"),
        })
        .unwrap();
        assert!(matches!(rx.recv().unwrap(), WorkerResponse::Error(_)));
    }

    #[test]
    fn writes_export_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("edited.yaml");
        let (tx, rx) = spawn();
        tx.send(WorkerRequest::Write {
            path: path.clone(),
            format: ExportFormat::Structured,
            contents: "# banner".into(),
        })
        .unwrap();
        match rx.recv().unwrap() {
            WorkerResponse::Written { ok, format, .. } => {
                assert!(ok);
                assert_eq!(format, ExportFormat::Structured);
            }
            other => panic!("unexpected response: {other:?}"),
        }
        assert_eq!(fs::read_to_string(path).unwrap(), "# banner");
    }
}
