//! JSON-lines file ledger

use super::{CloseTradeRecord, LedgerError, LedgerId, OpenTradeRecord, TradeLedger};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Line<'a> {
    Open {
        ledger_id: LedgerId,
        recorded_at: DateTime<Utc>,
        #[serde(flatten)]
        record: &'a OpenTradeRecord,
    },
    Close {
        recorded_at: DateTime<Utc>,
        #[serde(flatten)]
        record: &'a CloseTradeRecord,
    },
}

/// Appends one JSON object per trade record to a file
pub struct JsonlLedger {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonlLedger {
    /// Open (or create) a ledger file for appending
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::info!(path = %path.display(), "Opened trade ledger");
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&mut self, line: &Line<'_>) -> Result<(), LedgerError> {
        serde_json::to_writer(&mut self.writer, line)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl TradeLedger for JsonlLedger {
    fn open_trade(&mut self, record: &OpenTradeRecord) -> Result<LedgerId, LedgerError> {
        let ledger_id = Uuid::new_v4();
        self.write_line(&Line::Open {
            ledger_id,
            recorded_at: Utc::now(),
            record,
        })?;
        Ok(ledger_id)
    }

    fn close_trade(&mut self, record: &CloseTradeRecord) -> Result<(), LedgerError> {
        self.write_line(&Line::Close {
            recorded_at: Utc::now(),
            record,
        })
    }
}
