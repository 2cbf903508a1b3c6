//! Labelled training data loaded from CSV.

use std::{fs::File, io::Read, path::Path};

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    nlp::FeedbackRecord,
};

pub const TEXT_COLUMN: &str = "texto";
pub const LABEL_COLUMN: &str = "label";
pub const AUTHOR_ROLE_COLUMN: &str = "author_role";
pub const TARGET_TYPE_COLUMN: &str = "target_type";
pub const COURSE_CODE_COLUMN: &str = "course_code";

/// Columns every training CSV must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    TEXT_COLUMN,
    LABEL_COLUMN,
    AUTHOR_ROLE_COLUMN,
    TARGET_TYPE_COLUMN,
];

/// Raw feedback paired with its sentiment label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LabeledRecord {
    pub record: FeedbackRecord,
    pub label: String,
}

impl LabeledRecord {
    pub fn to_example(&self) -> LabeledExample {
        LabeledExample {
            encoded: self.record.encode(),
            label: self.label.clone(),
        }
    }
}

/// Encoded text with its label, the unit the training search works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledExample {
    pub encoded: String,
    pub label: String,
}

/// Load a labelled CSV from disk.
pub fn load_csv(path: &Path) -> Result<Vec<LabeledRecord>> {
    let file = File::open(path).map_err(|err| Error::io(path, err))?;
    let records = read_csv(file)?;
    info!(path = %path.display(), rows = records.len(), "loaded training data");
    Ok(records)
}

/// Parse labelled rows, checking the header before reading any data.
///
/// Blank cells in the metadata columns become missing values; rows with a blank
/// label are skipped.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<LabeledRecord>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let found: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    let column = |name: &str| found.iter().position(|h| h == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| column(**name).is_none())
        .map(|name| name.to_string())
        .collect();
    let (Some(text_idx), Some(label_idx), Some(role_idx), Some(target_idx)) = (
        column(TEXT_COLUMN),
        column(LABEL_COLUMN),
        column(AUTHOR_ROLE_COLUMN),
        column(TARGET_TYPE_COLUMN),
    ) else {
        return Err(Error::Schema { missing, found });
    };
    let course_idx = column(COURSE_CODE_COLUMN);

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in reader.records() {
        let row = row?;
        let cell = |idx: usize| {
            row.get(idx)
                .filter(|value| !value.trim().is_empty())
                .map(str::to_string)
        };
        let Some(label) = cell(label_idx) else {
            skipped += 1;
            continue;
        };
        records.push(LabeledRecord {
            record: FeedbackRecord {
                text: row.get(text_idx).unwrap_or_default().to_string(),
                author_role: cell(role_idx),
                target_type: cell(target_idx),
                course_code: course_idx.and_then(cell),
            },
            label: label.trim().to_string(),
        });
    }
    if skipped > 0 {
        warn!(skipped, "skipped rows without a label");
    }
    Ok(records)
}
