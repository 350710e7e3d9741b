//! Corpus assembly: extract every uploaded file, concatenate the non-empty
//! texts under per-file headers, and keep an ordered status record per file.
//!
//! Extraction failures are contained here: a file that cannot be read is
//! recorded as Failed and the rest of the batch is still processed.

use crate::extract;
use crate::models::{
    DeclaredType, ExtractionResult, FileStatus, ProcessedFileRecord, UploadedFile,
};

/// Output of one assembly pass.
#[derive(Debug, Default)]
pub struct Assembled {
    /// Concatenation of all non-empty extraction texts, each preceded by a
    /// header naming its source file. Empty iff no file yielded text.
    pub corpus: String,
    /// One record per supported file, in upload order.
    pub records: Vec<ProcessedFileRecord>,
    /// Non-fatal warnings (unsupported types, extraction errors).
    pub warnings: Vec<String>,
}

/// Assemble a corpus from uploaded files.
///
/// Unsupported file types are skipped with a warning and produce no record.
/// Files whose extracted text is empty after trimming are recorded as Failed
/// with info `"No text found"` and contribute nothing to the corpus.
pub fn assemble(files: &[UploadedFile]) -> Assembled {
    let mut out = Assembled::default();

    for file in files {
        let declared_type = match DeclaredType::from_name(&file.name) {
            Some(t) => t,
            None => {
                out.warnings
                    .push(format!("Unsupported file type: {}", file.name));
                continue;
            }
        };

        let extraction = match extract::extract(&file.bytes, declared_type) {
            Ok(result) => result,
            Err(e) => {
                out.warnings
                    .push(format!("Error reading {} {}: {}", declared_type, file.name, e));
                ExtractionResult::empty()
            }
        };

        if extraction.text.trim().is_empty() {
            out.records.push(ProcessedFileRecord {
                name: file.name.clone(),
                declared_type,
                info: "No text found".to_string(),
                status: FileStatus::Failed,
            });
            continue;
        }

        out.corpus.push_str(&format!("\n\n--- From {} ---\n", file.name));
        out.corpus.push_str(&extraction.text);
        out.records.push(ProcessedFileRecord {
            name: file.name.clone(),
            declared_type,
            info: format!(
                "{} - {} {}",
                declared_type.label(),
                extraction.unit_count,
                declared_type.unit_noun()
            ),
            status: FileStatus::Processed,
        });
    }

    out
}
