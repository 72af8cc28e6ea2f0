//! Verdict seam for the scan workflow.
//!
//! The default implementation is a deterministic placeholder, not a security
//! control: it flags names carrying the EICAR letters as a subsequence. Real
//! scanners plug in through [`VerdictEngine`] at the same point.

use async_trait::async_trait;
use drivewatch_model::{FileRecord, ScanStatus};

#[derive(Debug, thiserror::Error)]
pub enum VerdictError {
    #[error("verdict engine failure: {0}")]
    Failed(String),
}

/// Terminal outcome of one scan sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    Infected,
}

impl Verdict {
    pub fn status(self) -> ScanStatus {
        match self {
            Self::Clean => ScanStatus::Clean,
            Self::Infected => ScanStatus::Infected,
        }
    }
}

/// Computes the terminal verdict for a file. Invoked once per scan sequence,
/// after both dwell phases. A returned error aborts the sequence without
/// committing a terminal status.
#[async_trait]
pub trait VerdictEngine: Send + Sync {
    async fn verdict(&self, record: &FileRecord) -> Result<Verdict, VerdictError>;
}

/// A name is flagged iff `e`, `i`, `c`, `a`, `r` occur as a case-insensitive
/// subsequence, in that order (not necessarily contiguous).
pub fn name_is_flagged(name: &str) -> bool {
    const SIGNATURE: [char; 5] = ['e', 'i', 'c', 'a', 'r'];
    let mut next = 0;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c == SIGNATURE[next] {
            next += 1;
            if next == SIGNATURE.len() {
                return true;
            }
        }
    }
    false
}

/// Default, infallible verdict engine based on [`name_is_flagged`].
#[derive(Debug, Default)]
pub struct SignatureVerdict;

#[async_trait]
impl VerdictEngine for SignatureVerdict {
    async fn verdict(&self, record: &FileRecord) -> Result<Verdict, VerdictError> {
        if name_is_flagged(&record.name) {
            Ok(Verdict::Infected)
        } else {
            Ok(Verdict::Clean)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_the_signature_as_subsequence() {
        assert!(name_is_flagged("eicar_test.txt"));
        assert!(name_is_flagged("EICAR-sample"));
        assert!(name_is_flagged("eicar-test.com"));
        // letters spread across the name still match in order
        assert!(name_is_flagged("evil_card.zip"));
    }

    #[test]
    fn ignores_names_without_the_ordered_letters() {
        assert!(!name_is_flagged("report.pdf"));
        assert!(!name_is_flagged("clean_report.docx"));
        // has c, a, r, e but no i after the e
        assert!(!name_is_flagged("scared.txt"));
        assert!(!name_is_flagged(""));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(name_is_flagged("EiCaR"));
        assert!(name_is_flagged("E-I-C-A-R.bin"));
    }
}
