//! Per-borrower sequencing and uniqueness rules for sibling records.

use super::domain::{RecordId, ResidencyType};

/// Raised when a candidate sequence number cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    #[error("sequence number must be positive")]
    NotPositive,
    #[error("sequence number {0} already exists for this borrower")]
    Duplicate(u32),
}

/// Raised when a borrower would end up with two current residences.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("borrower can only have one current residence")]
pub struct MultipleCurrentResidences;

/// Validate a caller-supplied sequence number against same-type siblings, or
/// assign the next free one when the caller omitted it.
///
/// `exclude` names the record being updated so it does not collide with its
/// own stored sequence number. Works for any sibling identifier type
/// (borrowers under an application, records under a borrower).
pub fn assign_or_validate_sequence<I: Copy + PartialEq>(
    candidate: Option<u32>,
    existing: &[(I, u32)],
    exclude: Option<I>,
) -> Result<u32, SequenceError> {
    let siblings = existing
        .iter()
        .filter(|(id, _)| Some(*id) != exclude)
        .map(|(_, sequence)| *sequence);

    match candidate {
        Some(0) => Err(SequenceError::NotPositive),
        Some(sequence) => {
            if siblings.clone().any(|taken| taken == sequence) {
                Err(SequenceError::Duplicate(sequence))
            } else {
                Ok(sequence)
            }
        }
        None => Ok(siblings.max().map_or(1, |highest| highest + 1)),
    }
}

/// Reject a second `Current` residence while one already exists for the
/// borrower. Prior residences are unrestricted.
pub fn assert_single_current_residence(
    candidate: ResidencyType,
    existing: &[(RecordId, ResidencyType)],
    exclude: Option<RecordId>,
) -> Result<(), MultipleCurrentResidences> {
    if candidate != ResidencyType::Current {
        return Ok(());
    }

    let already_current = existing
        .iter()
        .filter(|(id, _)| Some(*id) != exclude)
        .any(|(_, residency_type)| *residency_type == ResidencyType::Current);

    if already_current {
        Err(MultipleCurrentResidences)
    } else {
        Ok(())
    }
}
