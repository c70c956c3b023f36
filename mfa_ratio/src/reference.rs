use crate::{dataset::AlignmentStore, error::TrackError};

/// Check that both datasets have the same reference sequences in the same
/// order.
///
/// Lengths are not compared: the lengths from the first dataset are used for
/// windowing, so a difference is only reported as a warning.
pub fn check_references<A, B>(ds_a: &A, ds_b: &B) -> Result<(), TrackError>
where
    A: AlignmentStore + ?Sized,
    B: AlignmentStore + ?Sized,
{
    let (ref_a, ref_b) = (ds_a.reference_names(), ds_b.reference_names());
    if ref_a.len() != ref_b.len() {
        return Err(TrackError::RefCountMismatch {
            a: ref_a.len(),
            b: ref_b.len(),
        });
    }
    for (index, (a, b)) in ref_a.iter().zip(ref_b.iter()).enumerate() {
        if a != b {
            return Err(TrackError::RefNameMismatch {
                index,
                a: a.clone(),
                b: b.clone(),
            });
        }
        let (la, lb) = (ds_a.reference_length(a), ds_b.reference_length(b));
        if la != lb {
            warn!(
                "Reference sequence {} has different lengths in the two files ({:?} and {:?})",
                a, la, lb
            )
        }
    }
    debug!("Reference sequences match ({} contigs)", ref_a.len());
    Ok(())
}
