use thiserror::Error;

use crate::config::Contig;

/// Conditions that abort a run.  Failures from the underlying files (open,
/// sort, index, fetch, write) are reported through anyhow context instead.
#[derive(Debug, Error, PartialEq)]
pub enum TrackError {
    #[error("There is a different number of sequences in the two file headers ({a} and {b})")]
    RefCountMismatch { a: usize, b: usize },
    #[error("Mismatch in the names of the reference sequences (or their order) at position {index}: {a} and {b}")]
    RefNameMismatch { index: usize, a: Contig, b: Contig },
    #[error("Second input file has no mapped reads; cannot calculate normalization factor")]
    NoMappedReads,
    #[error("{ctg}:{start}-{end} had a degenerate ratio")]
    DegenerateRatio { ctg: Contig, start: u64, end: u64 },
}
