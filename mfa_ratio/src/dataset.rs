use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use rust_htslib::bam::{self, Read};

use crate::config::Contig;

/// Access to one aligned dataset.
///
/// The reference list and the total mapped count are fixed when the dataset
/// is opened; only region counting touches the underlying file.
pub trait AlignmentStore {
    /// Reference sequence names in header order
    fn reference_names(&self) -> &[Contig];

    fn reference_length(&self, ctg: &str) -> Option<u64>;

    /// Total number of mapped reads as reported by the index
    fn total_mapped(&self) -> u64;

    /// Number of alignment records overlapping [start, end) on ctg
    fn count_overlapping(&mut self, ctg: &str, start: u64, end: u64) -> anyhow::Result<u64>;
}

/// Indexed BAM file
pub struct BamDataset {
    path: PathBuf,
    rdr: bam::IndexedReader,
    rec: bam::Record,
    ctgs: Vec<Contig>,
    ctg_hash: HashMap<Contig, (u32, u64)>, // (tid, length)
    total_mapped: u64,
}

impl BamDataset {
    /// Open an indexed BAM file.  The index must already exist (see [`crate::input::ensure_indexed`])
    pub fn open<P: AsRef<Path>>(name: P, threads: usize) -> anyhow::Result<Self> {
        let path = name.as_ref().to_owned();
        debug!("Opening input file {}", path.display());

        let mut rdr = bam::IndexedReader::from_path(&path)
            .with_context(|| format!("Failed to open input file {}", path.display()))?;

        if threads > 1 {
            debug!("Attach {} decompression threads to {}", threads, path.display());
            rdr.set_threads(threads).with_context(|| {
                format!("Could not set up threads for input file {}", path.display())
            })?;
        }

        let hdr = rdr.header();
        let mut ctgs = Vec::with_capacity(hdr.target_count() as usize);
        let mut ctg_hash = HashMap::with_capacity(ctgs.capacity());
        for (tid, name) in hdr.target_names().iter().enumerate() {
            let tid = tid as u32;
            let ctg: Contig = Arc::from(String::from_utf8_lossy(name).as_ref());
            let len = hdr.target_len(tid).with_context(|| {
                format!("Missing length for {} in header of {}", ctg, path.display())
            })?;
            trace!("{}: contig {} (tid {}) length {}", path.display(), ctg, tid, len);
            ctg_hash.insert(Arc::clone(&ctg), (tid, len));
            ctgs.push(ctg);
        }

        // Unplaced reads are reported with tid -1
        let total_mapped: u64 = rdr
            .index_stats()
            .with_context(|| format!("Could not read index statistics for {}", path.display()))?
            .iter()
            .filter(|(tid, ..)| *tid >= 0)
            .map(|(_, _, mapped, _)| *mapped)
            .sum();

        debug!(
            "Input file {}: {} contigs, {} mapped reads",
            path.display(),
            ctgs.len(),
            total_mapped
        );

        Ok(Self {
            path,
            rdr,
            rec: bam::Record::new(),
            ctgs,
            ctg_hash,
            total_mapped,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AlignmentStore for BamDataset {
    fn reference_names(&self) -> &[Contig] {
        &self.ctgs
    }

    fn reference_length(&self, ctg: &str) -> Option<u64> {
        self.ctg_hash.get(ctg).map(|(_, l)| *l)
    }

    fn total_mapped(&self) -> u64 {
        self.total_mapped
    }

    fn count_overlapping(&mut self, ctg: &str, start: u64, end: u64) -> anyhow::Result<u64> {
        let tid = self
            .ctg_hash
            .get(ctg)
            .map(|(tid, _)| *tid)
            .with_context(|| format!("Contig {} not found in {}", ctg, self.path.display()))?;

        self.rdr.fetch((tid, start, end)).with_context(|| {
            format!(
                "Could not fetch region {}:{}-{} from {}",
                ctg,
                start,
                end,
                self.path.display()
            )
        })?;

        let mut n = 0;
        while let Some(r) = self.rdr.read(&mut self.rec) {
            r.with_context(|| {
                format!(
                    "Error reading region {}:{}-{} from {}",
                    ctg,
                    start,
                    end,
                    self.path.display()
                )
            })?;
            n += 1;
        }
        Ok(n)
    }
}
