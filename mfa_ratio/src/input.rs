use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use rust_htslib::bam;

use crate::{dataset::BamDataset, sort::sort_bam};

/// Append `.suffix` to a path (foo.bam -> foo.bam.bai)
fn add_suffix(p: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(p);
    s.push(".");
    s.push(suffix);
    PathBuf::from(s)
}

fn has_index(p: &Path) -> bool {
    ["bai", "csi"].iter().any(|ext| add_suffix(p, ext).exists())
}

/// True if `a` was modified after `b`, or if either time can not be read
fn is_newer(a: &Path, b: &Path) -> bool {
    let mtime = |p: &Path| fs::metadata(p).and_then(|m| m.modified());
    match (mtime(a), mtime(b)) {
        (Ok(ta), Ok(tb)) => ta > tb,
        _ => true,
    }
}

/// Make sure an index exists for the BAM file `name`, returning the path of
/// the file that should be opened.
///
/// If the file has no index it is coordinate sorted into `<name>.srt.bam`
/// (holding at most `chunk_size` records in memory) and that file is indexed.
/// A sorted and indexed file left by a previous run is reused unless the
/// input has been modified since.
pub fn ensure_indexed<P: AsRef<Path>>(
    name: P,
    threads: usize,
    chunk_size: usize,
) -> anyhow::Result<PathBuf> {
    let name = name.as_ref();
    if !name.exists() {
        return Err(anyhow!("Input file {} not found", name.display()));
    }
    if has_index(name) {
        trace!("Found index for {}", name.display());
        return Ok(name.to_owned());
    }

    let srt = add_suffix(name, "srt.bam");
    if add_suffix(&srt, "bai").exists() {
        if !is_newer(name, &srt) {
            info!(
                "Using previously sorted and indexed file {} for {}",
                srt.display(),
                name.display()
            );
            return Ok(srt);
        }
        info!(
            "Input file {} is newer than {}; sorting again",
            name.display(),
            srt.display()
        );
        let idx = add_suffix(&srt, "bai");
        fs::remove_file(&idx)
            .with_context(|| format!("Could not remove old index {}", idx.display()))?;
    }

    warn!(
        "File {} was not indexed, sorting and indexing now...",
        name.display()
    );
    // Sort to a temporary file so an interrupted run is not mistaken for a sorted file
    let tmp = add_suffix(&srt, "tmp");
    sort_bam(name, &tmp, threads, chunk_size)?;
    fs::rename(&tmp, &srt).with_context(|| {
        format!("Could not rename {} to {}", tmp.display(), srt.display())
    })?;
    bam::index::build(srt.as_path(), None, bam::index::Type::Bai, threads as u32)
        .with_context(|| format!("Error building index for {}", srt.display()))?;
    info!("Sorting and indexing of {} done", name.display());
    Ok(srt)
}

/// Open an input BAM file, sorting and indexing first if required
pub fn open_input<P: AsRef<Path>>(
    name: P,
    threads: usize,
    chunk_size: usize,
) -> anyhow::Result<BamDataset> {
    let path = ensure_indexed(name, threads, chunk_size)?;
    BamDataset::open(path, threads)
}
