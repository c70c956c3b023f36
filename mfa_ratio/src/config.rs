use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::sort::DEFAULT_CHUNK_SIZE;

/// Config
///
/// Configuration info for the program
/// This is generated from the command line arguments
/// Once set it is read only
///
/// input - paths to the two BAM files (ratio is input[0]/input[1])
/// window - window (bin) size in base pairs
/// output - output wiggle file (stdout if not set)
/// threads - htslib decompression threads per input file
/// sort_chunk - maximum records held in memory when sorting an unindexed input
///
pub struct Config {
    input: [PathBuf; 2],
    window: u64,
    output: Option<PathBuf>,
    threads: usize,
    sort_chunk: usize,
}

impl Config {
    pub fn new(file1: PathBuf, file2: PathBuf, window: u64) -> Self {
        Self {
            input: [file1, file2],
            window,
            output: None,
            threads: 1,
            sort_chunk: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn set_output(&mut self, p: PathBuf) {
        self.output = Some(p)
    }

    pub fn set_threads(&mut self, nt: usize) {
        self.threads = nt
    }

    pub fn set_sort_chunk(&mut self, n: usize) {
        self.sort_chunk = n
    }

    pub fn input(&self) -> &[PathBuf; 2] {
        &self.input
    }

    pub fn window(&self) -> u64 {
        self.window
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn sort_chunk(&self) -> usize {
        self.sort_chunk
    }
}

pub type Contig = Arc<str>;
