use crate::error::TrackError;

/// Scaling factor applied to the counts of the second dataset so that both
/// datasets are on the same depth scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormFactor(f64);

impl NormFactor {
    /// factor = mapped_a / mapped_b.  There is no guard for mapped_b == 0;
    /// this is fatal.  mapped_a == 0 gives a factor of 0.
    pub fn new(mapped_a: u64, mapped_b: u64) -> Result<Self, TrackError> {
        if mapped_b == 0 {
            Err(TrackError::NoMappedReads)
        } else {
            Ok(Self(mapped_a as f64 / mapped_b as f64))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn scale(&self, x: f64) -> f64 {
        x * self.0
    }
}
