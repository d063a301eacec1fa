//! Byte-weighted progress across a batch

use crate::upload::types::UploadProgress;

/// Turns per-photo transfer fractions into whole-run progress
///
/// Each photo counts for its share of the run's total bytes. A run whose
/// photos are all empty reports 100%.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total_bytes: u64,
    uploaded_bytes: u64,
    total_photos: usize,
    last_percentage: f64,
}

impl ProgressTracker {
    pub fn new(total_bytes: u64, total_photos: usize) -> Self {
        Self {
            total_bytes,
            uploaded_bytes: 0,
            total_photos,
            last_percentage: 0.0,
        }
    }

    /// Progress while photo `index` (0-based) of `photo_bytes` is `fraction` sent
    pub fn in_flight(&mut self, index: usize, photo_bytes: u64, fraction: f64) -> UploadProgress {
        let fraction = fraction.clamp(0.0, 1.0);
        let percentage = if self.total_bytes == 0 {
            100.0
        } else {
            let total = self.total_bytes as f64;
            (self.uploaded_bytes as f64 / total) * 100.0
                + (fraction * photo_bytes as f64 / total) * 100.0
        };
        let in_flight_bytes = (fraction * photo_bytes as f64).round() as u64;
        self.report(index, percentage, self.uploaded_bytes + in_flight_bytes)
    }

    /// Progress once photo `index` of `photo_bytes` is fully done
    pub fn photo_done(&mut self, index: usize, photo_bytes: u64) -> UploadProgress {
        self.uploaded_bytes += photo_bytes;
        let percentage = if self.total_bytes == 0 {
            100.0
        } else {
            (self.uploaded_bytes as f64 / self.total_bytes as f64) * 100.0
        };
        self.report(index, percentage, self.uploaded_bytes)
    }

    pub fn uploaded_bytes(&self) -> u64 {
        self.uploaded_bytes
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    fn report(&mut self, index: usize, percentage: f64, bytes_uploaded: u64) -> UploadProgress {
        let percentage = percentage.clamp(self.last_percentage, 100.0);
        self.last_percentage = percentage;
        UploadProgress {
            percentage,
            bytes_uploaded: bytes_uploaded.min(self.total_bytes),
            total_bytes: self.total_bytes,
            current_photo: index + 1,
            total_photos: self.total_photos,
        }
    }
}
