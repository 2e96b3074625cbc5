use std::sync::Arc;
use std::thread::{self, JoinHandle};

use opensilicon_core::{ExtractedNetlist, Geometry, Technology};

use crate::assembler::extract;
use crate::cancel::CancelToken;
use crate::error::ExtractError;
use crate::options::ExtractionOptions;

/// An extraction running on a worker thread.
pub struct ExtractionJob {
    handle: JoinHandle<Result<ExtractedNetlist, ExtractError>>,
    cancel: CancelToken,
}

impl ExtractionJob {
    /// Start extracting `geometries` in the background.
    pub fn spawn(
        geometries: Arc<Vec<Geometry>>,
        tech: Arc<Technology>,
        options: ExtractionOptions,
    ) -> Self {
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let handle =
            thread::spawn(move || extract(&geometries, &tech, &options, &worker_cancel));
        Self { handle, cancel }
    }

    /// Token shared with the worker, for callers that cancel from elsewhere.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the worker. A cancelled job yields `ExtractError::Cancelled`.
    pub fn join(self) -> Result<ExtractedNetlist, ExtractError> {
        self.handle
            .join()
            .map_err(|_| ExtractError::WorkerPanicked)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_of_transistors(n: usize) -> Vec<Geometry> {
        let mut geoms = vec![Geometry::rect("diff", 0.0, 0.0, n as f64, 0.5)];
        for i in 0..n {
            let x = i as f64 + 0.4;
            geoms.push(Geometry::rect("poly", x, -0.2, x + 0.15, 0.7));
        }
        geoms
    }

    #[test]
    fn test_background_extraction() {
        let job = ExtractionJob::spawn(
            Arc::new(row_of_transistors(8)),
            Arc::new(Technology::sky130()),
            ExtractionOptions::default(),
        );
        let netlist = job.join().unwrap();
        assert_eq!(netlist.stats.device_count, 8);
    }

    #[test]
    fn test_parallel_jobs_do_not_share_names() {
        let tech = Arc::new(Technology::sky130());
        let a = ExtractionJob::spawn(
            Arc::new(row_of_transistors(4)),
            tech.clone(),
            ExtractionOptions::default(),
        );
        let b = ExtractionJob::spawn(
            Arc::new(row_of_transistors(4)),
            tech,
            ExtractionOptions::default(),
        );
        let a = a.join().unwrap();
        let b = b.join().unwrap();
        let names = |n: &ExtractedNetlist| n.devices.iter().map(|d| d.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&a), vec!["M0", "M1", "M2", "M3"]);
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn test_cancel_token_is_shared_with_worker() {
        let job = ExtractionJob::spawn(
            Arc::new(row_of_transistors(1)),
            Arc::new(Technology::sky130()),
            ExtractionOptions::default(),
        );
        let token = job.cancel_token();
        job.cancel();
        assert!(token.is_cancelled());
        // The worker may already have finished; either outcome is clean.
        match job.join() {
            Ok(netlist) => assert_eq!(netlist.stats.device_count, 1),
            Err(e) => assert!(matches!(e, ExtractError::Cancelled)),
        }
    }
}
