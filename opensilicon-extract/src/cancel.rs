use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ExtractError;

/// Shared cancellation flag, checked between outer-loop iterations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<(), ExtractError> {
        if self.is_cancelled() {
            Err(ExtractError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancelToken::new();
        let worker_side = token.clone();
        assert!(worker_side.check().is_ok());
        token.cancel();
        assert!(worker_side.is_cancelled());
        assert!(matches!(worker_side.check(), Err(ExtractError::Cancelled)));
    }
}
