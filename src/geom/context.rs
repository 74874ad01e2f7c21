use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::core::Tolerance;
use super::panel::PanelError;

/// Shared flag a host flips to stop a running panelization between cells.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-run settings threaded through the panelization loops.
pub struct GeomContext<'a> {
    pub tolerance: Tolerance,
    cancel: Option<CancellationToken>,
    progress: Option<Box<dyn FnMut(f64) + 'a>>,
}

impl<'a> GeomContext<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tolerance: Tolerance::DEFAULT,
            cancel: None,
            progress: None,
        }
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Callback receiving the completed fraction in `[0, 1]` once per outer iteration.
    #[must_use]
    pub fn with_progress(mut self, progress: impl FnMut(f64) + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn check_cancelled(&self) -> Result<(), PanelError> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(PanelError::Cancelled),
            _ => Ok(()),
        }
    }

    pub fn report_progress(&mut self, completed: usize, total: usize) {
        if let Some(progress) = self.progress.as_mut() {
            let fraction = if total == 0 {
                1.0
            } else {
                #[allow(clippy::cast_precision_loss)]
                let ratio = completed as f64 / total as f64;
                ratio.clamp(0.0, 1.0)
            };
            progress(fraction);
        }
    }
}

impl Default for GeomContext<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GeomContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeomContext")
            .field("tolerance", &self.tolerance)
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}
