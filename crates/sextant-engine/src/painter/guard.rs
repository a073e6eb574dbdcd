#[cfg(debug_assertions)]
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(debug_assertions)]
static PAINTER_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Marks a painter as alive; debug builds allow only one at a time.
///
/// Release builds compile the check out entirely.
#[derive(Debug)]
pub(crate) struct PainterGuard {
    _private: (),
}

impl PainterGuard {
    #[track_caller]
    pub(crate) fn acquire() -> Self {
        #[cfg(debug_assertions)]
        if PAINTER_ACTIVE.swap(true, Ordering::AcqRel) {
            panic!("there can be only one painter at a time");
        }
        Self { _private: () }
    }
}

impl Drop for PainterGuard {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        PAINTER_ACTIVE.store(false, Ordering::Release);
    }
}
