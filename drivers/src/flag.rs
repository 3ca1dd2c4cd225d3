#[derive(Debug, Clone)]
pub struct Inner<IntoWarning>
where
    IntoWarning: Clone + Send,
{
    pub warnings: Vec<IntoWarning>,
}

/// Cancellation request and warning sink shared between a device and its callers.
#[derive(Debug, Clone)]
pub struct Flag<IntoWarning>
where
    IntoWarning: Clone + Send,
{
    cancelled: std::sync::Arc<std::sync::atomic::AtomicBool>,
    inner: std::sync::Arc<std::sync::Mutex<Inner<IntoWarning>>>,
}

impl<IntoWarning> Flag<IntoWarning>
where
    IntoWarning: Clone + Send,
{
    pub fn new() -> Self {
        Self {
            cancelled: std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)),
            inner: std::sync::Arc::new(std::sync::Mutex::new(Inner {
                warnings: Vec::new(),
            })),
        }
    }

    pub fn cancel(&self) {
        self.cancelled
            .store(true, std::sync::atomic::Ordering::Release);
    }

    pub fn reset(&self) {
        self.cancelled
            .store(false, std::sync::atomic::Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(std::sync::atomic::Ordering::Acquire)
    }

    pub fn store_warning<Warning>(&self, warning: Warning)
    where
        Warning: Into<IntoWarning>,
    {
        self.inner
            .lock()
            .expect("mutex is not poisoned")
            .warnings
            .push(warning.into());
    }

    pub fn load_warnings(&self) -> Vec<IntoWarning> {
        std::mem::take(&mut self.inner.lock().expect("mutex is not poisoned").warnings)
    }
}

impl<IntoWarning> Default for Flag<IntoWarning>
where
    IntoWarning: Clone + Send,
{
    fn default() -> Self {
        Self::new()
    }
}
