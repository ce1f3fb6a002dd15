//! Host navigation framework boundary.

/// Issues redirect commands to the host's router.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}
