//=========================================================================
// Request Queue
//=========================================================================
//
// Core → host outbound requests, modeled as a small flag set.
//
// The core only sets flags; the host reads them after `progress` and
// calls `reset()` once it has acted. Flags are never cleared by the core.
//
//=========================================================================

use std::fmt;

//=== Request =============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    /// The application asked the host to shut down.
    Shutdown,
    /// The binding table was replaced; host-side rebinding UIs should refresh.
    ReloadBindings,
    /// A core-driven render hit surface loss; the host should recreate it.
    RecreateSurface,
}

impl Request {
    pub const ALL: [Request; 3] = [Self::Shutdown, Self::ReloadBindings, Self::RecreateSurface];

    const fn bit(self) -> u8 {
        match self {
            Self::Shutdown => 1 << 0,
            Self::ReloadBindings => 1 << 1,
            Self::RecreateSurface => 1 << 2,
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => f.write_str("shutdown"),
            Self::ReloadBindings => f.write_str("reload_bindings"),
            Self::RecreateSurface => f.write_str("recreate_surface"),
        }
    }
}

//=== RequestQueue ========================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestQueue {
    flags: u8,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `request`. Pushing an already-set request is a no-op.
    pub fn push(&mut self, request: Request) {
        self.flags |= request.bit();
    }

    pub fn is_set(&self, request: Request) -> bool {
        self.flags & request.bit() != 0
    }

    pub fn shutdown_requested(&self) -> bool {
        self.is_set(Request::Shutdown)
    }

    pub fn reload_bindings_requested(&self) -> bool {
        self.is_set(Request::ReloadBindings)
    }

    pub fn recreate_surface_requested(&self) -> bool {
        self.is_set(Request::RecreateSurface)
    }

    /// Set requests, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Request> + '_ {
        Request::ALL.into_iter().filter(|r| self.is_set(*r))
    }

    pub fn is_empty(&self) -> bool {
        self.flags == 0
    }

    /// Clears every flag.
    pub fn reset(&mut self) {
        self.flags = 0;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_is_idempotent() {
        let mut requests = RequestQueue::new();

        requests.push(Request::Shutdown);
        requests.push(Request::Shutdown);

        assert!(requests.shutdown_requested());
        assert!(!requests.reload_bindings_requested());
        assert_eq!(requests.iter().collect::<Vec<_>>(), vec![Request::Shutdown]);
    }

    #[test]
    fn flags_persist_until_reset() {
        let mut requests = RequestQueue::new();
        requests.push(Request::ReloadBindings);
        requests.push(Request::RecreateSurface);

        assert!(requests.reload_bindings_requested());
        assert!(requests.recreate_surface_requested());

        requests.reset();
        assert!(requests.is_empty());
        assert!(Request::ALL.iter().all(|r| !requests.is_set(*r)));
    }
}
