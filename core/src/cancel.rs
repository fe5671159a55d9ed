//! Cooperative cancellation of deferred work. Each request is handed a token carrying a generation
//! number. Issuing a new request through a `TokenSource` cancels the previous token, and any work
//! still holding the old token is expected to check it and stop.
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Identifies a single request. Generations issued by a `TokenSource` strictly increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

#[derive(Debug, Clone)]
pub struct CancellationToken {
    generation: Generation,
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    fn new(generation: Generation) -> Self {
        Self {
            generation,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Returns `Some(())` if the token is still live. Handy with `?` in functions returning
    /// `Option`.
    pub fn check(&self) -> Option<()> {
        if self.is_cancelled() { None } else { Some(()) }
    }
}

#[derive(Debug, Default)]
pub struct TokenSource {
    next_generation: u64,
    current: Option<CancellationToken>,
}

impl TokenSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the current token (if any) and returns a fresh one
    pub fn renew(&mut self) -> CancellationToken {
        self.cancel();
        let token = CancellationToken::new(Generation(self.next_generation));
        self.next_generation += 1;
        self.current = Some(token.clone());
        token
    }

    /// Cancels the current token without issuing a new one
    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.current.as_ref().is_some_and(|token| {
            token.generation() == generation && !token.is_cancelled()
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn renewing_cancels_previous_token() {
        let mut source = TokenSource::new();
        let first = source.renew();
        assert!(!first.is_cancelled());
        let second = source.renew();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(second.generation() > first.generation());
        assert!(!source.is_current(first.generation()));
        assert!(source.is_current(second.generation()));
    }

    #[test]
    fn cancel_leaves_nothing_current() {
        let mut source = TokenSource::new();
        let token = source.renew();
        source.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.check(), None);
        assert!(!source.is_current(token.generation()));
    }

    #[test]
    fn clones_share_cancellation() {
        let mut source = TokenSource::new();
        let token = source.renew();
        let clone = token.clone();
        source.renew();
        assert!(clone.is_cancelled());
    }
}
