//! UI-facing lookup state with stale-result protection.
//!
//! Nothing cancels an in-flight lookup when a new one starts; instead each
//! lookup gets a monotonic token and only the most recently issued token
//! may install its result. Displayed state therefore always reflects the
//! latest *issued* request, not whichever round trip happened to finish
//! last.

use parking_lot::Mutex;

use crate::types::QueryResult;

/// Identifies one lookup issued through a [`LookupSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

#[derive(Debug, Default)]
struct SessionState {
    last_issued: u64,
    loading: bool,
    result: Option<QueryResult>,
}

/// Tracks the busy flag and latest result for one lookup surface.
///
/// Internally synchronized so a lookup spawned onto a runtime can complete
/// from another thread.
#[derive(Debug, Default)]
pub struct LookupSession {
    state: Mutex<SessionState>,
}

impl LookupSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a lookup: marks the session busy and returns the token the
    /// eventual completion must present.
    pub fn begin(&self) -> RequestToken {
        let mut state = self.state.lock();
        state.last_issued += 1;
        state.loading = true;
        RequestToken(state.last_issued)
    }

    /// Deliver a finished lookup. Returns whether the result was installed;
    /// a completion for anything but the latest issued token is discarded.
    pub fn complete(&self, token: RequestToken, result: QueryResult) -> bool {
        let mut state = self.state.lock();
        if token.0 != state.last_issued {
            tracing::debug!(
                token = token.0,
                latest = state.last_issued,
                "discarding stale lookup result"
            );
            return false;
        }

        state.loading = false;
        state.result = Some(result);
        true
    }

    /// Whether the latest issued lookup is still outstanding.
    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Latest installed result, if any lookup has completed.
    pub fn result(&self) -> Option<QueryResult> {
        self.state.lock().result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QueryResult;

    fn failure(message: &str) -> QueryResult {
        QueryResult::failure(message, Vec::new())
    }

    #[test]
    fn begin_marks_loading() {
        let session = LookupSession::new();
        assert!(!session.is_loading());

        let _token = session.begin();
        assert!(session.is_loading());
    }

    #[test]
    fn completion_installs_result_and_clears_loading() {
        let session = LookupSession::new();
        let token = session.begin();

        assert!(session.complete(token, failure("first")));
        assert!(!session.is_loading());
        assert_eq!(
            session.result().and_then(|r| r.error).as_deref(),
            Some("first")
        );
    }

    #[test]
    fn stale_completion_is_discarded() {
        let session = LookupSession::new();
        let first = session.begin();
        let second = session.begin();

        // Second finishes first; first's late arrival must not clobber it.
        assert!(session.complete(second, failure("second")));
        assert!(!session.complete(first, failure("first")));

        assert_eq!(
            session.result().and_then(|r| r.error).as_deref(),
            Some("second")
        );
    }

    #[test]
    fn stale_completion_does_not_clear_newer_loading() {
        let session = LookupSession::new();
        let first = session.begin();
        let _second = session.begin();

        assert!(!session.complete(first, failure("first")));
        // The second lookup is still outstanding.
        assert!(session.is_loading());
        assert!(session.result().is_none());
    }

    #[test]
    fn tokens_are_monotonic() {
        let session = LookupSession::new();
        let a = session.begin();
        let b = session.begin();
        let c = session.begin();
        assert!(a < b && b < c);
    }
}
