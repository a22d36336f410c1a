use chrono::{DateTime, Utc};

/// Request-scoped input consumed by every store operation.
///
/// The HTTP collaborator that invokes the token layer builds one context per
/// inbound request: the request method, the arrival timestamp, an optional
/// client-supplied `since` hint (used by the macaroon `since` caveat), and
/// the transport session binding (the session cookie value) for stores that
/// keep server-side session state.
///
/// # Example
/// ```rust
/// use chrono::Utc;
/// use strata_token_core::RequestContext;
///
/// let ctx = RequestContext::new("GET", Utc::now())
///     .with_session("sess-91f2".to_string());
///
/// assert_eq!(ctx.method(), "GET");
/// assert!(ctx.since().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: String,
    now: DateTime<Utc>,
    since: Option<DateTime<Utc>>,
    session: Option<String>,
}

impl RequestContext {
    /// Creates a context for a request using `method` that arrived at `now`.
    pub fn new(method: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            method: method.into(),
            now,
            since: None,
            session: None,
        }
    }

    /// Attaches the client-supplied `since` query hint.
    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Attaches the transport session binding (session cookie value).
    pub fn with_session(mut self, session_id: String) -> Self {
        self.session = Some(session_id);
        self
    }

    /// The HTTP method of the request.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The arrival timestamp of the request.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// The client-supplied `since` hint, if any.
    pub fn since(&self) -> Option<DateTime<Utc>> {
        self.since
    }

    /// The session identifier the transport bound to this request, if any.
    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }
}
