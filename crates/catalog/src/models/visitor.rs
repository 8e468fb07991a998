//! Visitor analytics models: sessions and the page views they accumulate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mossberry_core::{PageViewId, VisitorSessionId};

/// An anonymous visitor session.
///
/// `ended_at` is set ~16 hours after creation and acts as a validity
/// horizon for attributing page views, not a true lifecycle field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorSession {
    /// Generated session ID.
    pub id: VisitorSessionId,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the session stops being valid.
    pub ended_at: DateTime<Utc>,
}

impl VisitorSession {
    /// Whether the session is still valid at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.ended_at
    }
}

/// One page view within a session. Page views are deleted only by the
/// session cascade, never independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView {
    /// Unique page view ID.
    pub id: PageViewId,
    /// Owning session.
    pub session_id: VisitorSessionId,
    /// Path that was viewed.
    pub url: String,
    /// When the view happened.
    pub viewed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_session_validity_horizon() {
        let now = Utc::now();
        let session = VisitorSession {
            id: VisitorSessionId::generate(),
            started_at: now,
            ended_at: now + Duration::hours(16),
        };
        assert!(session.is_valid_at(now));
        assert!(session.is_valid_at(now + Duration::hours(15)));
        assert!(!session.is_valid_at(now + Duration::hours(16)));
        assert!(!session.is_valid_at(now + Duration::hours(17)));
    }
}
