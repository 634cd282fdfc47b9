//! Per-client state carried explicitly instead of in browser storage.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What the client last told us about itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Local date the daily featured promo was last shown.
    pub promo_last_seen: Option<NaiveDate>,
}

impl SessionContext {
    #[must_use]
    pub fn new(promo_last_seen: Option<NaiveDate>) -> Self {
        Self { promo_last_seen }
    }

    /// The promo shows at most once per local calendar day.
    #[must_use]
    pub fn should_show_daily_promo(&self, today: NaiveDate) -> bool {
        self.promo_last_seen != Some(today)
    }

    pub fn mark_promo_seen(&mut self, today: NaiveDate) {
        self.promo_last_seen = Some(today);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fresh_session_sees_promo() {
        assert!(SessionContext::default().should_show_daily_promo(date(2026, 10, 18)));
    }

    #[test]
    fn promo_shows_once_per_day() {
        let today = date(2026, 10, 18);
        let mut session = SessionContext::default();
        session.mark_promo_seen(today);
        assert!(!session.should_show_daily_promo(today));
        assert!(session.should_show_daily_promo(date(2026, 10, 19)));
    }

    #[test]
    fn stale_date_from_earlier_day_shows_again() {
        let session = SessionContext::new(Some(date(2026, 10, 1)));
        assert!(session.should_show_daily_promo(date(2026, 10, 18)));
    }
}
