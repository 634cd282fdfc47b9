//! The deal discovery service: store lookup, ranking and display shuffle.

use std::convert::Infallible;
use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;

use chrono::Weekday;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::deals::DealCandidate;
use crate::featured::FeaturedSchedule;
use crate::query::DiscoveryQuery;
use crate::ranking::{rank_deals, RankedDeal, Ranking};
use crate::shuffle::shuffled;
use crate::weekday::{weekday_name, Clock};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The query itself is malformed; nothing was computed.
    #[error("invalid discovery query: {0}")]
    ClientInput(String),
    /// The deal store failed; propagated as-is.
    #[error("deal data unavailable: {0}")]
    DataUnavailable(#[source] Box<dyn StdError + Send + Sync>),
}

/// Read-only source of listed deals joined with their restaurant.
pub trait DealStore: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    /// All deals that may be shown, with restaurant location and delivery flag.
    ///
    /// Implementations may pre-filter on the active flags; the ranker checks
    /// them again regardless.
    fn list_active_candidates(
        &self,
    ) -> impl Future<Output = Result<Vec<DealCandidate>, Self::Error>> + Send;
}

/// In-memory store over a fixed candidate list.
#[derive(Debug, Clone, Default)]
pub struct StaticDealStore {
    candidates: Vec<DealCandidate>,
}

impl StaticDealStore {
    #[must_use]
    pub fn new(candidates: Vec<DealCandidate>) -> Self {
        Self { candidates }
    }
}

impl DealStore for StaticDealStore {
    type Error = Infallible;

    async fn list_active_candidates(&self) -> Result<Vec<DealCandidate>, Self::Error> {
        Ok(self.candidates.clone())
    }
}

/// Outcome of one discovery query.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryResult {
    #[serde(serialize_with = "serialize_weekday")]
    pub weekday: Weekday,
    /// Featured deals in schedule order.
    pub featured: Vec<RankedDeal>,
    /// Non-featured deals, nearest first.
    pub nearby: Vec<RankedDeal>,
    /// Non-featured deals in the shuffled display order.
    pub shuffled: Vec<RankedDeal>,
}

impl DiscoveryResult {
    fn from_ranking<R: Rng + ?Sized>(ranking: Ranking, rng: &mut R) -> Self {
        let shuffled = shuffled(&ranking.nearby, rng);
        Self {
            weekday: ranking.weekday,
            featured: ranking.featured,
            nearby: ranking.nearby,
            shuffled,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.featured.len() + self.nearby.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Featured deals, then the rest nearest first.
    #[must_use]
    pub fn by_distance(&self) -> Vec<RankedDeal> {
        self.featured.iter().chain(&self.nearby).cloned().collect()
    }

    /// Featured deals, then the rest in shuffled order.
    #[must_use]
    pub fn for_display(&self) -> Vec<RankedDeal> {
        self.featured.iter().chain(&self.shuffled).cloned().collect()
    }

    /// The deal to headline the daily promo: first featured deal, if any.
    #[must_use]
    pub fn promo(&self) -> Option<&RankedDeal> {
        self.featured.first()
    }
}

/// Discovery over a deal store, a clock and a featured schedule.
pub struct DiscoveryService<S, C> {
    store: S,
    clock: C,
    schedule: Arc<FeaturedSchedule>,
}

impl<S, C> DiscoveryService<S, C>
where
    S: DealStore,
    C: Clock,
{
    pub fn new(store: S, clock: C, schedule: Arc<FeaturedSchedule>) -> Self {
        Self {
            store,
            clock,
            schedule,
        }
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run `query` against the store.
    ///
    /// "Today" resolves against the service clock. The display shuffle draws
    /// from `rng`; callers that want a reproducible order seed it from
    /// [`DiscoveryQuery::shuffle_seed`].
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::DataUnavailable`] if the store fails.
    pub async fn discover<R>(
        &self,
        query: &DiscoveryQuery,
        rng: &mut R,
    ) -> Result<DiscoveryResult, DiscoveryError>
    where
        R: Rng + Send + ?Sized,
    {
        let weekday = query.day.resolve(self.clock.today());
        let candidates = self
            .store
            .list_active_candidates()
            .await
            .map_err(|e| DiscoveryError::DataUnavailable(Box::new(e)))?;
        let candidate_count = candidates.len();

        let ranking = rank_deals(candidates, query, weekday, &self.schedule);
        tracing::debug!(
            weekday = weekday_name(weekday),
            candidates = candidate_count,
            matched = ranking.len(),
            featured = ranking.featured.len(),
            radius_km = query.radius_km,
            "ranked deals"
        );

        Ok(DiscoveryResult::from_ranking(ranking, rng))
    }
}

fn serialize_weekday<S: serde::Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(weekday_name(*day))
}
