//! Filter, distance-annotate and order deal candidates for one query.

use std::cmp::Ordering;

use chrono::Weekday;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::deals::{DealCandidate, MealTime};
use crate::featured::FeaturedSchedule;
use crate::geo::distance_or_unknown;
use crate::query::DiscoveryQuery;
use crate::weekday::weekday_name;

/// A deal as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDeal {
    pub deal_id: String,
    pub title: String,
    pub description: Option<String>,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub cuisine: String,
    pub meal_time: MealTime,
    pub weekdays: Vec<&'static str>,
    pub price: Decimal,
    pub original_price: Decimal,
    pub savings: Decimal,
    pub has_delivery: bool,
    pub distance_km: f64,
    pub is_featured: bool,
    /// 1-based slot in the day's featured list.
    pub featured_position: Option<usize>,
}

impl RankedDeal {
    fn from_candidate(candidate: DealCandidate, distance_km: f64) -> Self {
        let savings = candidate.deal.savings();
        let DealCandidate { deal, restaurant } = candidate;
        Self {
            deal_id: deal.id,
            title: deal.title,
            description: deal.description,
            restaurant_id: restaurant.id,
            restaurant_name: restaurant.name,
            cuisine: restaurant.cuisine,
            meal_time: deal.meal_time,
            weekdays: deal.weekdays.iter().map(|d| weekday_name(*d)).collect(),
            price: deal.price,
            original_price: deal.original_price,
            savings,
            has_delivery: restaurant.has_delivery,
            distance_km,
            is_featured: false,
            featured_position: None,
        }
    }
}

/// Deterministic ranking of one query's matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub weekday: Weekday,
    /// Featured deals present in the result, in schedule order.
    pub featured: Vec<RankedDeal>,
    /// Everything else, nearest first.
    pub nearby: Vec<RankedDeal>,
}

impl Ranking {
    #[must_use]
    pub fn len(&self) -> usize {
        self.featured.len() + self.nearby.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.featured.is_empty() && self.nearby.is_empty()
    }

    /// Featured deals followed by the distance-ordered remainder.
    #[must_use]
    pub fn ranked(&self) -> Vec<RankedDeal> {
        self.featured.iter().chain(&self.nearby).cloned().collect()
    }
}

/// Rank `candidates` for `query` on the already-resolved `weekday`.
///
/// Drops inactive deals and restaurants, applies the query filters and the
/// radius, sorts by distance (ties by deal id) and lifts the day's featured
/// deals to the front. Deals without restaurant coordinates never pass the
/// radius test.
#[must_use]
pub fn rank_deals(
    candidates: Vec<DealCandidate>,
    query: &DiscoveryQuery,
    weekday: Weekday,
    schedule: &FeaturedSchedule,
) -> Ranking {
    let mut matched: Vec<RankedDeal> = candidates
        .into_iter()
        .filter(DealCandidate::is_listed)
        .filter(|c| query.accepts(c))
        .filter(|c| !query.available_only || c.deal.runs_on(weekday))
        .filter_map(|c| {
            let distance = distance_or_unknown(query.origin, c.restaurant.location);
            (distance <= query.radius_km).then(|| RankedDeal::from_candidate(c, distance))
        })
        .collect();

    matched.sort_by(by_distance_then_id);

    let mut featured = Vec::new();
    for (index, featured_id) in schedule.for_day(weekday).iter().enumerate() {
        if let Some(at) = matched.iter().position(|d| &d.deal_id == featured_id) {
            let mut deal = matched.remove(at);
            deal.is_featured = true;
            deal.featured_position = Some(index + 1);
            featured.push(deal);
        }
    }

    Ranking {
        weekday,
        featured,
        nearby: matched,
    }
}

fn by_distance_then_id(a: &RankedDeal, b: &RankedDeal) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then_with(|| a.deal_id.cmp(&b.deal_id))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Weekday;
    use rust_decimal::Decimal;

    use crate::deals::{DealCandidate, DealInfo, MealTime, RestaurantInfo};
    use crate::geo::GeoPoint;

    pub(crate) const ORIGIN: (f64, f64) = (-25.8758, 29.2364);

    pub(crate) fn candidate(id: &str, lat: f64, lng: f64) -> DealCandidate {
        DealCandidate {
            deal: DealInfo {
                id: id.to_string(),
                title: format!("Deal {id}"),
                description: None,
                price: Decimal::new(5999, 2),
                original_price: Decimal::new(7999, 2),
                meal_time: MealTime::Lunch,
                weekdays: vec![],
                is_active: true,
            },
            restaurant: RestaurantInfo {
                id: format!("rest-{id}"),
                name: format!("Restaurant {id}"),
                cuisine: "Traditional".to_string(),
                location: GeoPoint::from_optional(Some(lat), Some(lng)),
                has_delivery: true,
                is_active: true,
            },
        }
    }

    /// A candidate `north_km` kilometres due north of [`ORIGIN`].
    pub(crate) fn candidate_north(id: &str, north_km: f64) -> DealCandidate {
        candidate(id, ORIGIN.0 + north_km / 111.195, ORIGIN.1)
    }

    pub(crate) fn with_weekdays(mut c: DealCandidate, days: &[Weekday]) -> DealCandidate {
        c.deal.weekdays = days.to_vec();
        c
    }
}
