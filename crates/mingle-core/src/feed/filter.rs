use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::spatial::SpatialFilter;
use super::temporal::TemporalPolicy;
use crate::models::{Event, FilterCriteria, PriceRange, Story};

/// Pass when no categories are selected, or at least one selected category
/// appears among the event's tags. OR semantics, never AND.
pub fn matches_categories(event: &Event, categories: &HashSet<String>) -> bool {
    categories.is_empty() || event.tags.iter().any(|tag| categories.contains(tag))
}

pub fn matches_price(event: &Event, range: Option<PriceRange>) -> bool {
    range.map_or(true, |r| r.contains(event.price))
}

/// The predicate chain one refresh pass applies per event.
///
/// Checks run cheapest first and short-circuit: temporal status, category
/// and price, favorites membership, then the haversine distance last.
pub struct FeedFilter<'a> {
    criteria: &'a FilterCriteria,
    policy: TemporalPolicy,
    spatial: Option<SpatialFilter>,
    favorites: &'a HashSet<String>,
    now: DateTime<Utc>,
}

impl<'a> FeedFilter<'a> {
    pub fn new(
        criteria: &'a FilterCriteria,
        policy: TemporalPolicy,
        sentinel_distance_km: f64,
        favorites: &'a HashSet<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let spatial = criteria
            .near
            .map(|near| SpatialFilter::new(near, sentinel_distance_km));
        Self {
            criteria,
            policy,
            spatial,
            favorites,
            now,
        }
    }

    pub fn admits(&self, event: &Event) -> bool {
        if !self.policy.is_current(event, self.now) {
            return false;
        }
        if !matches_categories(event, &self.criteria.categories) {
            return false;
        }
        if !matches_price(event, self.criteria.price_range) {
            return false;
        }
        if self.criteria.favorites_only && !self.favorites.contains(&event.uid) {
            return false;
        }
        match &self.spatial {
            Some(spatial) => spatial.includes(event),
            None => true,
        }
    }
}

/// Keep a story iff the viewer authored it or a confirmed friend did.
///
/// When the friends gateway failed the caller passes an empty friend set;
/// the viewer then still sees their own stories.
pub fn visible_stories(
    stories: Vec<Story>,
    viewer_id: &str,
    friend_ids: &HashSet<String>,
) -> Vec<Story> {
    stories
        .into_iter()
        .filter(|story| story.author_id == viewer_id || friend_ids.contains(&story.author_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventKind, GeoPoint, NearFilter};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_000_000, 0).unwrap()
    }

    fn upcoming_event(uid: &str, tags: &[&str], price: u32) -> Event {
        Event {
            uid: uid.to_string(),
            kind: EventKind::Public,
            owner_id: "owner".to_string(),
            title: uid.to_string(),
            start: now() + Duration::hours(1),
            end: None,
            coordinate: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            price,
            is_flash: false,
        }
    }

    fn story_by(author_id: &str) -> Story {
        Story {
            id: format!("story-{author_id}"),
            event_id: "evt".to_string(),
            author_id: author_id.to_string(),
            posted_at: now(),
            media_url: None,
            seen: false,
        }
    }

    #[test]
    fn test_empty_categories_is_a_no_op() {
        let event = upcoming_event("a", &["music"], 0);
        assert!(matches_categories(&event, &HashSet::new()));
    }

    #[test]
    fn test_category_intersection_is_or_semantics() {
        let event = upcoming_event("a", &["music", "outdoor"], 0);
        let selected: HashSet<String> = ["sports", "music"].iter().map(|s| s.to_string()).collect();
        assert!(matches_categories(&event, &selected));

        let disjoint: HashSet<String> = ["sports"].iter().map(|s| s.to_string()).collect();
        assert!(!matches_categories(&event, &disjoint));
    }

    #[test]
    fn test_price_bounds_inclusive() {
        let event = upcoming_event("a", &[], 15);
        assert!(matches_price(&event, None));
        assert!(matches_price(&event, Some(PriceRange::new(15, 20))));
        assert!(matches_price(&event, Some(PriceRange::new(10, 15))));
        assert!(!matches_price(&event, Some(PriceRange::new(0, 14))));
    }

    #[test]
    fn test_chain_admits_on_all_predicates() {
        let mut criteria = FilterCriteria::default();
        criteria.categories.insert("music".to_string());
        criteria.price_range = Some(PriceRange::new(0, 20));
        criteria.near = Some(NearFilter::new(GeoPoint::new(0.0, 0.0), 100.0));
        let favorites = HashSet::new();
        let filter = FeedFilter::new(
            &criteria,
            TemporalPolicy::point_in_time(),
            30.0,
            &favorites,
            now(),
        );

        // No coordinate, so the 30 km sentinel applies and passes at 100 km.
        let good = upcoming_event("good", &["music"], 10);
        assert!(filter.admits(&good));

        let wrong_category = upcoming_event("cat", &["sports"], 10);
        assert!(!filter.admits(&wrong_category));

        let too_expensive = upcoming_event("price", &["music"], 50);
        assert!(!filter.admits(&too_expensive));

        let mut past = upcoming_event("past", &["music"], 10);
        past.start = now() - Duration::hours(2);
        assert!(!filter.admits(&past));
    }

    #[test]
    fn test_favorites_only_requires_membership() {
        let mut criteria = FilterCriteria::default();
        criteria.favorites_only = true;
        let favorites: HashSet<String> = ["fav".to_string()].into_iter().collect();
        let filter = FeedFilter::new(
            &criteria,
            TemporalPolicy::point_in_time(),
            30.0,
            &favorites,
            now(),
        );

        assert!(filter.admits(&upcoming_event("fav", &[], 0)));
        assert!(!filter.admits(&upcoming_event("other", &[], 0)));
    }

    #[test]
    fn test_story_visibility_keeps_self_and_friends() {
        let friends: HashSet<String> = ["friend".to_string()].into_iter().collect();
        let filtered = visible_stories(
            vec![story_by("me"), story_by("friend"), story_by("stranger")],
            "me",
            &friends,
        );
        let authors: Vec<&str> = filtered.iter().map(|s| s.author_id.as_str()).collect();
        assert_eq!(authors, vec!["me", "friend"]);
    }

    #[test]
    fn test_story_visibility_degrades_to_self_only() {
        let filtered = visible_stories(
            vec![story_by("me"), story_by("friend")],
            "me",
            &HashSet::new(),
        );
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].author_id, "me");
    }
}
