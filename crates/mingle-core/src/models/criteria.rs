use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::event::GeoPoint;

/// Inclusive price window in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub lo: u32,
    pub hi: u32,
}

impl PriceRange {
    pub fn new(lo: u32, hi: u32) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, price: u32) -> bool {
        price >= self.lo && price <= self.hi
    }
}

/// Proximity constraint relative to a reference location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearFilter {
    pub location: GeoPoint,
    pub radius_km: f64,
}

impl NearFilter {
    pub fn new(location: GeoPoint, radius_km: f64) -> Self {
        Self {
            location,
            radius_km,
        }
    }
}

/// The viewer's active feed filters.
///
/// An empty criteria set (the default) admits every event. Each populated
/// field narrows the feed; fields combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Keep only events tagged with at least one of these categories.
    pub categories: HashSet<String>,
    /// Keep only events whose price falls inside the range.
    pub price_range: Option<PriceRange>,
    /// Keep only events within `radius_km` of the reference location.
    pub near: Option<NearFilter>,
    /// Keep only events the viewer has favorited.
    pub favorites_only: bool,
}

impl FilterCriteria {
    /// Flip the favorites-only toggle, leaving every other filter intact.
    pub fn toggle_favorites_only(&mut self) -> bool {
        self.favorites_only = !self.favorites_only;
        self.favorites_only
    }

    /// True when no filter is set and the criteria admit everything.
    pub fn is_unfiltered(&self) -> bool {
        self.categories.is_empty()
            && self.price_range.is_none()
            && self.near.is_none()
            && !self.favorites_only
    }
}
