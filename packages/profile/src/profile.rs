//! Full profile assembly: search area, venues, menus and price statistics.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use venue_profile_stats::{PriceStatistics, StatsError, price_statistics};
use venue_profile_venues::menus::{FlattenOptions, MenuFailure, RawMenus, fetch_menus, menu_items};
use venue_profile_venues::progress::{ProgressCallback, null_progress};
use venue_profile_venues::search::{RawVenues, search_venues, venue_rows};
use venue_profile_venues::{SearchOptions, VenueDirectory};
use venue_profile_venues_models::{MenuItem, Venue};

use crate::ProfileError;
use crate::pipeline::{RadiusPipeline, SearchArea};

/// Raw directory payloads, exactly as returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RawSnapshot {
    /// Search responses keyed by category id.
    pub venues: RawVenues,
    /// Menu responses keyed by venue name.
    pub menus: RawMenus,
}

/// A venue whose menu is missing from the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedMenu {
    /// Directory venue id.
    pub venue_id: String,
    /// Venue name.
    pub venue_name: String,
    /// Why the lookup failed.
    pub reason: String,
}

impl From<MenuFailure> for SkippedMenu {
    fn from(failure: MenuFailure) -> Self {
        Self {
            venue_id: failure.venue_id,
            venue_name: failure.venue_name,
            reason: failure.error.to_string(),
        }
    }
}

/// Tables derived from a [`RawSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileTables {
    /// One row per venue per category search.
    pub venues: Vec<Venue>,
    /// One row per menu entry.
    pub menu_items: Vec<MenuItem>,
    /// Price statistics, absent when no item is complete.
    pub statistics: Option<PriceStatistics>,
}

impl ProfileTables {
    /// Flattens `raw` and computes price statistics.
    ///
    /// Having no complete item is logged and leaves `statistics` empty.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Venue`] if the venue payloads are malformed,
    /// or [`ProfileError::Stats`] if `confidence` is out of range.
    pub fn from_raw(
        raw: &RawSnapshot,
        options: FlattenOptions,
        confidence: f64,
    ) -> Result<Self, ProfileError> {
        let venues = venue_rows(&raw.venues)?;
        let menu_items = menu_items(&raw.menus, options);

        let statistics = match price_statistics(&menu_items, confidence) {
            Ok(stats) => Some(stats),
            Err(e @ StatsError::TooFewObservations { .. }) => {
                log::warn!("No price statistics: {e}");
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            venues,
            menu_items,
            statistics,
        })
    }
}

/// Everything known about the venues around one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueProfile {
    /// Address as given.
    pub address: String,
    /// Where and how far the search reached.
    pub search_area: SearchArea,
    /// Raw directory payloads.
    pub raw: RawSnapshot,
    /// Venues whose menus could not be fetched.
    pub skipped_menus: Vec<SkippedMenu>,
    /// Options `tables.menu_items` was flattened with.
    #[serde(default)]
    pub flatten: FlattenOptions,
    /// Flattened tables and statistics.
    pub tables: ProfileTables,
}

impl VenueProfile {
    /// Recomputes the tables at `confidence` with the profile's own
    /// flattening options.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] if the raw payloads are malformed or
    /// `confidence` is out of range.
    pub fn recompute(&mut self, confidence: f64) -> Result<(), ProfileError> {
        self.tables = ProfileTables::from_raw(&self.raw, self.flatten, confidence)?;
        Ok(())
    }
}

/// Runs the whole pipeline for an address.
pub struct ProfileBuilder {
    pipeline: RadiusPipeline,
    directory: Box<dyn VenueDirectory>,
    search: SearchOptions,
    flatten: FlattenOptions,
    confidence: f64,
    progress: Arc<dyn ProgressCallback>,
}

impl ProfileBuilder {
    /// Creates a builder with default search, flattening and confidence.
    #[must_use]
    pub fn new(pipeline: RadiusPipeline, directory: Box<dyn VenueDirectory>) -> Self {
        Self {
            pipeline,
            directory,
            search: SearchOptions::default(),
            flatten: FlattenOptions::default(),
            confidence: venue_profile_stats::DEFAULT_CONFIDENCE,
            progress: null_progress(),
        }
    }

    /// Sets the venue search options.
    #[must_use]
    pub fn search_options(mut self, search: SearchOptions) -> Self {
        self.search = search;
        self
    }

    /// Sets the menu flattening options.
    #[must_use]
    pub const fn flatten_options(mut self, flatten: FlattenOptions) -> Self {
        self.flatten = flatten;
        self
    }

    /// Sets the confidence of the Bayesian price intervals.
    #[must_use]
    pub const fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Reports menu retrieval progress to `progress`.
    #[must_use]
    pub fn progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// The radius pipeline, for callers that only need the search area.
    #[must_use]
    pub const fn pipeline(&self) -> &RadiusPipeline {
        &self.pipeline
    }

    /// Builds the profile for `address`.
    ///
    /// Stages run strictly in order. Per-venue menu failures are recorded
    /// in [`VenueProfile::skipped_menus`]; every other failure aborts.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] from whichever stage failed.
    pub async fn build(&self, address: &str) -> Result<VenueProfile, ProfileError> {
        log::info!("Building venue profile for \"{address}\"");

        let search_area = self.pipeline.search_area(address).await?;

        let venues = search_venues(
            self.directory.as_ref(),
            &search_area.center,
            search_area.radius,
            &self.search,
        )
        .await?;
        let listed = venue_rows(&venues)?;
        log::info!("Found {} venue listings", listed.len());

        let fetch = fetch_menus(self.directory.as_ref(), &listed, self.progress.as_ref()).await;
        if !fetch.failures.is_empty() {
            log::warn!("{} menus could not be fetched", fetch.failures.len());
        }

        let raw = RawSnapshot {
            venues,
            menus: fetch.menus,
        };
        let tables = ProfileTables::from_raw(&raw, self.flatten, self.confidence)?;

        Ok(VenueProfile {
            address: address.to_string(),
            search_area,
            raw,
            skipped_menus: fetch.failures.into_iter().map(SkippedMenu::from).collect(),
            flatten: self.flatten,
            tables,
        })
    }
}

#[cfg(test)]
mod tests {
    use venue_profile_venues_models::VenueCategory;

    use super::*;
    use crate::pipeline::RadiusOrigin;
    use crate::testing::{builder, menu_payload};

    #[tokio::test]
    async fn builds_full_profile() {
        let profile = builder().build("1201 24th St NW").await.unwrap();

        assert_eq!(profile.search_area.origin, RadiusOrigin::Derived);
        assert_eq!(profile.raw.venues.len(), 2);
        assert_eq!(profile.tables.venues.len(), 5);
        assert_eq!(
            profile
                .tables
                .venues
                .iter()
                .filter(|v| v.category() == VenueCategory::Nightlife)
                .count(),
            2
        );

        assert_eq!(
            profile.raw.menus.keys().collect::<Vec<_>>(),
            ["Blue Duck Tavern", "Dupont Deli", "Night Owl"]
        );
        assert_eq!(profile.tables.menu_items.len(), 9);

        assert_eq!(profile.skipped_menus.len(), 1);
        assert_eq!(profile.skipped_menus[0].venue_id, "gone");
        assert!(profile.skipped_menus[0].reason.contains("404"));

        let stats = profile.tables.statistics.unwrap();
        assert_eq!(stats.item_count, 9);
        assert_eq!(stats.by_section.len(), 3);
    }

    #[tokio::test]
    async fn flatten_options_apply() {
        let profile = builder()
            .flatten_options(FlattenOptions {
                drop_na: false,
                iter_limit: Some(2),
            })
            .build("addr")
            .await
            .unwrap();

        assert_eq!(profile.tables.menu_items.len(), 2);
        assert_eq!(profile.flatten.iter_limit, Some(2));
        let stats = profile.tables.statistics.unwrap();
        assert_eq!(stats.item_count, 2);
        assert!(stats.bayes_mvs.is_none());
    }

    #[tokio::test]
    async fn invalid_confidence_fails() {
        let result = builder().confidence(1.5).build("addr").await;
        assert!(matches!(
            result,
            Err(ProfileError::Stats(StatsError::InvalidConfidence { .. }))
        ));
    }

    #[tokio::test]
    async fn tables_rebuild_from_raw() {
        let profile = builder().build("addr").await.unwrap();
        let rebuilt =
            ProfileTables::from_raw(&profile.raw, FlattenOptions::default(), 0.99).unwrap();
        assert_eq!(rebuilt, profile.tables);
    }

    #[test]
    fn uniform_prices_keep_tables() {
        let mut raw = RawSnapshot::default();
        raw.menus
            .insert("Sub Shop".to_string(), menu_payload(&[10.0, 10.0, 10.0, 10.0]));

        let tables = ProfileTables::from_raw(&raw, FlattenOptions::default(), 0.99).unwrap();

        assert_eq!(tables.menu_items.len(), 4);
        let stats = tables.statistics.unwrap();
        assert_eq!(stats.overall.count, 4);
        assert!((stats.overall.max - 10.0).abs() < f64::EPSILON);
        assert!(stats.bayes_mvs.is_none());
    }

    #[test]
    fn raw_snapshot_uses_upper_case_keys() {
        let json = serde_json::to_value(RawSnapshot::default()).unwrap();
        assert!(json.get("VENUES").is_some());
        assert!(json.get("MENUS").is_some());
    }
}
