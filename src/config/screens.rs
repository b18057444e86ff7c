//! Admin screen presets
//!
//! Filter and sort registrations for the four management screens, plus the
//! API resource each one lists.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ListSettings;
use crate::list::{FilterSpec, ListConfig};
use crate::models::{SortDirection, SortField};

/// The management screens with a built-in definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenPreset {
    /// Paparazzi pages
    #[default]
    Paparazzi,
    /// Radio stations
    Radio,
    /// Theme pages
    Themes,
    /// Press release distribution packs
    PressPacks,
}

/// Everything a screen needs to fetch and list its records
#[derive(Debug, Clone)]
pub struct ScreenDefinition {
    /// Which preset produced this definition
    pub preset: ScreenPreset,
    /// Heading shown above the table
    pub title: &'static str,
    /// Admin API resource path, relative to the base URL
    pub resource: &'static str,
    /// Key wrapping the collection in list responses
    pub collection_key: &'static str,
    /// Controller registrations
    pub list: ListConfig,
}

impl ScreenPreset {
    /// Every preset
    pub const ALL: [ScreenPreset; 4] = [
        ScreenPreset::Paparazzi,
        ScreenPreset::Radio,
        ScreenPreset::Themes,
        ScreenPreset::PressPacks,
    ];

    /// Stable identifier, as used in config files
    pub fn as_str(self) -> &'static str {
        match self {
            ScreenPreset::Paparazzi => "paparazzi",
            ScreenPreset::Radio => "radio",
            ScreenPreset::Themes => "themes",
            ScreenPreset::PressPacks => "press-packs",
        }
    }

    /// Build the screen definition with the shared list settings applied
    pub fn definition(self, settings: &ListSettings) -> ScreenDefinition {
        let (title, resource, collection_key, list) = match self {
            ScreenPreset::Paparazzi => (
                "Paparazzi Management",
                "paparazzi/admin",
                "paparazzi",
                paparazzi(),
            ),
            ScreenPreset::Radio => ("Radio Management", "radios/admin", "radios", radio()),
            ScreenPreset::Themes => ("Themes Management", "themes/admin", "themes", themes()),
            ScreenPreset::PressPacks => (
                "Press Pack Management",
                "press-packs/admin",
                "press_packs",
                press_packs(),
            ),
        };

        ScreenDefinition {
            preset: self,
            title,
            resource,
            collection_key,
            list: list
                .with_page_size(settings.page_size)
                .with_debounce(settings.debounce()),
        }
    }
}

impl fmt::Display for ScreenPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised screen name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown screen '{0}' (expected paparazzi, radio, themes or press-packs)")]
pub struct UnknownScreen(pub String);

impl FromStr for ScreenPreset {
    type Err = UnknownScreen;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "paparazzi" => Ok(ScreenPreset::Paparazzi),
            "radio" | "radios" => Ok(ScreenPreset::Radio),
            "themes" | "theme" => Ok(ScreenPreset::Themes),
            "press-packs" | "press-pack" | "presspacks" => Ok(ScreenPreset::PressPacks),
            _ => Err(UnknownScreen(s.to_string())),
        }
    }
}

fn with_timestamps(config: ListConfig) -> ListConfig {
    config
        .with_sort_field(SortField::date("created_at"))
        .with_sort_field(SortField::date("updated_at"))
        .with_default_sort("created_at", SortDirection::Desc)
}

fn paparazzi() -> ListConfig {
    let config = ListConfig::new()
        .with_filter(FilterSpec::search(
            "search",
            ["page_name", "username", "category", "location"],
        ))
        .with_filter(FilterSpec::select("status", "status"))
        .with_filter(FilterSpec::select("platform", "platform"))
        .with_filter(FilterSpec::text("category", "category"))
        .with_filter(FilterSpec::text("location", "location"))
        .with_sort_field(SortField::text("page_name"))
        .with_sort_field(SortField::numeric("followers_count"))
        .with_sort_field(SortField::numeric("price_reel_no_tag_no_collab"))
        .with_sort_field(SortField::text("status"));
    with_timestamps(config)
}

fn radio() -> ListConfig {
    let config = ListConfig::new()
        .with_filter(FilterSpec::search(
            "search",
            ["radio_name", "frequency", "radio_language", "sn"],
        ))
        .with_filter(FilterSpec::select("group", "group_id"))
        .with_filter(FilterSpec::text("language", "radio_language"))
        .with_filter(FilterSpec::text("emirate", "emirate_state"))
        .with_sort_field(SortField::text("radio_name"))
        .with_sort_field(SortField::text("frequency"))
        .with_sort_field(SortField::text("sn"));
    with_timestamps(config)
}

fn themes() -> ListConfig {
    let config = ListConfig::new()
        .with_filter(FilterSpec::search(
            "search",
            ["username", "page_name", "category", "location"],
        ))
        .with_filter(FilterSpec::select("platform", "platform"))
        .with_filter(FilterSpec::text("category", "category"))
        .with_filter(FilterSpec::text("location", "location"))
        .with_sort_field(SortField::numeric("no_of_followers"))
        .with_sort_field(SortField::text("page_name"));
    with_timestamps(config)
}

fn press_packs() -> ListConfig {
    let config = ListConfig::new()
        .with_filter(FilterSpec::search(
            "search",
            ["distribution_package", "region", "industry", "news", "language"],
        ))
        .with_filter(FilterSpec::select("region", "region"))
        .with_filter(FilterSpec::select("industry", "industry"))
        .with_filter(FilterSpec::select("language", "language"))
        .with_sort_field(SortField::text("distribution_package"))
        .with_sort_field(SortField::numeric("price"));
    with_timestamps(config)
}
