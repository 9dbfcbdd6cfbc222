//! Validation utilities for forecast queries and provider payloads

use crate::models::ForecastDocument;
use crate::region::Region;

/// Longest district filter accepted from clients
pub const MAX_LOCATION_FILTER_LEN: usize = 64;

/// Validate a district filter supplied by a client
pub fn validate_location_filter(filter: &str) -> Result<(), &'static str> {
    if filter.chars().count() > MAX_LOCATION_FILTER_LEN {
        return Err("Location filter is too long");
    }
    if filter.chars().any(char::is_control) {
        return Err("Location filter contains control characters");
    }
    Ok(())
}

/// Whether the provider's label for a document names the expected region.
///
/// The provider writes 台 and 臺 interchangeably, so both are accepted.
pub fn region_label_matches(region: Region, document: &ForecastDocument) -> bool {
    let normalize = |s: &str| s.trim().replace('台', "臺");
    normalize(&document.region_label) == normalize(region.display_name())
}

/// Locations in a document that have no name, which filtering can never match
pub fn unnamed_locations(document: &ForecastDocument) -> usize {
    document
        .locations
        .iter()
        .filter(|location| location.name.trim().is_empty())
        .count()
}
