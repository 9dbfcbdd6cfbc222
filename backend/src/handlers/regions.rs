//! Region table handlers

use axum::Json;
use shared::{Region, RegionInfo};

/// List every supported region with its provider code and partition
pub async fn list_regions() -> Json<Vec<RegionInfo>> {
    Json(Region::ALL.iter().copied().map(RegionInfo::from).collect())
}
