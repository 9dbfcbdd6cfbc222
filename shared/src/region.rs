//! Region code table
//!
//! Every city and county served by the CWA township forecast datasets. Each region
//! owns exactly one storage partition whose name is fixed here at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when a region identifier is not part of the code table
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown region: {0}")]
pub struct UnknownRegion(pub String);

/// A Taiwanese city or county with a fixed provider dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Region {
    YilanCounty,
    TaoyuanCity,
    HsinchuCounty,
    MiaoliCounty,
    ChanghuaCounty,
    NantouCounty,
    YunlinCounty,
    ChiayiCounty,
    PingtungCounty,
    TaitungCounty,
    HualienCounty,
    PenghuCounty,
    KeelungCity,
    HsinchuCity,
    ChiayiCity,
    TaipeiCity,
    KaohsiungCity,
    NewTaipeiCity,
    TaichungCity,
    TainanCity,
    LienchiangCounty,
    KinmenCounty,
}

impl Region {
    /// Every region, in provider code order
    pub const ALL: [Region; 22] = [
        Region::YilanCounty,
        Region::TaoyuanCity,
        Region::HsinchuCounty,
        Region::MiaoliCounty,
        Region::ChanghuaCounty,
        Region::NantouCounty,
        Region::YunlinCounty,
        Region::ChiayiCounty,
        Region::PingtungCounty,
        Region::TaitungCounty,
        Region::HualienCounty,
        Region::PenghuCounty,
        Region::KeelungCity,
        Region::HsinchuCity,
        Region::ChiayiCity,
        Region::TaipeiCity,
        Region::KaohsiungCity,
        Region::NewTaipeiCity,
        Region::TaichungCity,
        Region::TainanCity,
        Region::LienchiangCounty,
        Region::KinmenCounty,
    ];

    /// Identifier used in URLs and payloads (e.g. `taipeiCity`)
    pub fn id(&self) -> &'static str {
        match self {
            Region::YilanCounty => "yilanCounty",
            Region::TaoyuanCity => "taoyuanCity",
            Region::HsinchuCounty => "hsinchuCounty",
            Region::MiaoliCounty => "miaoliCounty",
            Region::ChanghuaCounty => "changhuaCounty",
            Region::NantouCounty => "nantouCounty",
            Region::YunlinCounty => "yunlinCounty",
            Region::ChiayiCounty => "chiayiCounty",
            Region::PingtungCounty => "pingtungCounty",
            Region::TaitungCounty => "taitungCounty",
            Region::HualienCounty => "hualienCounty",
            Region::PenghuCounty => "penghuCounty",
            Region::KeelungCity => "keelungCity",
            Region::HsinchuCity => "hsinchuCity",
            Region::ChiayiCity => "chiayiCity",
            Region::TaipeiCity => "taipeiCity",
            Region::KaohsiungCity => "kaohsiungCity",
            Region::NewTaipeiCity => "newTaipeiCity",
            Region::TaichungCity => "taichungCity",
            Region::TainanCity => "tainanCity",
            Region::LienchiangCounty => "lienchiangCounty",
            Region::KinmenCounty => "kinmenCounty",
        }
    }

    /// CWA dataset code for the one-week township forecast
    pub fn provider_code(&self) -> &'static str {
        match self {
            Region::YilanCounty => "F-D0047-003",
            Region::TaoyuanCity => "F-D0047-007",
            Region::HsinchuCounty => "F-D0047-011",
            Region::MiaoliCounty => "F-D0047-015",
            Region::ChanghuaCounty => "F-D0047-019",
            Region::NantouCounty => "F-D0047-023",
            Region::YunlinCounty => "F-D0047-027",
            Region::ChiayiCounty => "F-D0047-031",
            Region::PingtungCounty => "F-D0047-035",
            Region::TaitungCounty => "F-D0047-039",
            Region::HualienCounty => "F-D0047-043",
            Region::PenghuCounty => "F-D0047-047",
            Region::KeelungCity => "F-D0047-051",
            Region::HsinchuCity => "F-D0047-055",
            Region::ChiayiCity => "F-D0047-059",
            Region::TaipeiCity => "F-D0047-063",
            Region::KaohsiungCity => "F-D0047-067",
            Region::NewTaipeiCity => "F-D0047-071",
            Region::TaichungCity => "F-D0047-075",
            Region::TainanCity => "F-D0047-079",
            Region::LienchiangCounty => "F-D0047-083",
            Region::KinmenCounty => "F-D0047-087",
        }
    }

    /// Name the provider uses for the region
    pub fn display_name(&self) -> &'static str {
        match self {
            Region::YilanCounty => "宜蘭縣",
            Region::TaoyuanCity => "桃園市",
            Region::HsinchuCounty => "新竹縣",
            Region::MiaoliCounty => "苗栗縣",
            Region::ChanghuaCounty => "彰化縣",
            Region::NantouCounty => "南投縣",
            Region::YunlinCounty => "雲林縣",
            Region::ChiayiCounty => "嘉義縣",
            Region::PingtungCounty => "屏東縣",
            Region::TaitungCounty => "臺東縣",
            Region::HualienCounty => "花蓮縣",
            Region::PenghuCounty => "澎湖縣",
            Region::KeelungCity => "基隆市",
            Region::HsinchuCity => "新竹市",
            Region::ChiayiCity => "嘉義市",
            Region::TaipeiCity => "臺北市",
            Region::KaohsiungCity => "高雄市",
            Region::NewTaipeiCity => "新北市",
            Region::TaichungCity => "臺中市",
            Region::TainanCity => "臺南市",
            Region::LienchiangCounty => "連江縣",
            Region::KinmenCounty => "金門縣",
        }
    }

    /// Name of the table holding this region's forecast records
    pub fn partition_name(&self) -> &'static str {
        match self {
            Region::YilanCounty => "forecasts_yilan_county",
            Region::TaoyuanCity => "forecasts_taoyuan_city",
            Region::HsinchuCounty => "forecasts_hsinchu_county",
            Region::MiaoliCounty => "forecasts_miaoli_county",
            Region::ChanghuaCounty => "forecasts_changhua_county",
            Region::NantouCounty => "forecasts_nantou_county",
            Region::YunlinCounty => "forecasts_yunlin_county",
            Region::ChiayiCounty => "forecasts_chiayi_county",
            Region::PingtungCounty => "forecasts_pingtung_county",
            Region::TaitungCounty => "forecasts_taitung_county",
            Region::HualienCounty => "forecasts_hualien_county",
            Region::PenghuCounty => "forecasts_penghu_county",
            Region::KeelungCity => "forecasts_keelung_city",
            Region::HsinchuCity => "forecasts_hsinchu_city",
            Region::ChiayiCity => "forecasts_chiayi_city",
            Region::TaipeiCity => "forecasts_taipei_city",
            Region::KaohsiungCity => "forecasts_kaohsiung_city",
            Region::NewTaipeiCity => "forecasts_new_taipei_city",
            Region::TaichungCity => "forecasts_taichung_city",
            Region::TainanCity => "forecasts_tainan_city",
            Region::LienchiangCounty => "forecasts_lienchiang_county",
            Region::KinmenCounty => "forecasts_kinmen_county",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .iter()
            .copied()
            .find(|region| region.id() == s)
            .ok_or_else(|| UnknownRegion(s.to_string()))
    }
}

/// Region table entry as exposed over the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegionInfo {
    pub id: String,
    pub provider_code: String,
    pub display_name: String,
    pub partition: String,
}

impl From<Region> for RegionInfo {
    fn from(region: Region) -> Self {
        Self {
            id: region.id().to_string(),
            provider_code: region.provider_code().to_string(),
            display_name: region.display_name().to_string(),
            partition: region.partition_name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_known_regions() {
        assert_eq!("taipeiCity".parse::<Region>(), Ok(Region::TaipeiCity));
        assert_eq!("newTaipeiCity".parse::<Region>(), Ok(Region::NewTaipeiCity));
        assert_eq!(
            "unknownCity".parse::<Region>(),
            Err(UnknownRegion("unknownCity".to_string()))
        );
        // Identifiers are case-sensitive
        assert!("TaipeiCity".parse::<Region>().is_err());
    }

    #[test]
    fn test_id_round_trip() {
        for region in Region::ALL {
            assert_eq!(region.id().parse::<Region>(), Ok(region));
            assert_eq!(region.to_string(), region.id());
        }
    }

    #[test]
    fn test_serde_uses_region_id() {
        let json = serde_json::to_string(&Region::KaohsiungCity).unwrap();
        assert_eq!(json, "\"kaohsiungCity\"");
        let parsed: Region = serde_json::from_str("\"hualienCounty\"").unwrap();
        assert_eq!(parsed, Region::HualienCounty);
    }

    #[test]
    fn test_partition_names_are_unique() {
        let names: HashSet<_> = Region::ALL.iter().map(|r| r.partition_name()).collect();
        assert_eq!(names.len(), Region::ALL.len());
        for name in names {
            assert!(name.starts_with("forecasts_"));
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }

    #[test]
    fn test_provider_codes_are_unique() {
        let codes: HashSet<_> = Region::ALL.iter().map(|r| r.provider_code()).collect();
        assert_eq!(codes.len(), Region::ALL.len());
        assert_eq!(Region::NewTaipeiCity.provider_code(), "F-D0047-071");

        // One-week township datasets: F-D0047-NNN
        for region in Region::ALL {
            let suffix = region.provider_code().strip_prefix("F-D0047-").unwrap();
            assert_eq!(suffix.len(), 3);
            assert!(suffix.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
