//! Homepage imagery and popup messages.

use serde::{Deserialize, Serialize};

use crate::types::{BannerId, BgImageId, LogoId, PopupId};

/// Hero carousel slide (`banners` collection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(default, skip_serializing)]
    pub id: BannerId,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub image: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub active: bool,
}

/// Partner or brand logo in the homepage strip (`logos` collection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logo {
    #[serde(default, skip_serializing)]
    pub id: LogoId,
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// Section background image (`bgImages` collection).
///
/// `placement` names the section that uses it (`hero`, `contact`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BgImage {
    #[serde(default, skip_serializing)]
    pub id: BgImageId,
    pub image: String,
    pub placement: String,
}

/// Popup message (`pop-up` collection).
///
/// Only shown when `settings/popup` is enabled; the first active message wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupMessage {
    #[serde(default, skip_serializing)]
    pub id: PopupId,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub active: bool,
}

/// Pick the background image for a placement, if any.
/// Page sections that can carry a background image.
pub const PLACEMENTS: &[&str] = &["hero", "contact"];

#[must_use]
pub fn background_for<'a>(images: &'a [BgImage], placement: &str) -> Option<&'a BgImage> {
    images.iter().find(|img| img.placement == placement)
}

/// Active banners sorted by `order`.
#[must_use]
pub fn active_banners(banners: &[Banner]) -> Vec<Banner> {
    let mut active: Vec<Banner> = banners.iter().filter(|b| b.active).cloned().collect();
    active.sort_by_key(|b| b.order);
    active
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banner(id: &str, order: i64, active: bool) -> Banner {
        Banner {
            id: BannerId::new(id),
            title: id.to_string(),
            subtitle: None,
            image: format!("https://img/{id}.jpg"),
            link: None,
            order,
            active,
        }
    }

    #[test]
    fn test_active_banners_filters_and_sorts() {
        let banners = vec![banner("c", 3, true), banner("a", 1, false), banner("b", 2, true)];
        let ids: Vec<_> = active_banners(&banners)
            .into_iter()
            .map(|b| b.id.into_inner())
            .collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_background_for() {
        let images = vec![BgImage {
            id: BgImageId::new("1"),
            image: "https://img/contact.jpg".to_string(),
            placement: "contact".to_string(),
        }];
        assert!(background_for(&images, "contact").is_some());
        assert!(background_for(&images, "hero").is_none());
    }
}
