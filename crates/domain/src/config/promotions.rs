use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Addon banners & cache-conflict dismissal
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Settings keys and the addon catalog used by the promotional banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionsConfig {
    /// Settings key holding the comma-terminated list of addon titles the
    /// admin has already seen.
    #[serde(default = "d_dismissed_key")]
    pub dismissed_key: String,
    /// Settings key flagged `"true"` the first time the catalog is recorded.
    #[serde(default = "d_first_key")]
    pub first_key: String,
    /// Settings key holding the comma-separated excluded cache plugins.
    #[serde(default = "d_excluded_cache_key")]
    pub excluded_cache_key: String,
    /// Link target for "View all Addons".
    #[serde(default = "d_addons_page_url")]
    pub addons_page_url: String,
    #[serde(default)]
    pub addons: Vec<AddonEntry>,
}

impl Default for PromotionsConfig {
    fn default() -> Self {
        Self {
            dismissed_key: d_dismissed_key(),
            first_key: d_first_key(),
            excluded_cache_key: d_excluded_cache_key(),
            addons_page_url: d_addons_page_url(),
            addons: Vec::new(),
        }
    }
}

/// One advertised addon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonEntry {
    pub title: String,
    #[serde(default)]
    pub thumb: String,
    #[serde(default)]
    pub url: String,
}

fn d_dismissed_key() -> String {
    "addon_note_dismissed".into()
}
fn d_first_key() -> String {
    "addon_note_first".into()
}
fn d_excluded_cache_key() -> String {
    "excluded_cache".into()
}
fn d_addons_page_url() -> String {
    "/admin/addons".into()
}
