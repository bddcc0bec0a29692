//! One-time "new addons" banner and cache-plugin conflict dismissal.
//!
//! Both are thin state machines over [`SettingsStore`]: the banner compares
//! the current addon catalog against the list the admin last acknowledged,
//! and the cache helper accumulates plugin names the admin chose to ignore.

use std::fmt::Write;
use std::sync::Arc;

use nb_domain::config::{AddonEntry, PromotionsConfig};
use nb_domain::error::Result;
use nb_domain::trace::TraceEvent;

use crate::render::{EscapeHtml, Sanitize};
use crate::settings::SettingsStore;

/// Fingerprint of a catalog: every title followed by a comma.
pub fn addon_hash(addons: &[AddonEntry]) -> String {
    addons.iter().fold(String::new(), |mut acc, a| {
        acc.push_str(&a.title);
        acc.push(',');
        acc
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddonNoteState {
    /// Nothing was recorded yet; the current catalog has been recorded as
    /// seen and no banner is due.
    FirstRun,
    /// The admin has seen every addon in the catalog.
    Unchanged,
    /// The catalog changed since the last acknowledgement; these addons are
    /// new to the admin.
    NewAddons(Vec<AddonEntry>),
}

pub struct AddonNotes {
    settings: Arc<dyn SettingsStore>,
    config: PromotionsConfig,
}

impl AddonNotes {
    pub fn new(settings: Arc<dyn SettingsStore>, config: PromotionsConfig) -> Self {
        Self { settings, config }
    }

    pub fn catalog(&self) -> &[AddonEntry] {
        &self.config.addons
    }

    pub fn current_hash(&self) -> String {
        addon_hash(&self.config.addons)
    }

    /// Compare the catalog with the last acknowledged one.
    pub fn check(&self) -> Result<AddonNoteState> {
        let current = self.current_hash();
        let recorded = self
            .settings
            .get(&self.config.dismissed_key)?
            .filter(|h| !h.is_empty());

        let Some(recorded) = recorded else {
            self.settings.set(&self.config.dismissed_key, &current)?;
            self.settings.set(&self.config.first_key, "true")?;
            return Ok(AddonNoteState::FirstRun);
        };

        if recorded == current {
            return Ok(AddonNoteState::Unchanged);
        }

        let seen: Vec<&str> = recorded.split(',').collect();
        let fresh = self
            .config
            .addons
            .iter()
            .filter(|a| !seen.contains(&a.title.as_str()))
            .cloned()
            .collect();
        Ok(AddonNoteState::NewAddons(fresh))
    }

    /// Banner markup for [`AddonNoteState::NewAddons`], or `None` when no
    /// banner is due.
    pub fn note_markup(&self) -> Result<Option<String>> {
        match self.check()? {
            AddonNoteState::NewAddons(addons) => {
                Ok(Some(render_note(&addons, &self.config.addons_page_url)))
            }
            _ => Ok(None),
        }
    }

    /// Mark the current catalog as seen.
    pub fn dismiss(&self) -> Result<()> {
        let hash = self.current_hash();
        self.settings.set(&self.config.dismissed_key, &hash)?;
        TraceEvent::AddonNoteDismissed { hash }.emit();
        Ok(())
    }

    /// Whether an open addons page is showing a stale catalog.
    pub fn needs_refresh(&self) -> Result<bool> {
        let recorded = self.settings.get(&self.config.dismissed_key)?;
        Ok(recorded.as_deref() != Some(self.current_hash().as_str()))
    }
}

/// Dismissible banner listing `addons`, with a link to the full catalog.
pub fn render_note(addons: &[AddonEntry], addons_page_url: &str) -> String {
    let esc = EscapeHtml;
    let mut items = String::new();
    for a in addons {
        let _ = write!(
            items,
            "<div class=\"nb-addon-item\"><img src=\"{}\" alt=\"\"/> <a href=\"{}\" target=\"_blank\">{}</a></div>",
            esc.sanitize(&a.thumb),
            esc.sanitize(&a.url),
            esc.sanitize(&a.title),
        );
    }
    format!(
        "<div class=\"updated notice nb_addon_note is-dismissible\">\
         <p><strong>New Addons for Your Forum!</strong><br><span>Extend your forum with addons</span></p>\
         <div class=\"nb-addon-list\">{items}<div style=\"clear:both;\"></div></div>\
         <p><a href=\"{}\">View all Addons &raquo;</a></p>\
         </div>",
        esc.sanitize(addons_page_url),
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Cache plugin conflicts
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct CacheConflicts {
    settings: Arc<dyn SettingsStore>,
    key: String,
}

impl CacheConflicts {
    pub fn new(settings: Arc<dyn SettingsStore>, config: &PromotionsConfig) -> Self {
        Self {
            settings,
            key: config.excluded_cache_key.clone(),
        }
    }

    /// Plugin names currently excluded from conflict warnings.
    pub fn excluded(&self) -> Result<Vec<String>> {
        let raw = self.settings.get(&self.key)?.unwrap_or_default();
        Ok(raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// Append `not_excluded` to the excluded list and store it.  Returns the
    /// stored comma-separated value.
    pub fn dismiss<S: AsRef<str>>(&self, not_excluded: &[S]) -> Result<String> {
        let mut excluded = self.settings.get(&self.key)?.unwrap_or_default();
        for name in not_excluded {
            excluded.push(',');
            excluded.push_str(name.as_ref());
        }
        let excluded = excluded.trim_matches(',').to_owned();
        self.settings.set(&self.key, &excluded)?;
        TraceEvent::CacheConflictDismissed {
            excluded: excluded.clone(),
        }
        .emit();
        Ok(excluded)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettings;

    fn addon(title: &str) -> AddonEntry {
        AddonEntry {
            title: title.into(),
            thumb: format!("/img/{title}.png"),
            url: format!("https://example.com/{title}"),
        }
    }

    fn config(titles: &[&str]) -> PromotionsConfig {
        PromotionsConfig {
            addons: titles.iter().map(|t| addon(t)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn hash_is_comma_terminated_titles() {
        assert_eq!(addon_hash(&[addon("Polls"), addon("Ads")]), "Polls,Ads,");
        assert_eq!(addon_hash(&[]), "");
    }

    #[test]
    fn note_lifecycle() {
        let settings = Arc::new(MemorySettings::new());

        let notes = AddonNotes::new(settings.clone(), config(&["Polls"]));
        assert_eq!(notes.check().unwrap(), AddonNoteState::FirstRun);
        assert_eq!(settings.get("addon_note_first").unwrap().as_deref(), Some("true"));
        assert_eq!(notes.check().unwrap(), AddonNoteState::Unchanged);
        assert!(!notes.needs_refresh().unwrap());
        assert!(notes.note_markup().unwrap().is_none());

        let notes = AddonNotes::new(settings.clone(), config(&["Polls", "Ads"]));
        assert_eq!(notes.check().unwrap(), AddonNoteState::NewAddons(vec![addon("Ads")]));
        assert!(notes.needs_refresh().unwrap());
        let html = notes.note_markup().unwrap().expect("banner due");
        assert!(html.contains(">Ads</a>"));
        assert!(!html.contains(">Polls</a>"));

        notes.dismiss().unwrap();
        assert_eq!(notes.check().unwrap(), AddonNoteState::Unchanged);
        assert_eq!(
            settings.get("addon_note_dismissed").unwrap().as_deref(),
            Some("Polls,Ads,")
        );
    }

    #[test]
    fn render_note_links_catalog_page() {
        let html = render_note(&[addon("Polls")], "/admin/addons?x=1&y=2");
        assert!(html.contains("is-dismissible"));
        assert!(html.contains(r#"href="/admin/addons?x=1&amp;y=2""#));
        assert!(html.contains(r#"src="/img/Polls.png""#));
    }

    #[test]
    fn cache_conflict_dismissal_accumulates() {
        let settings = Arc::new(MemorySettings::new());
        let cc = CacheConflicts::new(settings.clone(), &PromotionsConfig::default());

        assert_eq!(cc.dismiss(&["WP Rocket"]).unwrap(), "WP Rocket");
        assert_eq!(cc.dismiss(&["W3 Total Cache", "LiteSpeed"]).unwrap(),
            "WP Rocket,W3 Total Cache,LiteSpeed");
        assert_eq!(cc.excluded().unwrap().len(), 3);

        let none: [&str; 0] = [];
        assert_eq!(cc.dismiss(&none).unwrap(), "WP Rocket,W3 Total Cache,LiteSpeed");
    }
}
