use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use fluent_bundle::{FluentResource, concurrent::FluentBundle};
use lazy_static::lazy_static;
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    He,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::He => "he",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Locale::He => Direction::Rtl,
            Locale::En => Direction::Ltr,
        }
    }

    /// Short date the way each locale writes it, e.g. 3/14/2024 vs 14.3.2024
    pub fn format_date(&self, at: &DateTime<Utc>) -> String {
        match self {
            Locale::En => at.format("%-m/%-d/%Y").to_string(),
            Locale::He => at.format("%-d.%-m.%Y").to_string(),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    /// Accepts any BCP 47 tag whose language we ship, so `he-IL` or `en_US`
    /// written by other clients still resolve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: LanguageIdentifier = s
            .trim()
            .parse()
            .map_err(|e| format!("unsupported locale {}: {}", s, e))?;
        match id.language.as_str() {
            "en" => Ok(Locale::En),
            "he" | "iw" => Ok(Locale::He),
            _ => Err(format!("unsupported locale: {}", s)),
        }
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Ltr => write!(f, "ltr"),
            Direction::Rtl => write!(f, "rtl"),
        }
    }
}

#[derive(RustEmbed)]
#[folder = "i18n/"]
struct Asset;

lazy_static! {
    static ref BUNDLES: HashMap<Locale, FluentBundle<FluentResource>> = load_bundles();
}

/// One bundle per `{code}.ftl` found in the embedded folder. A resource with
/// syntax errors still contributes the messages that did parse.
fn load_bundles() -> HashMap<Locale, FluentBundle<FluentResource>> {
    let mut bundles = HashMap::new();
    for file in Asset::iter() {
        let Some(code) = file.strip_suffix(".ftl") else {
            continue;
        };
        let (Ok(locale), Ok(id)) = (code.parse::<Locale>(), code.parse::<LanguageIdentifier>()) else {
            tracing::warn!("skipping translations for unknown locale {}", code);
            continue;
        };
        let Some(content) = Asset::get(&file) else {
            continue;
        };
        let source = String::from_utf8_lossy(content.data.as_ref()).to_string();
        let resource = FluentResource::try_new(source).unwrap_or_else(|(partial, errors)| {
            tracing::error!("errors parsing {}: {:?}", &file, errors);
            partial
        });
        let mut bundle = FluentBundle::new_concurrent(vec![id]);
        // keys are plain labels, no bidi isolation marks around them
        bundle.set_use_isolating(false);
        if let Err(errors) = bundle.add_resource(resource) {
            tracing::error!("errors loading {}: {:?}", &file, errors);
        }
        bundles.insert(locale, bundle);
    }
    bundles
}

/// Looks up a display string. Unknown keys come back unchanged so a missing
/// entry shows up on the page instead of an empty label.
pub fn translate(locale: Locale, key: &str) -> Cow<'_, str> {
    let bundles: &'static HashMap<Locale, FluentBundle<FluentResource>> = &BUNDLES;
    let Some(bundle) = bundles.get(&locale) else {
        return Cow::Borrowed(key);
    };
    let Some(pattern) = bundle.get_message(key).and_then(|m| m.value()) else {
        return Cow::Borrowed(key);
    };
    let mut errors = vec![];
    let value = bundle.format_pattern(pattern, None, &mut errors);
    if !errors.is_empty() {
        tracing::warn!("errors formatting {}: {:?}", key, errors);
        return Cow::Borrowed(key);
    }
    value
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn parses_codes_with_regions() {
        assert_eq!("he".parse::<Locale>(), Ok(Locale::He));
        assert_eq!("he-IL".parse::<Locale>(), Ok(Locale::He));
        assert_eq!("EN_us".parse::<Locale>(), Ok(Locale::En));
        assert!("fr".parse::<Locale>().is_err());
        assert!("".parse::<Locale>().is_err());
    }

    #[test]
    fn hebrew_is_right_to_left() {
        assert_eq!(Locale::He.direction(), Direction::Rtl);
        assert_eq!(Locale::En.direction(), Direction::Ltr);
        assert_eq!(Locale::He.direction().to_string(), "rtl");
    }

    #[test]
    fn unknown_keys_fall_through() {
        assert_eq!(translate(Locale::En, "dashboard-title"), "Dashboard");
        assert_eq!(translate(Locale::He, "auth-sign-out"), "התנתקות");
        assert_eq!(translate(Locale::He, "nope-missing"), "nope-missing");
    }

    #[test]
    fn both_locales_ship_every_key() {
        let keys = [
            "site-title", "nav-dashboard", "nav-platform", "auth-sign-in", "auth-sign-out",
            "auth-unavailable", "dashboard-profile", "platform-empty", "filters-reset",
            "location-north",
        ];
        for key in keys {
            assert_ne!(translate(Locale::En, key), key, "{key}");
            assert_ne!(translate(Locale::He, key), key, "{key}");
        }
    }

    #[test]
    fn embedded_resources_load_for_both_locales() {
        assert!(BUNDLES.contains_key(&Locale::En));
        assert!(BUNDLES.contains_key(&Locale::He));
    }

    #[test]
    fn dates_follow_locale() {
        let at = Utc.with_ymd_and_hms(2024, 3, 14, 10, 0, 0).unwrap();
        assert_eq!(Locale::En.format_date(&at), "3/14/2024");
        assert_eq!(Locale::He.format_date(&at), "14.3.2024");
    }
}
