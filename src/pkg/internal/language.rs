use std::borrow::Cow;

use super::i18n::{self, Direction, Locale};

/// The active display language for one rendered page.
///
/// Built from the locale cookie before anything renders and handed to every
/// template, so a page never shows the fallback language first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageContext {
    locale: Locale,
}

impl LanguageContext {
    pub fn new(locale: Locale) -> Self {
        LanguageContext { locale }
    }

    /// Resolves the persisted cookie value, keeping `fallback` when the cookie
    /// is missing, empty or names a locale we do not ship.
    pub fn resolve(cookie: Option<&str>, fallback: Locale) -> Self {
        let locale = match cookie.filter(|v| !v.is_empty()) {
            Some(value) => value.parse().unwrap_or_else(|e| {
                tracing::debug!("ignoring locale cookie: {}", e);
                fallback
            }),
            None => fallback,
        };
        LanguageContext { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set_language(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn direction(&self) -> Direction {
        self.locale.direction()
    }

    pub fn t<'a>(&self, key: &'a str) -> Cow<'a, str> {
        i18n::translate(self.locale, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_wins_over_fallback() {
        let ctx = LanguageContext::resolve(Some("en"), Locale::He);
        assert_eq!(ctx.locale(), Locale::En);
        assert_eq!(ctx.direction(), Direction::Ltr);
    }

    #[test]
    fn bad_or_missing_cookie_keeps_fallback() {
        assert_eq!(LanguageContext::resolve(None, Locale::He).locale(), Locale::He);
        assert_eq!(LanguageContext::resolve(Some(""), Locale::En).locale(), Locale::En);
        assert_eq!(LanguageContext::resolve(Some("xx"), Locale::He).locale(), Locale::He);
    }

    #[test]
    fn setter_switches_direction_and_strings() {
        let mut ctx = LanguageContext::new(Locale::En);
        assert_eq!(ctx.t("auth-sign-in"), "Sign In");
        ctx.set_language(Locale::He);
        assert_eq!(ctx.direction(), Direction::Rtl);
        assert_eq!(ctx.t("auth-sign-in"), "התחברות");
    }
}
