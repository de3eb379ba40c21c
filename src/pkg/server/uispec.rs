use askama::Template;

use crate::pkg::internal::{adaptors::profiles::spec::Profile, language::LanguageContext};

/// One `<option>` of a filter dropdown.
#[derive(Debug, Clone)]
pub struct Choice {
    pub value: &'static str,
    pub label: String,
    pub selected: bool,
}

/// A post as the list and the detail pane print it.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub area: String,
    pub description: String,
    pub experience: String,
    pub apartment: String,
    pub posted: String,
    pub href: String,
    pub active: bool,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct Dashboard<'a> {
    pub lang: LanguageContext,
    pub header_name: Option<&'a str>,
    pub profile: Option<&'a Profile>,
    pub member_since: String,
    pub account_type: &'a str,
}

#[derive(Template)]
#[template(path = "platform.html")]
pub struct Platform {
    pub lang: LanguageContext,
    pub header_name: Option<String>,
    /// Rendered `PlatformView`.
    pub view: String,
}

/// Filter form, post list and detail pane. Served alone for htmx swaps, so
/// the form's selection and reset link are replaced together with the list.
#[derive(Template)]
#[template(path = "platform_view.html")]
pub struct PlatformView {
    pub lang: LanguageContext,
    pub locations: Vec<Choice>,
    pub experiences: Vec<Choice>,
    pub apartments: Vec<Choice>,
    pub posts: Vec<PostCard>,
    pub selected: Option<PostCard>,
    pub show_reset: bool,
    pub reset_href: String,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct Login<'a> {
    pub lang: LanguageContext,
    pub header_name: Option<&'a str>,
    pub email: &'a str,
    pub error: Option<String>,
}
