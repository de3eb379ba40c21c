use askama::Template;
use axum::{
    Extension,
    extract::{Query, State},
    http::HeaderMap,
    response::Html,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    pkg::{
        internal::{
            adaptors::posts::{selectors::PostSelector, spec::Post},
            bootstrap::header_name,
            filters::{ApartmentRequirement, ExperienceBracket, Filters, Location, derive_view},
            language::LanguageContext,
        },
        server::{
            handlers::session_token,
            state::AppState,
            uispec::{Choice, Platform, PlatformView, PostCard},
        },
    },
    prelude::Result,
};

pub const PLATFORM_PATH: &str = "/platform";

#[derive(Deserialize, Debug, Default)]
pub struct PlatformQuery {
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub experience: ExperienceBracket,
    #[serde(default)]
    pub apartment: ApartmentRequirement,
    pub selected: Option<i64>,
    #[serde(default)]
    pub reset: bool,
}

impl PlatformQuery {
    pub fn filters(&self) -> Filters {
        let mut filters = Filters {
            location: self.location,
            experience: self.experience,
            requires_apartment: self.apartment,
        };
        if self.reset {
            filters.reset();
        }
        filters
    }
}

pub async fn show(
    State(state): State<AppState>,
    Extension(lang): Extension<LanguageContext>,
    Query(params): Query<PlatformQuery>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<Html<String>> {
    let token = session_token(&jar, &state);
    let base = match PostSelector::new(&state.backend, &state.options.posts_table)
        .get_all(token)
        .await
    {
        Ok(posts) => posts,
        Err(e) => {
            tracing::error!("error fetching posts: {:?}", e);
            vec![]
        }
    };
    let filters = params.filters();
    let view = derive_view(&base, &filters, params.selected);
    tracing::debug!(
        "{} of {} posts match {:?}",
        view.filtered.len(),
        base.len(),
        &filters
    );

    let selected_id = view.selected.map(|p| p.id);
    let posts: Vec<PostCard> = view
        .filtered
        .iter()
        .map(|post| card(post, &filters, &lang, selected_id))
        .collect();
    let selected = view.selected.map(|post| card(post, &filters, &lang, selected_id));

    let mut cleared = filters;
    cleared.reset();
    let view = PlatformView {
        lang,
        locations: Location::OPTIONS
            .iter()
            .map(|l| Choice {
                value: l.as_str(),
                label: lang.t(l.label_key()).to_string(),
                selected: *l == filters.location,
            })
            .collect(),
        experiences: ExperienceBracket::OPTIONS
            .iter()
            .map(|e| Choice {
                value: e.as_str(),
                label: match e {
                    ExperienceBracket::All => lang.t("filters-all").to_string(),
                    other => other.as_str().to_string(),
                },
                selected: *e == filters.experience,
            })
            .collect(),
        apartments: ApartmentRequirement::OPTIONS
            .iter()
            .map(|a| Choice {
                value: a.as_str(),
                label: lang.t(a.label_key()).to_string(),
                selected: *a == filters.requires_apartment,
            })
            .collect(),
        posts,
        selected,
        show_reset: !filters.is_reset(),
        reset_href: format!("{}?{}", PLATFORM_PATH, cleared.to_query(selected_id)),
    };

    let partial = headers.contains_key("HX-Request") && !headers.contains_key("HX-Boosted");
    if partial {
        return Ok(Html(view.render()?));
    }
    let template = Platform {
        lang,
        header_name: header_name(&state.auth, &state.backend, &state.options.profiles_table, token).await,
        view: view.render()?,
    };
    Ok(Html(template.render()?))
}

fn card(post: &Post, filters: &Filters, lang: &LanguageContext, selected: Option<i64>) -> PostCard {
    let area_key = format!("location-{}", post.area.to_lowercase());
    let area = match lang.t(&area_key) {
        label if label == area_key.as_str() => post.area.clone(),
        label => label.into_owned(),
    };
    let apartment = if post.requires_apartment {
        lang.t("platform-apartment-required")
    } else {
        lang.t("platform-apartment-not-required")
    };
    PostCard {
        id: post.id,
        title: post.title.clone(),
        company: post.company.clone(),
        area,
        description: post.description.clone(),
        experience: post.experience.to_string(),
        apartment: apartment.to_string(),
        posted: lang.locale().format_date(&post.posted_at),
        href: format!("{}?{}", PLATFORM_PATH, filters.to_query(Some(post.id))),
        active: selected == Some(post.id),
    }
}
