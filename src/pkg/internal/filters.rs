//! Filtering of the post snapshot shown on the platform page.
//!
//! The page fetches every post once and everything here is a pure function
//! of that snapshot, the three filter values and the previous selection.
//! Nothing is pushed down to the backend.
use serde::{Deserialize, Serialize};

use super::adaptors::posts::spec::Post;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    #[default]
    All,
    South,
    Center,
    North,
}

impl Location {
    pub const OPTIONS: [Location; 4] = [Location::All, Location::South, Location::Center, Location::North];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::All => "All",
            Location::South => "South",
            Location::Center => "Center",
            Location::North => "North",
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            Location::All => "filters-all",
            Location::South => "location-south",
            Location::Center => "location-center",
            Location::North => "location-north",
        }
    }

    fn admits(&self, post: &Post) -> bool {
        match self {
            Location::All => true,
            area => post.area == area.as_str(),
        }
    }
}

/// Years-of-experience brackets. Both ends are inclusive, so a post asking
/// for exactly 2 years sits in `0-2` and in `2-5`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceBracket {
    #[default]
    All,
    #[serde(rename = "0-2")]
    UpToTwo,
    #[serde(rename = "2-5")]
    TwoToFive,
    #[serde(rename = "5+")]
    FivePlus,
}

impl ExperienceBracket {
    pub const OPTIONS: [ExperienceBracket; 4] = [
        ExperienceBracket::All,
        ExperienceBracket::UpToTwo,
        ExperienceBracket::TwoToFive,
        ExperienceBracket::FivePlus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceBracket::All => "All",
            ExperienceBracket::UpToTwo => "0-2",
            ExperienceBracket::TwoToFive => "2-5",
            ExperienceBracket::FivePlus => "5+",
        }
    }

    fn admits(&self, post: &Post) -> bool {
        let years = post.experience;
        match self {
            ExperienceBracket::All => true,
            ExperienceBracket::UpToTwo => (0.0..=2.0).contains(&years),
            ExperienceBracket::TwoToFive => (2.0..=5.0).contains(&years),
            ExperienceBracket::FivePlus => years >= 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApartmentRequirement {
    #[default]
    Default,
    Yes,
    No,
}

impl ApartmentRequirement {
    pub const OPTIONS: [ApartmentRequirement; 3] = [
        ApartmentRequirement::Default,
        ApartmentRequirement::Yes,
        ApartmentRequirement::No,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApartmentRequirement::Default => "Default",
            ApartmentRequirement::Yes => "Yes",
            ApartmentRequirement::No => "No",
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            ApartmentRequirement::Default => "filters-default",
            ApartmentRequirement::Yes => "filters-yes",
            ApartmentRequirement::No => "filters-no",
        }
    }

    fn admits(&self, post: &Post) -> bool {
        match self {
            ApartmentRequirement::Default => true,
            ApartmentRequirement::Yes => post.requires_apartment,
            ApartmentRequirement::No => !post.requires_apartment,
        }
    }
}

/// The three independent predicates. Unset (default) values admit everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default, skip_serializing_if = "is_default")]
    pub location: Location,
    #[serde(default, skip_serializing_if = "is_default")]
    pub experience: ExperienceBracket,
    #[serde(default, rename = "apartment", skip_serializing_if = "is_default")]
    pub requires_apartment: ApartmentRequirement,
}

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

impl Filters {
    pub fn matches(&self, post: &Post) -> bool {
        self.location.admits(post)
            && self.experience.admits(post)
            && self.requires_apartment.admits(post)
    }

    /// All three back to their defaults in one step.
    pub fn reset(&mut self) {
        *self = Filters::default();
    }

    pub fn is_reset(&self) -> bool {
        *self == Filters::default()
    }

    /// Query string reproducing these filters, optionally pinning a selection.
    pub fn to_query(&self, selected: Option<i64>) -> String {
        #[derive(Serialize)]
        struct Params {
            #[serde(skip_serializing_if = "is_default")]
            location: Location,
            #[serde(skip_serializing_if = "is_default")]
            experience: ExperienceBracket,
            #[serde(skip_serializing_if = "is_default")]
            apartment: ApartmentRequirement,
            #[serde(skip_serializing_if = "Option::is_none")]
            selected: Option<i64>,
        }
        serde_urlencoded::to_string(Params {
            location: self.location,
            experience: self.experience,
            apartment: self.requires_apartment,
            selected,
        })
        .unwrap_or_default()
    }
}

/// What the platform page shows for one set of inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct View<'a> {
    pub filtered: Vec<&'a Post>,
    pub selected: Option<&'a Post>,
}

/// Applies `filters` to `base` and settles the selection: the previously
/// selected post if it survived, else the first survivor, else nothing.
pub fn derive_view<'a>(base: &'a [Post], filters: &Filters, previous: Option<i64>) -> View<'a> {
    let filtered: Vec<&Post> = base.iter().filter(|post| filters.matches(post)).collect();
    let selected = previous
        .and_then(|id| filtered.iter().copied().find(|post| post.id == id))
        .or_else(|| filtered.first().copied());
    View { filtered, selected }
}
