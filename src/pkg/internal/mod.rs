pub mod adaptors;
pub mod auth;
pub mod backend;
pub mod bootstrap;
pub mod filters;
pub mod i18n;
pub mod language;
