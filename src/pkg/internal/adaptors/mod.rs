pub mod posts;
pub mod profiles;
