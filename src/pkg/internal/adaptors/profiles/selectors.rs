use crate::{
    pkg::internal::{
        adaptors::profiles::spec::{Profile, ProfileEntry, ProfileNameEntry},
        auth::Session,
        backend::Backend,
    },
    prelude::Result,
};

pub struct ProfileSelector<'a> {
    backend: &'a Backend,
    table: &'a str,
}

impl<'a> ProfileSelector<'a> {
    pub fn new(backend: &'a Backend, table: &'a str) -> Self {
        ProfileSelector { backend, table }
    }

    pub async fn for_session(&self, session: &Session) -> Result<Profile> {
        let row = self
            .backend
            .from(self.table)
            .select("*")
            .eq("id", &session.user.id)
            .auth(Some(&session.access_token))
            .single::<ProfileEntry>()
            .await?;
        Ok(row.into())
    }

    pub async fn full_name(&self, session: &Session) -> Result<String> {
        let row = self
            .backend
            .from(self.table)
            .select("full_name")
            .eq("id", &session.user.id)
            .auth(Some(&session.access_token))
            .single::<ProfileNameEntry>()
            .await?;
        Ok(row.full_name)
    }
}
