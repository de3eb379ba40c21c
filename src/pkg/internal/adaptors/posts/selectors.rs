use crate::{
    pkg::internal::{
        adaptors::posts::spec::{Post, PostEntry},
        backend::Backend,
    },
    prelude::Result,
};

pub struct PostSelector<'a> {
    backend: &'a Backend,
    table: &'a str,
}

impl<'a> PostSelector<'a> {
    pub fn new(backend: &'a Backend, table: &'a str) -> Self {
        PostSelector { backend, table }
    }

    /// Every post, in backend order. Filtering happens on the snapshot.
    pub async fn get_all(&self, token: Option<&str>) -> Result<Vec<Post>> {
        let rows = self
            .backend
            .from(self.table)
            .select("*")
            .auth(token)
            .execute::<PostEntry>()
            .await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }
}
