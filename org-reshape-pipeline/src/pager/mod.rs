//! Offset/limit paging over the conversation participant relation.
use std::sync::Arc;

use org_reshape_repository::{MigrationRepository, RepositoryError};
use org_reshape_shared::types::{ConversationId, ParticipantOwner};
use tracing::debug;

/// Rows requested per page.
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Collects every conversation id linked to a member or team.
///
/// Pages are requested at offsets `0, page_size, 2 * page_size, …` until a page
/// comes back short. Ids are not deduplicated and there is no cap on the
/// number of pages. A failing page aborts the whole collection.
pub struct ConversationPager {
    repository: Arc<dyn MigrationRepository>,
    page_size: i64,
}

impl ConversationPager {
    pub fn new(repository: Arc<dyn MigrationRepository>) -> Self {
        Self::with_page_size(repository, DEFAULT_PAGE_SIZE)
    }

    /// Page sizes below 1 are raised to 1.
    pub fn with_page_size(repository: Arc<dyn MigrationRepository>, page_size: i64) -> Self {
        Self {
            repository,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub async fn conversation_ids(
        &self,
        owner: ParticipantOwner,
    ) -> Result<Vec<ConversationId>, RepositoryError> {
        let mut conversation_ids = Vec::new();
        let mut offset = 0;

        loop {
            let page = self
                .repository
                .participant_conversation_ids(owner, self.page_size, offset)
                .await?;
            let fetched = page.len() as i64;
            conversation_ids.extend(page);

            debug!(%owner, offset, fetched, "Fetched participant page");

            if fetched < self.page_size {
                break;
            }
            offset += self.page_size;
        }

        Ok(conversation_ids)
    }
}
