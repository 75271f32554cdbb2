use portico_domain::{Section, visible_sections};

use super::*;

impl AuthorizationService {
    /// Returns the navigation sections a user may see, in display order.
    pub async fn resolve_visible_sections(&self, user_id: UserId) -> AppResult<Vec<Section>> {
        let permissions = self.resolve_effective_permissions(user_id).await?;
        Ok(visible_sections(&permissions))
    }
}
