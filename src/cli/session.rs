use crate::db::User;
use uuid::Uuid;

/// Who is using the shell right now.
#[derive(Debug, Default, Clone)]
pub struct Session {
    pub user: Option<User>,
}

impl Session {
    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|user| user.id)
    }
}
