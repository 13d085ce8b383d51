use crate::domain::{DomainError, Session};

use super::super::{ActionResponse, Container, SessionView};

pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn chat(
        &self,
        session: &mut Session,
        prompt: &str,
    ) -> Result<ActionResponse, DomainError> {
        let use_case = self.container.chat_session_use_case()?;
        let notices = use_case.chat(session, prompt).await;

        Ok(ActionResponse {
            session: SessionView::new(session, None),
            notices,
        })
    }
}
