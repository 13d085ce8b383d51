use tracing::info;

use crate::domain::{DocumentUpload, DomainError, Session};

use super::super::{ActionResponse, Container, SessionView};

pub struct DocumentController<'a> {
    container: &'a Container,
}

impl<'a> DocumentController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// "Process Document": validate the picked file and make it the session's
    /// document.
    pub async fn process(
        &self,
        session: &mut Session,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ActionResponse, DomainError> {
        let use_case = self.container.chat_session_use_case()?;
        let document = DocumentUpload::new(file_name, bytes)?;

        info!(
            "Processing {} ({} bytes)",
            document.file_name(),
            document.bytes().len()
        );
        let notices = use_case.process_document(session, document).await;

        Ok(ActionResponse {
            session: SessionView::new(session, None),
            notices,
        })
    }

    /// Manual "Delete File".
    pub async fn delete(&self, session: &mut Session) -> Result<ActionResponse, DomainError> {
        let use_case = self.container.chat_session_use_case()?;
        let notices = use_case.delete_document(session).await;

        Ok(ActionResponse {
            session: SessionView::new(session, None),
            notices,
        })
    }
}
