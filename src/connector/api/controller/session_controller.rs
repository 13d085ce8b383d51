use crate::domain::Session;

use super::super::{Container, SessionView};

pub struct SessionController<'a> {
    container: &'a Container,
}

impl<'a> SessionController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub fn view(&self, session: &Session) -> SessionView {
        SessionView::new(session, self.container.client_error())
    }
}
