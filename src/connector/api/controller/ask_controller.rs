use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::{DocumentUpload, Notice};

use super::super::Container;

/// One-shot question from the command line: upload, ask, delete.
pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn ask(&self, path: String, prompt: String) -> Result<String> {
        let upload_use_case = self.container.upload_use_case()?;
        let ask_use_case = self.container.ask_use_case()?;
        let delete_use_case = self.container.delete_use_case()?;

        let file_name = Path::new(&path)
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid document path: {}", path))?
            .to_string();
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path))?;
        let document = DocumentUpload::new(file_name, bytes)?;

        let remote = upload_use_case.execute(&document).await?;

        let answer = ask_use_case.execute(&remote, &prompt).await;
        let cleanup = delete_use_case.execute(&remote).await;

        let mut notices: Vec<Notice> = answer.error().cloned().into_iter().collect();
        notices.push(cleanup);

        Ok(self.format_answer(answer.text(), &notices))
    }

    fn format_answer(&self, text: &str, notices: &[Notice]) -> String {
        let mut output = text.to_string();

        for notice in notices {
            output.push_str(&format!(
                "\n[{}] {}",
                format!("{:?}", notice.level()).to_lowercase(),
                notice.message()
            ));
        }

        output
    }
}
