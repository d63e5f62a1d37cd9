use crate::backend::Backend;
use crate::content::{ParsedDocument, SaveId};
use crate::error::{Error, Result};
use crate::render::{DocumentView, escape_html};

/// What the user is looking at: at most one document and the last notice.
///
/// Actions take `&mut self`, so a view never runs two at once. A failed
/// action leaves the current document in place and records the error as
/// the notice.
pub struct ViewState<B> {
    backend: B,
    view: DocumentView,
    current: Option<ParsedDocument>,
    notice: Option<String>,
}

impl<B: Backend> ViewState<B> {
    pub fn new(backend: B, view: DocumentView) -> Self {
        Self {
            backend,
            view,
            current: None,
            notice: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn current(&self) -> Option<&ParsedDocument> {
        self.current.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Parse a URL and show the result
    pub async fn open_url(&mut self, url: &str, depth: usize) -> Result<()> {
        let outcome = match self.backend.parse(url, depth).await {
            Ok(response) => response
                .into_document()
                .ok_or_else(|| Error::NoContent(url.to_string())),
            Err(e) => Err(e),
        };
        let document = self.record(outcome)?;
        self.current = Some(document);
        Ok(())
    }

    /// Show a saved document
    pub async fn open_saved(&mut self, id: SaveId) -> Result<()> {
        let outcome = self.backend.get(id).await;
        let entry = self.record(outcome)?;
        self.current = Some(entry.to_document());
        Ok(())
    }

    /// Save the current document; it then carries its id and offers removal
    pub async fn save_current(&mut self) -> Result<SaveId> {
        let outcome = match &self.current {
            Some(document) => self.backend.save(document).await,
            None => Err(Error::MissingField("content")),
        };
        let receipt = self.record(outcome)?;

        if let Some(document) = self.current.as_mut() {
            document.id = Some(receipt.id);
        }
        self.notice = Some(receipt.message);
        Ok(receipt.id)
    }

    /// Remove the current document from the saves and go back
    pub async fn remove_current(&mut self) -> Result<()> {
        let outcome = match self.current.as_ref().and_then(|document| document.id) {
            Some(id) => self.backend.remove(id).await,
            None => Err(Error::MissingField("id")),
        };
        let message = self.record(outcome)?;

        self.current = None;
        self.notice = Some(message);
        Ok(())
    }

    /// Leave the current document
    pub fn back(&mut self) {
        self.current = None;
        self.notice = None;
    }

    /// The notice (if any) followed by the current document
    pub fn render(&self) -> String {
        let notice = self
            .notice
            .as_deref()
            .map(|notice| format!("<p class=\"notice\">{}</p>", escape_html(notice)));
        let body = self
            .current
            .as_ref()
            .map(|document| self.view.render_document(document));

        notice.into_iter().chain(body).collect::<Vec<_>>().join("\n")
    }

    fn record<T>(&mut self, outcome: Result<T>) -> Result<T> {
        match outcome {
            Ok(value) => {
                self.notice = None;
                Ok(value)
            }
            Err(e) => {
                ::log::warn!("Action failed: {}", e);
                self.notice = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{LocalBackend, REMOVED_MESSAGE};
    use crate::crawl::tests::{StaticSource, article, crawler};
    use crate::render::DocumentAction;
    use crate::store::{SAVED_MESSAGE, SaveStore};

    fn view_state() -> (tempfile::TempDir, ViewState<LocalBackend<StaticSource>>) {
        let source = StaticSource::default()
            .with_page("https://example.com/post", &article("Title", "Body & more", ""));
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(crawler(source), SaveStore::new(dir.path().join("saves.json")));
        (dir, ViewState::new(backend, DocumentView::default()))
    }

    #[tokio::test]
    async fn test_open_save_remove() {
        let (_dir, mut state) = view_state();
        assert_eq!(state.render(), "");

        state.open_url("https://example.com/post", 1).await.unwrap();
        let document = state.current().unwrap();
        assert_eq!(DocumentAction::for_document(document), DocumentAction::Save);
        assert!(state.render().contains("Body &amp; more"));
        assert!(state.render().contains("data-action=\"save\""));

        let id = state.save_current().await.unwrap();
        assert_eq!(state.notice(), Some(SAVED_MESSAGE));
        assert_eq!(
            DocumentAction::for_document(state.current().unwrap()),
            DocumentAction::Remove(id)
        );
        assert!(state.render().contains("data-action=\"remove\""));
        assert!(!state.render().contains("data-action=\"save\""));

        state.remove_current().await.unwrap();
        assert!(state.current().is_none());
        assert_eq!(state.notice(), Some(REMOVED_MESSAGE));
        assert!(state.backend().saves().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_document() {
        let (_dir, mut state) = view_state();
        state.open_url("https://example.com/post", 1).await.unwrap();

        let err = state.open_url("https://example.com/missing", 1).await.unwrap_err();
        assert_eq!(err.status_code(), 502);
        assert_eq!(state.current().unwrap().url, "https://example.com/post");
        assert!(state.notice().unwrap().contains("https://example.com/missing"));

        let rendered = state.render();
        assert!(rendered.starts_with("<p class=\"notice\">"));
        assert!(rendered.contains("Body &amp; more"));

        let err = state.open_saved(SaveId(42)).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(SaveId(42))));
        assert_eq!(state.current().unwrap().url, "https://example.com/post");
    }

    #[tokio::test]
    async fn test_actions_without_a_fitting_document() {
        let (_dir, mut state) = view_state();
        assert!(matches!(
            state.save_current().await,
            Err(Error::MissingField("content"))
        ));

        state.open_url("https://example.com/post", 1).await.unwrap();
        assert!(matches!(
            state.remove_current().await,
            Err(Error::MissingField("id"))
        ));
        assert!(state.current().is_some());
    }

    #[tokio::test]
    async fn test_open_saved_and_back() {
        let (_dir, mut state) = view_state();
        state.open_url("https://example.com/post", 1).await.unwrap();
        let id = state.save_current().await.unwrap();
        state.back();
        assert!(state.current().is_none());
        assert!(state.notice().is_none());

        state.open_saved(id).await.unwrap();
        let document = state.current().unwrap();
        assert_eq!(document.id, Some(id));
        assert_eq!(document.url, "https://example.com/post");
        assert!(state.notice().is_none());
    }
}
