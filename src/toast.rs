use maud::Markup;
use maud::html;
use serde::Deserialize;
use serde::Serialize;
use tower_sessions::Session;

const SESSION_KEY: &str = "toast";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

/// A notice shown once, on the next page the visitor renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: String,
}

impl Toast {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    pub async fn push(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(SESSION_KEY, self).await
    }

    pub async fn take(session: &Session) -> Result<Option<Self>, tower_sessions::session::Error> {
        session.remove(SESSION_KEY).await
    }

    pub fn render(&self) -> Markup {
        let (container, text) = match self.kind {
            ToastKind::Success => (
                "border-green-200 bg-green-50 dark:border-green-800 dark:bg-green-900/40",
                "text-green-800 dark:text-green-200",
            ),
            ToastKind::Error => (
                "border-red-200 bg-red-50 dark:border-red-800 dark:bg-red-900/40",
                "text-red-800 dark:text-red-200",
            ),
        };

        html! {
            div
                role="status"
                aria-live="polite"
                class={"fixed top-4 right-4 z-50 max-w-sm rounded-lg border p-4 shadow-lg " (container)} {
                p class={"text-sm font-semibold " (text)} { (self.title) }
                p class={"mt-1 text-sm " (text)} { (self.description) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    #[tokio::test]
    async fn test_toast_is_shown_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        Toast::success("Ticket Created", "Your ticket has been submitted successfully!")
            .push(&session)
            .await
            .expect("insert should succeed");

        let toast = Toast::take(&session)
            .await
            .expect("read should succeed")
            .expect("toast was pushed");
        assert_eq!(toast.title, "Ticket Created");
        assert!(toast.render().into_string().contains("submitted successfully"));

        assert_eq!(Toast::take(&session).await.expect("read should succeed"), None);
    }
}
