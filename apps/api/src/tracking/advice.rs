use crate::models::new_id;
use crate::models::tracking::SavedAdvice;
use crate::state::AppState;
use crate::store::{keys, save_json};

impl AppState {
    /// Newest first.
    pub async fn saved_advice(&self) -> Vec<SavedAdvice> {
        self.data.read().await.saved_advice.clone()
    }

    /// Bookmarks `text` unless the exact same text is already saved. Returns
    /// whether anything was added.
    pub async fn save_advice(&self, text: &str) -> bool {
        let list = {
            let mut data = self.data.write().await;
            if data.saved_advice.iter().any(|a| a.text == text) {
                return false;
            }
            data.saved_advice.insert(
                0,
                SavedAdvice {
                    id: new_id(),
                    text: text.to_string(),
                    date: self.now_utc(),
                },
            );
            data.saved_advice.clone()
        };
        save_json(self.store.as_ref(), keys::SAVED_ADVICE, &list).await;
        true
    }

    pub async fn remove_advice(&self, id: &str) -> bool {
        let list = {
            let mut data = self.data.write().await;
            let before = data.saved_advice.len();
            data.saved_advice.retain(|a| a.id != id);
            if data.saved_advice.len() == before {
                return false;
            }
            data.saved_advice.clone()
        };
        save_json(self.store.as_ref(), keys::SAVED_ADVICE, &list).await;
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::state::testing::harness;
    use crate::store::keys;

    #[tokio::test]
    async fn test_duplicate_text_not_saved_twice() {
        let h = harness();
        assert!(h.state.save_advice("Listen first.").await);
        assert!(!h.state.save_advice("Listen first.").await);
        assert_eq!(h.state.saved_advice().await.len(), 1);
    }

    #[tokio::test]
    async fn test_newest_first_and_remove() {
        let h = harness();
        h.state.save_advice("one").await;
        h.state.save_advice("two").await;

        let list = h.state.saved_advice().await;
        assert_eq!(list[0].text, "two");
        assert_eq!(list[1].text, "one");

        assert!(h.state.remove_advice(&list[0].id).await);
        assert!(!h.state.remove_advice(&list[0].id).await);
        let stored = h.stored(keys::SAVED_ADVICE).await.unwrap();
        assert!(stored.contains("one"));
        assert!(!stored.contains("two"));
    }
}
