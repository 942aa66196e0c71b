use crate::data::StudentStore;
use std::{ops::Deref, sync::Arc};

#[derive(Clone, Debug)]
pub struct RecordState {
    store: Arc<dyn StudentStore>,
}

impl RecordState {
    pub fn new(store: impl StudentStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub async fn sensible_shutdown(&self) {
        self.store.close().await;
    }
}

impl Deref for RecordState {
    type Target = dyn StudentStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}
