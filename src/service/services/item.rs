use itemgate_core::{dispatch, normalize, App, DocumentStore, RawBody};
use std::sync::Arc;

use crate::{
    formatter::Envelope,
    gateway::{self, Outcome},
};

pub struct ItemService {
    pub store: Arc<dyn DocumentStore>,
}

impl ItemService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        ItemService { store }
    }

    /// Every failure ends here and is answered as an `Error` envelope.
    #[tracing::instrument(name = "service::item::handle", skip(self, body))]
    pub async fn handle(&self, app: &str, action: &str, body: RawBody) -> Envelope {
        match self.process(app, action, body).await {
            Ok(outcome) => {
                let envelope = Envelope::from(outcome);
                tracing::info!("{} {} answered {:?}", app, action, envelope.status);
                envelope
            }
            Err(err) => {
                tracing::error!("{} {} failed: {:#}", app, action, err);
                Envelope::error(&err)
            }
        }
    }

    async fn process(&self, app: &str, action: &str, body: RawBody) -> anyhow::Result<Outcome> {
        let app: App = app.parse()?;
        let payload = normalize(body)?;
        let plan = dispatch(action, payload)?;

        gateway::execute(self.store.as_ref(), app, plan).await
    }
}
