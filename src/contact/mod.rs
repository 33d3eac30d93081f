//! Contact form: validation, submission through a configured back end, and the page glue.

pub mod form;
pub mod submit;
pub mod validate;

use serde::{Deserialize, Serialize};

use crate::log;

pub use form::ContactForm;
pub use submit::{
    DataStoreSubmitter, LocalSubmitter, RelaySubmitter, Submitter, select_submitter,
};
pub use validate::{Field, FieldError, FieldErrors, ValidContact, validate};

/// Shown for every network or storage failure; details go to the console.
pub const GENERIC_FAILURE: &str = "Unable to send your message right now. Please try again later.";

/// Raw form input, as read from the page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Invalid(FieldErrors),
    Sent,
    Failed(String),
}

pub struct ContactFlow {
    submitter: Box<dyn Submitter>,
}

impl ContactFlow {
    pub fn new(submitter: Box<dyn Submitter>) -> Self {
        Self { submitter }
    }

    /// Validates `fields` and, only if they pass, hands the payload to the back end.
    pub async fn submit(&self, fields: &ContactFields, created_at: &str) -> SubmitOutcome {
        let valid = match validate(fields) {
            Ok(valid) => valid,
            Err(errors) => return SubmitOutcome::Invalid(errors),
        };

        let payload = valid.into_payload(created_at);
        match self.submitter.submit(&payload).await {
            Ok(()) => {
                log::info("contact_sent", self.submitter.name());
                SubmitOutcome::Sent
            }
            Err(err) => {
                log::error(
                    "contact_submit_failed",
                    &format!("{}: {}", self.submitter.name(), err),
                );
                SubmitOutcome::Failed(GENERIC_FAILURE.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use async_trait::async_trait;
    use futures::executor::block_on;

    use super::*;
    use crate::error::SubmitError;
    use crate::storage::{KeyValueStore, MemoryStore};

    const KEY: &str = "portfolio-messages";
    const NOW: &str = "2026-10-19T09:00:00.000Z";

    struct RejectingRemote {
        calls: Rc<Cell<u32>>,
    }

    #[async_trait(?Send)]
    impl Submitter for RejectingRemote {
        fn name(&self) -> &'static str {
            "relay"
        }

        async fn submit(&self, _payload: &ContactPayload) -> Result<(), SubmitError> {
            self.calls.set(self.calls.get() + 1);
            Err(SubmitError::Status(503))
        }
    }

    fn valid_fields() -> ContactFields {
        ContactFields {
            name: "Ada".to_string(),
            email: "a@b.co".to_string(),
            message: "Hello there".to_string(),
        }
    }

    #[test]
    fn no_remote_appends_locally_and_succeeds() {
        let store = Rc::new(MemoryStore::default());
        let flow = ContactFlow::new(Box::new(LocalSubmitter::new(store.clone(), KEY)));

        let outcome = block_on(flow.submit(&valid_fields(), NOW));

        assert_eq!(outcome, SubmitOutcome::Sent);
        let stored: Vec<ContactPayload> =
            serde_json::from_str(&store.get(KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].email, "a@b.co");
        assert_eq!(stored[0].created_at, NOW);
    }

    #[test]
    fn remote_rejection_fails_without_touching_local_list() {
        let store = Rc::new(MemoryStore::default());
        store.set(KEY, "[]").unwrap();
        let calls = Rc::new(Cell::new(0));
        let flow = ContactFlow::new(Box::new(RejectingRemote {
            calls: calls.clone(),
        }));

        let outcome = block_on(flow.submit(&valid_fields(), NOW));

        assert_eq!(outcome, SubmitOutcome::Failed(GENERIC_FAILURE.to_string()));
        assert_eq!(calls.get(), 1);
        assert_eq!(store.get(KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn invalid_input_never_reaches_back_end() {
        let calls = Rc::new(Cell::new(0));
        let flow = ContactFlow::new(Box::new(RejectingRemote {
            calls: calls.clone(),
        }));
        let fields = ContactFields {
            email: "not-an-email".to_string(),
            ..valid_fields()
        };

        let outcome = block_on(flow.submit(&fields, NOW));

        let SubmitOutcome::Invalid(errors) = outcome else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.get(Field::Email), Some(FieldError::InvalidEmail));
        assert_eq!(calls.get(), 0);
    }
}
