//! Session field store — last-known identification fields, shared across screens.
//!
//! One store lives for the app's lifetime, wrapped in `Arc` and handed to the
//! capture workflow (writer) and the confirmation screen (reader). There is
//! no versioning or rollback: readers observe the latest merged snapshot, and
//! a hypothetical concurrent second writer is last-write-wins.

use std::sync::RwLock;

use serde::Serialize;

use crate::extraction::ExtractionFields;

/// Read-only view of the session for the confirmation screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub fields: ExtractionFields,
    /// True only when the last accepted extraction was partial — the
    /// confirmation screen shows the missing-field warning banner.
    pub warning: bool,
}

#[derive(Default)]
struct SessionState {
    fields: ExtractionFields,
    warning: bool,
}

/// Process-wide store of the five identification fields plus a warning flag.
///
/// Mutation happens only through [`merge`](Self::merge) and
/// [`set_warning`](Self::set_warning); both are called by the workflow
/// controller after a successful interpretation.
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge incoming fields: a present value overwrites, an absent value
    /// leaves the stored one untouched. Idempotent; an all-absent field set
    /// is a no-op.
    pub fn merge(&self, incoming: &ExtractionFields) {
        if let Ok(mut state) = self.inner.write() {
            merge_field(&mut state.fields.manufacturer, &incoming.manufacturer);
            merge_field(&mut state.fields.model, &incoming.model);
            merge_field(&mut state.fields.serial_number, &incoming.serial_number);
            merge_field(
                &mut state.fields.installation_date,
                &incoming.installation_date,
            );
            merge_field(&mut state.fields.equipment_name, &incoming.equipment_name);
        }
    }

    /// Unconditional overwrite of the warning flag.
    pub fn set_warning(&self, warning: bool) {
        if let Ok(mut state) = self.inner.write() {
            state.warning = warning;
        }
    }

    /// Latest merged snapshot for readers.
    pub fn snapshot(&self) -> SessionSnapshot {
        match self.inner.read() {
            Ok(state) => SessionSnapshot {
                fields: state.fields.clone(),
                warning: state.warning,
            },
            // Poisoned only if a writer panicked; readers see an empty session.
            Err(_) => SessionSnapshot {
                fields: ExtractionFields::default(),
                warning: false,
            },
        }
    }
}

fn merge_field(stored: &mut Option<String>, incoming: &Option<String>) {
    if let Some(value) = incoming {
        if !value.is_empty() {
            *stored = Some(value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(
        manufacturer: Option<&str>,
        model: Option<&str>,
        serial: Option<&str>,
    ) -> ExtractionFields {
        ExtractionFields {
            manufacturer: manufacturer.map(String::from),
            model: model.map(String::from),
            serial_number: serial.map(String::from),
            ..ExtractionFields::default()
        }
    }

    #[test]
    fn new_store_is_empty_without_warning() {
        let store = SessionStore::new();
        let snap = store.snapshot();
        assert!(snap.fields.is_empty());
        assert!(!snap.warning);
    }

    #[test]
    fn merge_overwrites_present_fields_only() {
        let store = SessionStore::new();
        store.merge(&fields(Some("ACME"), Some("X1"), Some("123")));

        // Second result carries a new model but nothing else
        store.merge(&fields(None, Some("X2"), None));

        let snap = store.snapshot();
        assert_eq!(snap.fields.manufacturer.as_deref(), Some("ACME"));
        assert_eq!(snap.fields.model.as_deref(), Some("X2"));
        assert_eq!(snap.fields.serial_number.as_deref(), Some("123"));
    }

    #[test]
    fn merge_is_idempotent() {
        let store = SessionStore::new();
        let incoming = fields(Some("ACME"), Some("X1"), None);
        store.merge(&incoming);
        let once = store.snapshot();
        store.merge(&incoming);
        assert_eq!(store.snapshot(), once);
    }

    #[test]
    fn merge_all_absent_is_noop() {
        let store = SessionStore::new();
        store.merge(&fields(Some("ACME"), None, Some("123")));
        let before = store.snapshot();
        store.merge(&ExtractionFields::default());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn set_warning_overwrites_unconditionally() {
        let store = SessionStore::new();
        store.set_warning(true);
        assert!(store.snapshot().warning);
        store.set_warning(false);
        assert!(!store.snapshot().warning);
    }

    #[test]
    fn snapshot_serializes_for_confirmation_screen() {
        let store = SessionStore::new();
        store.merge(&fields(Some("ACME"), Some("X1"), Some("123")));
        store.set_warning(true);

        let json = serde_json::to_string(&store.snapshot()).unwrap();
        assert!(json.contains("\"manufacturer\":\"ACME\""));
        assert!(json.contains("\"warning\":true"));
    }

    #[test]
    fn concurrent_merges_are_last_write_wins() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(SessionStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store.merge(&fields(Some(&format!("vendor-{i}")), None, None));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let snap = store.snapshot();
        let value = snap.fields.manufacturer.unwrap();
        assert!(value.starts_with("vendor-"), "one writer wins: {value}");
    }
}
