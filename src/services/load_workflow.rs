//! Load workflow
//!
//! Drives a load through its stage sequence. "Next" validates the current
//! stage's required fields, persists the record with the following stage's
//! status and advances; "Back" is a display-only step with no network call;
//! "Save" persists without moving. Selecting a file pushes that single field
//! to the backend immediately.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::client::{ApiClient, FormPayload};
use crate::models::{Attachment, AttachmentKind, Load, LoadField, LoadStage, LoadStatus, Resource};
use crate::state::SessionHandle;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::ISO_DATE_FORMAT;

/// Fields owned by the backend, never sent back
const SERVER_MANAGED: [&str; 3] = ["id", "created_at", "delivered_at"];

/// Plain date fields, always sent as `YYYY-MM-DD` or `""`
const DATE_FIELDS: [&str; 2] = ["pickup_date", "delivery_date"];

/// Required fields that must be filled before leaving `stage`
pub fn required_fields(stage: LoadStage) -> &'static [LoadField] {
    use LoadField::*;

    match stage {
        LoadStage::Open => &[ReferenceId, CustomerBroker, LoadPay, TotalMiles],
        LoadStage::Covered => &[Driver, Dispatcher, Truck],
        LoadStage::Dispatched => &[PickupLocation, DeliveryLocation, PickupDate],
        LoadStage::Loading => &[DriverPay],
        LoadStage::OnRoute => &[Mile, EmptyMile],
        LoadStage::Unloading => &[DeliveryDate],
        LoadStage::Delivered => &[TotalPay],
        LoadStage::Completed => &[PerMile],
        LoadStage::InYard => &[LoadPay, TotalPay],
    }
}

/// First missing required field of `stage`, as a blocking error
pub fn validate_stage(load: &Load, stage: LoadStage) -> AppResult<()> {
    match required_fields(stage)
        .iter()
        .find(|field| !load.has(**field))
    {
        Some(field) => Err(AppError::MissingField {
            stage,
            field: field.as_str(),
        }),
        None => Ok(()),
    }
}

fn form_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Multipart body persisting `load` with `status` as its new `load_status`.
///
/// References collapse to their id, the two dates go out as ISO dates or
/// `""`, stored attachments are left alone and pending ones become file parts.
pub fn build_payload(load: &Load, status: LoadStatus) -> AppResult<FormPayload> {
    let mut payload = FormPayload::new();

    if let Value::Object(fields) = serde_json::to_value(load)? {
        for (name, value) in fields {
            let skip = SERVER_MANAGED.contains(&name.as_str())
                || DATE_FIELDS.contains(&name.as_str())
                || AttachmentKind::ALL.iter().any(|k| k.field_name() == name)
                || name == "load_status";
            if skip {
                continue;
            }

            match value {
                Value::Null => {}
                Value::Object(reference) => {
                    if let Some(id) = reference.get("id").filter(|id| !id.is_null()) {
                        payload.push_text(name, form_text(id));
                    }
                }
                other => payload.push_text(name, form_text(&other)),
            }
        }
    }

    let iso = |date: Option<chrono::NaiveDate>| {
        date.map(|d| d.format(ISO_DATE_FORMAT).to_string())
            .unwrap_or_default()
    };
    payload.push_text("pickup_date", iso(load.pickup_date));
    payload.push_text("delivery_date", iso(load.delivery_date));

    for (kind, path) in load.pending_attachments() {
        payload = payload.file(kind.field_name(), path);
    }

    payload.push_text("load_status", status.as_str());
    Ok(payload)
}

/// Persistence the workflow needs from the backend
#[async_trait]
pub trait LoadBackend: Send + Sync {
    async fn create_load(&self, payload: FormPayload) -> AppResult<Load>;
    /// Full update (PUT)
    async fn update_load(&self, id: i64, payload: FormPayload) -> AppResult<Load>;
    /// Partial update (PATCH)
    async fn patch_load(&self, id: i64, payload: FormPayload) -> AppResult<Load>;
}

#[async_trait]
impl LoadBackend for ApiClient {
    async fn create_load(&self, payload: FormPayload) -> AppResult<Load> {
        self.post_form(&Load::collection_path(), payload).await
    }

    async fn update_load(&self, id: i64, payload: FormPayload) -> AppResult<Load> {
        self.put_form(&Load::record_path(id), payload).await
    }

    async fn patch_load(&self, id: i64, payload: FormPayload) -> AppResult<Load> {
        self.patch_form(&Load::record_path(id), payload).await
    }
}

/// Result of a successful "Next"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advanced { from: LoadStage, to: LoadStage },
    /// "Next" taken from the final stage: the workflow is over
    Completed,
}

/// Result of selecting a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Uploaded,
    /// No id yet; the file goes out with the next persist
    Deferred,
}

/// Stepper over one in-memory load
pub struct LoadWizard {
    backend: Arc<dyn LoadBackend>,
    session: SessionHandle,
    load: Load,
    stage: LoadStage,
}

impl LoadWizard {
    /// Start at the stage matching the load's status; new and cancelled
    /// loads start at the first stage
    pub fn new(backend: Arc<dyn LoadBackend>, session: SessionHandle, load: Load) -> Self {
        let stage = load.stage().unwrap_or(LoadStage::FIRST);
        Self {
            backend,
            session,
            load,
            stage,
        }
    }

    pub fn stage(&self) -> LoadStage {
        self.stage
    }

    pub fn load(&self) -> &Load {
        &self.load
    }

    pub fn load_mut(&mut self) -> &mut Load {
        &mut self.load
    }

    /// Missing required fields of the displayed stage
    pub fn missing_fields(&self) -> Vec<LoadField> {
        required_fields(self.stage)
            .iter()
            .copied()
            .filter(|field| !self.load.has(*field))
            .collect()
    }

    /// Validate, persist with the next stage's status, then advance
    pub async fn next(&mut self) -> AppResult<Transition> {
        let from = self.stage;
        validate_stage(&self.load, from)?;

        let target = from.next().unwrap_or(from);
        let payload = build_payload(&self.load, target.status())?;

        let saved = match self.load.id {
            Some(id) => self.backend.patch_load(id, payload).await?,
            None => self.create(payload).await?,
        };
        self.absorb(saved, target.status());

        if from.is_last() {
            info!("🏁 Load {:?} completed its workflow", self.load.id);
            return Ok(Transition::Completed);
        }

        self.stage = target;
        info!("✅ Load {:?} moved {} -> {}", self.load.id, from, target);
        Ok(Transition::Advanced { from, to: target })
    }

    /// Step back one stage, no validation and no network call
    pub fn back(&mut self) -> LoadStage {
        if let Some(previous) = self.stage.previous() {
            self.stage = previous;
        }
        self.stage
    }

    /// Persist the record as-is at the displayed stage.
    ///
    /// Falls back to the session's load id when the record was never reloaded
    /// after creation, and creates it when neither id exists.
    pub async fn save(&mut self) -> AppResult<&Load> {
        let status = self.stage.status();
        let payload = build_payload(&self.load, status)?;

        let id = match self.load.id {
            Some(id) => Some(id),
            None => self.session.load_id().await,
        };

        let saved = match id {
            Some(id) => self.backend.update_load(id, payload).await?,
            None => self.create(payload).await?,
        };
        self.absorb(saved, status);
        info!("💾 Load {:?} saved at {}", self.load.id, self.stage);
        Ok(&self.load)
    }

    /// Select a local file for `kind` and push that single field right away
    pub async fn attach(&mut self, kind: AttachmentKind, path: PathBuf) -> AppResult<AttachOutcome> {
        self.load
            .set_attachment(kind, Some(Attachment::Pending(path.clone())));

        let id = match self.load.id {
            Some(id) => Some(id),
            None => self.session.load_id().await,
        };
        let Some(id) = id else {
            debug!("Deferring {} upload until the load exists", kind);
            return Ok(AttachOutcome::Deferred);
        };

        let mut payload = FormPayload::new().file(kind.field_name(), path);
        if let Some(role) = self.session.role_id().await {
            payload.push_text("role", role.to_string());
        }

        let saved = self.backend.patch_load(id, payload).await?;
        let stored = saved.attachment(kind).cloned();
        if stored.is_some() {
            self.load.set_attachment(kind, stored);
        }
        info!("📎 Uploaded {} for load {}", kind, id);
        Ok(AttachOutcome::Uploaded)
    }

    /// Apply form edits (`field -> value`) to the in-memory load
    pub fn edit(&mut self, edits: &Map<String, Value>) -> AppResult<()> {
        let pending = self.load.pending_attachments();

        let mut current = match serde_json::to_value(&self.load)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        for (name, value) in edits {
            current.insert(name.clone(), value.clone());
        }
        let mut edited: Load = serde_json::from_value(Value::Object(current))?;

        // Pending files serialize as plain paths; restore them as pending
        for (kind, path) in pending {
            if !edits.contains_key(kind.field_name()) {
                edited.set_attachment(kind, Some(Attachment::Pending(path)));
            }
        }
        edited.id = self.load.id;
        self.load = edited;
        Ok(())
    }

    async fn create(&mut self, payload: FormPayload) -> AppResult<Load> {
        let created = self.backend.create_load(payload).await?;
        if let Some(id) = created.id {
            self.session.set_load_id(Some(id)).await?;
            info!("🆕 Load created with id {}", id);
        }
        Ok(created)
    }

    /// Fold the backend's answer into local state
    fn absorb(&mut self, saved: Load, status: LoadStatus) {
        if saved.id.is_some() {
            self.load.id = saved.id;
        }
        self.load.load_status = status;
        for kind in AttachmentKind::ALL {
            if let Some(stored) = saved.attachment(kind) {
                self.load.set_attachment(kind, Some(stored.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FormValue;
    use crate::models::{Reference, CustomerBroker};
    use crate::state::Session;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create(FormPayload),
        Update(i64, FormPayload),
        Patch(i64, FormPayload),
    }

    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<Call>>,
        next_id: i64,
    }

    impl RecordingBackend {
        fn with_next_id(next_id: i64) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                next_id,
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn echo(id: i64, payload: &FormPayload) -> Load {
        let mut load = Load {
            id: Some(id),
            ..Load::default()
        };
        for kind in AttachmentKind::ALL {
            if let Some(FormValue::File(path)) = payload.get(kind.field_name()) {
                let url = format!("https://files.example.com/{}", path.display());
                load.set_attachment(kind, Some(Attachment::Stored(url)));
            }
        }
        load
    }

    #[async_trait]
    impl LoadBackend for RecordingBackend {
        async fn create_load(&self, payload: FormPayload) -> AppResult<Load> {
            self.calls.lock().unwrap().push(Call::Create(payload.clone()));
            Ok(echo(self.next_id, &payload))
        }

        async fn update_load(&self, id: i64, payload: FormPayload) -> AppResult<Load> {
            self.calls.lock().unwrap().push(Call::Update(id, payload.clone()));
            Ok(echo(id, &payload))
        }

        async fn patch_load(&self, id: i64, payload: FormPayload) -> AppResult<Load> {
            self.calls.lock().unwrap().push(Call::Patch(id, payload.clone()));
            Ok(echo(id, &payload))
        }
    }

    fn complete_load() -> Load {
        serde_json::from_value(json!({
            "id": 40,
            "reference_id": "REF-9001",
            "customer_broker": { "id": 5, "company_name": "Acme Freight" },
            "load_pay": "2500.00",
            "total_miles": "812",
            "driver": 3,
            "dispatcher": 2,
            "truck": 8,
            "pickup_location": "Dallas, TX",
            "delivery_location": "Memphis, TN",
            "pickup_date": "2024-05-02",
            "driver_pay": "900",
            "mile": "780",
            "empty_mile": "32",
            "delivery_date": "2024-05-03T18:00:00Z",
            "total_pay": "2500",
            "per_mile": "3.08"
        }))
        .unwrap()
    }

    fn wizard_at(load: Load, stage: LoadStage, backend: Arc<RecordingBackend>) -> LoadWizard {
        let mut load = load;
        load.load_status = stage.status();
        LoadWizard::new(backend, SessionHandle::in_memory(Session::default()), load)
    }

    #[tokio::test]
    async fn test_missing_field_blocks_every_stage() {
        for stage in LoadStage::ALL {
            for field in required_fields(stage) {
                let backend = Arc::new(RecordingBackend::default());
                let mut load = complete_load();
                let mut edits = Map::new();
                edits.insert(field.as_str().to_string(), Value::Null);
                let mut wizard = wizard_at(load.clone(), stage, backend.clone());
                wizard.edit(&edits).unwrap();
                load = wizard.load().clone();

                let err = wizard.next().await.unwrap_err();
                assert!(
                    matches!(err, AppError::MissingField { field: f, .. } if f == field.as_str()),
                    "stage {} field {}",
                    stage,
                    field.as_str()
                );
                assert_eq!(wizard.stage(), stage);
                assert_eq!(wizard.load().load_status, load.load_status);
                assert!(backend.calls().is_empty());
            }
        }
    }

    #[tokio::test]
    async fn test_next_advances_with_next_status() {
        for stage in LoadStage::ALL.iter().copied().filter(|s| !s.is_last()) {
            let backend = Arc::new(RecordingBackend::default());
            let mut wizard = wizard_at(complete_load(), stage, backend.clone());

            let transition = wizard.next().await.unwrap();
            let expected = LoadStage::from_index(stage.index() + 1).unwrap();

            assert_eq!(transition, Transition::Advanced { from: stage, to: expected });
            assert_eq!(wizard.stage(), expected);
            assert_eq!(wizard.load().load_status, expected.status());

            match backend.calls().as_slice() {
                [Call::Patch(40, payload)] => {
                    assert_eq!(payload.get_text("load_status"), Some(expected.status().as_str()));
                }
                other => panic!("unexpected calls: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_next_from_last_stage_completes() {
        let backend = Arc::new(RecordingBackend::default());
        let mut wizard = wizard_at(complete_load(), LoadStage::InYard, backend.clone());

        assert_eq!(wizard.next().await.unwrap(), Transition::Completed);
        assert_eq!(wizard.stage(), LoadStage::InYard);
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_back_is_local() {
        let backend = Arc::new(RecordingBackend::default());
        let mut wizard = wizard_at(complete_load(), LoadStage::Loading, backend.clone());

        assert_eq!(wizard.back(), LoadStage::Dispatched);
        assert_eq!(wizard.back(), LoadStage::Covered);
        assert_eq!(wizard.back(), LoadStage::Open);
        assert_eq!(wizard.back(), LoadStage::Open);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_total_miles_names_field() {
        let backend = Arc::new(RecordingBackend::default());
        let load: Load = serde_json::from_value(json!({
            "reference_id": "REF-1",
            "customer_broker": 5,
            "load_pay": "1200",
            "total_miles": ""
        }))
        .unwrap();
        let mut wizard = LoadWizard::new(
            backend.clone(),
            SessionHandle::in_memory(Session::default()),
            load,
        );

        let err = wizard.next().await.unwrap_err();
        assert!(err.to_string().contains("total miles"));
        assert_eq!(wizard.stage(), LoadStage::Open);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_first_next_creates_and_remembers_id() {
        let backend = Arc::new(RecordingBackend::with_next_id(101));
        let session = SessionHandle::in_memory(Session::default());
        let mut load = complete_load();
        load.id = None;
        load.load_status = LoadStatus::Open;
        let mut wizard = LoadWizard::new(backend.clone(), session.clone(), load);

        wizard.next().await.unwrap();
        assert_eq!(wizard.load().id, Some(101));
        assert_eq!(session.load_id().await, Some(101));

        wizard.next().await.unwrap();
        let calls = backend.calls();
        assert!(matches!(calls[0], Call::Create(_)));
        assert!(matches!(calls[1], Call::Patch(101, _)));
    }

    #[tokio::test]
    async fn test_save_uses_session_load_id() {
        let backend = Arc::new(RecordingBackend::default());
        let session = SessionHandle::in_memory(Session {
            load_id: Some(66),
            ..Session::default()
        });
        let mut load = complete_load();
        load.id = None;
        load.load_status = LoadStatus::Dispatched;
        let mut wizard = LoadWizard::new(backend.clone(), session, load);

        wizard.save().await.unwrap();
        assert_eq!(wizard.stage(), LoadStage::Dispatched);
        match backend.calls().as_slice() {
            [Call::Update(66, payload)] => {
                assert_eq!(payload.get_text("load_status"), Some("DISPATCHED"));
            }
            other => panic!("unexpected calls: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_attach_uploads_single_field_with_role() {
        let backend = Arc::new(RecordingBackend::default());
        let session = SessionHandle::in_memory(Session {
            role_id: Some(3),
            ..Session::default()
        });
        let mut wizard = LoadWizard::new(backend.clone(), session, complete_load());

        let outcome = wizard
            .attach(AttachmentKind::BillOfLading, PathBuf::from("bol.pdf"))
            .await
            .unwrap();

        assert_eq!(outcome, AttachOutcome::Uploaded);
        match backend.calls().as_slice() {
            [Call::Patch(40, payload)] => {
                assert_eq!(payload.len(), 2);
                assert_eq!(payload.get_text("role"), Some("3"));
                assert!(matches!(payload.get("bill_of_lading"), Some(FormValue::File(_))));
            }
            other => panic!("unexpected calls: {:?}", other),
        }
        assert!(matches!(
            wizard.load().bill_of_lading,
            Some(Attachment::Stored(_))
        ));
    }

    #[tokio::test]
    async fn test_attach_without_id_is_deferred() {
        let backend = Arc::new(RecordingBackend::default());
        let mut wizard = LoadWizard::new(
            backend.clone(),
            SessionHandle::in_memory(Session::default()),
            Load::default(),
        );

        let outcome = wizard
            .attach(AttachmentKind::RateConfirmation, PathBuf::from("rc.pdf"))
            .await
            .unwrap();
        assert_eq!(outcome, AttachOutcome::Deferred);
        assert!(backend.calls().is_empty());
        assert_eq!(wizard.load().pending_attachments().len(), 1);
    }

    #[test]
    fn test_payload_shape() {
        let mut load = complete_load();
        load.customer_broker = Some(Reference::Object(CustomerBroker {
            id: Some(5),
            ..CustomerBroker::default()
        }));
        load.pickup_date = NaiveDate::from_ymd_opt(2024, 5, 2);
        load.delivery_date = None;
        load.document = Some(Attachment::Stored("https://files/doc.pdf".into()));
        load.proof_of_delivery = Some(Attachment::Pending(PathBuf::from("/tmp/pod.jpg")));

        let payload = build_payload(&load, LoadStatus::Covered).unwrap();

        assert_eq!(payload.get_text("customer_broker"), Some("5"));
        assert_eq!(payload.get_text("driver"), Some("3"));
        assert_eq!(payload.get_text("pickup_date"), Some("2024-05-02"));
        assert_eq!(payload.get_text("delivery_date"), Some(""));
        assert_eq!(payload.get_text("load_status"), Some("COVERED"));
        assert_eq!(payload.get_text("load_pay"), Some("2500.00"));
        assert!(!payload.contains("id"));
        assert!(!payload.contains("document"));
        assert!(!payload.contains("note"));
        assert_eq!(
            payload.get("proof_of_delivery"),
            Some(&FormValue::File(PathBuf::from("/tmp/pod.jpg")))
        );
    }

    #[test]
    fn test_edit_keeps_pending_files() {
        let backend = Arc::new(RecordingBackend::default());
        let mut load = complete_load();
        load.rate_confirmation = Some(Attachment::Pending(PathBuf::from("rc.pdf")));
        let mut wizard = LoadWizard::new(
            backend,
            SessionHandle::in_memory(Session::default()),
            load,
        );

        let mut edits = Map::new();
        edits.insert("total_miles".into(), json!("950"));
        wizard.edit(&edits).unwrap();

        assert_eq!(wizard.load().total_miles, Some(Decimal::new(950, 0)));
        assert!(wizard
            .load()
            .rate_confirmation
            .as_ref()
            .map(Attachment::is_pending)
            .unwrap_or(false));
        assert_eq!(wizard.load().id, Some(40));
    }
}
