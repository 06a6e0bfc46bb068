//! Administrator context: doctors, appointments, drugs, orders and the
//! dashboard summary.

use std::sync::Arc;

use clinic_admin_core::{
    Appointment, AppointmentId, CacheOrdering, DashboardSummary, Doctor, DoctorId, Drug, DrugId,
    DrugUpdate, EditBuffer, NewDrug, Order, OrderId, OrderStatus, Role,
};
use secrecy::SecretString;
use tracing::{debug, instrument};

use super::{Outcome, mutate, refresh};
use crate::api::{BackendClient, ImageUpload, NewDoctor};
use crate::notify::Notifier;
use crate::session::{SessionStore, TokenTrigger};
use crate::store::ResourceStore;

const DRUG_IMAGE_MISSING: &str = "Drug image not selected";
const DOCTOR_IMAGE_MISSING: &str = "Image Not Selected";

/// Admin stores plus the actions that read and write them.
///
/// Cheap to clone; clones share the same stores.
#[derive(Debug, Clone)]
pub struct AdminSync {
    inner: Arc<AdminSyncInner>,
}

#[derive(Debug)]
struct AdminSyncInner {
    client: BackendClient,
    session: SessionStore,
    notifier: Notifier,
    doctors: ResourceStore<Vec<Doctor>>,
    appointments: ResourceStore<Vec<Appointment>>,
    drugs: ResourceStore<Vec<Drug>>,
    orders: ResourceStore<Vec<Order>>,
    dashboard: ResourceStore<Option<DashboardSummary>>,
}

impl AdminSync {
    #[must_use]
    pub fn new(client: BackendClient, session: SessionStore, notifier: Notifier) -> Self {
        Self {
            inner: Arc::new(AdminSyncInner {
                client,
                session,
                notifier,
                doctors: ResourceStore::default(),
                appointments: ResourceStore::default(),
                drugs: ResourceStore::default(),
                orders: ResourceStore::default(),
                dashboard: ResourceStore::default(),
            }),
        }
    }

    #[must_use]
    pub fn doctors(&self) -> &ResourceStore<Vec<Doctor>> {
        &self.inner.doctors
    }

    /// Appointments, newest first.
    #[must_use]
    pub fn appointments(&self) -> &ResourceStore<Vec<Appointment>> {
        &self.inner.appointments
    }

    #[must_use]
    pub fn drugs(&self) -> &ResourceStore<Vec<Drug>> {
        &self.inner.drugs
    }

    /// Orders, newest first.
    #[must_use]
    pub fn orders(&self) -> &ResourceStore<Vec<Order>> {
        &self.inner.orders
    }

    /// Dashboard summary; `None` until the first successful fetch.
    #[must_use]
    pub fn dashboard(&self) -> &ResourceStore<Option<DashboardSummary>> {
        &self.inner.dashboard
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    fn token(&self) -> SecretString {
        self.inner.session.token(Role::Admin)
    }

    // =========================================================================
    // Fetches
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn fetch_doctors(&self) -> Outcome {
        let token = self.token();
        refresh(
            &self.inner.doctors,
            &self.inner.notifier,
            "doctors",
            self.inner.client.list_doctors(&token),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn fetch_appointments(&self) -> Outcome {
        let token = self.token();
        let fetch = async {
            self.inner
                .client
                .list_appointments(&token)
                .await
                .map(|list| CacheOrdering::NewestFirst.materialize(list))
        };
        refresh(
            &self.inner.appointments,
            &self.inner.notifier,
            "appointments",
            fetch,
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn fetch_drugs(&self) -> Outcome {
        let token = self.token();
        refresh(
            &self.inner.drugs,
            &self.inner.notifier,
            "drugs",
            self.inner.client.list_drugs(&token),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn fetch_orders(&self) -> Outcome {
        let token = self.token();
        let fetch = async {
            self.inner
                .client
                .list_orders(&token)
                .await
                .map(|list| CacheOrdering::NewestFirst.materialize(list))
        };
        refresh(&self.inner.orders, &self.inner.notifier, "orders", fetch).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_dashboard(&self) -> Outcome {
        let token = self.token();
        let fetch = async { self.inner.client.dashboard(&token).await.map(Some) };
        refresh(&self.inner.dashboard, &self.inner.notifier, "dashboard", fetch).await
    }

    /// Fetch every admin resource once, concurrently.
    pub async fn fetch_all(&self) -> [Outcome; 5] {
        let (doctors, appointments, drugs, orders, dashboard) = tokio::join!(
            self.fetch_doctors(),
            self.fetch_appointments(),
            self.fetch_drugs(),
            self.fetch_orders(),
            self.fetch_dashboard(),
        );
        [doctors, appointments, drugs, orders, dashboard]
    }

    /// Re-fetch every admin resource each time the admin token appears or
    /// changes, starting with the token present now.
    ///
    /// Runs until the task is aborted.
    pub async fn run_token_effect(self) {
        let mut session = self.inner.session.subscribe();
        let mut trigger = TokenTrigger::new(Role::Admin);
        loop {
            let fire = trigger.observe(&session.borrow_and_update());
            if fire {
                debug!("Admin token changed; refreshing");
                self.fetch_all().await;
            }
            if session.changed().await.is_err() {
                return;
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Flip a doctor's availability, then re-fetch doctors.
    #[instrument(skip(self), fields(doctor = %doctor))]
    pub async fn change_availability(&self, doctor: &DoctorId) -> Outcome {
        let token = self.token();
        let outcome = mutate(
            &self.inner.notifier,
            "change-availability",
            self.inner.client.change_availability(&token, doctor),
        )
        .await;
        if outcome.is_applied() {
            self.fetch_doctors().await;
        }
        outcome
    }

    /// Register a doctor, then re-fetch doctors.
    ///
    /// Fails locally, without a request, when no image is given.
    #[instrument(skip(self, doctor, image), fields(email = %doctor.email))]
    pub async fn add_doctor(&self, doctor: &NewDoctor, image: Option<ImageUpload>) -> Outcome {
        let Some(image) = image else {
            self.inner.notifier.error(DOCTOR_IMAGE_MISSING);
            return Outcome::Failed;
        };
        let token = self.token();
        let outcome = mutate(
            &self.inner.notifier,
            "add-doctor",
            self.inner.client.add_doctor(&token, doctor, image),
        )
        .await;
        if outcome.is_applied() {
            self.fetch_doctors().await;
        }
        outcome
    }

    /// Cancel an appointment, then re-fetch the appointment list.
    ///
    /// Used from both the appointment list and the dashboard; the dashboard
    /// summary itself is not re-fetched.
    #[instrument(skip(self), fields(appointment = %appointment))]
    pub async fn cancel_appointment(&self, appointment: &AppointmentId) -> Outcome {
        let token = self.token();
        let outcome = mutate(
            &self.inner.notifier,
            "cancel-appointment",
            self.inner.client.admin_cancel_appointment(&token, appointment),
        )
        .await;
        if outcome.is_applied() {
            self.fetch_appointments().await;
        }
        outcome
    }

    /// Move an order to a new status, then re-fetch orders.
    #[instrument(skip(self), fields(order = %order, status = %status))]
    pub async fn update_order_status(&self, order: &OrderId, status: OrderStatus) -> Outcome {
        let token = self.token();
        let outcome = mutate(
            &self.inner.notifier,
            "update-order-status",
            self.inner.client.update_order_status(&token, order, status),
        )
        .await;
        if outcome.is_applied() {
            self.fetch_orders().await;
        }
        outcome
    }

    /// Write one drug field, then re-fetch drugs.
    #[instrument(skip(self), fields(drug = %drug))]
    pub async fn update_drug_field(&self, drug: &DrugId, update: &DrugUpdate) -> Outcome {
        let token = self.token();
        let outcome = mutate(
            &self.inner.notifier,
            "update-drug",
            self.inner.client.update_drug(&token, drug, update),
        )
        .await;
        if outcome.is_applied() {
            self.fetch_drugs().await;
        }
        outcome
    }

    /// Delete a drug, then re-fetch drugs.
    #[instrument(skip(self), fields(drug = %drug))]
    pub async fn delete_drug(&self, drug: &DrugId) -> Outcome {
        let token = self.token();
        let outcome = mutate(
            &self.inner.notifier,
            "delete-drug",
            self.inner.client.delete_drug(&token, drug),
        )
        .await;
        if outcome.is_applied() {
            self.fetch_drugs().await;
        }
        outcome
    }

    /// Create a drug, then re-fetch drugs.
    ///
    /// Fails locally, without a request, when no image is given.
    #[instrument(skip(self, drug, image), fields(name = %drug.name))]
    pub async fn add_drug(&self, drug: &NewDrug, image: Option<ImageUpload>) -> Outcome {
        let Some(image) = image else {
            self.inner.notifier.error(DRUG_IMAGE_MISSING);
            return Outcome::Failed;
        };
        let token = self.token();
        let outcome = mutate(
            &self.inner.notifier,
            "add-drug",
            self.inner.client.add_drug(&token, drug, image),
        )
        .await;
        if outcome.is_applied() {
            self.fetch_drugs().await;
        }
        outcome
    }

    /// Save a drug's staged edits: one `update-drug` call per field, each
    /// followed by its own re-fetch.
    ///
    /// Returns one outcome per field written. With nothing staged no call is
    /// made and the drug stays in the Editing state.
    #[instrument(skip(self, buffer), fields(drug = %drug))]
    pub async fn save_drug_edits(
        &self,
        buffer: &mut EditBuffer<DrugId, DrugUpdate>,
        drug: &DrugId,
    ) -> Vec<Outcome> {
        let Some(patches) = buffer.take_for_save(drug) else {
            return Vec::new();
        };

        let mut outcomes = Vec::with_capacity(patches.len());
        for patch in &patches {
            outcomes.push(self.update_drug_field(drug, patch).await);
        }
        outcomes
    }
}
