//! Doctor context: the signed-in doctor's profile, appointments and
//! dashboard.

use std::sync::Arc;

use clinic_admin_core::{
    Appointment, AppointmentId, CacheOrdering, Doctor, DoctorDashboard, DoctorId, EditBuffer,
    ProfilePatch, ProfileUpdate, Role,
};
use secrecy::SecretString;
use tracing::{debug, instrument};

use super::{Outcome, mutate, refresh};
use crate::api::BackendClient;
use crate::notify::Notifier;
use crate::session::{SessionStore, TokenTrigger};
use crate::store::ResourceStore;

/// Doctor stores plus the actions that read and write them.
///
/// Cheap to clone; clones share the same stores.
#[derive(Debug, Clone)]
pub struct DoctorSync {
    inner: Arc<DoctorSyncInner>,
}

#[derive(Debug)]
struct DoctorSyncInner {
    client: BackendClient,
    session: SessionStore,
    notifier: Notifier,
    profile: ResourceStore<Option<Doctor>>,
    appointments: ResourceStore<Vec<Appointment>>,
    dashboard: ResourceStore<Option<DoctorDashboard>>,
}

impl DoctorSync {
    #[must_use]
    pub fn new(client: BackendClient, session: SessionStore, notifier: Notifier) -> Self {
        Self {
            inner: Arc::new(DoctorSyncInner {
                client,
                session,
                notifier,
                profile: ResourceStore::default(),
                appointments: ResourceStore::default(),
                dashboard: ResourceStore::default(),
            }),
        }
    }

    /// The doctor's own profile; `None` until the first successful fetch.
    #[must_use]
    pub fn profile(&self) -> &ResourceStore<Option<Doctor>> {
        &self.inner.profile
    }

    /// The doctor's appointments, newest first.
    #[must_use]
    pub fn appointments(&self) -> &ResourceStore<Vec<Appointment>> {
        &self.inner.appointments
    }

    #[must_use]
    pub fn dashboard(&self) -> &ResourceStore<Option<DoctorDashboard>> {
        &self.inner.dashboard
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    fn token(&self) -> SecretString {
        self.inner.session.token(Role::Doctor)
    }

    #[instrument(skip(self))]
    pub async fn fetch_profile(&self) -> Outcome {
        let token = self.token();
        let fetch = async { self.inner.client.doctor_profile(&token).await.map(Some) };
        refresh(&self.inner.profile, &self.inner.notifier, "profile", fetch).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_appointments(&self) -> Outcome {
        let token = self.token();
        let fetch = async {
            self.inner
                .client
                .doctor_appointments(&token)
                .await
                .map(|list| CacheOrdering::NewestFirst.materialize(list))
        };
        refresh(
            &self.inner.appointments,
            &self.inner.notifier,
            "doctor-appointments",
            fetch,
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn fetch_dashboard(&self) -> Outcome {
        let token = self.token();
        let fetch = async { self.inner.client.doctor_dashboard(&token).await.map(Some) };
        refresh(
            &self.inner.dashboard,
            &self.inner.notifier,
            "doctor-dashboard",
            fetch,
        )
        .await
    }

    /// Fetch every doctor resource once, concurrently.
    pub async fn fetch_all(&self) -> [Outcome; 3] {
        let (profile, appointments, dashboard) = tokio::join!(
            self.fetch_profile(),
            self.fetch_appointments(),
            self.fetch_dashboard(),
        );
        [profile, appointments, dashboard]
    }

    /// Re-fetch every doctor resource each time the doctor token appears or
    /// changes, starting with the token present now.
    ///
    /// Runs until the task is aborted.
    pub async fn run_token_effect(self) {
        let mut session = self.inner.session.subscribe();
        let mut trigger = TokenTrigger::new(Role::Doctor);
        loop {
            let fire = trigger.observe(&session.borrow_and_update());
            if fire {
                debug!("Doctor token changed; refreshing");
                self.fetch_all().await;
            }
            if session.changed().await.is_err() {
                return;
            }
        }
    }

    /// Write the editable profile fields, then re-fetch the profile.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Outcome {
        let token = self.token();
        let outcome = mutate(
            &self.inner.notifier,
            "update-profile",
            self.inner.client.update_doctor_profile(&token, update),
        )
        .await;
        if outcome.is_applied() {
            self.fetch_profile().await;
        }
        outcome
    }

    /// Save staged profile edits as a single `update-profile` call carrying
    /// the effective values of every editable field.
    ///
    /// Returns `None` without a call when the profile has not been fetched
    /// or nothing is staged.
    #[instrument(skip(self, buffer))]
    pub async fn save_profile_edits(
        &self,
        buffer: &mut EditBuffer<DoctorId, ProfilePatch>,
    ) -> Option<Outcome> {
        let canonical = self.inner.profile.snapshot();
        let profile = (*canonical).as_ref()?;

        let effective = buffer.overlay(&profile.id, profile);
        buffer.take_for_save(&profile.id)?;

        Some(self.update_profile(&ProfileUpdate::from_profile(&effective)).await)
    }

    /// Mark an appointment completed, then re-fetch appointments and the
    /// dashboard.
    #[instrument(skip(self), fields(appointment = %appointment))]
    pub async fn complete_appointment(&self, appointment: &AppointmentId) -> Outcome {
        let token = self.token();
        let outcome = mutate(
            &self.inner.notifier,
            "complete-appointment",
            self.inner.client.complete_appointment(&token, appointment),
        )
        .await;
        if outcome.is_applied() {
            tokio::join!(self.fetch_appointments(), self.fetch_dashboard());
        }
        outcome
    }

    /// Cancel an appointment, then re-fetch appointments and the dashboard.
    #[instrument(skip(self), fields(appointment = %appointment))]
    pub async fn cancel_appointment(&self, appointment: &AppointmentId) -> Outcome {
        let token = self.token();
        let outcome = mutate(
            &self.inner.notifier,
            "cancel-appointment",
            self.inner.client.doctor_cancel_appointment(&token, appointment),
        )
        .await;
        if outcome.is_applied() {
            tokio::join!(self.fetch_appointments(), self.fetch_dashboard());
        }
        outcome
    }
}
