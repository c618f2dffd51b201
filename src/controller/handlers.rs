// ABOUTME: Event handlers of the reconciliation controller.
// ABOUTME: Each handler observes state in a fixed order and returns a Reconciliation.

use snafu::ResultExt;

use crate::config::Config;
use crate::diagnostics::Warning;
use crate::platform::{ConfigImageResolver, ImageResolver, Platform};
use crate::podspec::PodSpecBuilder;
use crate::probe::ReadinessProbe;
use crate::status::{
    CONFIG_INVALID, CONFIGURING_POD, IMAGE_FETCH_FAILED, NOT_INITIALIZED, PEERS_FETCH_FAILED,
    POD_READY, POD_TERMINATING, SERVICE_READY, SPEC_SUBMISSION_PENDING, STATE_UNAVAILABLE,
    Status, WAITING_FOR_SERVICE,
};
use crate::store::{AppliedSpec, StateStore};
use crate::types::WorkloadIdentity;

use super::error::{ControllerError, StatusSnafu};
use super::event::{Event, EventKind, HandlerPath};
use super::reconciliation::{Draft, Reconciliation, Submission};

/// The reconciliation controller.
///
/// Sole writer of unit status, application status, and the deployment
/// spec. Leadership, readiness, and the initialization flag are observed
/// fresh on every invocation; nothing is cached between events except the
/// current configuration.
pub struct Controller<P, S, R> {
    identity: WorkloadIdentity,
    config: Config,
    platform: P,
    store: S,
    probe: R,
    resolver: Box<dyn ImageResolver>,
}

impl<P, S, R> std::fmt::Debug for Controller<P, S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("identity", &self.identity)
            .field("config", &self.config)
            .finish()
    }
}

impl<P, S, R> Controller<P, S, R>
where
    P: Platform,
    S: StateStore,
    R: ReadinessProbe,
{
    pub fn new(identity: WorkloadIdentity, config: Config, platform: P, store: S, probe: R) -> Self {
        Self {
            identity,
            config,
            platform,
            store,
            probe,
            resolver: Box::new(ConfigImageResolver),
        }
    }

    /// Replace the image resolver.
    pub fn with_resolver(mut self, resolver: impl ImageResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn identity(&self) -> &WorkloadIdentity {
        &self.identity
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle one event to completion or deferral and report its status.
    ///
    /// Collaborator failures become statuses. An error is returned only
    /// when the status itself cannot be written.
    pub async fn handle(&mut self, event: Event) -> Result<Reconciliation, ControllerError> {
        let kind = event.kind();
        tracing::debug!("Handling {} event", kind);

        if let Event::ConfigChanged { config } = event {
            self.config = config;
        }

        let reconciliation = match kind.path() {
            HandlerPath::Configure => self.configure_pod(kind).await?,
            HandlerPath::UpdateStatus => self.update_status(kind).await,
            HandlerPath::Stop => self.stop(kind),
        };

        self.report(&reconciliation).await?;
        tracing::debug!(
            "Finished {} event: unit {}, outcome {:?}",
            kind,
            reconciliation.unit,
            reconciliation.outcome
        );
        Ok(reconciliation)
    }

    /// Start, config-changed, and upgrade-charm.
    ///
    /// Validity is checked before leadership, and leadership before any
    /// network or orchestration call, so non-leaders never resolve images
    /// or submit specs.
    async fn configure_pod(&mut self, kind: EventKind) -> Result<Reconciliation, ControllerError> {
        let mut draft = Draft::new(kind);

        let validated = match self.config.validate() {
            Ok(validated) => validated,
            Err(e) => {
                tracing::warn!("Configuration is not valid: {}", e);
                return Ok(draft.done(Status::blocked(CONFIG_INVALID)));
            }
        };

        if !self.is_leader(&mut draft).await {
            tracing::debug!("Spec changes ignored by non-leader");
            return Ok(draft.done(Status::active(POD_READY)));
        }

        tracing::debug!("Configuring pod");
        self.platform
            .set_unit_status(&Status::waiting(CONFIGURING_POD))
            .await
            .context(StatusSnafu)?;

        let image = match self.resolver.resolve(validated.image()).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("Failed to resolve image: {}", e);
                return Ok(draft.done(Status::blocked(IMAGE_FETCH_FAILED)));
            }
        };

        let peers = match self.platform.expected_peers().await {
            Ok(peers) => peers,
            Err(e) => {
                tracing::warn!("Failed to list expected peers: {}", e);
                return Ok(draft.done(Status::blocked(PEERS_FETCH_FAILED)));
            }
        };

        let (spec, resources) = PodSpecBuilder::new(&self.identity, &image, &peers).build();
        log_descriptor("Pod spec", &spec);
        log_descriptor("Pod resources", &resources);

        match self.apply_spec(AppliedSpec { spec, resources }, &mut draft).await {
            Ok(submission) => draft.submission = submission,
            Err(e) => {
                tracing::warn!("Failed to submit pod spec: {}", e);
                return Ok(draft.defer(Status::waiting(SPEC_SUBMISSION_PENDING)));
            }
        }

        if !self.probe.is_ready(&self.identity.address()).await {
            tracing::debug!("Backing service not ready, deferring {}", kind);
            return Ok(draft.defer(Status::waiting(WAITING_FOR_SERVICE)));
        }

        match self.store.mark_initialized().await {
            Ok(true) => {
                tracing::info!("Backing service reachable, controller initialized");
                draft.initialized_now = true;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Failed to persist initialization flag: {}", e);
                return Ok(draft.done(Status::blocked(STATE_UNAVAILABLE)));
            }
        }

        draft.app = Some(Status::active(SERVICE_READY));
        Ok(draft.done(Status::active(POD_READY)))
    }

    /// Submit the pod spec unless it equals the last applied one.
    ///
    /// An unreadable last-applied value counts as unknown, so the pod spec is
    /// submitted. Failing to record a successful submission only costs a
    /// redundant submission later.
    async fn apply_spec(
        &self,
        applied: AppliedSpec,
        draft: &mut Draft,
    ) -> Result<Submission, crate::platform::PlatformError> {
        let last = match self.store.last_applied().await {
            Ok(last) => last,
            Err(e) => {
                draft.diagnostics.warn(Warning::last_applied_unreadable(format!(
                    "cannot read last applied pod spec, resubmitting: {e}"
                )));
                None
            }
        };

        if last.as_ref() == Some(&applied) {
            tracing::debug!("Pod spec unchanged, skipping submission");
            return Ok(Submission::Unchanged);
        }

        self.platform
            .submit_spec(&applied.spec, &applied.resources)
            .await?;
        tracing::info!("Submitted pod spec for {}", self.identity.name);

        if let Err(e) = self.store.set_last_applied(applied).await {
            draft.diagnostics.warn(Warning::last_applied_not_saved(format!(
                "cannot record submitted pod spec: {e}"
            )));
        }

        Ok(Submission::Submitted)
    }

    /// Periodic health refresh. Never defers: the event recurs on its own.
    async fn update_status(&mut self, kind: EventKind) -> Reconciliation {
        let mut draft = Draft::new(kind);

        if !self.is_leader(&mut draft).await {
            return draft.done(Status::active(""));
        }

        if !self.probe.is_ready(&self.identity.address()).await {
            return draft.done(Status::waiting(WAITING_FOR_SERVICE));
        }

        match self.store.initialized().await {
            Ok(true) => {}
            Ok(false) => return draft.done(Status::waiting(NOT_INITIALIZED)),
            Err(e) => {
                tracing::error!("Failed to read initialization flag: {}", e);
                return draft.done(Status::blocked(STATE_UNAVAILABLE));
            }
        }

        draft.app = Some(Status::active(""));
        draft.done(Status::active(POD_READY))
    }

    /// Mark the terminating unit. No leadership check, no other effects.
    fn stop(&self, kind: EventKind) -> Reconciliation {
        Draft::new(kind).done(Status::maintenance(POD_TERMINATING))
    }

    /// Leadership as reported right now. An unanswerable query counts as
    /// not leader, so no shared resource is written.
    async fn is_leader(&self, draft: &mut Draft) -> bool {
        match self.platform.is_leader().await {
            Ok(leader) => leader,
            Err(e) => {
                draft.diagnostics.warn(Warning::leadership_unknown(format!(
                    "cannot determine leadership, acting as non-leader: {e}"
                )));
                false
            }
        }
    }

    /// Write the final statuses of a reconciliation.
    async fn report(&self, reconciliation: &Reconciliation) -> Result<(), ControllerError> {
        self.platform
            .set_unit_status(&reconciliation.unit)
            .await
            .context(StatusSnafu)?;

        if let Some(app) = &reconciliation.app {
            self.platform
                .set_application_status(app)
                .await
                .context(StatusSnafu)?;
        }

        Ok(())
    }
}

fn log_descriptor(label: &str, value: &impl serde::Serialize) {
    match serde_yaml::to_string(value) {
        Ok(yaml) => tracing::debug!("{}:\n{}", label, yaml),
        Err(e) => tracing::debug!("{} could not be rendered: {}", label, e),
    }
}
