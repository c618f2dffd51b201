// ABOUTME: Pod specification builder for the Redis workload.
// ABOUTME: Pure, deterministic rendering of deployment and resource descriptors.

mod builder;
mod types;

pub use builder::{
    ENV_APPLICATION, ENV_EXPECTED_UNITS, PodSpecBuilder, READINESS_INITIAL_DELAY_SECS,
    READINESS_PERIOD_SECS, SPEC_VERSION,
};
pub use types::{
    ContainerPort, ContainerSpec, DeploymentSpec, EnvConfigValue, FieldRef, ImageDetails,
    KubernetesContainerSpec, KubernetesResources, Protocol, PullPolicy, ReadinessProbeSpec,
    ResourceSpec, ServiceBody, ServicePort, ServiceSpec, ServiceType, TcpSocket,
};
