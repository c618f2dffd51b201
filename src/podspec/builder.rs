// ABOUTME: Renders the deployment and resource descriptors for the workload.
// ABOUTME: Identical inputs always produce structurally equal output.

use std::collections::BTreeMap;

use crate::types::{UnitName, WorkloadIdentity};

use super::types::{
    ContainerPort, ContainerSpec, DeploymentSpec, EnvConfigValue, ImageDetails,
    KubernetesContainerSpec, KubernetesResources, Protocol, PullPolicy, ReadinessProbeSpec,
    ResourceSpec, ServiceBody, ServicePort, ServiceSpec, ServiceType, TcpSocket,
};

/// Pod spec format version understood by the platform.
pub const SPEC_VERSION: u32 = 3;
pub const READINESS_INITIAL_DELAY_SECS: u32 = 10;
pub const READINESS_PERIOD_SECS: u32 = 5;

pub const ENV_EXPECTED_UNITS: &str = "JUJU_EXPECTED_UNITS";
pub const ENV_APPLICATION: &str = "JUJU_APPLICATION";

const PORT_NAME: &str = "redis";

/// Pod fields exposed to the container through the downward API.
const FIELD_ENV: [(&str, &str); 4] = [
    ("JUJU_NODE_NAME", "spec.nodeName"),
    ("JUJU_POD_NAME", "metadata.name"),
    ("JUJU_POD_NAMESPACE", "metadata.namespace"),
    ("JUJU_POD_IP", "status.podIP"),
];

/// Builds pod descriptors from the workload identity, image and peers.
///
/// Performs no I/O. Peers are rendered in the order given; callers pass
/// them already sorted by ordinal.
#[derive(Debug, Clone)]
pub struct PodSpecBuilder<'a> {
    identity: &'a WorkloadIdentity,
    image: &'a ImageDetails,
    expected_units: &'a [UnitName],
}

impl<'a> PodSpecBuilder<'a> {
    pub fn new(
        identity: &'a WorkloadIdentity,
        image: &'a ImageDetails,
        expected_units: &'a [UnitName],
    ) -> Self {
        Self {
            identity,
            image,
            expected_units,
        }
    }

    /// Build both descriptors.
    pub fn build(&self) -> (DeploymentSpec, ResourceSpec) {
        (self.build_pod_spec(), self.build_pod_resources())
    }

    pub fn build_pod_spec(&self) -> DeploymentSpec {
        DeploymentSpec {
            version: SPEC_VERSION,
            containers: vec![ContainerSpec {
                name: self.identity.name.to_string(),
                image_details: self.image.clone(),
                image_pull_policy: PullPolicy::Always,
                ports: vec![ContainerPort {
                    name: PORT_NAME.to_string(),
                    container_port: self.identity.port,
                    protocol: Protocol::Tcp,
                }],
                env_config: self.env_config(),
                kubernetes: KubernetesContainerSpec {
                    readiness_probe: self.readiness_probe(),
                },
            }],
        }
    }

    pub fn build_pod_resources(&self) -> ResourceSpec {
        let name = self.identity.name.to_string();

        let mut selector = BTreeMap::new();
        selector.insert("app.kubernetes.io/name".to_string(), name.clone());
        selector.insert("role".to_string(), "master".to_string());

        ResourceSpec {
            kubernetes_resources: KubernetesResources {
                services: vec![ServiceSpec {
                    name,
                    spec: ServiceBody {
                        // NodePort so clients outside the cluster can connect.
                        service_type: ServiceType::NodePort,
                        cluster_ip: String::new(),
                        ports: vec![ServicePort {
                            name: PORT_NAME.to_string(),
                            port: self.identity.port,
                            protocol: Protocol::Tcp,
                        }],
                        selector,
                    },
                }],
            },
        }
    }

    fn readiness_probe(&self) -> ReadinessProbeSpec {
        ReadinessProbeSpec {
            tcp_socket: TcpSocket {
                port: self.identity.port,
            },
            initial_delay_seconds: READINESS_INITIAL_DELAY_SECS,
            period_seconds: READINESS_PERIOD_SECS,
        }
    }

    fn env_config(&self) -> BTreeMap<String, EnvConfigValue> {
        let mut env: BTreeMap<String, EnvConfigValue> = FIELD_ENV
            .iter()
            .map(|(key, path)| (key.to_string(), EnvConfigValue::field(path)))
            .collect();

        let expected = self
            .expected_units
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        env.insert(ENV_EXPECTED_UNITS.to_string(), EnvConfigValue::Literal(expected));
        env.insert(
            ENV_APPLICATION.to_string(),
            EnvConfigValue::Literal(self.identity.name.to_string()),
        );

        env
    }
}
