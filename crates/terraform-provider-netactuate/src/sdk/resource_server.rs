//! `netactuate_server` resource

use crate::provider::{ClientSlot, api_error, attribute, sensitive};
use crate::state::{
    changed, computed, flag, int, known, set, string, update_value, with_default,
};
use async_trait::async_trait;
use netactuate_cloud::{BuildServerRequest, CreateServerRequest, NetActuateApi, Server};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tf_provider::value::Value;
use tf_provider::{AttributePath, Diagnostics, Resource, map};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::ValueEmpty;
use tokio::time::{Instant, sleep};

pub const HOSTNAME_PATTERN: &str = r"^(([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9])\.)*([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9])$";

static HOSTNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(HOSTNAME_PATTERN).expect("hostname pattern is a valid regex"));

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

pub fn is_valid_hostname(hostname: &str) -> bool {
    HOSTNAME_RE.is_match(hostname)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerState {
    pub id: Value<String>,
    pub hostname: Value<String>,
    pub plan: Value<String>,
    pub location: Value<String>,
    pub location_id: Value<i64>,
    pub image: Value<String>,
    pub image_id: Value<i64>,
    pub ssh_key_id: Value<i64>,
    pub ssh_key: Value<String>,
    pub password: Value<String>,
    pub cloud_config: Value<String>,
    pub user_data: Value<String>,
    pub package_billing: Value<String>,
    pub package_billing_contract_id: Value<String>,
    pub cancel_billing: Value<bool>,
    pub primary_ipv4: Value<String>,
    pub primary_ipv6: Value<String>,
    pub status: Value<String>,
    pub ipv4_addresses: Value<Vec<String>>,
    pub ipv6_addresses: Value<Vec<String>>,
}

impl ServerState {
    /// Whether applying `self` over `prior` needs a rebuild
    fn needs_rebuild(&self, prior: &ServerState) -> bool {
        changed(&prior.hostname, &self.hostname)
            || changed(&prior.image, &self.image)
            || changed(&prior.image_id, &self.image_id)
            || changed(&prior.ssh_key, &self.ssh_key)
            || changed(&prior.ssh_key_id, &self.ssh_key_id)
            || changed(&prior.password, &self.password)
            || changed(&prior.cloud_config, &self.cloud_config)
            || changed(&prior.user_data, &self.user_data)
            || changed(&prior.package_billing, &self.package_billing)
            || changed(
                &prior.package_billing_contract_id,
                &self.package_billing_contract_id,
            )
    }

    fn server_id(&self, diags: &mut Diagnostics) -> Option<i64> {
        let id = string(&self.id);
        match id.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                diags.root_error(
                    "Invalid server id",
                    format!("{:?} is not a numeric mbpkgid", id),
                );
                None
            }
        }
    }

    fn apply(&mut self, server: &Server) {
        self.id = set(server.id.to_string());
        self.hostname = set(server.name.clone());
        self.location = set(server.location.clone());
        self.location_id = set(server.location_id);
        self.image = set(server.os.clone());
        self.image_id = set(server.os_id);
        self.status = set(server.server_status.clone());
        self.primary_ipv4 = set(server.primary_ipv4.clone());
        self.primary_ipv6 = set(server.primary_ipv6.clone());
        if !server.package.is_empty() {
            self.plan = set(server.package.clone());
        }
        // Billing settings are only tracked when configured
        update_value(&mut self.package_billing, &server.package_billing);
        update_value(
            &mut self.package_billing_contract_id,
            &server.package_billing_contract_id,
        );
        self.cancel_billing = with_default(self.cancel_billing.clone(), false);
    }
}

/// What a status wait is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wait {
    Running,
    /// Terminated, or unlinked altogether
    Gone,
}

#[derive(Debug, Clone)]
pub struct ServerResource {
    client: Arc<ClientSlot>,
    poll_interval: Duration,
    timeout: Duration,
}

impl ServerResource {
    pub fn new(client: Arc<ClientSlot>) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_polling(self, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
            ..self
        }
    }

    /// Poll the server until it reaches the wanted state.
    ///
    /// The first poll is immediate. This only waits on status; failed
    /// calls are not retried.
    async fn wait_for(
        &self,
        diags: &mut Diagnostics,
        client: &dyn NetActuateApi,
        id: i64,
        wait: Wait,
    ) -> bool {
        let started = Instant::now();
        loop {
            match client.get_server(id).await {
                Ok(server) => {
                    let done = match wait {
                        Wait::Running => server.is_running(),
                        Wait::Gone => server.is_terminated(),
                    };
                    if done {
                        return true;
                    }
                    tracing::debug!(
                        server_id = id,
                        status = %server.server_status,
                        "Waiting for server"
                    );
                }
                Err(e) if e.is_not_found() && wait == Wait::Gone => return true,
                Err(e) => {
                    api_error(diags, &e);
                    return false;
                }
            }

            if started.elapsed() >= self.timeout {
                let target = match wait {
                    Wait::Running => "RUNNING",
                    Wait::Gone => "TERMINATED",
                };
                diags.root_error(
                    "Timeout waiting for server",
                    format!(
                        "server {} did not reach {} within {:?}",
                        id, target, self.timeout
                    ),
                );
                return false;
            }
            sleep(self.poll_interval).await;
        }
    }

    /// Fold the remote server into `state`. `None` means the server is gone.
    async fn refresh(
        &self,
        diags: &mut Diagnostics,
        client: &dyn NetActuateApi,
        mut state: ServerState,
    ) -> Option<ServerState> {
        let id = state.server_id(diags)?;

        let server = match client.get_server(id).await {
            Ok(server) => server,
            Err(e) if e.is_not_found() => {
                tracing::warn!(server_id = id, "Server not found, removing from state");
                return None;
            }
            Err(e) => {
                api_error(diags, &e);
                return None;
            }
        };
        if server.is_terminated() {
            tracing::warn!(server_id = id, "Server is terminated, removing from state");
            return None;
        }
        state.apply(&server);

        match client.get_ips(id).await {
            Ok(ips) => {
                state.ipv4_addresses = set(ips.ipv4.into_iter().map(|ip| ip.address).collect());
                state.ipv6_addresses = set(ips.ipv6.into_iter().map(|ip| ip.address).collect());
                Some(state)
            }
            Err(e) => {
                api_error(diags, &e);
                None
            }
        }
    }
}

/// Location id from `location_id`, or by looking up `location` by name.
///
/// Planning leaves `location_id` unknown when only `location` changed, so the
/// name wins whenever the two disagree.
async fn resolve_location(
    diags: &mut Diagnostics,
    client: &dyn NetActuateApi,
    state: &ServerState,
) -> Option<i64> {
    if let Some(&id) = known(&state.location_id).filter(|id| **id != 0) {
        return Some(id);
    }
    let name = string(&state.location);
    if name.is_empty() {
        diags.root_error(
            "Missing location",
            "One of 'location' or 'location_id' must be set",
        );
        return None;
    }
    let locations = match client.get_locations().await {
        Ok(locations) => locations,
        Err(e) => {
            api_error(diags, &e);
            return None;
        }
    };
    let found = locations.iter().find(|loc| loc.name == name).map(|loc| loc.id);
    if found.is_none() {
        diags.error(
            "Unknown location",
            format!("location {:?} does not exist", name),
            AttributePath::new("location"),
        );
    }
    found
}

/// Image id from `image_id`, or by looking up `image` by name.
async fn resolve_image(
    diags: &mut Diagnostics,
    client: &dyn NetActuateApi,
    state: &ServerState,
) -> Option<i64> {
    if let Some(&id) = known(&state.image_id).filter(|id| **id != 0) {
        return Some(id);
    }
    let name = string(&state.image);
    if name.is_empty() {
        diags.root_error("Missing image", "One of 'image' or 'image_id' must be set");
        return None;
    }
    let oses = match client.get_oss().await {
        Ok(oses) => oses,
        Err(e) => {
            api_error(diags, &e);
            return None;
        }
    };
    let found = oses.iter().find(|os| os.name == name).map(|os| os.id);
    if found.is_none() {
        diags.error(
            "Unknown image",
            format!("image {:?} does not exist", name),
            AttributePath::new("image"),
        );
    }
    found
}

fn conflicting<A, B>(diags: &mut Diagnostics, a: (&str, &Value<A>), b: (&'static str, &Value<B>)) {
    if !matches!(a.1, Value::Null) && !matches!(b.1, Value::Null) {
        diags.error(
            "Conflicting configuration arguments",
            format!("{:?} cannot be set together with {:?}", a.0, b.0),
            AttributePath::new(b.0),
        );
    }
}

#[async_trait]
impl Resource for ServerResource {
    type State<'a> = ServerState;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        use AttributeConstraint::{Computed, Optional, OptionalComputed, Required};
        use AttributeType as Ty;
        let strings = || Ty::List(Box::new(Ty::String));

        Some(Schema {
            version: 1,
            block: Block {
                description: Description::plain("A NetActuate virtual server"),
                attributes: map! {
                    "id" => attribute(Ty::String, Computed, "Server mbpkgid"),
                    "hostname" => attribute(
                        Ty::String,
                        Required,
                        "Fully qualified hostname; changing it rebuilds the server",
                    ),
                    "plan" => attribute(
                        Ty::String,
                        Required,
                        "Server plan; changing it replaces the server",
                    ),
                    "location" => attribute(Ty::String, OptionalComputed, "Location name"),
                    "location_id" => attribute(Ty::Number, OptionalComputed, "Location id"),
                    "image" => attribute(Ty::String, OptionalComputed, "OS image name"),
                    "image_id" => attribute(Ty::Number, OptionalComputed, "OS image id"),
                    "ssh_key_id" => attribute(Ty::Number, Optional, "Id of a stored SSH key"),
                    "ssh_key" => sensitive(attribute(Ty::String, Optional, "SSH public key")),
                    "password" => sensitive(attribute(Ty::String, Optional, "Root password")),
                    "cloud_config" => attribute(Ty::String, Optional, "cloud-init configuration"),
                    "user_data" => attribute(Ty::String, Optional, "Script run on first boot"),
                    "package_billing" => attribute(Ty::String, Optional, "Billing type"),
                    "package_billing_contract_id" => attribute(
                        Ty::String,
                        Optional,
                        "Billing contract",
                    ),
                    "cancel_billing" => attribute(
                        Ty::Bool,
                        OptionalComputed,
                        "Cancel billing when the server is destroyed",
                    ),
                    "primary_ipv4" => attribute(Ty::String, Computed, "Primary IPv4 address"),
                    "primary_ipv6" => attribute(Ty::String, Computed, "Primary IPv6 address"),
                    "status" => attribute(Ty::String, Computed, "Server status"),
                    "ipv4_addresses" => attribute(strings(), Computed, "All IPv4 addresses"),
                    "ipv6_addresses" => attribute(strings(), Computed, "All IPv6 addresses"),
                },
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        let errors = diags.errors.len();
        if let Some(hostname) = known(&config.hostname)
            && !is_valid_hostname(hostname)
        {
            diags.error(
                "Invalid attribute value",
                format!("{:?} is not a valid hostname", hostname),
                AttributePath::new("hostname"),
            );
        }
        conflicting(diags, ("location", &config.location), ("location_id", &config.location_id));
        conflicting(diags, ("image", &config.image), ("image_id", &config.image_id));

        (diags.errors.len() == errors).then_some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let state = self.refresh(diags, client.as_ref(), state).await?;
        Some((state, private_state))
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let planned = ServerState {
            id: Value::Unknown,
            location: computed(proposed_state.location),
            location_id: computed(proposed_state.location_id),
            image: computed(proposed_state.image),
            image_id: computed(proposed_state.image_id),
            cancel_billing: with_default(proposed_state.cancel_billing, false),
            primary_ipv4: Value::Unknown,
            primary_ipv6: Value::Unknown,
            status: Value::Unknown,
            ipv4_addresses: Value::Unknown,
            ipv6_addresses: Value::Unknown,
            ..proposed_state
        };
        Some((planned, ValueEmpty::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        let mut planned = proposed_state;
        planned.cancel_billing = with_default(planned.cancel_billing, false);

        let mut replace = Vec::new();
        if changed(&prior_state.plan, &planned.plan) {
            replace.push(AttributePath::new("plan"));
        }
        // Unconfigured halves of a name/id pair follow the configured half
        if changed(&prior_state.location, &planned.location) {
            replace.push(AttributePath::new("location"));
            if matches!(config_state.location_id, Value::Null) {
                planned.location_id = Value::Unknown;
            }
        }
        if changed(&prior_state.location_id, &planned.location_id) {
            replace.push(AttributePath::new("location_id"));
            if matches!(config_state.location, Value::Null) {
                planned.location = Value::Unknown;
            }
        }
        let image_changed = changed(&prior_state.image, &planned.image);
        if image_changed && matches!(config_state.image_id, Value::Null) {
            planned.image_id = Value::Unknown;
        }
        let image_id_changed = changed(&prior_state.image_id, &planned.image_id);
        if image_id_changed && matches!(config_state.image, Value::Null) {
            planned.image = Value::Unknown;
        }

        Some((planned, prior_private_state, replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        _prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(ValueEmpty::default())
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let location = resolve_location(diags, client.as_ref(), &planned_state).await?;
        let image = resolve_image(diags, client.as_ref(), &planned_state).await?;

        let request = CreateServerRequest {
            plan: string(&planned_state.plan).to_string(),
            location,
            image,
            fqdn: string(&planned_state.hostname).to_string(),
            ssh_key: string(&planned_state.ssh_key).to_string(),
            ssh_key_id: int(&planned_state.ssh_key_id),
            password: string(&planned_state.password).to_string(),
            package_billing: string(&planned_state.package_billing).to_string(),
            package_billing_contract_id: string(&planned_state.package_billing_contract_id)
                .to_string(),
            cloud_config: string(&planned_state.cloud_config).to_string(),
            script_content: string(&planned_state.user_data).to_string(),
        };

        let build = match client.create_server(&request).await {
            Ok(build) => build,
            Err(e) => {
                api_error(diags, &e);
                return None;
            }
        };
        tracing::info!(server_id = build.server_id, fqdn = %request.fqdn, "Created server");

        let state = ServerState {
            id: set(build.server_id.to_string()),
            ..planned_state
        };
        // A server stuck in provisioning is still recorded, with the error
        self.wait_for(diags, client.as_ref(), build.server_id, Wait::Running)
            .await;
        let state = self.refresh(diags, client.as_ref(), state).await?;
        Some((state, planned_private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let id = prior_state.server_id(diags)?;
        let planned_state = ServerState {
            id: prior_state.id.clone(),
            ..planned_state
        };

        if planned_state.needs_rebuild(&prior_state) {
            let image = resolve_image(diags, client.as_ref(), &planned_state).await?;
            let request = BuildServerRequest {
                location: int(&prior_state.location_id),
                image,
                fqdn: string(&planned_state.hostname).to_string(),
                ssh_key: string(&planned_state.ssh_key).to_string(),
                ssh_key_id: int(&planned_state.ssh_key_id),
                password: string(&planned_state.password).to_string(),
                package_billing: string(&planned_state.package_billing).to_string(),
                package_billing_contract_id: string(&planned_state.package_billing_contract_id)
                    .to_string(),
                cloud_config: string(&planned_state.cloud_config).to_string(),
                script_content: string(&planned_state.user_data).to_string(),
            };

            if let Err(e) = client.build_server(id, &request).await {
                api_error(diags, &e);
                return None;
            }
            tracing::info!(server_id = id, "Rebuilding server");

            if !self.wait_for(diags, client.as_ref(), id, Wait::Running).await {
                return None;
            }
        }

        let state = self.refresh(diags, client.as_ref(), planned_state).await?;
        Some((state, planned_private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let client = self.client.get(diags)?;
        let id = prior_state.server_id(diags)?;

        match client
            .delete_server(id, flag(&prior_state.cancel_billing, false))
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!(server_id = id, "Server already deleted");
            }
            Err(e) => {
                api_error(diags, &e);
                return None;
            }
        }

        if !self.wait_for(diags, client.as_ref(), id, Wait::Gone).await {
            return None;
        }

        if let Err(e) = client.unlink_server(id).await {
            api_error(diags, &e);
            return None;
        }
        tracing::info!(server_id = id, "Deleted server");
        Some(())
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = ServerState {
            id: set(id),
            ..Default::default()
        };
        Some((state, ValueEmpty::default()))
    }
}
