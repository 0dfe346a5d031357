use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ec2::config::Credentials;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::{Filter, Instance as Ec2Instance};
use aws_sdk_ec2::Client;
use tracing::{debug, info};

use super::ComputeApi;
use crate::shared::config::BotConfig;
use crate::shared::error::{BotError, BotResult};
use crate::shared::types::{Instance, InstanceState, NetworkInterface};
use gamehost_core::AddressAssociation;

const NAME_TAG: &str = "Name";

/// EC2-backed compute API
#[derive(Clone)]
pub struct Ec2ComputeApi {
    client: Client,
}

impl Ec2ComputeApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn from_config(config: &BotConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()));

        if let Some((access_key_id, secret_access_key)) = config.static_credentials() {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "gamehost-config",
            ));
        }

        let sdk_config = loader.load().await;
        info!(region = %config.aws_region, "EC2 client configured");
        Self::new(Client::new(&sdk_config))
    }
}

#[async_trait]
impl ComputeApi for Ec2ComputeApi {
    async fn describe_by_name(&self, name: &str) -> BotResult<Vec<Instance>> {
        let output = self
            .client
            .describe_instances()
            .filters(
                Filter::builder()
                    .name(format!("tag:{NAME_TAG}"))
                    .values(name)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| BotError::ProviderCallFailed(DisplayErrorContext(e).to_string()))?;

        let instances = output
            .reservations()
            .iter()
            .flat_map(|reservation| reservation.instances())
            .map(|instance| instance_from_sdk(name, instance))
            .collect::<BotResult<Vec<_>>>()?;

        debug!(instance = %name, matches = instances.len(), "Described instances");
        Ok(instances)
    }

    async fn start_instance(&self, instance_id: &str) -> BotResult<()> {
        self.client
            .start_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| BotError::ProviderCallFailed(DisplayErrorContext(e).to_string()))
    }

    async fn stop_instance(&self, instance_id: &str) -> BotResult<()> {
        self.client
            .stop_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| BotError::ProviderCallFailed(DisplayErrorContext(e).to_string()))
    }
}

/// Map an SDK record onto the domain model. The name tag on the record wins
/// over the name that was asked for.
pub fn instance_from_sdk(requested_name: &str, instance: &Ec2Instance) -> BotResult<Instance> {
    let name = instance
        .tags()
        .iter()
        .find(|tag| tag.key() == Some(NAME_TAG))
        .and_then(|tag| tag.value())
        .unwrap_or(requested_name);

    let state = instance
        .state()
        .and_then(|state| state.name())
        .map(|name| InstanceState::from_provider(name.as_str()))
        .unwrap_or_else(|| InstanceState::Unknown("unknown".to_string()));

    let mut record = Instance::new(instance.instance_id().unwrap_or_default(), name, state)?;
    record.network_interfaces = instance
        .network_interfaces()
        .iter()
        .map(|interface| NetworkInterface {
            association: interface.association().map(|association| AddressAssociation {
                public_ip: association.public_ip().map(ToString::to_string),
                ip_owner_id: association.ip_owner_id().map(ToString::to_string),
            }),
        })
        .collect();

    Ok(record)
}
