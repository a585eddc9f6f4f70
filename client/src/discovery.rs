use crate::config::ClientOptions;
use crate::error::FaroError;

/// A running face service announced by a discovery mechanism
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    pub name: String,
    pub address: String,
    pub port: u16,
}

impl ServiceRecord {
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// Lists the face services currently running, e.g. by browsing zeroconf announcements
#[async_trait::async_trait]
pub trait ServiceDiscovery: Send + Sync {
    async fn running_services(&self) -> Result<Vec<ServiceRecord>, FaroError>;
}

/// Discovery over a fixed list of services
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    services: Vec<ServiceRecord>,
}

impl StaticDiscovery {
    pub fn new(services: Vec<ServiceRecord>) -> Self {
        Self { services }
    }
}

#[async_trait::async_trait]
impl ServiceDiscovery for StaticDiscovery {
    async fn running_services(&self) -> Result<Vec<ServiceRecord>, FaroError> {
        Ok(self.services.clone())
    }
}

/// Endpoint of the first running service called `name`
#[tracing::instrument(skip(discovery))]
pub async fn lookup_address(discovery: &dyn ServiceDiscovery, name: &str) -> Option<String> {
    match discovery.running_services().await {
        Ok(services) => {
            let found = services.iter().find(|service| service.name == name);
            if found.is_none() {
                log::warn!("Found no running services named \"{name}\"");
            }
            found.map(ServiceRecord::endpoint)
        }
        Err(err) => {
            log::warn!("Service discovery failed while looking up \"{name}\": {err}");
            None
        }
    }
}

/// The address a client should dial: the discovered endpoint of `service_name` when one is
/// configured and running, otherwise the configured address
pub async fn resolve_address(options: &ClientOptions, discovery: &dyn ServiceDiscovery) -> String {
    let discovered = match &options.service_name {
        Some(name) => lookup_address(discovery, name).await,
        None => None,
    };
    discovered.unwrap_or_else(|| options.address.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use pretty_assertions::assert_eq;

    static SERVICES: Lazy<StaticDiscovery> = Lazy::new(|| {
        StaticDiscovery::new(vec![
            ServiceRecord {
                name: "vgg2".to_string(),
                address: "10.0.0.5".to_string(),
                port: 50031,
            },
            ServiceRecord {
                name: "arcface".to_string(),
                address: "10.0.0.6".to_string(),
                port: 50032,
            },
        ])
    });

    struct FailingDiscovery;

    #[async_trait::async_trait]
    impl ServiceDiscovery for FailingDiscovery {
        async fn running_services(&self) -> Result<Vec<ServiceRecord>, FaroError> {
            Err(FaroError::InvalidArgument("no multicast".to_string()))
        }
    }

    fn options_for(service_name: Option<&str>) -> ClientOptions {
        ClientOptions {
            service_name: service_name.map(str::to_string),
            address: "localhost:50030".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_named_service_is_resolved() {
        let address = resolve_address(&options_for(Some("arcface")), &*SERVICES).await;
        assert_eq!(address, "10.0.0.6:50032");
    }

    #[tokio::test]
    async fn test_unknown_service_falls_back_to_address() {
        let address = resolve_address(&options_for(Some("missing")), &*SERVICES).await;
        assert_eq!(address, "localhost:50030");
    }

    #[tokio::test]
    async fn test_discovery_is_skipped_without_service_name() {
        let address = resolve_address(&options_for(None), &FailingDiscovery).await;
        assert_eq!(address, "localhost:50030");
    }

    #[tokio::test]
    async fn test_discovery_failure_falls_back_to_address() {
        let address = resolve_address(&options_for(Some("vgg2")), &FailingDiscovery).await;
        assert_eq!(address, "localhost:50030");
    }
}
