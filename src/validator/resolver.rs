use async_trait::async_trait;
use std::collections::HashSet;
use std::io;

/// Capability to resolve a hostname to at least one address.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, host: &str) -> io::Result<()>;
}

/// Resolves hostnames through the system resolver.
#[derive(Debug, Default, Clone, Copy)]
pub struct DnsResolver;

#[async_trait]
impl HostResolver for DnsResolver {
    async fn resolve(&self, host: &str) -> io::Result<()> {
        // lookup_host wants a port; it plays no part in the lookup itself
        let mut addrs = tokio::net::lookup_host((host, 0)).await?;
        match addrs.next() {
            Some(_) => Ok(()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no addresses for {host}"),
            )),
        }
    }
}

/// Resolver backed by a fixed set of known hosts, for tests and offline use.
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    hosts: HashSet<String>,
}

impl StaticResolver {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| h.into().to_ascii_lowercase())
                .collect(),
        }
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn resolve(&self, host: &str) -> io::Result<()> {
        if self.hosts.contains(&host.to_ascii_lowercase()) {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("unknown host {host}"),
            ))
        }
    }
}
