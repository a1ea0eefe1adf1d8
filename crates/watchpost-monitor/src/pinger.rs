use async_trait::async_trait;

/// Reachability probe, injected into the monitor so tests can script it.
#[async_trait]
pub trait Pinger: Send + Sync {
    async fn ping(&self, ip: &str) -> bool;
}

/// Shells out to the system `ping` binary, one echo request with a one
/// second timeout.
pub struct SystemPinger;

#[async_trait]
impl Pinger for SystemPinger {
    async fn ping(&self, ip: &str) -> bool {
        match tokio::process::Command::new("ping")
            .args(["-c", "1", "-W", "1", ip])
            .output()
            .await
        {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::debug!(ip = %ip, error = %e, "ping invocation failed");
                false
            }
        }
    }
}
