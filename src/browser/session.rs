use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use super::{BrowserAgent, BrowserSession, SessionProfile, STEALTH_SCRIPT, USER_AGENTS};
use crate::error::{AppError, Result};

const WINDOW_SIZE: (u32, u32) = (1920, 1080);

/// Builds identity-randomized sessions on top of a [`BrowserAgent`].
pub struct SessionManager<A> {
    agent: A,
    page_load_timeout: Duration,
}

impl<A: BrowserAgent> SessionManager<A> {
    pub fn new(agent: A, page_load_timeout: Duration) -> Self {
        Self { agent, page_load_timeout }
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// A profile with a user agent picked at random from the identity pool.
    pub fn random_profile(&self) -> SessionProfile {
        let user_agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);
        SessionProfile {
            user_agent: user_agent.to_string(),
            stealth_script: STEALTH_SCRIPT.to_string(),
            page_load_timeout: self.page_load_timeout,
            window_size: WINDOW_SIZE,
        }
    }

    /// Launch a fresh session. The returned guard must be released by the caller.
    pub async fn open(&self) -> Result<SessionGuard> {
        let profile = self.random_profile();
        debug!(user_agent = %profile.user_agent, "launching browser session");
        let session = self.agent.launch(&profile).await.map_err(|e| match e {
            AppError::SessionSetup(_) => e,
            other => AppError::SessionSetup(other.to_string()),
        })?;
        Ok(SessionGuard {
            session,
            user_agent: profile.user_agent,
            released: false,
        })
    }
}

/// Owns a live session for the length of one attempt.
///
/// `release` closes it explicitly. If the guard is dropped unreleased (panic or
/// cancelled future) the close is handed to the runtime instead.
pub struct SessionGuard {
    session: Box<dyn BrowserSession>,
    user_agent: String,
    released: bool,
}

impl SessionGuard {
    pub fn session(&mut self) -> &mut dyn BrowserSession {
        self.session.as_mut()
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub async fn release(mut self) {
        self.released = true;
        let session = std::mem::replace(&mut self.session, Box::new(Released));
        if let Err(e) = session.close().await {
            warn!("Session close failed: {e}");
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        warn!("Session dropped without release; closing in background");
        let session = std::mem::replace(&mut self.session, Box::new(Released));
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = session.close().await;
            });
        }
    }
}

/// Placeholder left behind once the real session has been handed off for closing.
struct Released;

#[async_trait]
impl BrowserSession for Released {
    async fn navigate(&mut self, _url: &str) -> Result<()> {
        Err(AppError::Browser("session already released".to_string()))
    }
    async fn is_present(&mut self, _selector: &str) -> Result<bool> {
        Err(AppError::Browser("session already released".to_string()))
    }
    async fn page_html(&mut self) -> Result<String> {
        Err(AppError::Browser("session already released".to_string()))
    }
    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeAgent, FakePage};

    #[tokio::test]
    async fn profile_uses_pool_identity_and_stealth_hook() {
        let manager = SessionManager::new(FakeAgent::new(vec![]), Duration::from_secs(30));
        let profile = manager.random_profile();
        assert!(USER_AGENTS.contains(&profile.user_agent.as_str()));
        assert!(profile.stealth_script.contains("webdriver"));
        assert_eq!(profile.page_load_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn launch_failure_is_session_setup_error() {
        let manager = SessionManager::new(
            FakeAgent::new(vec![FakePage::LaunchFails]),
            Duration::from_secs(30),
        );
        let err = manager.open().await.err().expect("launch should fail");
        assert!(matches!(err, AppError::SessionSetup(_)), "{err:?}");
        assert_eq!(manager.agent().closes(), 0);
    }

    #[tokio::test]
    async fn release_closes_the_session() {
        let manager = SessionManager::new(
            FakeAgent::new(vec![FakePage::Missing]),
            Duration::from_secs(30),
        );
        let guard = manager.open().await.unwrap();
        assert!(USER_AGENTS.contains(&guard.user_agent()));
        guard.release().await;
        assert_eq!(manager.agent().launches(), 1);
        assert_eq!(manager.agent().closes(), 1);
    }

    #[tokio::test]
    async fn dropped_guard_still_closes_session() {
        let manager = SessionManager::new(
            FakeAgent::new(vec![FakePage::Missing]),
            Duration::from_secs(30),
        );
        let guard = manager.open().await.unwrap();
        drop(guard);
        tokio::task::yield_now().await;
        assert_eq!(manager.agent().closes(), 1);
    }
}
