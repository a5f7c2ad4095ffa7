//! Per-term acquisition: a bounded retry loop where every attempt gets a fresh
//! browser session that is released before the attempt returns.

pub mod retry;

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::browser::{BrowserAgent, BrowserSession, SessionManager};
use crate::config::{Config, DelayRange};
use crate::error::{AppError, Result};
use crate::extractor::Extractor;
use crate::types::{AcquisitionState, Record, TermOutcome};

pub use retry::{retry_bounded, RetryOutcome, RetryPolicy};

pub struct AcquisitionController<A> {
    sessions: SessionManager<A>,
    extractor: Extractor,
    retry: RetryPolicy,
    navigation_timeout: Duration,
    dwell: DelayRange,
    cfg: Config,
}

impl<A: BrowserAgent> AcquisitionController<A> {
    pub fn new(cfg: Config, agent: A) -> Result<Self> {
        Ok(Self {
            sessions: SessionManager::new(agent, cfg.navigation_timeout),
            extractor: Extractor::new(&cfg)?,
            retry: RetryPolicy {
                max_attempts: cfg.max_retries,
                backoff: cfg.pacing.backoff,
            },
            navigation_timeout: cfg.navigation_timeout,
            dwell: cfg.pacing.dwell,
            cfg,
        })
    }

    pub fn sessions(&self) -> &SessionManager<A> {
        &self.sessions
    }

    /// Acquire listings for one search term. Never fails: an exhausted retry
    /// budget yields an outcome with no records.
    pub async fn acquire(&self, term: &str) -> TermOutcome {
        let url = self.cfg.search_url(term);
        let url = url.as_str();
        info!(term, url, "Acquiring listings");

        let outcome = retry_bounded(&self.retry, term, move |attempt| self.attempt(term, url, attempt)).await;

        match outcome {
            RetryOutcome::Succeeded { value, attempts } => {
                info!(term, attempts, records = value.len(), "Term succeeded");
                TermOutcome {
                    term: term.to_string(),
                    records: value,
                    attempts,
                    final_state: AcquisitionState::Success,
                }
            }
            RetryOutcome::Exhausted { attempts, last_error } => {
                let reason = last_error.map(|e| e.to_string()).unwrap_or_default();
                warn!(term, attempts, "Giving up on term: {reason}");
                TermOutcome {
                    term: term.to_string(),
                    records: Vec::new(),
                    attempts,
                    final_state: AcquisitionState::Terminal,
                }
            }
        }
    }

    /// One attempt: open a session, drive it, release it on every path.
    async fn attempt(&self, term: &str, url: &str, attempt: u32) -> Result<Vec<Record>> {
        debug!(term, attempt, state = %AcquisitionState::Idle, "Starting attempt");
        let mut guard = self.sessions.open().await?;
        debug!(term, attempt, user_agent = guard.user_agent(), "Session opened");
        let result = self.drive(guard.session(), term, url, attempt).await;
        guard.release().await;

        let state = if result.is_ok() {
            AcquisitionState::Success
        } else {
            AcquisitionState::RetryableFailure
        };
        debug!(term, attempt, state = %state, "Attempt finished");
        result
    }

    async fn drive(
        &self,
        session: &mut dyn BrowserSession,
        term: &str,
        url: &str,
        attempt: u32,
    ) -> Result<Vec<Record>> {
        debug!(term, attempt, state = %AcquisitionState::Navigating, "Navigating to {url}");
        tokio::time::timeout(self.navigation_timeout, session.navigate(url))
            .await
            .map_err(|_| AppError::NavigationTimeout(self.navigation_timeout))??;
        self.dwell.sleep().await;

        debug!(term, attempt, state = %AcquisitionState::AwaitingContent, "Waiting for listings");
        let records = self.extractor.extract(session).await?;
        debug!(term, attempt, state = %AcquisitionState::Extracting, records = records.len(), "Extraction done");

        if records.is_empty() {
            return Err(AppError::EmptyExtraction(url.to_string()));
        }
        Ok(records)
    }
}
