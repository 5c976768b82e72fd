//! Meeting orchestration facade
//!
//! One [`MeetingFacade`] per meeting view. It joins (or starts) the team's
//! active session, keeps a cached copy of the authoritative session, drives a
//! once-per-second display value and a periodic checkpoint, and applies
//! relay events from other participants by re-reading the service.
//!
//! Every successful mutating call replaces the cache with the server's
//! answer. A failed call never changes local state optimistically; a pause or
//! resume rejected as `InvalidState` re-reads the session before returning.

use chrono::Utc;
use l10_common::api::{SectionTimingView, SessionStatusResponse, SessionView};
use l10_common::events::MeetingEvent;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{broadcast::error::RecvError, watch};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{FacadeError, FacadeResult};
use crate::relay::Relay;
use crate::timer::DisplayTimer;
use crate::transport::{HttpSessionApi, MeetingScope, SessionApi};

/// Facade settings
#[derive(Debug, Clone)]
pub struct FacadeConfig {
    /// Service root, e.g. `http://127.0.0.1:5730`
    pub base_url: String,
    /// Time between timer checkpoints while running
    pub checkpoint_interval: Duration,
    /// Time between display updates
    pub tick_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5730".to_string(),
            checkpoint_interval: Duration::from_secs(30),
            tick_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Default)]
struct FacadeState {
    session: Option<SessionView>,
    timer: Option<DisplayTimer>,
    /// Local start of the current section, reset on pause/resume
    section_anchor: Option<Instant>,
}

struct FacadeInner {
    api: Arc<dyn SessionApi>,
    relay: Arc<dyn Relay>,
    scope: MeetingScope,
    user_id: Option<String>,
    config: FacadeConfig,
    state: Mutex<FacadeState>,
    display_tx: watch::Sender<i64>,
    tasks: Mutex<Option<CancellationToken>>,
}

/// Client-side orchestration of one meeting session
pub struct MeetingFacade {
    inner: Arc<FacadeInner>,
}

impl MeetingFacade {
    pub fn new(
        api: Arc<dyn SessionApi>,
        relay: Arc<dyn Relay>,
        scope: MeetingScope,
        user_id: Option<String>,
        config: FacadeConfig,
    ) -> Self {
        let (display_tx, _) = watch::channel(0);
        Self {
            inner: Arc::new(FacadeInner {
                api,
                relay,
                scope,
                user_id,
                config,
                state: Mutex::new(FacadeState::default()),
                display_tx,
                tasks: Mutex::new(None),
            }),
        }
    }

    /// Facade talking to the service over HTTP at `config.base_url`
    pub fn connect(
        config: FacadeConfig,
        relay: Arc<dyn Relay>,
        scope: MeetingScope,
        user_id: Option<String>,
    ) -> FacadeResult<Self> {
        let api = HttpSessionApi::new(&config.base_url, config.request_timeout)?;
        Ok(Self::new(Arc::new(api), relay, scope, user_id, config))
    }

    pub fn scope(&self) -> &MeetingScope {
        &self.inner.scope
    }

    /// Cached session, if joined
    pub fn session(&self) -> Option<SessionView> {
        self.inner.lock_state().session.clone()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.inner.session_id()
    }

    pub fn is_paused(&self) -> bool {
        self.inner
            .lock_state()
            .session
            .as_ref()
            .is_some_and(|s| s.is_paused)
    }

    /// Current display value in seconds
    pub fn elapsed_seconds(&self) -> i64 {
        self.inner.elapsed_seconds()
    }

    /// Seconds since the local section anchor (0 while paused)
    pub fn section_elapsed_seconds(&self) -> u64 {
        let state = self.inner.lock_state();
        match (&state.session, state.section_anchor) {
            (Some(session), Some(anchor)) if !session.is_paused => anchor.elapsed().as_secs(),
            _ => 0,
        }
    }

    /// Display value published every tick
    pub fn display(&self) -> watch::Receiver<i64> {
        self.inner.display_tx.subscribe()
    }

    /// Join the team's active session, starting one if there is none
    ///
    /// Racing joiners converge: a `Conflict` from start means someone else
    /// created the session first, so it is looked up again.
    pub async fn join(&self) -> FacadeResult<SessionView> {
        let inner = &self.inner;
        let session = match inner.api.get_active(&inner.scope).await? {
            Some(session) => {
                info!("Joined active session {}", session.id);
                session
            }
            None => match inner.api.start(&inner.scope, inner.user_id.as_deref()).await {
                Ok(session) => {
                    info!("Started session {}", session.id);
                    inner.relay.broadcast(MeetingEvent::SessionStarted {
                        session_id: session.id,
                        organization_id: session.organization_id.clone(),
                        team_id: session.team_id.clone(),
                        meeting_type: session.meeting_type.clone(),
                        timestamp: Utc::now(),
                    });
                    session
                }
                Err(FacadeError::Conflict(msg)) => {
                    debug!("Start lost the race ({}), joining the winner", msg);
                    inner
                        .api
                        .get_active(&inner.scope)
                        .await?
                        .ok_or(FacadeError::Conflict(msg))?
                }
                Err(e) => return Err(e),
            },
        };

        inner.cache(session.clone());
        inner.lock_state().section_anchor = Some(Instant::now());
        self.spawn_tasks();
        Ok(session)
    }

    /// Pause when running, resume when paused
    pub async fn pause_resume(&self) -> FacadeResult<SessionView> {
        if self.is_paused() {
            self.resume().await
        } else {
            self.pause(None).await
        }
    }

    pub async fn pause(&self, reason: Option<&str>) -> FacadeResult<SessionView> {
        let inner = &self.inner;
        let session_id = inner.require_session()?;
        let session = match inner
            .api
            .pause(&inner.scope, session_id, reason, inner.user_id.as_deref())
            .await
        {
            Ok(session) => session,
            Err(e) => return Err(inner.reconcile(e).await),
        };

        inner.cache(session.clone());
        inner.lock_state().section_anchor = Some(Instant::now());
        inner.relay.broadcast(MeetingEvent::TimerPaused {
            session_id,
            reason: reason.map(str::to_string),
            timestamp: Utc::now(),
        });
        Ok(session)
    }

    pub async fn resume(&self) -> FacadeResult<SessionView> {
        let inner = &self.inner;
        let session_id = inner.require_session()?;
        let session = match inner
            .api
            .resume(&inner.scope, session_id, inner.user_id.as_deref())
            .await
        {
            Ok(session) => session,
            Err(e) => return Err(inner.reconcile(e).await),
        };

        inner.cache(session.clone());
        inner.lock_state().section_anchor = Some(Instant::now());
        inner.relay.broadcast(MeetingEvent::TimerResumed {
            session_id,
            active_duration_seconds: session.active_duration_seconds,
            timestamp: Utc::now(),
        });
        Ok(session)
    }

    /// Move the meeting to another agenda section
    ///
    /// Ending the previous section is best-effort; starting the new one is not.
    pub async fn change_section(&self, section: &str) -> FacadeResult<SectionTimingView> {
        let inner = &self.inner;
        let session_id = inner.require_session()?;
        let previous = inner
            .lock_state()
            .session
            .as_ref()
            .and_then(|s| s.current_section.clone());

        if let Some(previous) = previous.filter(|p| p != section) {
            if let Err(e) = inner.api.end_section(&inner.scope, session_id, &previous).await {
                warn!("Failed to end section {}: {}", previous, e);
            }
        }

        let timing = inner
            .api
            .start_section(&inner.scope, session_id, section)
            .await?;
        let session = inner
            .api
            .update_section(&inner.scope, session_id, &timing.section_id)
            .await?;

        inner.cache(session);
        inner.lock_state().section_anchor = Some(Instant::now());
        inner.relay.broadcast(MeetingEvent::SectionChange {
            session_id,
            section_id: timing.section_id.clone(),
            timestamp: Utc::now(),
        });
        Ok(timing)
    }

    /// Conclude the meeting
    ///
    /// A session someone else already ended counts as success. Returns the
    /// final session when this call concluded it.
    pub async fn end(&self) -> FacadeResult<Option<SessionView>> {
        let inner = &self.inner;
        let session_id = inner.require_session()?;
        let response = inner.api.end(&inner.scope, session_id).await?;

        if response.already_concluded {
            info!("Session {} was already concluded", session_id);
        } else if let Some(session) = &response.session {
            inner.relay.broadcast(MeetingEvent::SessionEnded {
                session_id,
                final_duration_seconds: session
                    .final_duration_seconds
                    .unwrap_or(session.active_duration_seconds),
                timestamp: Utc::now(),
            });
        }

        self.clear_cache();
        Ok(response.session)
    }

    /// Authoritative status, refreshing the cache
    pub async fn status(&self) -> FacadeResult<SessionStatusResponse> {
        self.inner.refresh().await
    }

    /// Apply an event received from the relay
    ///
    /// Returns whether the event concerned this facade's session.
    pub async fn handle_relay_event(&self, event: &MeetingEvent) -> FacadeResult<bool> {
        self.inner.handle_relay_event(event).await
    }

    /// Stop background tasks and forget the session
    pub fn clear_cache(&self) {
        self.inner.stop_tasks();
        *self.inner.lock_state() = FacadeState::default();
        self.inner.display_tx.send_replace(0);
    }

    fn spawn_tasks(&self) {
        self.inner.stop_tasks();
        let cancel = CancellationToken::new();

        tokio::spawn(checkpoint_loop(self.inner.clone(), cancel.clone()));
        tokio::spawn(display_loop(self.inner.clone(), cancel.clone()));
        tokio::spawn(relay_loop(self.inner.clone(), cancel.clone()));

        let mut tasks = self
            .inner
            .tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *tasks = Some(cancel);
    }
}

impl Drop for MeetingFacade {
    fn drop(&mut self) {
        self.inner.stop_tasks();
    }
}

impl FacadeInner {
    fn lock_state(&self) -> MutexGuard<'_, FacadeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn session_id(&self) -> Option<Uuid> {
        self.lock_state().session.as_ref().map(|s| s.id)
    }

    fn require_session(&self) -> FacadeResult<Uuid> {
        self.session_id().ok_or(FacadeError::NoSession)
    }

    fn elapsed_seconds(&self) -> i64 {
        self.lock_state()
            .timer
            .as_ref()
            .map(DisplayTimer::elapsed_seconds)
            .unwrap_or(0)
    }

    /// Replace the cached session and reseed the display from it
    fn cache(&self, session: SessionView) {
        let elapsed = {
            let mut state = self.lock_state();
            let (seed, paused) = (session.active_duration_seconds, session.is_paused);
            state.session = Some(session);
            match state.timer.as_mut() {
                Some(timer) => timer.reseed(seed, paused),
                None => state.timer = Some(DisplayTimer::new(seed, paused)),
            }
            state.timer.map(|t| t.elapsed_seconds()).unwrap_or(seed)
        };
        self.display_tx.send_replace(elapsed);
    }

    async fn refresh(&self) -> FacadeResult<SessionStatusResponse> {
        let session_id = self.require_session()?;
        let status = self.api.status(&self.scope, session_id).await?;
        if status.session.is_active {
            self.cache(status.session.clone());
        } else {
            info!("Session {} ended elsewhere", session_id);
            self.forget();
        }
        Ok(status)
    }

    /// Re-read the session after losing a state race, then hand the error back
    ///
    /// `InvalidState` means the cached pause flag is stale.
    async fn reconcile(&self, err: FacadeError) -> FacadeError {
        if matches!(err, FacadeError::InvalidState(_)) {
            match self.refresh().await {
                Ok(status) => debug!(
                    "Reconciled session {} after {} (paused: {})",
                    status.session.id, err, status.session.is_paused
                ),
                Err(e) => warn!("Refresh after {} failed: {}", err, e),
            }
        }
        err
    }

    async fn handle_relay_event(&self, event: &MeetingEvent) -> FacadeResult<bool> {
        if self.session_id() != Some(event.session_id()) {
            return Ok(false);
        }

        match event {
            MeetingEvent::SessionStarted { .. } => {}
            MeetingEvent::TimerPaused { .. }
            | MeetingEvent::TimerResumed { .. }
            | MeetingEvent::SectionChange { .. } => {
                self.refresh().await?;
                self.lock_state().section_anchor = Some(Instant::now());
            }
            MeetingEvent::SessionEnded { .. } => {
                info!("Session {} ended by another participant", event.session_id());
                self.forget();
            }
        }
        debug!("Applied relay event {}", event.event_type());
        Ok(true)
    }

    /// Drop the session and stop background work
    fn forget(&self) {
        self.stop_tasks();
        *self.lock_state() = FacadeState::default();
        self.display_tx.send_replace(0);
    }

    fn stop_tasks(&self) {
        let token = self
            .tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(token) = token {
            token.cancel();
        }
    }

    /// Best-effort checkpoint of the displayed value
    async fn checkpoint(&self) {
        let (session_id, paused) = {
            let state = self.lock_state();
            match &state.session {
                Some(session) => (session.id, session.is_paused),
                None => return,
            }
        };
        if paused {
            return;
        }

        let elapsed = self.elapsed_seconds();
        match self.api.save_state(&self.scope, session_id, elapsed).await {
            Ok(()) => debug!("Checkpoint saved for {}: {}s", session_id, elapsed),
            Err(e) => warn!("Checkpoint for {} failed: {}", session_id, e),
        }
    }
}

async fn checkpoint_loop(inner: Arc<FacadeInner>, cancel: CancellationToken) {
    let mut ticker = interval(inner.config.checkpoint_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; nothing to save yet
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => inner.checkpoint().await,
        }
    }
}

async fn display_loop(inner: Arc<FacadeInner>, cancel: CancellationToken) {
    let mut ticker = interval(inner.config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                inner.display_tx.send_replace(inner.elapsed_seconds());
            }
        }
    }
}

async fn relay_loop(inner: Arc<FacadeInner>, cancel: CancellationToken) {
    let mut rx = inner.relay.subscribe();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            received = rx.recv() => match received {
                Ok(event) => {
                    if let Err(e) = inner.handle_relay_event(&event).await {
                        warn!("Failed to apply relay event {}: {}", event.event_type(), e);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Relay lagged by {} events, refreshing", skipped);
                    if let Err(e) = inner.refresh().await {
                        warn!("Refresh after relay lag failed: {}", e);
                    }
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
}
