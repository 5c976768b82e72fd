//! Session service transport
//!
//! [`SessionApi`] is the seam between the facade and the meeting-session
//! service. [`HttpSessionApi`] talks to `l10-sessions` over REST.

use async_trait::async_trait;
use l10_common::api::{
    ActiveSessionResponse, EndSessionResponse, PauseRequest, ResumeRequest, SaveStateRequest,
    SectionRequest, SectionResponse, SectionTimingView, SessionResponse, SessionStatusResponse,
    SessionView, StartSessionRequest, UpdateSectionRequest,
};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::error::{FacadeError, FacadeResult};

const USER_AGENT: &str = concat!("l10-facade/", env!("CARGO_PKG_VERSION"));

/// Which meeting a facade operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingScope {
    pub organization_id: String,
    pub team_id: String,
    pub meeting_type: String,
}

impl MeetingScope {
    pub fn new(organization_id: &str, team_id: &str, meeting_type: &str) -> Self {
        Self {
            organization_id: organization_id.to_string(),
            team_id: team_id.to_string(),
            meeting_type: meeting_type.to_string(),
        }
    }
}

/// Operations of the meeting-session service used by the facade
#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn start(
        &self,
        scope: &MeetingScope,
        facilitator_id: Option<&str>,
    ) -> FacadeResult<SessionView>;

    async fn get_active(&self, scope: &MeetingScope) -> FacadeResult<Option<SessionView>>;

    async fn pause(
        &self,
        scope: &MeetingScope,
        session_id: Uuid,
        reason: Option<&str>,
        user_id: Option<&str>,
    ) -> FacadeResult<SessionView>;

    async fn resume(
        &self,
        scope: &MeetingScope,
        session_id: Uuid,
        user_id: Option<&str>,
    ) -> FacadeResult<SessionView>;

    async fn end(&self, scope: &MeetingScope, session_id: Uuid) -> FacadeResult<EndSessionResponse>;

    async fn save_state(
        &self,
        scope: &MeetingScope,
        session_id: Uuid,
        elapsed_seconds: i64,
    ) -> FacadeResult<()>;

    async fn update_section(
        &self,
        scope: &MeetingScope,
        session_id: Uuid,
        section: &str,
    ) -> FacadeResult<SessionView>;

    async fn start_section(
        &self,
        scope: &MeetingScope,
        session_id: Uuid,
        section_id: &str,
    ) -> FacadeResult<SectionTimingView>;

    async fn end_section(
        &self,
        scope: &MeetingScope,
        session_id: Uuid,
        section_id: &str,
    ) -> FacadeResult<SectionTimingView>;

    async fn status(
        &self,
        scope: &MeetingScope,
        session_id: Uuid,
    ) -> FacadeResult<SessionStatusResponse>;
}

/// REST client for `l10-sessions`
#[derive(Debug, Clone)]
pub struct HttpSessionApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSessionApi {
    /// `base_url` is the service root, e.g. `http://127.0.0.1:5730`
    pub fn new(base_url: &str, timeout: Duration) -> FacadeResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FacadeError::Transient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn sessions_url(&self, scope: &MeetingScope) -> String {
        format!(
            "{}/api/v1/organizations/{}/teams/{}/meeting-sessions",
            self.base_url, scope.organization_id, scope.team_id
        )
    }

    fn session_url(&self, scope: &MeetingScope, session_id: Uuid, action: &str) -> String {
        format!("{}/{}/{}", self.sessions_url(scope), session_id, action)
    }

    async fn execute(&self, request: RequestBuilder) -> FacadeResult<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = FacadeError::from_response(status, &body);
        debug!("Session service answered {}: {}", status, err);
        Err(err)
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> FacadeResult<T> {
        let response = self.execute(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| FacadeError::Protocol(e.to_string()))
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.client.request(method, url)
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn start(
        &self,
        scope: &MeetingScope,
        facilitator_id: Option<&str>,
    ) -> FacadeResult<SessionView> {
        let body = StartSessionRequest {
            organization_id: scope.organization_id.clone(),
            team_id: scope.team_id.clone(),
            meeting_type: scope.meeting_type.clone(),
            facilitator_id: facilitator_id.map(str::to_string),
        };
        let url = format!("{}/start", self.sessions_url(scope));
        let response: SessionResponse = self.json(self.request(Method::POST, url).json(&body)).await?;
        Ok(response.session)
    }

    async fn get_active(&self, scope: &MeetingScope) -> FacadeResult<Option<SessionView>> {
        let url = format!("{}/active", self.sessions_url(scope));
        let request = self
            .request(Method::GET, url)
            .query(&[("meeting_type", scope.meeting_type.as_str())]);
        let response: ActiveSessionResponse = self.json(request).await?;
        Ok(response.session)
    }

    async fn pause(
        &self,
        scope: &MeetingScope,
        session_id: Uuid,
        reason: Option<&str>,
        user_id: Option<&str>,
    ) -> FacadeResult<SessionView> {
        let body = PauseRequest {
            reason: reason.map(str::to_string),
            user_id: user_id.map(str::to_string),
        };
        let url = self.session_url(scope, session_id, "pause");
        let response: SessionResponse = self.json(self.request(Method::POST, url).json(&body)).await?;
        Ok(response.session)
    }

    async fn resume(
        &self,
        scope: &MeetingScope,
        session_id: Uuid,
        user_id: Option<&str>,
    ) -> FacadeResult<SessionView> {
        let body = ResumeRequest {
            user_id: user_id.map(str::to_string),
        };
        let url = self.session_url(scope, session_id, "resume");
        let response: SessionResponse = self.json(self.request(Method::POST, url).json(&body)).await?;
        Ok(response.session)
    }

    async fn end(&self, scope: &MeetingScope, session_id: Uuid) -> FacadeResult<EndSessionResponse> {
        let url = self.session_url(scope, session_id, "end");
        self.json(self.request(Method::POST, url)).await
    }

    async fn save_state(
        &self,
        scope: &MeetingScope,
        session_id: Uuid,
        elapsed_seconds: i64,
    ) -> FacadeResult<()> {
        let url = self.session_url(scope, session_id, "save-state");
        let body = SaveStateRequest { elapsed_seconds };
        self.execute(self.request(Method::POST, url).json(&body)).await?;
        Ok(())
    }

    async fn update_section(
        &self,
        scope: &MeetingScope,
        session_id: Uuid,
        section: &str,
    ) -> FacadeResult<SessionView> {
        let url = self.session_url(scope, session_id, "section");
        let body = UpdateSectionRequest {
            section: section.to_string(),
        };
        let response: SessionResponse = self.json(self.request(Method::PATCH, url).json(&body)).await?;
        Ok(response.session)
    }

    async fn start_section(
        &self,
        scope: &MeetingScope,
        session_id: Uuid,
        section_id: &str,
    ) -> FacadeResult<SectionTimingView> {
        let url = self.session_url(scope, session_id, "sections/start");
        let body = SectionRequest {
            session_id: Some(session_id),
            section_id: section_id.to_string(),
        };
        let response: SectionResponse = self.json(self.request(Method::POST, url).json(&body)).await?;
        Ok(response.section)
    }

    async fn end_section(
        &self,
        scope: &MeetingScope,
        session_id: Uuid,
        section_id: &str,
    ) -> FacadeResult<SectionTimingView> {
        let url = self.session_url(scope, session_id, "sections/end");
        let body = SectionRequest {
            session_id: Some(session_id),
            section_id: section_id.to_string(),
        };
        let response: SectionResponse = self.json(self.request(Method::POST, url).json(&body)).await?;
        Ok(response.section)
    }

    async fn status(
        &self,
        scope: &MeetingScope,
        session_id: Uuid,
    ) -> FacadeResult<SessionStatusResponse> {
        let url = self.session_url(scope, session_id, "status");
        self.json(self.request(Method::GET, url)).await
    }
}
