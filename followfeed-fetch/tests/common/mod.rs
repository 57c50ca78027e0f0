//! Shared test double for the activity client.

#![allow(dead_code)]

use async_trait::async_trait;
use followfeed_core::{
    ActivityClient, ActivityPage, AuthRequest, ClientError, RawActivityEntry, SessionState,
    SettingValue, UserId,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Device id the double assigns when a login supplies none.
pub const GENERATED_DEVICE_ID: &str = "android-feedfacefeedface";

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Resume { device_id: Option<String> },
    Login { device_id: Option<String>, observed: bool },
    Lookup(String),
    Page(Option<String>),
}

/// Scripted [`ActivityClient`] that records every call it receives.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub resume_error: Option<ClientError>,
    pub login_error: Option<ClientError>,
    pub lookup_error: Mutex<Option<ClientError>>,
    pub user_id: u64,
    pub pages: Mutex<VecDeque<Result<ActivityPage, ClientError>>>,
    pub settings: SessionState,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            user_id: 25_025_320,
            ..Self::default()
        }
    }

    pub fn with_pages(pages: Vec<Result<ActivityPage, ClientError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Self::new()
        }
    }

    pub fn calls_handle(&self) -> Arc<Mutex<Vec<Call>>> {
        Arc::clone(&self.calls)
    }

    pub fn recorded(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ActivityClient for ScriptedClient {
    async fn authenticate(&mut self, request: AuthRequest<'_>) -> Result<(), ClientError> {
        if let Some(cached) = request.cached_settings {
            self.record(Call::Resume {
                device_id: cached.device_id().map(str::to_owned),
            });
            if let Some(err) = self.resume_error.take() {
                return Err(err);
            }
            self.settings = cached;
            return Ok(());
        }

        self.record(Call::Login {
            device_id: request.device_id.clone(),
            observed: request.on_login.is_some(),
        });
        if let Some(err) = self.login_error.take() {
            return Err(err);
        }

        let mut settings = SessionState::new();
        settings.insert(
            "device_id",
            request
                .device_id
                .unwrap_or_else(|| GENERATED_DEVICE_ID.to_string()),
        );
        settings.insert("cookie", SettingValue::Bytes(b"sessionid=fresh".to_vec()));
        self.settings = settings;

        if let Some(observer) = request.on_login {
            observer.on_login(&self.settings).await?;
        }
        Ok(())
    }

    async fn lookup_user_id(&self, username: &str) -> Result<UserId, ClientError> {
        self.record(Call::Lookup(username.to_string()));
        match self.lookup_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(UserId(self.user_id)),
        }
    }

    async fn fetch_activity_page(
        &self,
        cursor: Option<&str>,
    ) -> Result<ActivityPage, ClientError> {
        self.record(Call::Page(cursor.map(str::to_owned)));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Http("no scripted page left".to_string())))
    }

    fn settings(&self) -> SessionState {
        self.settings.clone()
    }
}

/// A page of stories with the given texts, all at the same timestamp.
pub fn page(texts: &[&str], next: Option<&str>) -> ActivityPage {
    ActivityPage::new(
        texts
            .iter()
            .map(|t| RawActivityEntry::new(*t, 1_600_000_000))
            .collect(),
        next.map(str::to_owned),
    )
}
