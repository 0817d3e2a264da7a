//! HTTP client for the back-office REST API
//!
//! Wraps a single `reqwest::Client`, attaches the bearer token from the
//! session to every request and exposes verb helpers plus typed CRUD over
//! any `Resource`. A 401 clears the session and surfaces as
//! `AppError::SessionExpired`, leaving the reaction to the caller.

use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::config::EnvironmentConfig;
use crate::models::{
    AttachmentKind, ChatMessage, DriverExpense, DriverPay, Load, Location, LoginRequest,
    LoginResponse, NewChatMessage, Page, RegisterRequest, Resource, Role, TruckExpense, User,
};
use crate::state::{Session, SessionHandle};
use crate::utils::errors::{api_error, not_found_error, AppError, AppResult};

/// One value of a multipart body
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File(PathBuf),
}

/// Ordered multipart body, built before any file is read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    fields: Vec<(String, FormValue)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_text(name, value);
        self
    }

    pub fn file(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.fields.push((name.into(), FormValue::File(path.into())));
        self
    }

    /// Set a text field, replacing an earlier value of the same name
    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.fields.retain(|(existing, _)| *existing != name);
        self.fields.push((name, FormValue::Text(value.into())));
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(FormValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn fields(&self) -> &[(String, FormValue)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Read pending files and build the reqwest multipart form
    pub async fn into_multipart(self) -> AppResult<Form> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = match value {
                FormValue::Text(text) => form.text(name, text),
                FormValue::File(path) => {
                    let bytes = tokio::fs::read(&path).await?;
                    let part = Part::bytes(bytes).file_name(file_name(&path));
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

/// List endpoints answer either a bare array or a paginated envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Plain(Vec<T>),
    Paged(Page<T>),
}

impl<T> ListBody<T> {
    /// Records on this response and the link to the next page, if any
    fn split(self) -> (Vec<T>, Option<String>) {
        match self {
            ListBody::Plain(records) => (records, None),
            ListBody::Paged(page) => (page.results, page.next),
        }
    }
}

/// Client for the back-office API
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: EnvironmentConfig,
    session: SessionHandle,
}

impl ApiClient {
    pub fn new(config: EnvironmentConfig, session: SessionHandle) -> AppResult<Self> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        if config.is_production() && !config.api_base_url.starts_with("https://") {
            warn!("⚠️ Production backend {} is not served over https", config.api_base_url);
        }

        Ok(Self {
            http,
            config,
            session,
        })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            self.config.endpoint(path)
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("➡️ {} {}", method, url);
        self.http.request(method, url)
    }

    async fn expire_session(&self) {
        warn!("❌ Session expired, clearing stored credentials");
        if let Err(e) = self.session.clear().await {
            warn!("Failed to clear session store: {}", e);
        }
    }

    /// Send with the bearer token; 401 expires the session
    async fn send(&self, builder: RequestBuilder) -> AppResult<Response> {
        let session = self.session.snapshot().await;
        if session.is_expired() {
            self.expire_session().await;
            return Err(AppError::SessionExpired);
        }

        let builder = match session.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        debug!("📡 Response status: {}", status);

        if status == StatusCode::UNAUTHORIZED {
            self.expire_session().await;
            return Err(AppError::SessionExpired);
        }

        check_status(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AppResult<T> {
        let response = self.send(builder).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        self.send_json(self.request(Method::GET, path)).await
    }

    pub async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> AppResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send_json(self.request(Method::GET, path).query(query))
            .await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(self.request(Method::POST, path).json(body))
            .await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(self.request(Method::PUT, path).json(body))
            .await
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(self.request(Method::PATCH, path).json(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> AppResult<()> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: FormPayload,
    ) -> AppResult<T> {
        let form = payload.into_multipart().await?;
        self.send_json(self.request(Method::POST, path).multipart(form))
            .await
    }

    pub async fn put_form<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: FormPayload,
    ) -> AppResult<T> {
        let form = payload.into_multipart().await?;
        self.send_json(self.request(Method::PUT, path).multipart(form))
            .await
    }

    pub async fn patch_form<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: FormPayload,
    ) -> AppResult<T> {
        let form = payload.into_multipart().await?;
        self.send_json(self.request(Method::PATCH, path).multipart(form))
            .await
    }

    // ---------------------------------------------------------------
    // Typed CRUD
    // ---------------------------------------------------------------

    /// Every record of a collection; paged answers are followed through `next`
    pub async fn list_all<T: DeserializeOwned>(&self, path: &str) -> AppResult<Vec<T>> {
        let body: ListBody<T> = self.get_json(path).await?;
        let (mut records, mut next) = body.split();

        while let Some(url) = next {
            let page: Page<T> = self.follow_page(&url).await?;
            debug!("📄 {} more records from {}", page.results.len(), url);
            records.extend(page.results);
            next = page.next;
        }
        Ok(records)
    }

    /// Full collection of a resource
    pub async fn list<R: Resource>(&self) -> AppResult<Vec<R>> {
        self.list_all(&R::collection_path()).await
    }

    /// Full collection as raw JSON, for generic screens
    pub async fn list_raw(&self, path: &str) -> AppResult<Vec<Value>> {
        self.list_all(path).await
    }

    /// One record; a 404 becomes `AppError::NotFound`
    pub async fn fetch<R: Resource>(&self, id: i64) -> AppResult<R> {
        self.get_json(&R::record_path(id))
            .await
            .map_err(|e| missing_as_not_found(e, R::NAME, id))
    }

    pub async fn create<R: Resource>(&self, record: &R) -> AppResult<R> {
        self.post_json(&R::collection_path(), record).await
    }

    /// Full update (PUT)
    pub async fn update<R: Resource>(&self, id: i64, record: &R) -> AppResult<R> {
        self.put_json(&R::record_path(id), record).await
    }

    /// Partial update (PATCH) with an arbitrary field subset
    pub async fn partial_update<R: Resource>(&self, id: i64, fields: &Value) -> AppResult<R> {
        self.patch_json(&R::record_path(id), fields).await
    }

    pub async fn remove<R: Resource>(&self, id: i64) -> AppResult<()> {
        self.delete(&R::record_path(id)).await
    }

    // ---------------------------------------------------------------
    // Loads: server-side pagination
    // ---------------------------------------------------------------

    pub async fn list_loads_page(&self, page: u32, size: u32) -> AppResult<Page<Load>> {
        self.get_json_with_query(
            &Load::collection_path(),
            &[("page", page), ("page_size", size)],
        )
        .await
    }

    /// Follow a `next` / `previous` URL from an earlier page
    pub async fn follow_page<T: DeserializeOwned>(&self, url: &str) -> AppResult<Page<T>> {
        self.get_json(url).await
    }

    // ---------------------------------------------------------------
    // Auth
    // ---------------------------------------------------------------

    /// Log in and store the returned tokens in the session
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        request.validate()?;

        // No bearer token and no session expiry on this call
        let response = self
            .request(Method::POST, "/auth/login/")
            .json(&request)
            .send()
            .await?;
        let response = check_status(response).await?;
        let login: LoginResponse = serde_json::from_str(&response.text().await?)?;

        let session = Session::from_login(&login);
        self.session.replace(session.clone()).await?;
        info!("✅ Logged in as user {:?}", session.user_id);
        Ok(session)
    }

    pub async fn register(&self, request: &RegisterRequest) -> AppResult<User> {
        request.validate()?;
        let response = self
            .request(Method::POST, "/auth/register/")
            .json(request)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(serde_json::from_str(&response.text().await?)?)
    }

    pub async fn logout(&self) -> AppResult<()> {
        self.session.clear().await
    }

    pub async fn current_user(&self) -> AppResult<User> {
        let session = self.session.snapshot().await;
        if !session.is_authenticated() {
            return Err(AppError::NotAuthenticated);
        }
        let user_id = session.user_id.ok_or(AppError::NotAuthenticated)?;
        self.fetch::<User>(user_id).await
    }

    pub async fn roles(&self) -> AppResult<Vec<Role>> {
        self.list::<Role>().await
    }

    pub async fn locations(&self) -> AppResult<Vec<Location>> {
        self.list::<Location>().await
    }

    // ---------------------------------------------------------------
    // Nested pay / expense sub-resources
    // ---------------------------------------------------------------

    pub async fn driver_pays(&self, driver_id: i64) -> AppResult<Vec<DriverPay>> {
        self.list_all(&format!("/driver/{}/pay/", driver_id)).await
    }

    pub async fn create_driver_pay(&self, driver_id: i64, pay: &DriverPay) -> AppResult<DriverPay> {
        pay.validate()?;
        self.post_json(&format!("/driver/{}/pay/", driver_id), pay)
            .await
    }

    pub async fn driver_expenses(&self, driver_id: i64) -> AppResult<Vec<DriverExpense>> {
        self.list_all(&format!("/driver/{}/expense/", driver_id))
            .await
    }

    pub async fn create_driver_expense(
        &self,
        driver_id: i64,
        expense: &DriverExpense,
    ) -> AppResult<DriverExpense> {
        expense.validate()?;
        self.post_json(&format!("/driver/{}/expense/", driver_id), expense)
            .await
    }

    pub async fn truck_expenses(&self, truck_id: i64) -> AppResult<Vec<TruckExpense>> {
        self.list_all(&format!("/truck/{}/expense/", truck_id))
            .await
    }

    pub async fn create_truck_expense(
        &self,
        truck_id: i64,
        expense: &TruckExpense,
    ) -> AppResult<TruckExpense> {
        expense.validate()?;
        self.post_json(&format!("/truck/{}/expense/", truck_id), expense)
            .await
    }

    // ---------------------------------------------------------------
    // Load chat
    // ---------------------------------------------------------------

    pub async fn chat_messages(&self, load_id: i64) -> AppResult<Vec<ChatMessage>> {
        self.list_all(&format!("/chat/{}/", load_id)).await
    }

    pub async fn post_chat_message(&self, message: &NewChatMessage) -> AppResult<ChatMessage> {
        message.validate()?;
        self.post_json(&format!("/chat/{}/", message.load_id), message)
            .await
    }

    pub async fn upload_chat_attachment(
        &self,
        load_id: i64,
        kind: AttachmentKind,
        path: &Path,
    ) -> AppResult<ChatMessage> {
        let mut payload = FormPayload::new()
            .text("load_id", load_id.to_string())
            .text("field_name", kind.field_name())
            .file("file", path);
        if let Some(user_id) = self.session.snapshot().await.user_id {
            payload.push_text("user", user_id.to_string());
        }
        self.post_form(&format!("/chat/{}/", load_id), payload).await
    }
}

pub(crate) fn missing_as_not_found(error: AppError, resource: &str, id: i64) -> AppError {
    match error {
        AppError::Api {
            status: StatusCode::NOT_FOUND,
            ..
        } => not_found_error(resource, id),
        other => other,
    }
}

/// Turn non-2xx responses into `AppError::Api` carrying the backend message
async fn check_status(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!("❌ Request failed with status {}: {}", status, body);
    Err(api_error(status, &body))
}
