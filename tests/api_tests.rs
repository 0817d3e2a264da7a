//! Client behaviour against a fake back-office API served over HTTP

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Map, Value};

use fleet_admin::client::ApiClient;
use fleet_admin::commands::records::{self, ListArgs};
use fleet_admin::config::EnvironmentConfig;
use fleet_admin::models::{
    Attachment, AttachmentKind, Driver, Load, LoadStage, ResourceKind, Truck,
};
use fleet_admin::services::dashboard::{fetch_dashboard, summarize};
use fleet_admin::services::forms::{submit_create, submit_update};
use fleet_admin::services::load_workflow::{AttachOutcome, LoadWizard, Transition};
use fleet_admin::services::screens::{driver_edit_context, load_detail};
use fleet_admin::state::{Session, SessionHandle};
use fleet_admin::utils::errors::{AppError, GENERIC_ERROR_MESSAGE};

#[derive(Debug, Clone)]
struct Seen {
    method: &'static str,
    path: String,
    authorization: Option<String>,
    fields: Vec<(String, String)>,
}

#[derive(Clone)]
struct Backend {
    base: String,
    seen: Arc<Mutex<Vec<Seen>>>,
    trucks: Arc<Mutex<HashMap<i64, Value>>>,
    trailers_down: Arc<AtomicBool>,
}

impl Backend {
    fn record(&self, method: &'static str, path: &str, headers: &HeaderMap, fields: Vec<(String, String)>) {
        self.seen.lock().unwrap().push(Seen {
            method,
            path: path.to_string(),
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            fields,
        });
    }

    fn requests(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|seen| format!("{} {}", seen.method, seen.path))
            .collect()
    }

    fn stored_truck(&self, id: i64) -> Option<Value> {
        self.trucks.lock().unwrap().get(&id).cloned()
    }
}

fn revoked(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "Bearer revoked-token")
        .unwrap_or(false)
}

async fn multipart_fields(mut multipart: Multipart) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.unwrap();
        let value = match file_name {
            Some(file_name) => format!("file:{}", file_name),
            None => String::from_utf8_lossy(&bytes).into_owned(),
        };
        fields.push((name, value));
    }
    fields
}

async fn login(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    backend.record("POST", "/auth/login/", &headers, vec![]);
    if body["password"] == "secret" {
        Json(json!({ "access": "token-abc", "refresh": "refresh-abc", "user_id": 4, "role": 2 }))
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "No active account found with the given credentials" })),
        )
            .into_response()
    }
}

async fn list_drivers(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record("GET", "/driver/", &headers, vec![]);
    if revoked(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Token is invalid" }))).into_response();
    }
    Json(json!([
        { "id": 1, "first_name": "Dana", "last_name": "Reyes", "driver_status": "ACTIVE" },
        { "id": 2, "first_name": "Omar", "last_name": "Haddad", "rate_per_mile": "" }
    ]))
    .into_response()
}

async fn get_driver(State(backend): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    backend.record("GET", &format!("/driver/{}/", id), &headers, vec![]);
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response()
}

async fn list_trucks(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record("GET", "/truck/", &headers, vec![]);
    let trucks: Vec<Value> = backend.trucks.lock().unwrap().values().cloned().collect();
    Json(trucks).into_response()
}

async fn create_truck(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    backend.record("POST", "/truck/", &headers, vec![]);
    let has_unit = body["unit_number"].as_str().map(|u| !u.is_empty()).unwrap_or(false);
    if !has_unit {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "unit_number": ["This field is required."] })),
        )
            .into_response();
    }

    let mut trucks = backend.trucks.lock().unwrap();
    let id = 100 + trucks.len() as i64;
    body["id"] = json!(id);
    trucks.insert(id, body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_truck(State(backend): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    backend.record("GET", &format!("/truck/{}/", id), &headers, vec![]);
    match backend.stored_truck(id) {
        Some(truck) => Json(truck).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response(),
    }
}

async fn put_truck(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    backend.record("PUT", &format!("/truck/{}/", id), &headers, vec![]);
    body["id"] = json!(id);
    backend.trucks.lock().unwrap().insert(id, body.clone());
    Json(body).into_response()
}

async fn patch_truck(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    backend.record("PATCH", &format!("/truck/{}/", id), &headers, vec![]);
    let mut trucks = backend.trucks.lock().unwrap();
    let Some(Value::Object(stored)) = trucks.get_mut(&id) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response();
    };
    stored.extend(body);
    Json(Value::Object(stored.clone())).into_response()
}

async fn list_trailers(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record("GET", "/trailer/", &headers, vec![]);
    if backend.trailers_down.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "detail": "Trailers are offline" })))
            .into_response();
    }
    Json(json!([{ "id": 8, "trailer_number": "TR-8", "trailer_status": "ACTIVE" }])).into_response()
}

async fn broken(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record("GET", "/broken/", &headers, vec![]);
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>upstream exploded</html>").into_response()
}

async fn list_dispatchers(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record("GET", "/dispatcher/", &headers, vec![]);
    Json(json!([{ "id": 6, "first_name": "Lee", "last_name": "Park" }])).into_response()
}

async fn list_brokers(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record("GET", "/customer_broker/", &headers, vec![]);
    Json(json!([])).into_response()
}

async fn get_load(State(backend): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    backend.record("GET", &format!("/load/{}/", id), &headers, vec![]);
    if id != 77 {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response();
    }
    Json(json!({
        "id": 77,
        "load_status": "COVERED",
        "truck": 3,
        "trailer": { "id": 8, "trailer_number": "TR-8" },
        "dispatcher": null
    }))
    .into_response()
}

async fn list_loads(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    backend.record("GET", "/load/", &headers, vec![]);
    let page = query.get("page").map(String::as_str).unwrap_or("1");
    let body = if page == "1" {
        json!({
            "count": 2,
            "next": format!("{}/load/?page=2&page_size=1", backend.base),
            "previous": null,
            "results": [{ "id": 1, "load_status": "OPEN" }]
        })
    } else {
        json!({
            "count": 2,
            "next": null,
            "previous": format!("{}/load/?page=1&page_size=1", backend.base),
            "results": [{ "id": 2, "load_status": "DELIVERED" }]
        })
    };
    Json(body).into_response()
}

async fn create_load(State(backend): State<Backend>, headers: HeaderMap, multipart: Multipart) -> Response {
    let fields = multipart_fields(multipart).await;
    let status = fields
        .iter()
        .find(|(name, _)| name == "load_status")
        .map(|(_, value)| value.clone())
        .unwrap_or_default();
    backend.record("POST", "/load/", &headers, fields);
    (
        StatusCode::CREATED,
        Json(json!({
            "id": 55,
            "load_status": status,
            "bill_of_lading": "https://files.test/bol.pdf"
        })),
    )
        .into_response()
}

async fn patch_load(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Response {
    let fields = multipart_fields(multipart).await;
    backend.record("PATCH", &format!("/load/{}/", id), &headers, fields);
    Json(json!({ "id": id, "rate_confirmation": "https://files.test/rc.pdf" })).into_response()
}

async fn serve() -> Backend {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/api", listener.local_addr().unwrap());
    let backend = Backend {
        base,
        seen: Arc::new(Mutex::new(Vec::new())),
        trucks: Arc::new(Mutex::new(HashMap::from([(
            3,
            json!({ "id": 3, "unit_number": "U-3", "truck_status": "ACTIVE" }),
        )]))),
        trailers_down: Arc::new(AtomicBool::new(false)),
    };

    let app = Router::new()
        .route("/api/auth/login/", post(login))
        .route("/api/driver/", get(list_drivers))
        .route("/api/driver/:id/", get(get_driver))
        .route("/api/truck/", get(list_trucks).post(create_truck))
        .route("/api/truck/:id/", get(get_truck).put(put_truck).patch(patch_truck))
        .route("/api/trailer/", get(list_trailers))
        .route("/api/dispatcher/", get(list_dispatchers))
        .route("/api/customer_broker/", get(list_brokers))
        .route("/api/broken/", get(broken))
        .route("/api/load/", get(list_loads).post(create_load))
        .route("/api/load/:id/", get(get_load).patch(patch_load))
        .with_state(backend.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    backend
}

fn client_for(backend: &Backend, session: Session) -> ApiClient {
    ApiClient::new(
        EnvironmentConfig::with_base_url(&backend.base),
        SessionHandle::in_memory(session),
    )
    .unwrap()
}

fn logged_in() -> Session {
    Session {
        access_token: Some("token-abc".into()),
        user_id: Some(4),
        role_id: Some(2),
        ..Session::default()
    }
}

fn form(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn temp_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fleet-admin-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.4 test").unwrap();
    path
}

#[tokio::test]
async fn test_login_stores_session_and_sends_bearer() {
    let backend = serve().await;
    let client = client_for(&backend, Session::default());

    let session = client.login("dispatch@fleet.test", "secret").await.unwrap();
    assert_eq!(session.access_token.as_deref(), Some("token-abc"));
    assert_eq!(session.role_id, Some(2));
    assert_eq!(client.session().snapshot().await, session);

    let drivers = client.list::<Driver>().await.unwrap();
    assert_eq!(drivers.len(), 2);
    assert_eq!(drivers[0].full_name(), "Dana Reyes");
    assert_eq!(drivers[1].rate_per_mile, None);

    let requests = backend.requests();
    assert_eq!(requests[0].authorization, None);
    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer token-abc"));
}

#[tokio::test]
async fn test_rejected_login_is_an_api_error() {
    let backend = serve().await;
    let client = client_for(&backend, Session::default());

    match client.login("dispatch@fleet.test", "wrong").await {
        Err(AppError::Api { status, message }) => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(message, "No active account found with the given credentials");
        }
        other => panic!("unexpected result: {:?}", other.map(|s| s.user_id)),
    }
    assert!(!client.session().snapshot().await.is_authenticated());
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let backend = serve().await;
    let client = client_for(
        &backend,
        Session {
            access_token: Some("revoked-token".into()),
            load_id: Some(12),
            ..logged_in()
        },
    );

    let result = client.list::<Driver>().await;
    assert!(matches!(result, Err(AppError::SessionExpired)));
    assert_eq!(client.session().snapshot().await, Session::default());
}

#[tokio::test]
async fn test_expired_token_fails_without_request() {
    let backend = serve().await;
    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &json!({ "exp": chrono::Utc::now().timestamp() - 10 }),
        &jsonwebtoken::EncodingKey::from_secret(b"k"),
    )
    .unwrap();
    let client = client_for(
        &backend,
        Session {
            access_token: Some(expired),
            ..Session::default()
        },
    );

    assert!(matches!(client.list::<Driver>().await, Err(AppError::SessionExpired)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_error_messages() {
    let backend = serve().await;
    let client = client_for(&backend, logged_in());

    match client.create(&Truck::default()).await {
        Err(AppError::Api { status, message }) => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(message, "unit_number: This field is required.");
        }
        other => panic!("unexpected result: {:?}", other.is_ok()),
    }

    match client.list_raw("/broken/").await {
        Err(AppError::Api { message, .. }) => assert_eq!(message, GENERIC_ERROR_MESSAGE),
        other => panic!("unexpected result: {:?}", other.is_ok()),
    }

    assert!(matches!(client.fetch::<Driver>(99).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_load_pagination() {
    let backend = serve().await;
    let client = client_for(&backend, logged_in());

    let first = client.list_loads_page(1, 1).await.unwrap();
    assert_eq!(first.count, 2);
    assert_eq!(first.results[0].id, Some(1));
    assert!(first.has_next());
    assert!(!first.has_previous());

    let second = client
        .follow_page::<Load>(first.next.as_deref().unwrap())
        .await
        .unwrap();
    assert_eq!(second.results[0].id, Some(2));
    assert!(!second.has_next());
}

#[tokio::test]
async fn test_wizard_creates_then_attaches() {
    let backend = serve().await;
    let client = client_for(&backend, logged_in());

    let mut load: Load = serde_json::from_value(json!({
        "reference_id": "R-1",
        "customer_broker": 10,
        "load_pay": "1000",
        "total_miles": 500
    }))
    .unwrap();
    load.set_attachment(
        AttachmentKind::BillOfLading,
        Some(Attachment::Pending(temp_file("bol.pdf"))),
    );

    let mut wizard = LoadWizard::new(Arc::new(client.clone()), client.session().clone(), load);
    let transition = wizard.next().await.unwrap();
    assert_eq!(
        transition,
        Transition::Advanced {
            from: LoadStage::Open,
            to: LoadStage::Covered
        }
    );
    assert_eq!(wizard.load().id, Some(55));
    assert_eq!(client.session().load_id().await, Some(55));
    assert_eq!(
        wizard.load().attachment(AttachmentKind::BillOfLading),
        Some(&Attachment::Stored("https://files.test/bol.pdf".into()))
    );

    let created = &backend.requests()[0];
    assert_eq!(created.method, "POST");
    let field = |name: &str| {
        created
            .fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    };
    assert_eq!(field("load_status").as_deref(), Some("COVERED"));
    assert_eq!(field("customer_broker").as_deref(), Some("10"));
    assert_eq!(field("pickup_date").as_deref(), Some(""));
    assert_eq!(field("bill_of_lading").as_deref(), Some("file:bol.pdf"));
    assert_eq!(field("driver"), None);

    let outcome = wizard
        .attach(AttachmentKind::RateConfirmation, temp_file("rc.pdf"))
        .await
        .unwrap();
    assert_eq!(outcome, AttachOutcome::Uploaded);

    let patched = &backend.requests()[1];
    assert_eq!(patched.method, "PATCH");
    assert_eq!(patched.path, "/load/55/");
    assert_eq!(
        patched.fields,
        vec![
            ("rate_confirmation".to_string(), "file:rc.pdf".to_string()),
            ("role".to_string(), "2".to_string()),
        ]
    );
    assert_eq!(patched.authorization.as_deref(), Some("Bearer token-abc"));
}

#[tokio::test]
async fn test_list_follows_every_page() {
    let backend = serve().await;
    let client = client_for(&backend, logged_in());

    let loads = client.list::<Load>().await.unwrap();
    let ids: Vec<Option<i64>> = loads.iter().map(|load| load.id).collect();
    assert_eq!(ids, vec![Some(1), Some(2)]);
    assert_eq!(backend.paths(), vec!["GET /load/", "GET /load/"]);

    let raw = client.list_raw("/load/").await.unwrap();
    assert_eq!(raw.len(), 2);
}

#[tokio::test]
async fn test_dashboard_counts_every_load() {
    let backend = serve().await;
    let client = client_for(&backend, logged_in());

    let data = fetch_dashboard(&client).await.unwrap();
    let summary = summarize(&data);
    assert_eq!(summary.total_loads, 2);
    assert_eq!(summary.load_status_counts["OPEN"], 1);
    assert_eq!(summary.load_status_counts["DELIVERED"], 1);
    assert_eq!(summary.total_dispatchers, 1);
    assert_eq!(summary.total_brokers, 0);
    assert_eq!(summary.trailer_status_counts["ACTIVE"], 1);
}

#[tokio::test]
async fn test_one_failed_list_fails_the_dashboard() {
    let backend = serve().await;
    backend.trailers_down.store(true, Ordering::SeqCst);
    let client = client_for(&backend, logged_in());

    match fetch_dashboard(&client).await {
        Err(AppError::Api { status, message }) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(message, "Trailers are offline");
        }
        other => panic!("unexpected result: {:?}", other.map(|data| data.loads.len())),
    }
}

#[tokio::test]
async fn test_driver_edit_context_fails_with_missing_driver() {
    let backend = serve().await;
    let client = client_for(&backend, logged_in());

    let result = driver_edit_context(&client, 99).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(backend.paths().contains(&"GET /driver/99/".to_string()));
}

#[tokio::test]
async fn test_load_detail_fetches_only_bare_ids() {
    let backend = serve().await;
    let client = client_for(&backend, logged_in());

    let detail = load_detail(&client, 77).await.unwrap();
    assert_eq!(detail.load.id, Some(77));
    assert_eq!(detail.truck.and_then(|t| t.unit_number).as_deref(), Some("U-3"));
    assert_eq!(detail.trailer.and_then(|t| t.trailer_number).as_deref(), Some("TR-8"));
    assert!(detail.dispatcher.is_none());

    assert_eq!(backend.paths(), vec!["GET /load/77/", "GET /truck/3/"]);
}

#[tokio::test]
async fn test_created_record_reads_back() {
    let backend = serve().await;
    let client = client_for(&backend, logged_in());

    let created = submit_create(
        &client,
        ResourceKind::Truck,
        form(json!({
            "unit_number": "T-9",
            "make": "Volvo",
            "year": "2020",
            "current_mileage": ""
        })),
    )
    .await
    .unwrap();
    let id = created["id"].as_i64().unwrap();

    let stored = backend.stored_truck(id).unwrap();
    assert_eq!(stored["year"], json!(2020));
    assert_eq!(stored["current_mileage"], Value::Null);

    let truck: Truck = client.fetch(id).await.unwrap();
    assert_eq!(truck.unit_number.as_deref(), Some("T-9"));
    assert_eq!(truck.make.as_deref(), Some("Volvo"));
    assert_eq!(truck.year, Some(2020));
    assert_eq!(truck.current_mileage, None);
}

#[tokio::test]
async fn test_update_put_replaces_and_patch_merges() {
    let backend = serve().await;
    let client = client_for(&backend, logged_in());

    submit_update(
        &client,
        ResourceKind::Truck,
        3,
        form(json!({ "unit_number": "U-3", "year": "2021" })),
        false,
    )
    .await
    .unwrap();
    assert_eq!(
        backend.stored_truck(3).unwrap(),
        json!({ "id": 3, "unit_number": "U-3", "year": 2021 })
    );

    submit_update(
        &client,
        ResourceKind::Truck,
        3,
        form(json!({ "current_mileage": "120500" })),
        true,
    )
    .await
    .unwrap();
    let truck: Truck = client.fetch(3).await.unwrap();
    assert_eq!(truck.year, Some(2021));
    assert_eq!(truck.current_mileage.map(|m| m.to_string()).as_deref(), Some("120500"));

    assert_eq!(
        backend.paths(),
        vec!["PUT /truck/3/", "PATCH /truck/3/", "GET /truck/3/"]
    );
}

#[tokio::test]
async fn test_invalid_full_update_is_not_sent() {
    let backend = serve().await;
    let client = client_for(&backend, logged_in());

    let result = submit_update(&client, ResourceKind::Truck, 3, form(json!({ "year": "2021" })), false).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(backend.requests().is_empty());
}

fn list_args(resource: ResourceKind) -> ListArgs {
    ListArgs {
        resource,
        search: String::new(),
        field: "all".into(),
        status: None,
        page: None,
        size: None,
        all_pages: false,
        json: true,
    }
}

#[tokio::test]
async fn test_failed_list_screen_is_left_empty() {
    let backend = serve().await;
    backend.trailers_down.store(true, Ordering::SeqCst);
    let client = client_for(&backend, logged_in());

    records::list(&client, list_args(ResourceKind::Trailer)).await.unwrap();
    assert_eq!(backend.paths(), vec!["GET /trailer/"]);

    let revoked = client_for(
        &backend,
        Session {
            access_token: Some("revoked-token".into()),
            ..logged_in()
        },
    );
    let result = records::list(&revoked, list_args(ResourceKind::Driver)).await;
    assert!(matches!(result, Err(AppError::SessionExpired)));
}
