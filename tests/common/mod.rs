#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use fake::Fake;
use fake::faker::name::en::Name;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use schoolhub::router::init_router;
use schoolhub::testing::TestContext;

pub const PASSWORD: &str = "Secr3t!";
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-an-image";
const BOUNDARY: &str = "schoolhub-boundary-7MA4YWxkTrZu0gW";

pub struct TestApp {
    pub router: Router,
    pub ctx: TestContext,
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

pub fn setup_test_app() -> TestApp {
    app_with_context(TestContext::new())
}

/// Builds the app around a context whose state a test has already adjusted.
pub fn app_with_context(ctx: TestContext) -> TestApp {
    let router = init_router(ctx.state.clone(), None);
    TestApp { router, ctx }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub fn fake_name() -> String {
    Name().fake()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// A `multipart/form-data` request with the given text parts and an optional
/// `image` file part `(content_type, bytes)`.
pub fn multipart_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    image: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"school\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let mut builder = Request::builder().method(method).uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn school_fields(name: &str) -> Vec<(&'static str, String)> {
    vec![
        ("name", name.to_string()),
        ("address", "12 Hill Road".to_string()),
        ("city", "Pune".to_string()),
        ("state", "Maharashtra".to_string()),
        ("contact", "9876543210".to_string()),
        ("email", "office@school.edu".to_string()),
    ]
}

pub fn as_pairs<'a>(fields: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

/// Sends a request and returns the status with the JSON body
/// (`Value::Null` for an empty body).
pub async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub async fn register(app: &TestApp, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            "POST",
            "/auth/register",
            json!({ "name": name, "email": email, "password": password }),
        ),
    )
    .await
}

pub async fn verify(app: &TestApp, email: &str, otp: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request("POST", "/auth/verify-otp", json!({ "email": email, "otp": otp })),
    )
    .await
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "email": email, "password": password }),
        ),
    )
    .await
}

/// The OTP currently stored for `email`.
pub fn stored_otp(app: &TestApp, email: &str) -> String {
    app.ctx
        .users
        .get(email)
        .and_then(|user| user.otp)
        .expect("user should have a pending OTP")
}

/// Registers, verifies and logs in a fresh user.
pub async fn create_verified_user(app: &TestApp) -> TestUser {
    let email = generate_unique_email();

    let (status, _) = register(app, &fake_name(), &email, PASSWORD).await;
    assert_eq!(status, StatusCode::OK);

    let otp = stored_otp(app, &email);
    let (status, _) = verify(app, &email, &otp).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = login(app, &email, PASSWORD).await;
    assert_eq!(status, StatusCode::OK);

    TestUser {
        id: body["user"]["id"].as_str().unwrap().to_string(),
        email,
        token: body["token"].as_str().unwrap().to_string(),
    }
}

/// Creates a school as `user` and returns the response `data`.
pub async fn create_school(app: &TestApp, user: &TestUser, name: &str) -> Value {
    let fields = school_fields(name);
    let (status, body) = send(
        app,
        multipart_request(
            "POST",
            "/schools",
            Some(&user.token),
            &as_pairs(&fields),
            Some(("image/png", PNG_BYTES)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    body["data"].clone()
}
