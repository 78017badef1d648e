use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use orgchart_server::{router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    _dir: TempDir,
    app: Router,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(dir.path().join("orgchart.sqlite3"));
        Self {
            _dir: dir,
            app: router(state),
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let raw = body.map(|value| value.to_string());
        self.send_raw(method, uri, raw).await
    }

    async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(text) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(text)
            }
            None => Body::empty(),
        };
        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_department(&self, name: &str, parent_id: Option<i64>) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/departments",
                Some(json!({ "name": name, "parent_id": parent_id })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["id"].as_i64().unwrap()
    }

    async fn create_employee(&self, department_id: i64, full_name: &str, position: &str) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                &format!("/departments/{department_id}/employees"),
                Some(json!({ "full_name": full_name, "position": position })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn department_detail_lists_one_level() {
    let app = TestApp::new();
    let engineering = app.create_department("  Engineering ", None).await;
    let backend = app.create_department("Backend", Some(engineering)).await;
    app.create_department("Databases", Some(backend)).await;
    let lead = app.create_employee(engineering, "Ada Lovelace", "Director").await;

    let (status, body) = app
        .send(Method::GET, &format!("/departments/{engineering}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], engineering);
    assert_eq!(body["name"], "Engineering");
    assert_eq!(body["parent_id"], Value::Null);

    let children = body["children"].as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["id"], backend);
    assert_eq!(children[0]["parent_id"], engineering);

    let employees = body["employees"].as_array().unwrap();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0]["id"], lead);
}

#[tokio::test]
async fn employee_round_trips_hire_date() {
    let app = TestApp::new();
    let sales = app.create_department("Sales", None).await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/departments/{sales}/employees"),
            Some(json!({
                "full_name": " Grace Hopper ",
                "position": "Account Executive",
                "hired_at": "2021-03-15"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full_name"], "Grace Hopper");
    assert_eq!(body["hired_at"], "2021-03-15");

    let id = body["id"].as_i64().unwrap();
    let (status, fetched) = app.send(Method::GET, &format!("/employees/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn patch_renames_and_moves_to_root() {
    let app = TestApp::new();
    let parent = app.create_department("Operations", None).await;
    let child = app.create_department("Logistics", Some(parent)).await;

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/departments/{child}"),
            Some(json!({ "name": "Supply Chain" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Supply Chain");
    assert_eq!(body["parent_id"], parent);

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/departments/{child}"),
            Some(json!({ "parent_id": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parent_id"], Value::Null);
}

#[tokio::test]
async fn patch_rejects_cycles_and_self_parent() {
    let app = TestApp::new();
    let a = app.create_department("A", None).await;
    let b = app.create_department("B", Some(a)).await;
    let c = app.create_department("C", Some(b)).await;

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/departments/{a}"),
            Some(json!({ "parent_id": c })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("cycle"));

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/departments/{a}"),
            Some(json!({ "parent_id": a })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.send(Method::GET, &format!("/departments/{a}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parent_id"], Value::Null);
}

#[tokio::test]
async fn duplicate_name_is_conflict() {
    let app = TestApp::new();
    app.create_department("Finance", None).await;
    let (status, body) = app
        .send(Method::POST, "/departments", Some(json!({ "name": "Finance" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn reassign_delete_moves_employees_and_removes_source() {
    let app = TestApp::new();
    let a = app.create_department("Research", None).await;
    let b = app.create_department("Development", None).await;
    let jane = app.create_employee(a, "Jane Doe", "Scientist").await;

    let (status, body) = app
        .send(
            Method::DELETE,
            &format!("/departments/{a}?mode=reassign&reassign_to_department_id={b}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, employee) = app
        .send(Method::GET, &format!("/employees/{jane}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(employee["department_id"], b);

    let (status, body) = app.send(Method::GET, &format!("/departments/{a}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn cascade_delete_removes_subtree() {
    let app = TestApp::new();
    let root = app.create_department("Marketing", None).await;
    let child = app.create_department("Brand", Some(root)).await;
    let employee = app.create_employee(child, "Linus Pauling", "Designer").await;

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/departments/{root}?mode=cascade"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send(Method::GET, &format!("/departments/{child}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .send(Method::GET, &format!("/employees/{employee}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_rejects_bad_mode_and_target() {
    let app = TestApp::new();
    let a = app.create_department("Legal", None).await;
    let child = app.create_department("Compliance", Some(a)).await;

    for query in [
        "",
        "?mode=purge",
        "?mode=reassign",
        "?mode=reassign&reassign_to_department_id=abc",
    ] {
        let (status, body) = app
            .send(Method::DELETE, &format!("/departments/{a}{query}"), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query `{query}`: {body}");
    }

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/departments/{a}?mode=reassign&reassign_to_department_id={a}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/departments/{a}?mode=reassign&reassign_to_department_id={child}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/departments/{a}?mode=reassign&reassign_to_department_id=9999"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(Method::GET, &format!("/departments/{a}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_input_is_bad_request() {
    let app = TestApp::new();
    let dept = app.create_department("Support", None).await;

    let (status, body) = app.send(Method::GET, "/departments/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("abc"));

    let (status, _) = app.send(Method::GET, "/employees/1.5", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send_raw(Method::POST, "/departments", Some("{not json".to_string()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::POST, "/departments", Some(json!({ "name": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/departments/{dept}/employees"),
            Some(json!({ "full_name": "", "position": "Agent" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_entities_are_not_found() {
    let app = TestApp::new();

    let (status, _) = app.send(Method::GET, "/departments/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(Method::GET, "/employees/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::POST,
            "/departments",
            Some(json!({ "name": "Orphan", "parent_id": 42 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::PATCH,
            "/departments/42",
            Some(json!({ "name": "Ghost" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::DELETE, "/departments/42?mode=cascade", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Missing department wins over a malformed body.
    let (status, _) = app
        .send_raw(
            Method::POST,
            "/departments/42/employees",
            Some("{not json".to_string()),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send_raw(
            Method::PATCH,
            "/departments/42",
            Some("{not json".to_string()),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_with_malformed_body_on_existing_department_is_bad_request() {
    let app = TestApp::new();
    let dept = app.create_department("Research", None).await;

    let (status, _) = app
        .send_raw(
            Method::PATCH,
            &format!("/departments/{dept}"),
            Some("{not json".to_string()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/departments/{dept}"),
            Some(json!({ "parent_id": "three" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
