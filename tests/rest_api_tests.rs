//! REST API endpoint tests (tower test utilities, no server needed).

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use text2sql::config::HttpConfig;
use text2sql::database::{DatabaseDriver, DatabaseResult};
use text2sql::protocol::rest::create_router;
use text2sql::{
    ColumnSchema, DatabaseError, DatabaseManager, DatabaseSchema, ForeignKey, GenerationSettings,
    LanguageModel, ModelError, QueryResult, TableSchema, Text2Sql,
};
use tower::ServiceExt;

/// In-memory shop database: fixed schema, echoes the SQL it was given.
#[derive(Default)]
struct ShopDriver {
    fail: bool,
    introspections: AtomicUsize,
    executed: Mutex<Vec<String>>,
}

#[async_trait]
impl DatabaseDriver for ShopDriver {
    async fn introspect(&self) -> DatabaseResult<DatabaseSchema> {
        self.introspections.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DatabaseError::Connection(
                "could not connect to server".to_string(),
            ));
        }
        Ok(DatabaseSchema::from_tables(vec![
            TableSchema::new("customers")
                .column(ColumnSchema::new("id", "integer"))
                .column(ColumnSchema::new("name", "text"))
                .primary_key("id"),
            TableSchema::new("orders")
                .column(ColumnSchema::new("id", "integer"))
                .column(ColumnSchema::new("customer_id", "integer"))
                .primary_key("id")
                .foreign_key(ForeignKey::new("customer_id", "customers", "id")),
        ]))
    }

    async fn query(&self, sql: &str) -> DatabaseResult<QueryResult> {
        self.executed.lock().push(sql.to_string());
        if sql.contains("missing_table") {
            return Err(DatabaseError::Query(
                "relation \"missing_table\" does not exist".to_string(),
            ));
        }
        Ok(QueryResult::new(
            vec!["name".to_string(), "orders".to_string()],
            vec![vec![json!("alice"), json!(3)], vec![json!("bob"), json!(1)]],
        ))
    }
}

/// Model that answers with a fixed text and records prompts.
struct ScriptedModel {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn broken() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, prompt: &str, _max_new_tokens: usize) -> Result<String, ModelError> {
        self.prompts.lock().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| ModelError::Other("model crashed".to_string()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct TestApp {
    router: axum::Router,
    driver: Arc<ShopDriver>,
    model: Arc<ScriptedModel>,
}

fn create_test_app_with(driver: ShopDriver, model: ScriptedModel) -> TestApp {
    let driver = Arc::new(driver);
    let model = Arc::new(model);
    let database = Arc::new(DatabaseManager::new(driver.clone()));
    let service = Arc::new(Text2Sql::new(
        database,
        model.clone(),
        GenerationSettings::default(),
    ));
    TestApp {
        router: create_router(service, &HttpConfig::default()),
        driver,
        model,
    }
}

fn create_test_app(reply: &str) -> TestApp {
    create_test_app_with(ShopDriver::default(), ScriptedModel::replying(reply))
}

async fn send_json_request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let req = match method {
        "GET" => Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
        "POST" => Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_string(&body.unwrap_or(json!({}))).unwrap(),
            ))
            .unwrap(),
        _ => panic!("Unsupported method"),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!({}));
    (status, json)
}

// Health

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app("");
    let (status, json) = send_json_request(&app.router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["schema_cached"], false);
}

// Schema

#[tokio::test]
async fn test_get_database_schema() {
    let app = create_test_app("");
    let (status, json) =
        send_json_request(&app.router, "POST", "/get_database_schema", Some(json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    let schema = json["schema"].as_str().unwrap();
    assert!(schema.starts_with("Table: customers\n  Columns: id (integer), name (text)\n"));
    assert!(schema.contains("\n\nTable: orders\n"));
    assert!(schema.contains("  Foreign Key: customer_id references customers(id)\n"));
}

#[tokio::test]
async fn test_schema_is_introspected_once() {
    let app = create_test_app("no sql here");

    send_json_request(&app.router, "POST", "/get_database_schema", None).await;
    send_json_request(&app.router, "POST", "/get_database_schema", None).await;
    send_json_request(
        &app.router,
        "POST",
        "/generate_sql",
        Some(json!({"query": "q", "tables": ["orders"]})),
    )
    .await;

    assert_eq!(app.driver.introspections.load(Ordering::SeqCst), 1);
    let (_, health) = send_json_request(&app.router, "GET", "/health", None).await;
    assert_eq!(health["schema_cached"], true);
}

#[tokio::test]
async fn test_schema_failure_is_reported_in_body() {
    let app = create_test_app_with(
        ShopDriver {
            fail: true,
            ..ShopDriver::default()
        },
        ScriptedModel::replying(""),
    );

    let (status, json) =
        send_json_request(&app.router, "POST", "/get_database_schema", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "error");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("could not connect to server"));

    // failures are not cached: the next call tries again
    send_json_request(&app.router, "POST", "/get_database_schema", None).await;
    assert_eq!(app.driver.introspections.load(Ordering::SeqCst), 2);
}

// Generation

#[tokio::test]
async fn test_generate_sql_with_rows() {
    let reply = "Join customers to orders and count.\n\
                 ```sql\nSELECT c.name, count(*) AS orders FROM customers c JOIN orders o ON o.customer_id = c.id GROUP BY c.name\n```";
    let app = create_test_app(reply);

    let (status, json) = send_json_request(
        &app.router,
        "POST",
        "/generate_sql",
        Some(json!({"query": "Orders per customer?", "tables": ["customers", "orders"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["sql_query"], reply);
    assert_eq!(
        json["execute_query"],
        json!({
            "columns": ["name", "orders"],
            "data": [["alice", 3], ["bob", 1]],
            "row_count": 2
        })
    );
    assert_eq!(
        app.driver.executed.lock().as_slice(),
        ["SELECT c.name, count(*) AS orders FROM customers c JOIN orders o ON o.customer_id = c.id GROUP BY c.name"]
    );
}

#[tokio::test]
async fn test_generate_sql_prompt_uses_selected_tables_only() {
    let app = create_test_app("none");

    send_json_request(
        &app.router,
        "POST",
        "/generate_sql",
        Some(json!({"query": "List customers", "tables": ["customers"]})),
    )
    .await;

    let prompts = app.model.prompts.lock();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Table: customers"));
    assert!(!prompts[0].contains("Table: orders"));
    assert!(prompts[0].contains("Question:\nList customers"));
}

#[tokio::test]
async fn test_generate_sql_without_fence() {
    let app = create_test_app("This question is not related to the database.");

    let (status, json) = send_json_request(
        &app.router,
        "POST",
        "/generate_sql",
        Some(json!({"query": "What is the capital of France?", "tables": ["customers"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["sql_query"],
        "This question is not related to the database."
    );
    assert!(json["execute_query"].is_null());
    assert!(app.driver.executed.lock().is_empty());
}

#[tokio::test]
async fn test_generate_sql_rejects_writes_without_touching_database() {
    let app = create_test_app("```sql\nUPDATE customers SET name = 'x'\n```");

    let (status, json) = send_json_request(
        &app.router,
        "POST",
        "/generate_sql",
        Some(json!({"query": "rename everyone", "tables": ["customers"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["execute_query"], json!({"error": "Query not supported."}));
    assert!(app.driver.executed.lock().is_empty());
}

#[tokio::test]
async fn test_generate_sql_unterminated_fence_is_unsupported() {
    let app = create_test_app("```sql\nSELECT * FROM customers");

    let (_, json) = send_json_request(
        &app.router,
        "POST",
        "/generate_sql",
        Some(json!({"query": "all customers", "tables": ["customers"]})),
    )
    .await;

    assert_eq!(json["execute_query"]["error"], "Query not supported.");
}

#[tokio::test]
async fn test_generate_sql_execution_error_is_inline() {
    let app = create_test_app("```sql\nSELECT * FROM missing_table\n```");

    let (status, json) = send_json_request(
        &app.router,
        "POST",
        "/generate_sql",
        Some(json!({"query": "q", "tables": ["customers"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["execute_query"]["error"],
        "relation \"missing_table\" does not exist"
    );
}

#[tokio::test]
async fn test_generate_sql_model_failure() {
    let app = create_test_app_with(ShopDriver::default(), ScriptedModel::broken());

    let (status, json) = send_json_request(
        &app.router,
        "POST",
        "/generate_sql",
        Some(json!({"query": "q", "tables": ["customers"]})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"detail": "Internal server error"}));
}

#[tokio::test]
async fn test_generate_sql_schema_failure() {
    let app = create_test_app_with(
        ShopDriver {
            fail: true,
            ..ShopDriver::default()
        },
        ScriptedModel::replying("```sql\nSELECT 1\n```"),
    );

    let (status, json) = send_json_request(
        &app.router,
        "POST",
        "/generate_sql",
        Some(json!({"query": "q", "tables": ["customers"]})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["detail"], "Internal server error");
    assert!(app.model.prompts.lock().is_empty());
}

#[tokio::test]
async fn test_generate_sql_malformed_body() {
    let app = create_test_app("");

    let (status, _) = send_json_request(
        &app.router,
        "POST",
        "/generate_sql",
        Some(json!({"tables": ["customers"]})),
    )
    .await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_concurrent_generations_share_schema() {
    let app = create_test_app("```sql\nSELECT 1\n```");
    // warm the cache so every request below reads it
    send_json_request(&app.router, "POST", "/get_database_schema", None).await;

    let mut handles = Vec::new();
    for i in 0..16 {
        let router = app.router.clone();
        handles.push(tokio::spawn(async move {
            send_json_request(
                &router,
                "POST",
                "/generate_sql",
                Some(json!({"query": format!("question {i}"), "tables": ["orders"]})),
            )
            .await
        }));
    }
    for handle in handles {
        let (status, json) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["execute_query"]["row_count"], 2);
    }

    assert_eq!(app.driver.introspections.load(Ordering::SeqCst), 1);
    assert_eq!(app.driver.executed.lock().len(), 16);
}
