//! End-to-end test: the real actix-web server, driven over HTTP with reqwest.
//!
//! The server runs on the in-memory repository, so no database is needed:
//!
//!   cargo test --test e2e_test

use std::time::Duration;

use invoice_ledger::{build_server, AppService, InMemoryInvoiceRepository};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

fn free_port() -> u16 {
    // Bind to port 0 to let the OS assign a free port, then release it.
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind failed")
        .local_addr()
        .expect("addr failed")
        .port()
}

/// Start the service in a background task and wait until it answers.
async fn start_app() -> String {
    let port = free_port();
    let service = AppService::boxed(InMemoryInvoiceRepository::new());
    let server = build_server(service, "127.0.0.1", port).expect("Failed to bind the service");
    tokio::spawn(server);

    let app_url = format!("http://127.0.0.1:{}", port);
    let client = Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .unwrap();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        if tokio::time::Instant::now() > deadline {
            panic!("service did not become ready within 10s");
        }
        if client.get(format!("{}/health", app_url)).send().await.is_ok() {
            return app_url;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

fn invoice_body(client_name: &str) -> Value {
    json!({
        "client_name": client_name,
        "date": "2024-01-15",
        "due_date": "2024-02-15",
        "line_items": [
            { "description": "Dev", "quantity": 10, "unit_price": 150.50 },
            { "description": "Design", "quantity": 5, "unit_price": 200.00 }
        ]
    })
}

async fn create(http: &Client, app_url: &str, client_name: &str) -> Value {
    let resp = http
        .post(format!("{}/invoices", app_url))
        .json(&invoice_body(client_name))
        .send()
        .await
        .expect("Failed to POST /invoices");
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("invalid create response")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_invoice_lifecycle() {
    let app_url = start_app().await;
    let http = Client::new();

    // ── 1. Create ────────────────────────────────────────────────────────────
    let created = create(&http, &app_url, "Acme").await;
    let id = created["id"].as_str().expect("missing id").to_string();
    assert_eq!(created["total_amount"].as_f64(), Some(2505.0));
    assert_eq!(created["payment_status"], "pending");
    assert_eq!(created["line_items"].as_array().unwrap().len(), 2);

    // ── 2. Read back ─────────────────────────────────────────────────────────
    let fetched: Value = http
        .get(format!("{}/invoices/{}", app_url, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);

    // ── 3. Update without line items keeps the total ─────────────────────────
    tokio::time::sleep(Duration::from_millis(5)).await;
    let renamed: Value = http
        .patch(format!("{}/invoices/{}", app_url, id))
        .json(&json!({ "client_name": "Acme Corp" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(renamed["client_name"], "Acme Corp");
    assert_eq!(renamed["total_amount"].as_f64(), Some(2505.0));
    assert_eq!(renamed["line_items"], created["line_items"]);
    assert_ne!(renamed["updated_at"], created["updated_at"]);

    // ── 4. Replace line items ────────────────────────────────────────────────
    let replaced: Value = http
        .patch(format!("{}/invoices/{}", app_url, id))
        .json(&json!({
            "line_items": [
                { "description": "New Item 1", "quantity": 3, "unit_price": 15.50 },
                { "description": "New Item 2", "quantity": 2, "unit_price": 22.75 }
            ]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(replaced["total_amount"].as_f64(), Some(92.0));
    let old_ids: Vec<&Value> = created["line_items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| &l["id"])
        .collect();
    for line in replaced["line_items"].as_array().unwrap() {
        assert!(!old_ids.contains(&&line["id"]));
    }

    // ── 5. Mark paid ─────────────────────────────────────────────────────────
    let paid: Value = http
        .post(format!("{}/invoices/{}/mark-paid", app_url, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(paid["payment_status"], "paid");
    assert_eq!(paid["total_amount"].as_f64(), Some(92.0));
    assert!(paid.get("line_items").is_none());

    // ── 6. Print ─────────────────────────────────────────────────────────────
    let resp = http
        .get(format!("{}/invoices/{}/print", app_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let text = resp.text().await.unwrap();
    assert!(text.contains("Acme Corp"));
    assert!(text.contains("VAT"));

    // ── 7. Delete twice ──────────────────────────────────────────────────────
    for expected in [true, false] {
        let body: Value = http
            .delete(format!("{}/invoices/{}", app_url, id))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["success"], expected);
    }
    let resp = http
        .get(format!("{}/invoices/{}", app_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_is_newest_first_and_filterable() {
    let app_url = start_app().await;
    let http = Client::new();

    let empty: Vec<Value> = http
        .get(format!("{}/invoices", app_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(empty.is_empty());

    let a = create(&http, &app_url, "A").await;
    let b = create(&http, &app_url, "B").await;
    let c = create(&http, &app_url, "C").await;

    let listed: Vec<Value> = http
        .get(format!("{}/invoices", app_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = listed
        .iter()
        .map(|i| i["client_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["C", "B", "A"]);
    assert!(listed.iter().all(|i| i.get("line_items").is_none()));

    http.post(format!("{}/invoices/{}/mark-paid", app_url, b["id"].as_str().unwrap()))
        .send()
        .await
        .unwrap();
    let paid: Vec<Value> = http
        .get(format!("{}/invoices?status=paid", app_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0]["id"], b["id"]);

    let pending: Vec<Value> = http
        .get(format!("{}/invoices?status=pending", app_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let pending_ids: Vec<&Value> = pending.iter().map(|i| &i["id"]).collect();
    assert_eq!(pending_ids, vec![&c["id"], &a["id"]]);
}

#[tokio::test]
async fn test_validation_and_missing_ids() {
    let app_url = start_app().await;
    let http = Client::new();

    let mut body = invoice_body("Acme");
    body["line_items"][0]["unit_price"] = json!(0);
    let resp = http
        .post(format!("{}/invoices", app_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: Value = resp.json().await.unwrap();
    assert!(err["error"].as_str().unwrap().contains("unit price"));

    let resp = http
        .post(format!("{}/invoices", app_url))
        .json(&json!({ "client_name": "Acme" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let missing = Uuid::new_v4();
    let resp = http
        .post(format!("{}/invoices/{}/mark-paid", app_url, missing))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = http
        .delete(format!("{}/invoices/{}", app_url, missing))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], false);

    let listed: Vec<Value> = http
        .get(format!("{}/invoices", app_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty(), "rejected creates must not leave rows behind");
}
