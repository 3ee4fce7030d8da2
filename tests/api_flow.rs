use std::net::SocketAddr;
use std::sync::Arc;

use gigwire::{AppState, auth::token::JwtKeys, db, hub::ChatHub};
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;

async fn start_server() -> SocketAddr {
    let db_pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::init_schema(&db_pool).await.unwrap();

    let app = gigwire::app(AppState {
        db_pool,
        jwt: JwtKeys::new("api-flow-test-secret"),
        hub: Arc::new(ChatHub::new()),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn register(client: &reqwest::Client, addr: SocketAddr, email: &str, role: &str) -> i64 {
    let res = client
        .post(format!("http://{addr}/auth/register"))
        .json(&json!({
            "email": email,
            "password": "hunter2!",
            "role": role,
            "name": "Test User",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["role"], role);
    body["id"].as_i64().unwrap()
}

async fn login(client: &reqwest::Client, addr: SocketAddr, email: &str) -> String {
    let res = client
        .post(format!("http://{addr}/auth/login"))
        .form(&[("username", email), ("password", "hunter2!")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn register_login_and_job_lifecycle() {
    let addr = start_server().await;
    let client = reqwest::Client::new();

    register(&client, addr, "ada@example.com", "client").await;
    register(&client, addr, "bob@example.com", "freelancer").await;
    let ada = login(&client, addr, "ada@example.com").await;
    let bob = login(&client, addr, "bob@example.com").await;

    // Only clients may post jobs.
    let res = client
        .post(format!("http://{addr}/jobs/create"))
        .bearer_auth(&bob)
        .json(&json!({"title": "Nope", "description": "A thing", "budget": 10}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 405);

    // Payload validation mirrors the listing rules: no empty descriptions.
    let res = client
        .post(format!("http://{addr}/jobs/create"))
        .bearer_auth(&ada)
        .json(&json!({"title": "Build a site", "description": "", "budget": 500}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 422);

    let res = client
        .post(format!("http://{addr}/jobs/create"))
        .bearer_auth(&ada)
        .json(&json!({"title": "Build a site", "description": "Static site", "budget": 500}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let job: Value = res.json().await.unwrap();
    assert_eq!(job["status"], "open");
    let job_id = job["id"].as_i64().unwrap();

    // Filtered listing finds it; a disjoint budget window does not.
    let listed: Value = client
        .get(format!("http://{addr}/jobs/?title=site&min_budget=100"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let empty: Value = client
        .get(format!("http://{addr}/jobs/?max_budget=50"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(empty.as_array().unwrap().is_empty());

    // Edits are owner-only.
    let res = client
        .patch(format!("http://{addr}/jobs/{job_id}"))
        .bearer_auth(&bob)
        .json(&json!({"budget": 600}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);
    let res = client
        .patch(format!("http://{addr}/jobs/{job_id}"))
        .bearer_auth(&ada)
        .json(&json!({"budget": 600}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let job: Value = res.json().await.unwrap();
    assert_eq!(job["budget"], 600);
    assert_eq!(job["title"], "Build a site");
}

#[tokio::test]
async fn accepting_a_proposal_creates_a_contract_and_closes_the_job() {
    let addr = start_server().await;
    let client = reqwest::Client::new();

    let ada_id = register(&client, addr, "ada@example.com", "client").await;
    let bob_id = register(&client, addr, "bob@example.com", "freelancer").await;
    let ada = login(&client, addr, "ada@example.com").await;
    let bob = login(&client, addr, "bob@example.com").await;

    let job: Value = client
        .post(format!("http://{addr}/jobs/create"))
        .bearer_auth(&ada)
        .json(&json!({"title": "Build a site", "description": "Static site", "budget": 500}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let job_id = job["id"].as_i64().unwrap();

    // Clients cannot bid on their own listings.
    let res = client
        .post(format!("http://{addr}/proposals/{job_id}"))
        .bearer_auth(&ada)
        .json(&json!({"bid_amount": 450}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 405);

    let proposal: Value = client
        .post(format!("http://{addr}/proposals/{job_id}"))
        .bearer_auth(&bob)
        .json(&json!({"bid_amount": 450, "cover_letter": "I build sites"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let proposal_id = proposal["id"].as_i64().unwrap();

    // Only the job owner may accept.
    let res = client
        .post(format!("http://{addr}/contracts/{proposal_id}"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 405);

    let res = client
        .post(format!("http://{addr}/contracts/{proposal_id}"))
        .bearer_auth(&ada)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let contract: Value = res.json().await.unwrap();
    assert_eq!(contract["status"], "ongoing");
    assert_eq!(contract["amount"], 450);
    assert_eq!(contract["client_id"].as_i64().unwrap(), ada_id);
    assert_eq!(contract["freelancer_id"].as_i64().unwrap(), bob_id);

    let jobs: Value = client
        .get(format!("http://{addr}/jobs/?status=closed"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(jobs.as_array().unwrap().len(), 1);

    // Both parties see the contract; each side lists exactly one.
    for tok in [&ada, &bob] {
        let contracts: Value = client
            .get(format!("http://{addr}/contracts/"))
            .bearer_auth(tok)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(contracts.as_array().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn collection_routes_accept_both_slash_forms() {
    let addr = start_server().await;
    let client = reqwest::Client::new();

    register(&client, addr, "ada@example.com", "client").await;
    let ada = login(&client, addr, "ada@example.com").await;

    for path in ["/jobs", "/jobs/"] {
        let res = client
            .get(format!("http://{addr}{path}"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200, "GET {path}");
    }
    for path in ["/proposals", "/proposals/", "/contracts", "/contracts/"] {
        let res = client
            .get(format!("http://{addr}{path}"))
            .bearer_auth(&ada)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200, "GET {path}");
    }
}

#[tokio::test]
async fn authentication_is_required_and_checked() {
    let addr = start_server().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{addr}/contracts/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let res = client
        .get(format!("http://{addr}/contracts/"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    register(&client, addr, "ada@example.com", "client").await;
    let res = client
        .post(format!("http://{addr}/auth/login"))
        .form(&[("username", "ada@example.com"), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Not Authenticated");
}
