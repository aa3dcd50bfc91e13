mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{message, results, TestServer, ADMIN_USERNAME};

#[tokio::test]
async fn health_is_public() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await?;
    assert_eq!(results(&body)["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn login_returns_token_and_profile() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;

    let (status, body) = server.post("/admin/profil", Some(&token), json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message(&body), "Fetched admin profile successfully");
    assert_eq!(results(&body)["admin"]["Username"], ADMIN_USERNAME);
    assert_eq!(results(&body)["token"], token.as_str());
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let server = TestServer::start().await?;
    server.admin_token().await?;

    let (status, body) = server
        .post(
            "/admin/login",
            None,
            json!({"username": ADMIN_USERNAME, "password": "wrong"}),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["data"].get("results").is_none());

    let (status, _) = server
        .post("/admin/login", None, json!({"username": "nobody", "password": "x"}))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn protected_routes_check_the_header() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = server.post("/student/all", None, json!({})).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message(&body), "No Authorization header provided");

    let res = server
        .client
        .post(server.url("/student/all"))
        .header("Authorization", "Token abc")
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await?;
    assert_eq!(message(&body), "Invalid Authorization header format");

    let (status, _) = server.post("/student/all", Some("not-a-jwt"), json!({})).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_revokes_database_checked_routes() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;

    let (status, body) = server.post("/admin/logout", Some(&token), json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message(&body), "Logout successful");

    let (status, _) = server.post("/admin/profil", Some(&token), json!({})).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Admin creation only verifies the signature
    let (status, body) = server
        .post(
            "/admin/create",
            Some(&token),
            json!({"username": "second", "password": "pw", "email": "s@example.com", "fullName": "Second"}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message(&body), "Admin created successfully");
    assert_eq!(results(&body)["Username"], "second");
    assert!(results(&body).get("Password").is_none());

    let (status, _) = server
        .post("/admin/login", None, json!({"username": "second", "password": "pw"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
