mod common;

use std::sync::Arc;

use anyhow::Result;
use facts_api::app::AppState;
use facts_api::auth::JwtVerifier;
use facts_api::database::Fact;
use reqwest::{header, StatusCode};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn creates_fact_owned_by_caller() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let user = Uuid::new_v4();

    let res = reqwest::Client::new()
        .post(server.url("/api/saveFact"))
        .bearer_auth(common::token_for(user))
        .json(&json!({ "factText": "A day on Venus is longer than its year." }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let created = res.json::<Fact>().await?;
    assert_eq!(created.fact_text, "A day on Venus is longer than its year.");
    assert_eq!(created.user_id, user);

    let stored = server.store.all_for(user).await;
    assert_eq!(stored, vec![created]);
    Ok(())
}

#[tokio::test]
async fn response_uses_camel_case_fields() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let body = reqwest::Client::new()
        .post(server.url("/api/saveFact"))
        .bearer_auth(common::token_for(Uuid::new_v4()))
        .json(&json!({ "factText": "Jupiter has the shortest day." }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;

    for field in ["id", "factText", "createdAt", "userId"] {
        assert!(body.get(field).is_some(), "missing {}: {}", field, body);
    }
    assert!(!body["createdAt"].is_null());
    Ok(())
}

#[tokio::test]
async fn ids_are_never_reused() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let mut ids = Vec::new();

    for user in [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()] {
        let fact = client
            .post(server.url("/api/saveFact"))
            .bearer_auth(common::token_for(user))
            .json(&json!({ "factText": "same text" }))
            .send()
            .await?
            .json::<Fact>()
            .await?;
        ids.push(fact.id);
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    Ok(())
}

#[tokio::test]
async fn missing_or_empty_text_is_400_and_stores_nothing() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let token = common::token_for(Uuid::new_v4());

    let bodies = [
        json!({ "factText": "" }),
        json!({ "factText": "   " }),
        json!({ "factText": null }),
        json!({ "factText": 42 }),
        json!({}),
    ];

    for body in bodies {
        let res = client
            .post(server.url("/api/saveFact"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body {} was accepted", body);
        assert_eq!(res.json::<serde_json::Value>().await?, json!({ "error": "factText is required" }));
    }

    let res = client
        .post(server.url("/api/saveFact"))
        .bearer_auth(&token)
        .header(header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert!(server.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn unauthenticated_writes_store_nothing() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let requests = [
        client.post(server.url("/api/saveFact")),
        client.post(server.url("/api/saveFact")).bearer_auth("forged.token.value"),
    ];

    for request in requests {
        let res = request.json(&json!({ "factText": "sneaky" })).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.json::<serde_json::Value>().await?, json!({ "error": "Authentication failed" }));
    }

    assert!(server.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn auth_is_checked_before_body() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = reqwest::Client::new()
        .post(server.url("/api/saveFact"))
        .json(&json!({}))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn wrong_method_is_405_with_allow_post() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = reqwest::Client::new();

    for request in [
        client.get(server.url("/api/saveFact")),
        client.put(server.url("/api/saveFact")).bearer_auth(common::token_for(Uuid::new_v4())),
    ] {
        let res = request.send().await?;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers().get(header::ALLOW).map(|v| v.as_bytes()), Some(&b"POST"[..]));
    }

    assert!(server.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn store_failure_is_a_generic_500() -> Result<()> {
    let verifier = Arc::new(JwtVerifier::new(common::JWT_SECRET, Some(common::AUDIENCE))?);
    let (_port, base_url) = common::serve(AppState::new(verifier, Arc::new(common::BrokenStore))).await?;

    let res = reqwest::Client::new()
        .post(format!("{}/api/saveFact", base_url))
        .bearer_auth(common::token_for(Uuid::new_v4()))
        .json(&json!({ "factText": "lost" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.text().await?;
    assert_eq!(body, r#"{"error":"Error saving fact"}"#);
    Ok(())
}
