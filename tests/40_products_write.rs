mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use catalog_api::auth::{Claims, TokenIssuer};
use catalog_api::database::models::User;

#[tokio::test]
async fn writes_require_a_bearer_token() -> Result<()> {
    let server = common::spawn_server().await?;
    let widget = json!({ "name": "Widget", "price": 9.99, "quantity": 5 });

    let res = server.client.post(server.url("/products")).json(&widget).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .post(server.url("/products"))
        .header("authorization", "Basic dXNlcjpwdw==")
        .json(&widget)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .post(server.url("/products"))
        .bearer_auth("not.a.token")
        .json(&widget)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let (status, body) = {
        let res = server.client.get(server.url("/products")).send().await?;
        (res.status(), res.json::<Value>().await?)
    };
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalProducts"], 0);
    Ok(())
}

#[tokio::test]
async fn expired_token_is_forbidden() -> Result<()> {
    let server = common::spawn_server().await?;

    // Correctly signed with the server's own secret, but two hours stale
    let issuer = TokenIssuer::from_config(&server.config.security)?;
    let user = User::new("stale".to_string(), "unused-hash".to_string());
    let expired = issuer.sign(&Claims::new(&user, chrono::Duration::hours(-2)))?;

    let res = server
        .client
        .post(server.url("/products"))
        .bearer_auth(&expired)
        .json(&json!({ "name": "Widget", "price": 9.99, "quantity": 5 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(common::message(&res.json::<Value>().await?), "Invalid or expired token");

    // A fresh token from the same issuer passes the guard
    let fresh = issuer.issue(&user)?;
    let res = server
        .client
        .post(server.url("/products"))
        .bearer_auth(&fresh)
        .json(&json!({ "name": "Widget", "price": 9.99, "quantity": 5 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn create_then_fetch() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token_for("writer").await?;

    let created = server
        .create_product(&token, json!({ "name": "Widget", "price": 9.99, "quantity": 5 }))
        .await?;
    assert_eq!(created["name"], "Widget");
    assert_eq!(created["price"], 9.99);
    assert_eq!(created["quantity"], 5);
    let id = created["id"].as_str().unwrap_or_default().to_string();
    assert!(!id.is_empty());

    let res = server.client.get(server.url(&format!("/products/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, created);
    Ok(())
}

#[tokio::test]
async fn create_validates_fields() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token_for("writer").await?;

    let cases = [
        (json!({ "price": 1, "quantity": 1 }), "name is required"),
        (json!({ "name": "X", "quantity": 1 }), "price is required"),
        (json!({ "name": "X", "price": -1, "quantity": 1 }), "price must be greater than or equal to 0"),
        (json!({ "name": "X", "price": 1, "quantity": 1.5 }), "quantity must be a whole number"),
        (json!({ "name": "X", "price": "cheap", "quantity": 1 }), "price must be a number"),
    ];

    for (body, expected) in cases {
        let res = server
            .client
            .post(server.url("/products"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(common::message(&res.json::<Value>().await?), expected);
    }

    // Numeric strings are coerced
    let created = server
        .create_product(&token, json!({ "name": "Gadget", "price": "4.50", "quantity": "3" }))
        .await?;
    assert_eq!(created["price"], 4.5);
    assert_eq!(created["quantity"], 3);
    Ok(())
}

#[tokio::test]
async fn update_merges_and_delete_removes() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token_for("writer").await?;

    let created = server
        .create_product(&token, json!({ "name": "Widget", "price": 9.99, "quantity": 5 }))
        .await?;
    let path = format!("/products/{}", created["id"].as_str().unwrap_or_default());

    let res = server
        .client
        .put(server.url(&path))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 7 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = res.json::<Value>().await?;
    assert_eq!(updated["name"], "Widget");
    assert_eq!(updated["price"], 9.99);
    assert_eq!(updated["quantity"], 7);

    let res = server.client.delete(server.url(&path)).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.client.delete(server.url(&path)).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server.client.get(server.url(&path)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.client.delete(server.url(&path)).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn update_of_unknown_or_malformed_id() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.token_for("writer").await?;

    let res = server
        .client
        .put(server.url("/products/123"))
        .bearer_auth(&token)
        .json(&json!({ "price": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::message(&res.json::<Value>().await?), "Invalid ID format");

    let res = server
        .client
        .put(server.url("/products/67e55044-10b1-426f-9247-bb680e5fe0c8"))
        .bearer_auth(&token)
        .json(&json!({ "price": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
