mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn only_allow_listed_verbs_are_routed() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::access_token()?;

    let res = client.get(server.url("/payment-debt/")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    let res = client.delete(server.url("/payment-debt/1/")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}

#[tokio::test]
async fn invalid_payload_is_rejected_without_database() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/payment-debt/"))
        .bearer_auth(common::access_token()?)
        .json(&json!({"debt_id": 1, "email": "not-an-email"}))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["email"][0], "Enter a valid email address.");
    assert_eq!(body["field_errors"]["name"][0], "This field is required.");
    Ok(())
}

#[tokio::test]
async fn valid_payload_reports_database_outage() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/payment-debt/"))
        .bearer_auth(common::access_token()?)
        .json(&json!({
            "debt_id": 8291,
            "name": "John Doe",
            "government_id": 11111111111i64,
            "email": "johndoe@kanastra.com.br",
            "debt_amount": "1000000.00",
            "debt_due_date": "2022-10-12"
        }))
        .send()
        .await?;

    assert!(res.status().is_server_error(), "unexpected status: {}", res.status());
    Ok(())
}
