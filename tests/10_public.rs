mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = reqwest::get(server.url("/health")).await?;

    // No database is reachable, so the server reports itself degraded
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    assert_eq!(body["data"]["status"], "degraded");
    assert_eq!(body["data"]["storage"], "memory");
    Ok(())
}

#[tokio::test]
async fn root_lists_endpoints() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = reqwest::get(server.url("/")).await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["endpoints"]["csv-files-upload"], "/csv-files-upload/");
    Ok(())
}

#[tokio::test]
async fn openapi_served_as_yaml_and_json() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let yaml = client.get(server.url("/openapi/")).send().await?;
    assert_eq!(yaml.status(), StatusCode::OK);
    let content_type = yaml.headers()[reqwest::header::CONTENT_TYPE].to_str()?.to_string();
    assert!(content_type.starts_with("application/vnd.oai.openapi"), "{}", content_type);
    let text = yaml.text().await?;
    assert!(text.contains("openapi:"), "{}", text);

    let json = client
        .get(server.url("/openapi/"))
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;
    assert_eq!(json.status(), StatusCode::OK);
    let document = json.json::<serde_json::Value>().await?;
    assert_eq!(document["info"]["title"], "Payments API");
    assert!(document["paths"]["/csv-files-upload/"]["post"].is_object());
    assert!(document["paths"].get("/payment-debt/{debt_id}/").is_none());
    Ok(())
}

#[tokio::test]
async fn docs_page_loads_schema() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = reqwest::get(server.url("/docs/")).await?;

    assert_eq!(res.status(), StatusCode::OK);
    let html = res.text().await?;
    assert!(html.contains("/openapi/?format=json"));
    Ok(())
}

#[tokio::test]
async fn server_stops_when_dropped() -> Result<()> {
    let server = common::spawn_server().await?;
    let health = server.url("/health");
    assert!(reqwest::get(&health).await.is_ok());

    drop(server);

    let client = reqwest::Client::builder().timeout(std::time::Duration::from_secs(2)).build()?;
    assert!(client.get(&health).send().await.is_err(), "server still answering after drop");
    Ok(())
}
