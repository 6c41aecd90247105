// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::http::StatusCode;
use axum_test::TestServer;
use hrefcount::application::context::AppContext;
use hrefcount::config::settings::Settings;
use hrefcount::presentation::routes;
use serde_json::Value;

use super::helpers::site::{start_test_site, TestSite};

async fn create_test_server(site: &TestSite) -> (TestServer, AppContext) {
    let mut settings = Settings::defaults().unwrap();
    settings.analyzer.urls = vec![site.url("/two"), site.url("/three")];
    settings.retry.max_retries = 0;

    let context = AppContext::build(settings).await.unwrap();
    let server = TestServer::new(routes::routes(context.analyzer.clone())).unwrap();
    (server, context)
}

#[tokio::test]
async fn test_index_and_healthcheck() {
    let site = start_test_site().await;
    let (server, _context) = create_test_server(&site).await;

    let index = server.get("/").await;
    index.assert_status_ok();
    assert_eq!(
        index.json::<Value>()["data"],
        "/v1/tags | /v1/tags/{id} | /healthcheck"
    );

    let health = server.get("/healthcheck").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["data"], "Ok!");
}

#[tokio::test]
async fn test_get_all_tags() {
    let site = start_test_site().await;
    let (server, _context) = create_test_server(&site).await;

    let response = server.get("/v1/tags").await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["urls_processed"], 2);
    assert!(body["total_time"].as_f64().unwrap() >= 0.0);
    assert_eq!(body["data"][0]["id"], 0);
    assert_eq!(body["data"][0]["count"], 2);
    assert_eq!(body["data"][1]["url"], site.url("/three"));
    assert_eq!(body["data"][1]["count"], 3);
    assert!(body["data"][1]["error"].is_null());
}

#[tokio::test]
async fn test_get_single_tag() {
    let site = start_test_site().await;
    let (server, _context) = create_test_server(&site).await;

    let response = server.get("/v1/tags/1").await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["id"], 1);
    assert_eq!(body["data"][0]["count"], 3);
    assert!(body["time"].is_number());
}

#[tokio::test]
async fn test_out_of_range_id_is_unprocessable() {
    let site = start_test_site().await;
    let (server, context) = create_test_server(&site).await;

    let response = server.get("/v1/tags/2").await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let message = response.json::<Value>()["data"].as_str().unwrap().to_string();
    assert!(message.contains("out of range"), "unexpected message: {}", message);
    assert_eq!(site.hits(), 0);

    context.shutdown().await;
}
