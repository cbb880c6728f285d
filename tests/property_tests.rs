//! Property-based tests for lead decoding and storage.

mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use leads_api::services::leads::LeadInput;
use proptest::prelude::*;
use serde_json::json;

fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[A-Za-z '\\-]{1,24}", ".{0,16}"]
}

fn status_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("New".to_string()),
        Just("Contacted".to_string()),
        Just("Qualified".to_string()),
        "[A-Za-z]{1,12}",
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn any_string_fields_decode(
        last_name in text_strategy(),
        company in text_strategy(),
        status in status_strategy(),
        id in prop::option::of(any::<i64>()),
    ) {
        let mut body = json!({ "last_name": last_name, "company": company });
        if let Some(status) = &status {
            body["status"] = json!(status);
        }
        if let Some(id) = id {
            body["id"] = json!(id);
        }

        let input: LeadInput = serde_json::from_value(body).unwrap();
        prop_assert_eq!(&input.last_name, &last_name);
        prop_assert_eq!(&input.company, &company);
        prop_assert_eq!(input.status, status.unwrap_or_else(|| "New".to_string()));
    }

    #[test]
    fn non_string_last_name_is_rejected(n in any::<i64>()) {
        let body = json!({ "last_name": n, "company": "Acme" });
        prop_assert!(serde_json::from_value::<LeadInput>(body).is_err());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn list_length_matches_number_created(
        leads in prop::collection::vec((text_strategy(), text_strategy()), 0..6)
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let app = TestApp::new().await;

            for (i, (last_name, company)) in leads.iter().enumerate() {
                let response = app
                    .request(
                        Method::POST,
                        "/leads",
                        Some(json!({ "last_name": last_name, "company": company })),
                    )
                    .await;
                assert_eq!(response.status(), StatusCode::OK);
                let created = response_json(response).await;
                assert_eq!(created["id"].as_i64().unwrap(), i as i64 + 1);
                assert_eq!(created["last_name"], json!(last_name));
            }

            let listed = response_json(app.request(Method::GET, "/leads", None).await).await;
            assert_eq!(listed.as_array().unwrap().len(), leads.len());
        });
    }
}
