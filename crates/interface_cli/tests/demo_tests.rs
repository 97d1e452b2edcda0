//! Demo walkthrough against the seeded in-memory port

use serde_json::json;

use domain_crm::Entity;
use interface_cli::{build_crm, run};
use test_utils::{
    assert_call_count, assert_last_params, assert_not_called, seeded_port, seeded_port_with,
    unlinked_port, CrmFixtures, IdFixtures,
};

#[tokio::test]
async fn test_demo_with_linked_company() {
    let port = seeded_port().await;
    let crm = build_crm(port.clone()).unwrap();
    let mut out = Vec::new();

    let summary = run(&crm, &mut out).await.unwrap();

    assert_eq!(summary.deals_found, 3);
    assert_eq!(summary.inspected_deal, Some(IdFixtures::id(IdFixtures::LINKED_DEAL)));
    assert_eq!(summary.created_company, None);
    assert_eq!(summary.product_rows, 2);
    assert_eq!(summary.sale_deals, 2);
    assert!(summary.note.is_some());
    assert!(summary.created_deal.is_some());

    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("Deals found: 3"));
    assert!(output.contains("- Company: Acme LLC"));
    assert!(output.contains("- Contact: Ivan Petrov"));
    assert!(output.contains("- Total: 1000.00"));
    assert!(output.contains("Title restored to: Windows for the office"));

    assert_not_called(&port, "crm.company.add").await;
    assert_call_count(&port, "crm.company.get", 1).await;
    assert_call_count(&port, "crm.contact.get", 1).await;
}

#[tokio::test]
async fn test_demo_saves_only_changed_fields() {
    let port = seeded_port().await;
    let crm = build_crm(port.clone()).unwrap();

    run(&crm, &mut std::io::sink()).await.unwrap();

    // rename, restore, custom fields
    assert_call_count(&port, "crm.deal.update", 3).await;
    assert_last_params(
        &port,
        "crm.deal.update",
        &json!({
            "id": "1",
            "fields": {"UF_CRM_DELIVERY_ADDRESS": "1 Example st.", "UTM_SOURCE": "google"},
        }),
    )
    .await;

    let deal = port
        .record("deal", &IdFixtures::id(IdFixtures::LINKED_DEAL))
        .await
        .unwrap();
    assert_eq!(deal["TITLE"], json!("Windows for the office"));
    assert_eq!(deal["UTM_SOURCE"], json!("google"));
}

#[tokio::test]
async fn test_demo_creates_and_links_missing_company() {
    let port = unlinked_port().await;
    let crm = build_crm(port.clone()).unwrap();
    let mut out = Vec::new();

    let summary = run(&crm, &mut out).await.unwrap();

    let company_id = summary.created_company.expect("company was created");
    let company = port.record("company", &company_id).await.unwrap();
    assert_eq!(company["TITLE"], json!("Test company"));

    let deal = port
        .record("deal", &IdFixtures::id(IdFixtures::LINKED_DEAL))
        .await
        .unwrap();
    assert_eq!(deal["COMPANY_ID"], json!(company_id.as_str()));
    assert_call_count(&port, "crm.company.add", 1).await;
    assert_not_called(&port, "crm.company.get").await;
}

#[tokio::test]
async fn test_demo_note_and_new_deal() {
    let port = seeded_port().await;
    let crm = build_crm(port.clone()).unwrap();

    let summary = run(&crm, &mut std::io::sink()).await.unwrap();

    assert_last_params(
        &port,
        "crm.timeline.comment.add",
        &json!({
            "fields": {
                "ENTITY_ID": "1",
                "ENTITY_TYPE": "deal",
                "COMMENT": "Test note added through the accessors",
            },
        }),
    )
    .await;

    let created_id = summary.created_deal.unwrap();
    let created = crm.deals().get(&created_id).await.unwrap();
    assert_eq!(created.title().unwrap().as_deref(), Some("Test deal"));
    assert_eq!(created.stage_id().unwrap().as_deref(), Some("NEW"));
    assert_eq!(created.opportunity().unwrap(), Some(rust_decimal_macros::dec!(1000)));
    assert_eq!(created.get("delivery_address").unwrap().as_text(), Some("123 Test st."));
}

#[tokio::test]
async fn test_demo_continues_when_custom_field_is_absent() {
    let port = seeded_port_with(
        CrmFixtures::linked_deal()
            .without("UF_CRM_DELIVERY_ADDRESS")
            .build(),
    )
    .await;
    let crm = build_crm(port.clone()).unwrap();
    let mut out = Vec::new();

    let summary = run(&crm, &mut out).await.unwrap();

    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("Delivery address: -"));
    assert!(output.contains("New delivery address: 1 Example st."));
    assert!(summary.note.is_some());
    assert_eq!(summary.product_rows, 2);
    assert_call_count(&port, "crm.timeline.comment.add", 1).await;
    assert_call_count(&port, "crm.deal.productrows.get", 1).await;
}

#[tokio::test]
async fn test_demo_on_empty_portal() {
    let port = std::sync::Arc::new(domain_crm::MockCrmPort::new());
    let crm = build_crm(port.clone()).unwrap();
    let mut out = Vec::new();

    let summary = run(&crm, &mut out).await.unwrap();

    assert_eq!(summary.deals_found, 0);
    assert_eq!(summary.inspected_deal, None);
    assert!(summary.created_deal.is_some());
    assert!(String::from_utf8(out).unwrap().contains("No deals to inspect"));
    assert_not_called(&port, "crm.deal.update").await;
}

#[tokio::test]
async fn test_demo_stops_on_remote_error() {
    let port = seeded_port().await;
    port.fail_next(
        "crm.deal.list",
        core_kernel::PortError::Unauthorized { message: "Invalid request credentials".into() },
    )
    .await;
    let crm = build_crm(port.clone()).unwrap();

    let err = run(&crm, &mut std::io::sink()).await.unwrap_err();

    assert!(format!("{:#}", err).contains("Invalid request credentials"));
    assert_not_called(&port, "crm.deal.add").await;
}
