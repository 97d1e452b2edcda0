//! Pre-built Test Fixtures
//!
//! Remote-shaped records and an in-memory port seeded with a small, fixed
//! CRM: one company, one contact and three deals. Ids are stable so tests can
//! refer to them directly.

use std::sync::Arc;

use rust_decimal_macros::dec;
use serde_json::{json, Value};

use core_kernel::EntityId;
use domain_crm::MockCrmPort;

use crate::builders::{DealRecordBuilder, ProductRowBuilder};

/// Fixture timestamps in the CRM's RFC 3339 form
pub struct TimestampFixtures;

impl TimestampFixtures {
    pub fn created() -> &'static str {
        "2024-03-01T10:15:00+03:00"
    }

    pub fn modified() -> &'static str {
        "2024-03-05T16:40:00+03:00"
    }
}

/// Stable ids of the seeded records
pub struct IdFixtures;

impl IdFixtures {
    pub const COMPANY: u64 = 10;
    pub const CONTACT: u64 = 20;
    /// Linked to the company and the contact, has product rows
    pub const LINKED_DEAL: u64 = 1;
    /// `SERVICE` deal without links
    pub const SERVICE_DEAL: u64 = 2;
    /// Second `SALE` deal without links
    pub const SALE_DEAL: u64 = 3;

    pub fn id(raw: u64) -> EntityId {
        EntityId::from(raw)
    }
}

/// Remote payloads for the seeded records
pub struct CrmFixtures;

impl CrmFixtures {
    pub fn company() -> Value {
        json!({
            "ID": IdFixtures::COMPANY.to_string(),
            "TITLE": "Acme LLC",
            "COMPANY_TYPE": "CUSTOMER",
            "INDUSTRY": "MANUFACTURING",
            "EMPLOYEES": "EMPLOYEES_2",
            "REVENUE": "2500000.00",
            "CURRENCY_ID": "RUB",
            "COMMENTS": "",
            "ASSIGNED_BY_ID": "1",
            "DATE_CREATE": TimestampFixtures::created(),
            "DATE_MODIFY": TimestampFixtures::modified(),
        })
    }

    pub fn contact() -> Value {
        json!({
            "ID": IdFixtures::CONTACT.to_string(),
            "NAME": "Ivan",
            "SECOND_NAME": "",
            "LAST_NAME": "Petrov",
            "POST": "Procurement manager",
            "TYPE_ID": "CLIENT",
            "COMPANY_ID": IdFixtures::COMPANY.to_string(),
            "COMMENTS": "",
            "ASSIGNED_BY_ID": "1",
            "DATE_CREATE": TimestampFixtures::created(),
            "DATE_MODIFY": TimestampFixtures::modified(),
        })
    }

    pub fn linked_deal() -> DealRecordBuilder {
        DealRecordBuilder::new()
            .with_id(IdFixtures::LINKED_DEAL)
            .with_title("Windows for the office")
            .with_type("SALE")
            .with_opportunity(dec!(1500.00))
            .with_company(IdFixtures::COMPANY)
            .with_contact(IdFixtures::CONTACT)
    }

    pub fn service_deal() -> DealRecordBuilder {
        DealRecordBuilder::new()
            .with_id(IdFixtures::SERVICE_DEAL)
            .with_title("Maintenance contract")
            .with_type("SERVICE")
            .with_stage("WON")
            .with_opportunity(dec!(300.00))
            .with("CLOSED", "Y")
    }

    pub fn sale_deal() -> DealRecordBuilder {
        DealRecordBuilder::new()
            .with_id(IdFixtures::SALE_DEAL)
            .with_title("Roof repair")
            .with_type("SALE")
            .with_opportunity(dec!(9000.00))
    }

    pub fn product_rows() -> Vec<Value> {
        vec![
            ProductRowBuilder::new("Window frame", dec!(250.00), dec!(4))
                .with_id(101)
                .for_deal(IdFixtures::LINKED_DEAL)
                .build(),
            ProductRowBuilder::new("Glass pane", dec!(99.90), dec!(1.5))
                .with_id(102)
                .for_deal(IdFixtures::LINKED_DEAL)
                .build(),
        ]
    }
}

/// Returns a mock port holding the standard fixture records
pub async fn seeded_port() -> Arc<MockCrmPort> {
    seeded_port_with(CrmFixtures::linked_deal().build()).await
}

/// Like [`seeded_port`], but the first deal has no company linked
pub async fn unlinked_port() -> Arc<MockCrmPort> {
    seeded_port_with(CrmFixtures::linked_deal().with("COMPANY_ID", "0").build()).await
}

/// Seeds the standard fixtures with `first_deal` in place of the linked deal
pub async fn seeded_port_with(first_deal: Value) -> Arc<MockCrmPort> {
    let port = Arc::new(MockCrmPort::new());
    port.insert("company", CrmFixtures::company()).await;
    port.insert("contact", CrmFixtures::contact()).await;
    port.insert("deal", first_deal).await;
    port.insert("deal", CrmFixtures::service_deal().build()).await;
    port.insert("deal", CrmFixtures::sale_deal().build()).await;
    port.set_product_rows(&IdFixtures::id(IdFixtures::LINKED_DEAL), CrmFixtures::product_rows())
        .await;
    port
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_port_holds_fixtures() {
        let port = seeded_port().await;

        let deal = port
            .record("deal", &IdFixtures::id(IdFixtures::LINKED_DEAL))
            .await
            .unwrap();
        assert_eq!(deal["COMPANY_ID"], json!("10"));
        assert!(port.record("company", &IdFixtures::id(IdFixtures::COMPANY)).await.is_some());
        assert_eq!(port.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_unlinked_port_clears_company() {
        let port = unlinked_port().await;

        let deal = port
            .record("deal", &IdFixtures::id(IdFixtures::LINKED_DEAL))
            .await
            .unwrap();
        assert_eq!(deal["COMPANY_ID"], json!("0"));
    }
}
