//! Demo walkthrough
//!
//! Each step prints what it did to `out`. Steps 2 to 6 work on the first
//! listed deal and are skipped when the portal has no deals.

use std::fmt::Display;
use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use rust_decimal::Decimal;

use core_kernel::EntityId;
use domain_crm::{
    Crm, CrmError, CrmPort, CustomField, Deal, Entity, FieldDescriptor, FieldValue, Filter,
};

const DEMO_COMPANY_TITLE: &str = "Test company";
const DEMO_DELIVERY_ADDRESS: &str = "1 Example st.";
const DEMO_UTM_SOURCE: &str = "google";
const DEMO_NOTE: &str = "Test note added through the accessors";

/// Custom deal fields used by the demo
pub fn deal_custom_fields() -> Vec<FieldDescriptor> {
    vec![
        CustomField::plain("utm_source", "UTM_SOURCE"),
        CustomField::text("delivery_address", "UF_CRM_DELIVERY_ADDRESS"),
        CustomField::select("delivery_type", "UF_CRM_DELIVERY_TYPE"),
    ]
}

/// Builds the CRM handle with the demo's custom fields
pub fn build_crm(port: Arc<dyn CrmPort>) -> Result<Crm, CrmError> {
    Crm::builder(port).deal_fields(deal_custom_fields()).build()
}

/// What a demo run touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoSummary {
    pub deals_found: usize,
    pub inspected_deal: Option<EntityId>,
    pub created_company: Option<EntityId>,
    pub note: Option<EntityId>,
    pub product_rows: usize,
    pub sale_deals: usize,
    pub created_deal: Option<EntityId>,
}

/// Runs the walkthrough
pub async fn run<W: Write>(crm: &Crm, out: &mut W) -> anyhow::Result<DemoSummary> {
    let mut summary = DemoSummary::default();

    let deals = crm.deals().get_all().await.context("listing deals")?;
    writeln!(out, "Deals found: {}", deals.len())?;
    summary.deals_found = deals.len();

    match deals.into_iter().next() {
        Some(deal) => inspect_deal(crm, deal, out, &mut summary).await?,
        None => writeln!(out, "No deals to inspect")?,
    }

    let sales = crm
        .deals()
        .filter(Filter::new().eq("type_id", "SALE"))
        .await
        .context("filtering deals")?;
    writeln!(out, "Deals of type SALE: {}", sales.len())?;
    summary.sale_deals = sales.len();

    let created = crm
        .deals()
        .create([
            ("title", FieldValue::from("Test deal")),
            ("opportunity", FieldValue::from(Decimal::from(1000))),
            ("currency_id", FieldValue::from("RUB")),
            ("stage_id", FieldValue::Select("NEW".to_string())),
            ("delivery_address", FieldValue::from("123 Test st.")),
        ])
        .await
        .context("creating deal")?;
    writeln!(out, "Created deal: {} (ID: {})", show(created.title()?), show(created.id()))?;
    summary.created_deal = created.id();

    tracing::info!(?summary, "Demo finished");
    Ok(summary)
}

async fn inspect_deal<W: Write>(
    crm: &Crm,
    mut deal: Deal,
    out: &mut W,
    summary: &mut DemoSummary,
) -> anyhow::Result<()> {
    summary.inspected_deal = deal.id();

    // Relations
    let company = deal.company().await.context("loading company")?;
    let contact = deal.contact().await.context("loading contact")?;

    writeln!(out, "Deal: {} (ID: {})", show(deal.title()?), show(deal.id()))?;
    writeln!(out, "- Created: {}", show(deal.created_at()?))?;
    writeln!(out, "- Amount: {}", show(deal.opportunity()?))?;
    writeln!(out, "- Stage: {}", show(deal.stage_id()?))?;
    match &contact {
        Some(contact) => writeln!(out, "- Contact: {}", contact.full_name())?,
        None => writeln!(out, "- Contact: -")?,
    }

    match company {
        Some(company) => writeln!(out, "- Company: {}", show(company.title()?))?,
        None => {
            let company = crm
                .companies()
                .create([("title", DEMO_COMPANY_TITLE)])
                .await
                .context("creating company")?;
            writeln!(
                out,
                "Created company: {} (ID: {})",
                show(company.title()?),
                show(company.id())
            )?;
            deal.set_company_id(company.id())?;
            deal.save().await.context("linking company")?;
            summary.created_company = company.id();
        }
    }

    // Plain field round trip
    let original_title = deal.title()?.unwrap_or_default();
    deal.set_title(format!("{} (edited)", original_title))?;
    deal.save().await.context("renaming deal")?;
    writeln!(out, "Title changed to: {}", show(deal.title()?))?;
    deal.set_title(original_title)?;
    deal.save().await.context("restoring deal title")?;
    writeln!(out, "Title restored to: {}", show(deal.title()?))?;

    // Custom fields
    writeln!(out, "Delivery address: {}", show_field(deal.get("delivery_address"))?)?;
    writeln!(out, "UTM source: {}", show_field(deal.get("utm_source"))?)?;
    deal.set("delivery_address", DEMO_DELIVERY_ADDRESS)?;
    deal.set("utm_source", DEMO_UTM_SOURCE)?;
    deal.save().await.context("saving custom fields")?;
    writeln!(out, "New delivery address: {}", show_field(deal.get("delivery_address"))?)?;
    writeln!(out, "New UTM source: {}", show_field(deal.get("utm_source"))?)?;

    // Sub-resources
    let note = deal.notes().create(DEMO_NOTE).await.context("adding note")?;
    writeln!(out, "Added note {}: {}", show(note.id()), show(note.text()?))?;
    summary.note = note.id();

    let products = deal.products().get_all().await.context("loading product rows")?;
    writeln!(out, "Product rows: {}", products.len())?;
    if let Some(product) = products.first() {
        writeln!(out, "- Product ID: {}", show(product.id()))?;
        writeln!(out, "- Price: {}", show(product.price()?))?;
        writeln!(out, "- Quantity: {}", show(product.quantity()?))?;
        writeln!(out, "- Total: {}", product.total())?;
    }
    summary.product_rows = products.len();

    Ok(())
}

/// Portals without a custom field omit its key; that reads as `-`
fn show_field(value: Result<FieldValue, CrmError>) -> Result<String, CrmError> {
    match value {
        Ok(value) => Ok(value.to_string()),
        Err(CrmError::MissingField { .. }) => Ok("-".to_string()),
        Err(e) => Err(e),
    }
}

fn show<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
