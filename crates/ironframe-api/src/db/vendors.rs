//! Vendor registry persistence.

use ironframe_cadence::VendorRecord;
use sqlx::PgPool;

use super::{enum_to_text, text_to_enum};

/// Insert or update a vendor by name.
pub async fn upsert(pool: &PgPool, vendor: &VendorRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO vendors (vendor_name, associated_entity, industry, risk_tier,
         document_expiration_date, last_request_sent, current_cadence,
         compliance_contact_email, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
         ON CONFLICT (vendor_name) DO UPDATE SET
           associated_entity = EXCLUDED.associated_entity,
           industry = EXCLUDED.industry,
           risk_tier = EXCLUDED.risk_tier,
           document_expiration_date = EXCLUDED.document_expiration_date,
           last_request_sent = EXCLUDED.last_request_sent,
           current_cadence = EXCLUDED.current_cadence,
           compliance_contact_email = EXCLUDED.compliance_contact_email,
           updated_at = NOW()",
    )
    .bind(&vendor.vendor_name)
    .bind(&vendor.associated_entity)
    .bind(enum_to_text(&vendor.industry, "industry")?)
    .bind(enum_to_text(&vendor.risk_tier, "risk tier")?)
    .bind(&vendor.document_expiration_date)
    .bind(vendor.last_request_sent)
    .bind(vendor.current_cadence.as_str())
    .bind(&vendor.compliance_contact_email)
    .execute(pool)
    .await?;
    Ok(())
}

/// Load every vendor, ordered by name.
pub async fn load_all(pool: &PgPool) -> Result<Vec<VendorRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, VendorRow>(
        "SELECT vendor_name, associated_entity, industry, risk_tier,
         document_expiration_date, last_request_sent, current_cadence,
         compliance_contact_email
         FROM vendors ORDER BY vendor_name",
    )
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(VendorRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct VendorRow {
    vendor_name: String,
    associated_entity: String,
    industry: String,
    risk_tier: String,
    document_expiration_date: String,
    last_request_sent: Option<chrono::DateTime<chrono::Utc>>,
    current_cadence: String,
    compliance_contact_email: Option<String>,
}

impl VendorRow {
    fn into_record(self) -> Result<VendorRecord, sqlx::Error> {
        Ok(VendorRecord {
            industry: text_to_enum(&self.industry, "industry")?,
            risk_tier: text_to_enum(&self.risk_tier, "risk tier")?,
            current_cadence: text_to_enum(&self.current_cadence, "cadence bucket")?,
            vendor_name: self.vendor_name,
            associated_entity: self.associated_entity,
            document_expiration_date: self.document_expiration_date,
            last_request_sent: self.last_request_sent,
            compliance_contact_email: self.compliance_contact_email,
        })
    }
}
