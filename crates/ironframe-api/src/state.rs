//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! - **Vendors** — the vendor registry the cadence engine evaluates.
//! - **Sink** — the in-memory outbound log, milestone claims, and audit
//!   chain. With a database configured the sink queues every change and
//!   [`AppState::persist_changes`] writes them through to Postgres, one
//!   transaction per batch under the persist lock. Milestone claims go to
//!   Postgres directly through [`AppState::claim_milestone`] before dispatch.
//! - **Cadence config** — milestone toggles and escalation stakeholders.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use ironframe_cadence::{
    AuditActionType, CadenceBucket, CadenceConfig, InMemorySink, Industry, Milestone,
    NotificationSink, RiskTier, VendorRecord,
};
use ironframe_core::{TenantContext, TenantKey};
use parking_lot::RwLock;
use sqlx::PgPool;

use crate::error::AppError;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store keyed by name.
///
/// The lock is `parking_lot` and is never held across an `.await`.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<String, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, key: impl Into<String>, value: T) -> Option<T> {
        self.data.write().insert(key.into(), value)
    }

    /// Insert only if the key is absent. Returns `false` if it was taken.
    pub fn insert_new(&self, key: impl Into<String>, value: T) -> bool {
        let mut guard = self.data.write();
        match guard.entry(key.into()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    /// Retrieve a record by key.
    pub fn get(&self, key: &str) -> Option<T> {
        self.data.read().get(key).cloned()
    }

    /// List all records, ordered by key.
    pub fn list(&self) -> Vec<T> {
        let guard = self.data.read();
        let mut keys: Vec<&String> = guard.keys().collect();
        keys.sort();
        keys.into_iter().filter_map(|k| guard.get(k).cloned()).collect()
    }

    /// Replace the whole contents.
    pub fn replace_all(&self, entries: impl IntoIterator<Item = (String, T)>) {
        let mut guard = self.data.write();
        guard.clear();
        guard.extend(entries);
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Configuration ------------------------------------------------------------

/// Default interval between scheduled cadence evaluations.
pub const DEFAULT_CADENCE_INTERVAL_SECS: u64 = 3600;

/// Process configuration read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Listen port.
    pub port: u16,
    /// Path to a cadence configuration file (YAML or JSON).
    pub cadence_config_path: Option<PathBuf>,
    /// Seconds between scheduled evaluations; `0` disables the job.
    pub cadence_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cadence_config_path: None,
            cadence_interval_secs: DEFAULT_CADENCE_INTERVAL_SECS,
        }
    }
}

impl AppConfig {
    /// Build from `PORT`, `CADENCE_CONFIG`, and `CADENCE_INTERVAL_SECS`.
    /// `DATABASE_URL` is read by [`crate::db::init_pool`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            cadence_config_path: lookup("CADENCE_CONFIG")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            cadence_interval_secs: lookup("CADENCE_INTERVAL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cadence_interval_secs),
        }
    }
}

// -- Seed data ----------------------------------------------------------------

/// The built-in vendor portfolio, with expirations relative to `now`.
pub fn seed_vendors(now: DateTime<Utc>) -> Vec<VendorRecord> {
    use Industry::*;
    use RiskTier::*;
    let seed: [(&str, TenantKey, Industry, RiskTier, i64); 9] = [
        ("Azure Health", TenantKey::Medshield, Healthcare, High, 72),
        ("Stripe", TenantKey::Vaultbank, Finance, High, 42),
        ("SWIFT", TenantKey::Vaultbank, Finance, Critical, 66),
        ("Schneider Electric", TenantKey::Gridcore, Energy, High, 58),
        ("GCP Cloud", TenantKey::Medshield, Healthcare, Low, 110),
        ("Twilio", TenantKey::Vaultbank, Finance, High, 95),
        ("Crowdstrike", TenantKey::Gridcore, Energy, Low, 44),
        ("ServiceNow", TenantKey::Medshield, Healthcare, Low, 84),
        ("Palo Alto Networks", TenantKey::Vaultbank, Finance, Critical, 37),
    ];
    seed.into_iter()
        .map(|(name, tenant, industry, risk_tier, days)| VendorRecord {
            vendor_name: name.to_string(),
            associated_entity: tenant.entity_name().to_string(),
            industry,
            risk_tier,
            document_expiration_date: (now + Duration::days(days)).to_rfc3339(),
            last_request_sent: None,
            current_cadence: CadenceBucket::from_days(days),
            compliance_contact_email: None,
        })
        .collect()
}

// -- AppState -----------------------------------------------------------------

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Vendor registry keyed by vendor name.
    pub vendors: Store<VendorRecord>,
    /// Outbound log, claims, and audit chain.
    pub sink: InMemorySink,
    /// Cadence configuration.
    pub cadence: Arc<CadenceConfig>,
    /// Process configuration.
    pub config: AppConfig,
    /// Postgres pool; `None` runs in-memory only.
    pub db_pool: Option<PgPool>,
    /// Serialises cadence evaluations within this process.
    pub evaluation_lock: Arc<tokio::sync::Mutex<()>>,
    /// Serialises write-through so audit rows land in chain order.
    pub persist_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    /// In-memory state with default configuration and the seed portfolio.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), CadenceConfig::default(), None)
    }

    /// State with explicit configuration. The vendor registry starts with
    /// the seed portfolio; [`hydrate_from_db`](Self::hydrate_from_db)
    /// replaces it when a database holds vendors.
    pub fn with_config(config: AppConfig, cadence: CadenceConfig, db_pool: Option<PgPool>) -> Self {
        let sink = if db_pool.is_some() {
            InMemorySink::with_outbox()
        } else {
            InMemorySink::new()
        };
        let vendors = Store::new();
        for vendor in seed_vendors(Utc::now()) {
            vendors.insert(vendor.vendor_name.clone(), vendor);
        }
        Self {
            vendors,
            sink,
            cadence: Arc::new(cadence),
            config,
            db_pool,
            evaluation_lock: Arc::new(tokio::sync::Mutex::new(())),
            persist_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Require `ctx` to have access to `target`.
    ///
    /// A denial is logged as a security event and appended to the audit
    /// chain as `TENANT_ISOLATION_VIOLATION` before the error is returned.
    pub async fn require_tenant(
        &self,
        ctx: &TenantContext,
        target: TenantKey,
    ) -> Result<(), AppError> {
        let Err(err) = ctx.require(target) else {
            return Ok(());
        };
        let active = ctx.active().map(|k| k.slug()).unwrap_or("none");
        tracing::warn!(
            active_tenant = %active,
            tenant = %target,
            "tenant isolation violation"
        );
        let description = format!(
            "Denied {} access to tenant {} ({})",
            active,
            target.slug(),
            target.id()
        );
        self.sink.append_audit_entry(
            AuditActionType::TenantIsolationViolation,
            Some(target.entity_name()),
            &description,
            Utc::now(),
        )?;
        self.persist_changes().await?;
        Err(err.into())
    }

    /// Load vendors, outbound messages, claims, and the audit chain from
    /// Postgres. A database without vendors is seeded from the registry.
    pub async fn hydrate_from_db(&self) -> Result<(), sqlx::Error> {
        let Some(pool) = &self.db_pool else {
            return Ok(());
        };

        let vendors = crate::db::vendors::load_all(pool).await?;
        if vendors.is_empty() {
            for vendor in self.vendors.list() {
                crate::db::vendors::upsert(pool, &vendor).await?;
            }
        } else {
            self.vendors
                .replace_all(vendors.into_iter().map(|v| (v.vendor_name.clone(), v)));
        }

        let messages = crate::db::outbound::load_all(pool).await?;
        let claims = crate::db::claims::load_all(pool).await?;
        let audit = crate::db::audit::load_all(pool).await?;
        tracing::info!(
            vendors = self.vendors.len(),
            messages = messages.len(),
            claims = claims.len(),
            audit_entries = audit.len(),
            "hydrated state from database"
        );
        self.sink.hydrate(messages, claims, audit);

        let integrity = self.sink.verify_audit_chain();
        if !integrity.chain_valid {
            tracing::error!(
                broken_links = integrity.broken_links,
                "persisted audit chain failed verification"
            );
        }
        Ok(())
    }

    /// Write queued sink changes through to Postgres. No-op without a pool.
    ///
    /// The batch is drained and written under the persist lock in one
    /// transaction. On failure it goes back to the front of the queue and
    /// the next call retries it.
    pub async fn persist_changes(&self) -> Result<(), sqlx::Error> {
        let Some(pool) = &self.db_pool else {
            return Ok(());
        };
        let _guard = self.persist_lock.lock().await;
        let batch = self.sink.drain_changes();
        if batch.is_empty() {
            return Ok(());
        }
        if let Err(e) = crate::db::write_changes(pool, &batch).await {
            tracing::error!(error = %e, pending = batch.len(), "failed to persist sink changes");
            self.sink.requeue_changes(batch);
            return Err(e);
        }
        Ok(())
    }

    /// Durably claim `(vendor_name, milestone)` ahead of dispatch. Without a
    /// pool every claim succeeds here and the in-memory sink decides.
    pub async fn claim_milestone(
        &self,
        vendor_name: &str,
        milestone: Milestone,
    ) -> Result<bool, sqlx::Error> {
        match &self.db_pool {
            Some(pool) => crate::db::claims::insert(pool, vendor_name, milestone).await,
            None => Ok(true),
        }
    }

    /// Drop a durable claim whose dispatch was never recorded.
    pub async fn release_milestone(
        &self,
        vendor_name: &str,
        milestone: Milestone,
    ) -> Result<(), sqlx::Error> {
        match &self.db_pool {
            Some(pool) => crate::db::claims::release(pool, vendor_name, milestone).await,
            None => Ok(()),
        }
    }

    /// Persist a vendor record. No-op without a pool.
    pub async fn persist_vendor(&self, vendor: &VendorRecord) -> Result<(), sqlx::Error> {
        match &self.db_pool {
            Some(pool) => crate::db::vendors::upsert(pool, vendor).await,
            None => Ok(()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironframe_cadence::SinkChange;

    #[test]
    fn config_defaults_without_env() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.cadence_interval_secs, 3600);
    }

    #[test]
    fn config_reads_overrides() {
        let config = AppConfig::from_lookup(|key| match key {
            "PORT" => Some("9090".into()),
            "CADENCE_CONFIG" => Some("/etc/ironframe/cadence.yaml".into()),
            "CADENCE_INTERVAL_SECS" => Some("0".into()),
            _ => None,
        });
        assert_eq!(config.port, 9090);
        assert_eq!(
            config.cadence_config_path,
            Some(PathBuf::from("/etc/ironframe/cadence.yaml"))
        );
        assert_eq!(config.cadence_interval_secs, 0);
    }

    #[test]
    fn seed_portfolio_covers_every_tenant() {
        let vendors = seed_vendors(Utc::now());
        assert_eq!(vendors.len(), 9);
        for tenant in TenantKey::ALL {
            assert!(vendors.iter().any(|v| v.tenant() == Some(tenant)));
        }
        let stripe = vendors.iter().find(|v| v.vendor_name == "Stripe").unwrap();
        assert_eq!(stripe.current_cadence, CadenceBucket::Sixty);
    }

    fn unreachable_pool() -> PgPool {
        sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://ironframe@127.0.0.1:1/ironframe")
            .unwrap()
    }

    #[tokio::test]
    async fn failed_persist_keeps_changes_in_chain_order() {
        let state = AppState::with_config(
            AppConfig::default(),
            CadenceConfig::default(),
            Some(unreachable_pool()),
        );
        state
            .sink
            .append_audit_entry(AuditActionType::EmailSent, Some("VAULTBANK"), "first", Utc::now())
            .unwrap();
        assert!(state.persist_changes().await.is_err());

        state
            .sink
            .append_audit_entry(AuditActionType::EmailSent, Some("VAULTBANK"), "second", Utc::now())
            .unwrap();
        assert!(state.persist_changes().await.is_err());

        let queued: Vec<_> = state
            .sink
            .drain_changes()
            .into_iter()
            .filter_map(|change| match change {
                SinkChange::Audit(entry) => Some(entry),
                _ => None,
            })
            .collect();
        assert_eq!(queued.len(), 2);
        assert_eq!(queued[0].description, "first");
        assert_eq!(queued[1].previous_hash, queued[0].entry_hash);
    }

    #[tokio::test]
    async fn persist_without_pool_is_a_no_op() {
        let state = AppState::new();
        assert!(state.persist_changes().await.is_ok());
        assert!(state.claim_milestone("Stripe", Milestone::Day60).await.unwrap());
    }

    #[test]
    fn store_lists_in_key_order_and_rejects_duplicates() {
        let store: Store<u32> = Store::new();
        assert!(store.insert_new("b", 2));
        assert!(store.insert_new("a", 1));
        assert!(!store.insert_new("a", 3));
        assert_eq!(store.list(), vec![1, 2]);
    }
}
