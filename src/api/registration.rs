//! Arrival and departure registrations and the QR scan-and-verify workflow.
//!
//! A scan resolves a verification code to a record. A record that is not yet
//! verified is fetched in full so the officer can compare it with the
//! traveller before confirming with an explicit verify call. A record that
//! was verified earlier ends the workflow with an informational notice.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{ApiError, Result};
use crate::http::{ApiClient, Body};
use crate::models::{
    ArrivalDetail, ArrivalSummary, Departure, Identified, ScanRequest, ScanResponse,
    Verification, VerifyRequest, VerifyResponse,
};
use crate::notify::{Notice, NoticeLevel};
use crate::store::{FilterKey, MutationPolicy, Resource, ResourceStore};

pub struct Arrivals;

impl Resource for Arrivals {
    const NAME: &'static str = "arrivals";
    const PATH: &'static str = "/arrival";
    const FILTERS: &'static [FilterKey] = &[
        FilterKey::same("entry_name"),
        FilterKey::same("passport_number"),
        FilterKey::same("visa_number"),
        FilterKey::same("black_list"),
        FilterKey::same("is_verified"),
        FilterKey::same("verification_code"),
    ];
    const POLICY: MutationPolicy = MutationPolicy::PatchById;

    type Item = ArrivalSummary;
    type Detail = ArrivalDetail;
}

pub struct Departures;

impl Resource for Departures {
    const NAME: &'static str = "departures";
    const PATH: &'static str = "/departure";
    const FILTERS: &'static [FilterKey] = &[
        FilterKey::same("departure_name"),
        FilterKey::same("passport_number"),
        FilterKey::same("black_list"),
        FilterKey::same("is_verified"),
        FilterKey::same("verification_code"),
    ];
    const POLICY: MutationPolicy = MutationPolicy::PatchById;

    type Item = Departure;
    type Detail = Departure;
}

/// Result of a successful scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome<D> {
    /// The record awaits the officer's confirmation; `detail` is now the
    /// store's current record.
    PendingVerification { id: i64, detail: D },
    /// The record was verified earlier. Nothing changed.
    AlreadyVerified { id: i64, verified_at: DateTime<Utc> },
}

impl<D> ScanOutcome<D> {
    pub fn id(&self) -> i64 {
        match self {
            ScanOutcome::PendingVerification { id, .. } | ScanOutcome::AlreadyVerified { id, .. } => *id,
        }
    }

    pub fn is_already_verified(&self) -> bool {
        matches!(self, ScanOutcome::AlreadyVerified { .. })
    }
}

/// Result of a verify call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerifyOutcome {
    pub id: i64,
    pub verified_at: Option<DateTime<Utc>>,
}

/// A registration store: list/detail state with coalesced list calls, plus
/// scan and verify.
pub struct RegistrationStore<R: Resource> {
    records: ResourceStore<R>,
    verifying: AtomicBool,
}

impl<R: Resource> Deref for RegistrationStore<R> {
    type Target = ResourceStore<R>;

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl<R> RegistrationStore<R>
where
    R: Resource,
    R::Item: Verification,
    R::Detail: Verification,
{
    pub fn new(client: ApiClient) -> Self {
        Self {
            records: ResourceStore::coalescing(client),
            verifying: AtomicBool::new(false),
        }
    }

    pub fn is_verifying(&self) -> bool {
        self.verifying.load(Ordering::SeqCst)
    }

    /// The current record when it already holds `id`, otherwise a fresh fetch.
    pub async fn detail(&self, id: i64, force_reload: bool) -> Result<R::Detail> {
        if !force_reload {
            if let Some(current) = self.current().filter(|c| c.id() == id) {
                return Ok(current);
            }
        }
        self.get_by_id(id).await
    }

    /// POST `<path>/scan` with the verification code.
    pub async fn scan(&self, code: &str) -> Result<ScanOutcome<R::Detail>> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ApiError::Validation("Verification code is required".to_string()));
        }

        let request = ScanRequest {
            verification_code: code.to_string(),
        };
        let path = format!("{}/scan", R::PATH);
        let response: ScanResponse = self
            .track(self.client().post(&path, Body::json(&request)?))
            .await
            .inspect_err(|e| tracing::error!(resource = R::NAME, "Failed to scan QR code: {}", e))?;

        let Some(id) = response.id else {
            tracing::warn!(resource = R::NAME, "Scan matched no record");
            self.client().notifier().publish(Notice::message(
                NoticeLevel::Warning,
                "Not found",
                "No record matches this code",
            ));
            return Err(ApiError::NotFound(format!("no {} record for this code", R::NAME)));
        };

        if let Some(verified_at) = response.verified_at {
            return Ok(self.already_verified(id, verified_at));
        }

        let detail = self.get_by_id(id).await?;
        tracing::info!(resource = R::NAME, id, "Scan resolved, awaiting verification");
        Ok(ScanOutcome::PendingVerification { id, detail })
    }

    fn already_verified(&self, id: i64, verified_at: DateTime<Utc>) -> ScanOutcome<R::Detail> {
        tracing::info!(resource = R::NAME, id, %verified_at, "Scanned record is already verified");
        self.client().notifier().publish(Notice::message(
            NoticeLevel::Info,
            "Already verified",
            format!(
                "This record was verified at {}",
                verified_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
        ));
        ScanOutcome::AlreadyVerified { id, verified_at }
    }

    /// Record a verification locally. An existing timestamp is kept.
    fn mark_verified(&self, id: i64, at: DateTime<Utc>) {
        self.patch_item(id, |row| {
            if !row.is_verified() {
                row.set_verified_at(at);
            }
        });
        self.patch_current(id, |detail| {
            if !detail.is_verified() {
                detail.set_verified_at(at);
            }
        });
    }

    async fn while_verifying<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.verifying.store(true, Ordering::SeqCst);
        let _done = scopeguard::guard(&self.verifying, |flag| flag.store(false, Ordering::SeqCst));
        fut.await
    }
}

impl RegistrationStore<Arrivals> {
    /// PUT `/arrival/:id` without a body, then reload the record.
    pub async fn verify(&self, id: i64) -> Result<VerifyOutcome> {
        self.while_verifying(async {
            let previous = self.current().filter(|c| c.id == id).and_then(|c| c.verified_at);
            self.track(self.client().put::<Value>(&Arrivals::item_path(id), Body::Empty))
                .await
                .inspect_err(|e| tracing::error!(resource = Arrivals::NAME, id, "Failed to verify: {}", e))?;

            let detail = self.get_by_id(id).await?;
            let verified_at = detail.verified_at.or(previous);
            if let Some(at) = verified_at {
                self.mark_verified(id, at);
            }
            tracing::info!(resource = Arrivals::NAME, id, "Arrival verified");
            Ok::<_, ApiError>(VerifyOutcome { id, verified_at })
        })
        .await
    }
}

impl RegistrationStore<Departures> {
    /// PUT `/departure/:id` with the verification time, then patch the list
    /// row and the current record.
    pub async fn verify(&self, id: i64) -> Result<VerifyOutcome> {
        self.while_verifying(async {
            let now = Utc::now();
            let body = Body::json(&VerifyRequest { verified_at: now })?;
            let response: Option<VerifyResponse> = self
                .track(self.client().put(&Departures::item_path(id), body))
                .await
                .inspect_err(|e| tracing::error!(resource = Departures::NAME, id, "Failed to verify: {}", e))?;

            let at = response.and_then(|r| r.verified_at).unwrap_or(now);
            self.mark_verified(id, at);
            tracing::info!(resource = Departures::NAME, id, "Departure verified");
            Ok::<_, ApiError>(VerifyOutcome {
                id,
                verified_at: Some(at),
            })
        })
        .await
    }
}

/// Which registration a scan targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    #[default]
    Arrival,
    Departure,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::Arrival => "arrival",
            ScanType::Departure => "departure",
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arrival" | "arrivals" => Ok(ScanType::Arrival),
            "departure" | "departures" => Ok(ScanType::Departure),
            other => Err(ApiError::Validation(format!("unknown scan type {:?}", other))),
        }
    }
}

/// Outcome of a scan, tagged with the registration it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "outcome", rename_all = "lowercase")]
pub enum ScanResult {
    Arrival(ScanOutcome<ArrivalDetail>),
    Departure(ScanOutcome<Departure>),
}

impl ScanResult {
    pub fn id(&self) -> i64 {
        match self {
            ScanResult::Arrival(outcome) => outcome.id(),
            ScanResult::Departure(outcome) => outcome.id(),
        }
    }

    pub fn scan_type(&self) -> ScanType {
        match self {
            ScanResult::Arrival(_) => ScanType::Arrival,
            ScanResult::Departure(_) => ScanType::Departure,
        }
    }
}

/// QR scanner front-end dispatching to the arrival or departure store.
pub struct Scanner {
    arrivals: Arc<RegistrationStore<Arrivals>>,
    departures: Arc<RegistrationStore<Departures>>,
    scan_type: RwLock<ScanType>,
}

impl Scanner {
    pub fn new(
        arrivals: Arc<RegistrationStore<Arrivals>>,
        departures: Arc<RegistrationStore<Departures>>,
    ) -> Self {
        Self {
            arrivals,
            departures,
            scan_type: RwLock::new(ScanType::default()),
        }
    }

    pub fn scan_type(&self) -> ScanType {
        *self.scan_type.read()
    }

    pub fn set_scan_type(&self, scan_type: ScanType) {
        let previous = std::mem::replace(&mut *self.scan_type.write(), scan_type);
        tracing::debug!(from = %previous, to = %scan_type, "Scanner type changed");
    }

    pub fn is_loading(&self) -> bool {
        match self.scan_type() {
            ScanType::Arrival => self.arrivals.is_loading(),
            ScanType::Departure => self.departures.is_loading(),
        }
    }

    pub async fn scan(&self, code: &str) -> Result<ScanResult> {
        match self.scan_type() {
            ScanType::Arrival => self.arrivals.scan(code).await.map(ScanResult::Arrival),
            ScanType::Departure => self.departures.scan(code).await.map(ScanResult::Departure),
        }
    }

    pub async fn verify(&self, id: i64) -> Result<VerifyOutcome> {
        match self.scan_type() {
            ScanType::Arrival => self.arrivals.verify(id).await,
            ScanType::Departure => self.departures.verify(id).await,
        }
    }
}
