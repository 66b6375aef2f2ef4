//! Client onboarding and the agency-scoped client listing.
//!
//! Peripheral to the ledger itself, but it shares the engine's rules:
//! expected violations come back as `Rejection` values, writes run inside a
//! write transaction, and stored text is normalized before any uniqueness
//! check (national id uppercased, name title-cased, email lowercased).

use crate::{
    config::LedgerConfig,
    error::LedgerResult,
    event::{EventLogEntry, LedgerEvent},
    store::{ClientRow, LedgerStore, NewClient},
    types::{AgencyId, ClientId, ClientStatus, SortField, SortOrder, UserId},
    validation::{Checked, Rejection},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientRequest {
    pub national_id: String,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    pub agency_id: Option<AgencyId>,
    #[serde(default)]
    pub created_by: Option<UserId>,
}

#[derive(Debug)]
pub enum OnboardingOutcome {
    Registered { client_id: ClientId },
    Rejected(Rejection),
}

impl OnboardingOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }

    /// Zero when rejected.
    pub fn client_id(&self) -> ClientId {
        match self {
            Self::Registered { client_id } => *client_id,
            Self::Rejected(_) => 0,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Registered { client_id } => format!("Client {client_id} registered"),
            Self::Rejected(rejection) => rejection.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientQuery {
    pub agency_id: AgencyId,
    #[serde(default)]
    pub status: Option<ClientStatus>,
    #[serde(default)]
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

#[derive(Debug, Serialize)]
pub struct ClientPage {
    /// Unpaged match count for the same filters.
    pub total: i64,
    pub clients: Vec<ClientRow>,
}

pub struct ClientDirectory<'a> {
    store: &'a LedgerStore,
    config: &'a LedgerConfig,
}

impl<'a> ClientDirectory<'a> {
    pub fn new(store: &'a LedgerStore, config: &'a LedgerConfig) -> Self {
        Self { store, config }
    }

    pub fn register(&self, req: &ClientRequest) -> LedgerResult<OnboardingOutcome> {
        let national_id = normalize_national_id(&req.national_id);
        let full_name = title_case(req.full_name.trim());
        let email = req
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty());

        // Required fields.
        if national_id.is_empty() {
            return Ok(OnboardingOutcome::Rejected(Rejection::MissingField(
                "national_id",
            )));
        }
        if full_name.is_empty() {
            return Ok(OnboardingOutcome::Rejected(Rejection::MissingField(
                "full_name",
            )));
        }
        let agency_id = match req.agency_id {
            Some(id) => id,
            None => {
                return Ok(OnboardingOutcome::Rejected(Rejection::MissingField(
                    "agency_id",
                )))
            }
        };

        let txn = self.store.begin_immediate()?;
        let db = txn.db();

        // Duplicate checks, then email shape, then referential checks —
        // inside the write transaction so the UNIQUE constraints and these
        // reads see the same snapshot.
        if db.national_id_exists(&national_id)? {
            return Ok(OnboardingOutcome::Rejected(Rejection::DuplicateNationalId(
                national_id,
            )));
        }
        if let Some(email) = email.as_deref() {
            if db.client_email_exists(email)? {
                return Ok(OnboardingOutcome::Rejected(Rejection::DuplicateEmail(
                    email.to_string(),
                )));
            }
            if !looks_like_email(email) {
                return Ok(OnboardingOutcome::Rejected(Rejection::InvalidEmail(
                    email.to_string(),
                )));
            }
        }
        match db.agency(agency_id)? {
            None => {
                return Ok(OnboardingOutcome::Rejected(Rejection::AgencyNotFound(
                    agency_id,
                )))
            }
            Some(a) if !a.active => {
                return Ok(OnboardingOutcome::Rejected(Rejection::AgencyInactive(
                    agency_id,
                )))
            }
            Some(_) => {}
        }
        if let Some(creator) = req.created_by {
            match db.user(creator)? {
                None => {
                    return Ok(OnboardingOutcome::Rejected(Rejection::UserNotFound(
                        creator,
                    )))
                }
                Some(u) if !u.active => {
                    return Ok(OnboardingOutcome::Rejected(Rejection::UserInactive(
                        creator,
                    )))
                }
                Some(_) => {}
            }
        }

        let client_id = db.insert_client(&NewClient {
            national_id: national_id.clone(),
            full_name,
            email,
            phone: req.phone.as_deref().map(|p| p.trim().to_string()),
            address: req.address.as_deref().map(|a| a.trim().to_string()),
            date_of_birth: req.date_of_birth.map(|d| d.to_string()),
            agency_id,
            registration_date: Utc::now().date_naive().to_string(),
            created_by: req.created_by,
        })?;
        txn.commit()?;

        let event = LedgerEvent::ClientRegistered {
            client_id,
            agency_id,
            national_id,
        };
        self.store.db().append_event(&EventLogEntry {
            id: None,
            component: "clients".to_string(),
            event_type: event.type_name().to_string(),
            payload: serde_json::to_string(&event)?,
            created_at: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })?;

        log::info!("client {client_id} registered with agency {agency_id}");
        Ok(OnboardingOutcome::Registered { client_id })
    }

    pub fn list_by_agency(&self, query: &ClientQuery) -> LedgerResult<Checked<ClientPage>> {
        let db = self.store.db();
        match db.agency(query.agency_id)? {
            None => return Ok(Err(Rejection::AgencyNotFound(query.agency_id))),
            Some(a) if !a.active => return Ok(Err(Rejection::AgencyInactive(query.agency_id))),
            Some(_) => {}
        }

        let pattern = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));
        let limit = query.limit.clamp(1, self.config.page_cap);
        let offset = query.offset.max(0);

        let (total, clients) = db.clients_page(
            query.agency_id,
            query.status.map(|s| s.as_str()),
            pattern.as_deref(),
            query.sort_by,
            query.sort_order,
            limit,
            offset,
        )?;
        Ok(Ok(ClientPage { total, clients }))
    }
}

fn normalize_national_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// First letter of each whitespace-separated word uppercased, the rest
/// lowercased. Collapses runs of whitespace to single spaces.
fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Minimal shape check: one '@', a non-empty local part, and a domain with
/// a dot that is neither leading nor trailing.
fn looks_like_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    let (local, domain) = match (parts.next(), parts.next()) {
        (Some(local), Some(domain)) => (local, domain),
        _ => return false,
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
}
