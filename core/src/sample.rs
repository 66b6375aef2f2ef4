//! Deterministic sample data for the demo runner and smoke tests.
//!
//! RULE: same seed, same data. All randomness flows through one seeded
//! Pcg64Mcg; nothing here touches a platform RNG.

use crate::{
    error::LedgerResult,
    store::{LedgerStore, NewClient, NewContract},
    types::{AgencyId, ClientId, ContractId, ContractStatus, UserId, UserRole},
};
use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

const FIRST_NAMES: &[&str] = &[
    "Amina", "Thierry", "Brigitte", "Emmanuel", "Clarisse", "Serge", "Solange", "Patrick",
    "Josiane", "Hervé", "Mireille", "Boris", "Nadège", "Cyrille", "Estelle", "Landry",
    "Vanessa", "Rodrigue", "Francine", "Ulrich",
];

const LAST_NAMES: &[&str] = &[
    "Nkemeni", "Mbarga", "Fotso", "Etoundi", "Ngassa", "Tchoupo", "Kamga", "Abena",
    "Nganou", "Essomba", "Talla", "Owona", "Djoumessi", "Bekolo", "Moukoko", "Njoya",
];

const CITIES: &[&str] = &["Douala", "Yaoundé", "Bafoussam", "Garoua", "Limbé", "Bamenda"];

const CONTRACT_TYPES: &[&str] = &["LOAN", "SAVINGS", "CREDIT_LINE"];

#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub agencies: usize,
    pub clients_per_agency: usize,
    pub contracts_per_client: usize,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            agencies: 2,
            clients_per_agency: 5,
            contracts_per_client: 2,
        }
    }
}

/// Ids of everything the seeder created, in creation order.
#[derive(Debug, Default)]
pub struct SampleSummary {
    pub agency_ids: Vec<AgencyId>,
    pub staff_ids: Vec<UserId>,
    pub client_ids: Vec<ClientId>,
    pub contract_ids: Vec<ContractId>,
}

pub struct SampleSeeder {
    rng: Pcg64Mcg,
}

impl SampleSeeder {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn seed(&mut self, store: &LedgerStore, spec: &SampleSpec) -> LedgerResult<SampleSummary> {
        let db = store.db();
        let mut summary = SampleSummary::default();
        let today = Utc::now().date_naive().to_string();

        // One head-office user not attached to any branch.
        db.insert_user("direction@head-office.example", UserRole::Ceo.as_str(), None, true)?;

        for a in 0..spec.agencies {
            let city = CITIES[self.rng.gen_range(0..CITIES.len())];
            let agency_id = db.insert_agency(
                &format!("AG-{:03}", a + 1),
                &format!("Agence {city}"),
                Some(city),
                true,
            )?;
            summary.agency_ids.push(agency_id);

            let manager = db.insert_user(
                &format!("manager.ag{:03}@example.cm", a + 1),
                UserRole::AgencyManager.as_str(),
                Some(agency_id),
                true,
            )?;
            let staff = db.insert_user(
                &format!("caisse.ag{:03}@example.cm", a + 1),
                UserRole::AgencyStaff.as_str(),
                Some(agency_id),
                true,
            )?;
            summary.staff_ids.push(staff);

            for c in 0..spec.clients_per_agency {
                let first = FIRST_NAMES[self.rng.gen_range(0..FIRST_NAMES.len())];
                let last = LAST_NAMES[self.rng.gen_range(0..LAST_NAMES.len())];
                let national_id: String = format!("{:012}", self.rng.gen_range(0..1_000_000_000_000u64));
                let client_id = db.insert_client(&NewClient {
                    national_id,
                    full_name: format!("{first} {last}"),
                    email: Some(format!(
                        "{}.{}.{a}{c}@example.cm",
                        first.to_lowercase(),
                        last.to_lowercase()
                    )),
                    phone: Some(format!("+2376{:08}", self.rng.gen_range(0..100_000_000u64))),
                    address: Some(format!("BP {} {city}", self.rng.gen_range(100..10_000))),
                    date_of_birth: None,
                    agency_id,
                    registration_date: today.clone(),
                    created_by: Some(manager),
                })?;
                summary.client_ids.push(client_id);

                for k in 0..spec.contracts_per_client {
                    let contract_type =
                        CONTRACT_TYPES[self.rng.gen_range(0..CONTRACT_TYPES.len())];
                    let amount = (self.rng.gen_range(5..200) * 25_000) as f64;
                    let contract_id = db.insert_contract(&NewContract {
                        contract_number: format!("CTR-{:03}-{client_id:05}-{k}", a + 1),
                        client_id,
                        agency_id,
                        contract_type: contract_type.to_string(),
                        amount,
                        start_date: Some(today.clone()),
                        end_date: None,
                        status: ContractStatus::Draft,
                    })?;
                    summary.contract_ids.push(contract_id);
                }
            }
        }

        log::info!(
            "seeded {} agencies, {} clients, {} contracts",
            summary.agency_ids.len(),
            summary.client_ids.len(),
            summary.contract_ids.len()
        );
        Ok(summary)
    }
}
