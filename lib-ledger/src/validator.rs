//! Expected-vs-observed state validation.
//!
//! Given a schema-checked expected-state document and a live wrapper, the
//! validator reconstructs the full observable state of the remote record with
//! the minimum read sequence, then asserts deep structural equality, failing
//! with the first mismatching field.
//!
//! Controllers and allowances are rebuilt by enumerating the two remote
//! key-value collections and issuing one follow-up read per key: an O(n)
//! fan-out proportional to the number of configured entries, with no
//! pagination or batching.
//!
//! The blocklist cannot be read directly. It is rebuilt by replaying the full
//! history of blocklist-addition events and re-checking next-epoch membership
//! for each candidate: an address is in the final set iff it appears at least
//! once in the event log AND is still flagged blocklisted at check time.
//! This assumes the event query returns the complete history; if the remote
//! interface ever paginates or truncates, the reconstruction under-counts.

use crate::decode;
use crate::error::{LedgerError, LedgerResult};
use crate::receipt::{EventRecord, ObjectOwner};
use crate::treasury::TreasuryClient;
use crate::types::{Address, CoinMetadata, EpochSelector, ObjectId};
use crate::upgrade_service::UpgradeServiceClient;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

/// Epoch-dual flag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PausedState {
    pub current: bool,
    pub next: bool,
}

/// Full observable state of one treasury record. Used both as the strict
/// expected-state input schema and as the reconstruction target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreasuryStateDoc {
    pub treasury_id: ObjectId,
    pub owner: Address,
    #[serde(default)]
    pub pending_owner: Option<Address>,
    pub master_minter: Address,
    pub blocklister: Address,
    pub pauser: Address,
    pub metadata_updater: Address,
    /// controller address -> current holder of the bound mint authorization
    pub controllers: BTreeMap<Address, Address>,
    /// mint-authorization holder -> allowance in the token's smallest unit
    pub mint_allowances: BTreeMap<Address, u64>,
    pub paused: PausedState,
    /// Compared as an unordered set; transport order is irrelevant.
    pub blocklist: Vec<Address>,
    pub total_supply: u64,
    pub compatible_versions: Vec<u64>,
    pub metadata: CoinMetadata,
}

/// Full observable state of one upgrade-service record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpgradeServiceStateDoc {
    pub upgrade_service_id: ObjectId,
    pub admin: Address,
    #[serde(default)]
    pub pending_admin: Option<Address>,
    pub package_id: ObjectId,
    pub version: u64,
    pub policy: u8,
}

/// Parse a strict JSON array of expected treasury states.
pub fn parse_treasury_state_docs(raw: &str) -> LedgerResult<Vec<TreasuryStateDoc>> {
    Ok(serde_json::from_str(raw)?)
}

/// Parse a strict JSON array of expected upgrade-service states.
pub fn parse_upgrade_service_state_docs(raw: &str) -> LedgerResult<Vec<UpgradeServiceStateDoc>> {
    Ok(serde_json::from_str(raw)?)
}

// ============================================================================
// Comparison (pure)
// ============================================================================

fn check<T: PartialEq + Debug>(field: &str, expected: &T, actual: &T) -> LedgerResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(LedgerError::StateMismatch {
            field: field.to_string(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        })
    }
}

/// Compare two maps entry-wise so a mismatch names the offending key.
fn check_map<V: PartialEq + Debug>(
    field: &str,
    expected: &BTreeMap<Address, V>,
    actual: &BTreeMap<Address, V>,
) -> LedgerResult<()> {
    let keys: BTreeSet<&Address> = expected.keys().chain(actual.keys()).collect();
    for key in keys {
        check(
            &format!("{}[{}]", field, key),
            &expected.get(key),
            &actual.get(key),
        )?;
    }
    Ok(())
}

/// Deep-compare expected against observed treasury state, failing on the
/// first mismatching field.
pub fn compare_treasury_states(
    expected: &TreasuryStateDoc,
    actual: &TreasuryStateDoc,
) -> LedgerResult<()> {
    check("treasury_id", &expected.treasury_id, &actual.treasury_id)?;
    check("owner", &expected.owner, &actual.owner)?;
    check("pending_owner", &expected.pending_owner, &actual.pending_owner)?;
    check("master_minter", &expected.master_minter, &actual.master_minter)?;
    check("blocklister", &expected.blocklister, &actual.blocklister)?;
    check("pauser", &expected.pauser, &actual.pauser)?;
    check(
        "metadata_updater",
        &expected.metadata_updater,
        &actual.metadata_updater,
    )?;
    check_map("controllers", &expected.controllers, &actual.controllers)?;
    check_map(
        "mint_allowances",
        &expected.mint_allowances,
        &actual.mint_allowances,
    )?;
    check("paused.current", &expected.paused.current, &actual.paused.current)?;
    check("paused.next", &expected.paused.next, &actual.paused.next)?;
    let expected_blocklist: BTreeSet<&Address> = expected.blocklist.iter().collect();
    let actual_blocklist: BTreeSet<&Address> = actual.blocklist.iter().collect();
    check("blocklist", &expected_blocklist, &actual_blocklist)?;
    check("total_supply", &expected.total_supply, &actual.total_supply)?;
    check(
        "compatible_versions",
        &expected.compatible_versions,
        &actual.compatible_versions,
    )?;
    check("metadata.name", &expected.metadata.name, &actual.metadata.name)?;
    check(
        "metadata.symbol",
        &expected.metadata.symbol,
        &actual.metadata.symbol,
    )?;
    check(
        "metadata.description",
        &expected.metadata.description,
        &actual.metadata.description,
    )?;
    check(
        "metadata.icon_url",
        &expected.metadata.icon_url,
        &actual.metadata.icon_url,
    )?;
    check(
        "metadata.decimals",
        &expected.metadata.decimals,
        &actual.metadata.decimals,
    )?;
    Ok(())
}

/// Deep-compare expected against observed upgrade-service state.
pub fn compare_upgrade_service_states(
    expected: &UpgradeServiceStateDoc,
    actual: &UpgradeServiceStateDoc,
) -> LedgerResult<()> {
    check(
        "upgrade_service_id",
        &expected.upgrade_service_id,
        &actual.upgrade_service_id,
    )?;
    check("admin", &expected.admin, &actual.admin)?;
    check("pending_admin", &expected.pending_admin, &actual.pending_admin)?;
    check("package_id", &expected.package_id, &actual.package_id)?;
    check("version", &expected.version, &actual.version)?;
    check("policy", &expected.policy, &actual.policy)?;
    Ok(())
}

// ============================================================================
// Blocklist replay (pure core)
// ============================================================================

/// Extract the candidate address set from the blocklist-addition event log.
/// Duplicates collapse; an address later unblocked is filtered by the
/// membership re-check, not here.
pub fn blocklist_candidates(events: &[EventRecord]) -> LedgerResult<BTreeSet<Address>> {
    let mut candidates = BTreeSet::new();
    for (i, event) in events.iter().enumerate() {
        let addr = decode::decode_address_key(
            event.data.get("address").ok_or_else(|| LedgerError::Shape {
                path: format!("events[{}].address", i),
                expected: "a present field".to_string(),
            })?,
            &format!("events[{}].address", i),
        )?;
        candidates.insert(addr);
    }
    Ok(candidates)
}

// ============================================================================
// Observation (read fan-out)
// ============================================================================

async fn mint_cap_holder(client: &TreasuryClient, mint_cap: &ObjectId) -> LedgerResult<Address> {
    match client.get_object_owner(mint_cap).await? {
        ObjectOwner::Address { address } => Ok(address),
        other => Err(LedgerError::Shape {
            path: format!("mint_cap {} owner", mint_cap),
            expected: format!("an account address holder, got {:?}", other),
        }),
    }
}

/// Rebuild the confirmed blocklist: replay the event history, then re-check
/// next-epoch membership per candidate.
pub async fn reconstruct_blocklist(client: &TreasuryClient) -> LedgerResult<BTreeSet<Address>> {
    let events = client.query_blocklist_events().await?;
    let mut confirmed = BTreeSet::new();
    for candidate in blocklist_candidates(&events)? {
        if client
            .is_blocklisted(&candidate, EpochSelector::Next)
            .await?
        {
            confirmed.insert(candidate);
        }
    }
    Ok(confirmed)
}

/// Reconstruct the full observable treasury state.
pub async fn observe_treasury_state(client: &TreasuryClient) -> LedgerResult<TreasuryStateDoc> {
    let treasury = client.refresh().await?;

    let mut controllers = BTreeMap::new();
    for field in client
        .rpc()
        .get_dynamic_fields(&treasury.controllers_table)
        .await?
    {
        let controller = decode::decode_address_key(&field.name, "controllers.key")?;
        let entry = client.rpc().get_object(&field.object_id).await?;
        let mint_cap = decode::decode_controller_entry(&entry)?;
        let holder = mint_cap_holder(client, &mint_cap).await?;
        controllers.insert(controller, holder);
    }

    let mut mint_allowances = BTreeMap::new();
    for field in client
        .rpc()
        .get_dynamic_fields(&treasury.allowances_table)
        .await?
    {
        let mint_cap = decode::decode_object_id_key(&field.name, "mint_allowances.key")?;
        let entry = client.rpc().get_object(&field.object_id).await?;
        let allowance = decode::decode_allowance_entry(&entry)?;
        let holder = mint_cap_holder(client, &mint_cap).await?;
        mint_allowances.insert(holder, allowance);
    }

    let paused = PausedState {
        current: client.is_paused(EpochSelector::Current).await?,
        next: client.is_paused(EpochSelector::Next).await?,
    };
    let blocklist = reconstruct_blocklist(client).await?.into_iter().collect();

    Ok(TreasuryStateDoc {
        treasury_id: client.treasury_id.clone(),
        owner: treasury.roles.owner.active,
        pending_owner: treasury.roles.owner.pending,
        master_minter: treasury.roles.master_minter,
        blocklister: treasury.roles.blocklister,
        pauser: treasury.roles.pauser,
        metadata_updater: treasury.roles.metadata_updater,
        controllers,
        mint_allowances,
        paused,
        blocklist,
        total_supply: treasury.total_supply,
        compatible_versions: treasury.compatible_versions,
        metadata: treasury.metadata,
    })
}

/// Reconstruct the full observable upgrade-service state.
pub async fn observe_upgrade_service_state(
    client: &UpgradeServiceClient,
) -> LedgerResult<UpgradeServiceStateDoc> {
    let service = client.refresh().await?;
    Ok(UpgradeServiceStateDoc {
        upgrade_service_id: client.service_id.clone(),
        admin: service.admin.active,
        pending_admin: service.admin.pending,
        package_id: service.package_id,
        version: service.version,
        policy: service.policy,
    })
}

/// Observe and compare one treasury record against its expected state.
pub async fn validate_treasury_state(
    client: &TreasuryClient,
    expected: &TreasuryStateDoc,
) -> LedgerResult<()> {
    let observed = observe_treasury_state(client).await?;
    compare_treasury_states(expected, &observed)
}

/// Observe and compare one upgrade-service record against its expected state.
pub async fn validate_upgrade_service_state(
    client: &UpgradeServiceClient,
    expected: &UpgradeServiceStateDoc,
) -> LedgerResult<()> {
    let observed = observe_upgrade_service_state(client).await?;
    compare_upgrade_service_states(expected, &observed)
}
