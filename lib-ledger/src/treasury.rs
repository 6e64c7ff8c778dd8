//! Client wrapper for one remote treasury record.
//!
//! Knows the fixed entry-point names and argument encodings of the treasury
//! contract family. Mutating operations build a call (or a short fixed
//! sequence of calls submitted atomically), sign with the caller credential,
//! and return the full receipt; read operations decode the remote object's
//! nested field layout through the `decode` module.

use crate::decode::{self, TreasuryObject};
use crate::error::{LedgerError, LedgerResult};
use crate::receipt::{EventRecord, ObjectOwner, TransactionReceipt};
use crate::rpc::{CallArg, LedgerRpc, MoveCall, TransactionData, TransactionKind};
use crate::signer::Signer;
use crate::type_tag::TypeTag;
use crate::types::{Address, EpochSelector, MigrationAction, ObjectId};
use serde_json::json;

/// Contract module holding every treasury entry point.
const TREASURY_MODULE: &str = "treasury";

/// Submission options shared by every mutating operation.
#[derive(Debug, Clone, Copy)]
pub struct CallOptions {
    pub gas_budget: u64,
    /// Simulate instead of submitting. The receipt is a materially identical
    /// effects preview; nothing is persisted remotely.
    pub dry_run: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        CallOptions {
            gas_budget: 50_000_000,
            dry_run: false,
        }
    }
}

/// Privileged-role rotation request. Only the populated fields are rotated;
/// the owner change is a two-phase proposal that still needs the matching
/// accept call from the new owner's key.
#[derive(Debug, Clone, Default)]
pub struct RoleRotation {
    pub new_master_minter: Option<Address>,
    pub new_blocklister: Option<Address>,
    pub new_pauser: Option<Address>,
    pub new_metadata_updater: Option<Address>,
    pub new_owner: Option<Address>,
}

impl RoleRotation {
    pub fn is_empty(&self) -> bool {
        self.new_master_minter.is_none()
            && self.new_blocklister.is_none()
            && self.new_pauser.is_none()
            && self.new_metadata_updater.is_none()
            && self.new_owner.is_none()
    }
}

/// Metadata replacement payload for `update_metadata`.
#[derive(Debug, Clone)]
pub struct MetadataUpdate {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub icon_url: String,
}

/// Typed operations against one treasury object.
pub struct TreasuryClient {
    rpc: LedgerRpc,
    pub treasury_id: ObjectId,
    pub package_id: String,
    pub coin_type: TypeTag,
}

impl TreasuryClient {
    pub fn new(
        rpc: LedgerRpc,
        treasury_id: ObjectId,
        package_id: String,
        coin_type: TypeTag,
    ) -> Self {
        TreasuryClient {
            rpc,
            treasury_id,
            package_id,
            coin_type,
        }
    }

    /// Build from a known object id by resolving its type remotely.
    pub async fn from_object_id(rpc: LedgerRpc, treasury_id: ObjectId) -> LedgerResult<Self> {
        let raw = rpc.get_object(&treasury_id).await?;
        let tag = TypeTag::parse(&raw.object_type)?;
        if !tag.matches_entry(TREASURY_MODULE, "Treasury") {
            return Err(LedgerError::Shape {
                path: "object_type".to_string(),
                expected: format!("a treasury::Treasury object, got '{}'", raw.object_type),
            });
        }
        let package_id = tag.package.clone();
        let coin_type = *tag.type_param.ok_or_else(|| LedgerError::Shape {
            path: "object_type".to_string(),
            expected: "a coin type parameter".to_string(),
        })?;
        Ok(Self::new(rpc, treasury_id, package_id, coin_type))
    }

    /// Build from a deployment receipt by scanning for exactly one created
    /// treasury object.
    pub fn from_deployment(rpc: LedgerRpc, receipt: &TransactionReceipt) -> LedgerResult<Self> {
        let (treasury_id, tag) = receipt.single_created_object(TREASURY_MODULE, "Treasury")?;
        let package_id = tag.package.clone();
        let coin_type = *tag.type_param.ok_or_else(|| LedgerError::Shape {
            path: "object_type".to_string(),
            expected: "a coin type parameter".to_string(),
        })?;
        Ok(Self::new(rpc, treasury_id, package_id, coin_type))
    }

    pub fn rpc(&self) -> &LedgerRpc {
        &self.rpc
    }

    /// Printed event type of blocklist additions, used for event replay.
    pub fn blocklisted_event_type(&self) -> String {
        format!("{}::{}::Blocklisted", self.package_id, TREASURY_MODULE)
    }

    // ========================================================================
    // Call construction (pure)
    // ========================================================================

    /// Build one treasury entry-point call. Every call carries the coin type
    /// argument and the treasury object as its first argument.
    fn call(&self, function: &str, mut args: Vec<CallArg>) -> MoveCall {
        let mut full_args = vec![CallArg::object(&self.treasury_id)];
        full_args.append(&mut args);
        MoveCall {
            package: self.package_id.clone(),
            module: TREASURY_MODULE.to_string(),
            function: function.to_string(),
            type_args: vec![self.coin_type.to_string()],
            args: full_args,
        }
    }

    /// The atomic two-call rotation body: bind the authorization to the new
    /// controller, then drop the old binding. Either both land or neither.
    pub fn rotation_calls(
        &self,
        new_controller: &Address,
        old_controller: &Address,
        mint_cap_id: &ObjectId,
    ) -> Vec<MoveCall> {
        vec![
            self.call(
                "configure_controller",
                vec![
                    CallArg::pure(new_controller),
                    CallArg::pure(mint_cap_id),
                ],
            ),
            self.call("remove_controller", vec![CallArg::pure(old_controller)]),
        ]
    }

    /// Calls for the populated fields of a role rotation, in a fixed order.
    pub fn role_rotation_calls(&self, rotation: &RoleRotation) -> Vec<MoveCall> {
        let mut calls = Vec::new();
        if let Some(addr) = &rotation.new_master_minter {
            calls.push(self.call("update_master_minter", vec![CallArg::pure(addr)]));
        }
        if let Some(addr) = &rotation.new_blocklister {
            calls.push(self.call("update_blocklister", vec![CallArg::pure(addr)]));
        }
        if let Some(addr) = &rotation.new_pauser {
            calls.push(self.call("update_pauser", vec![CallArg::pure(addr)]));
        }
        if let Some(addr) = &rotation.new_metadata_updater {
            calls.push(self.call("update_metadata_updater", vec![CallArg::pure(addr)]));
        }
        if let Some(addr) = &rotation.new_owner {
            calls.push(self.call("transfer_ownership", vec![CallArg::pure(addr)]));
        }
        calls
    }

    async fn submit(
        &self,
        signer: &Signer,
        calls: Vec<MoveCall>,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        let tx = TransactionData {
            sender: signer.address(),
            kind: TransactionKind::Calls { calls },
            gas_budget: opts.gas_budget,
        };
        if opts.dry_run {
            self.rpc.dry_run(&tx).await
        } else {
            self.rpc.execute(&tx, signer).await?.ensure_success()
        }
    }

    // ========================================================================
    // Mutating operations
    // ========================================================================

    /// Create a fresh mint authorization bound to `controller`, transferring
    /// the authorization object to `minter`.
    pub async fn configure_new_controller(
        &self,
        signer: &Signer,
        controller: &Address,
        minter: &Address,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        let call = self.call(
            "configure_new_controller",
            vec![CallArg::pure(controller), CallArg::pure(minter)],
        );
        self.submit(signer, vec![call], opts).await
    }

    /// Drop a controller's binding. The authorization object itself survives
    /// with its current holder.
    pub async fn remove_controller(
        &self,
        signer: &Signer,
        controller: &Address,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        let call = self.call("remove_controller", vec![CallArg::pure(controller)]);
        self.submit(signer, vec![call], opts).await
    }

    /// Set the allowance of the signing controller's mint authorization, in
    /// the token's smallest unit.
    pub async fn set_mint_allowance(
        &self,
        signer: &Signer,
        allowance: u64,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        let call = self.call(
            "set_mint_allowance",
            vec![CallArg::pure(allowance.to_string())],
        );
        self.submit(signer, vec![call], opts).await
    }

    pub async fn mint(
        &self,
        signer: &Signer,
        mint_cap: &ObjectId,
        amount: u64,
        recipient: &Address,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        let call = self.call(
            "mint",
            vec![
                CallArg::object(mint_cap),
                CallArg::pure(amount.to_string()),
                CallArg::pure(recipient),
            ],
        );
        self.submit(signer, vec![call], opts).await
    }

    /// Add or remove one address from the blocklist. The write lands in the
    /// next-epoch value; the current value converges after the boundary.
    pub async fn set_blocklist_state(
        &self,
        signer: &Signer,
        address: &Address,
        blocked: bool,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        let function = if blocked { "blocklist" } else { "unblocklist" };
        let call = self.call(function, vec![CallArg::pure(address)]);
        self.submit(signer, vec![call], opts).await
    }

    /// Pause or unpause the coin. Epoch semantics as for the blocklist.
    pub async fn set_paused_state(
        &self,
        signer: &Signer,
        paused: bool,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        let function = if paused { "pause" } else { "unpause" };
        let call = self.call(function, vec![]);
        self.submit(signer, vec![call], opts).await
    }

    /// Rebind the mint authorization currently held under `old_controller`
    /// to `new_controller`, as one atomic transaction. Fails before any
    /// submission if the old controller holds no authorization.
    pub async fn rotate_controller(
        &self,
        signer: &Signer,
        new_controller: &Address,
        old_controller: &Address,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        let mint_cap = self
            .get_mint_cap_id(old_controller)
            .await?
            .ok_or_else(|| {
                LedgerError::Precondition(format!(
                    "No mint authorization configured for controller {}",
                    old_controller
                ))
            })?;
        let calls = self.rotation_calls(new_controller, old_controller, &mint_cap);
        self.submit(signer, calls, opts).await
    }

    pub async fn update_metadata(
        &self,
        signer: &Signer,
        update: &MetadataUpdate,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        let call = self.call(
            "update_metadata",
            vec![
                CallArg::pure(&update.name),
                CallArg::pure(&update.symbol),
                CallArg::pure(&update.description),
                CallArg::pure(&update.icon_url),
            ],
        );
        self.submit(signer, vec![call], opts).await
    }

    /// Rotate the populated privileged roles in one atomic transaction.
    pub async fn rotate_privileged_roles(
        &self,
        signer: &Signer,
        rotation: &RoleRotation,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        if rotation.is_empty() {
            return Err(LedgerError::Precondition(
                "Role rotation requested with no roles to rotate".to_string(),
            ));
        }
        let calls = self.role_rotation_calls(rotation);
        self.submit(signer, calls, opts).await
    }

    /// Accept a pending ownership transfer. Must be signed by the pending
    /// owner's key.
    pub async fn accept_treasury_owner(
        &self,
        signer: &Signer,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        let call = self.call("accept_ownership", vec![]);
        self.submit(signer, vec![call], opts).await
    }

    /// Issue a migration action. The transition itself is enforced remotely;
    /// callers re-read the compatible-version list to confirm it took.
    pub async fn upgrade_migration(
        &self,
        signer: &Signer,
        action: MigrationAction,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        let call = self.call(action.entry_point(), vec![]);
        self.submit(signer, vec![call], opts).await
    }

    // ========================================================================
    // Read operations
    // ========================================================================

    /// Fetch and decode the full treasury record.
    pub async fn refresh(&self) -> LedgerResult<TreasuryObject> {
        let raw = self.rpc.get_object(&self.treasury_id).await?;
        decode::decode_treasury(&raw)
    }

    pub async fn get_roles(&self) -> LedgerResult<crate::types::TreasuryRoles> {
        Ok(self.refresh().await?.roles)
    }

    pub async fn get_metadata(&self) -> LedgerResult<crate::types::CoinMetadata> {
        Ok(self.refresh().await?.metadata)
    }

    pub async fn get_total_supply(&self) -> LedgerResult<u64> {
        Ok(self.refresh().await?.total_supply)
    }

    pub async fn get_compatible_versions(&self) -> LedgerResult<Vec<u64>> {
        Ok(self.refresh().await?.compatible_versions)
    }

    /// Look up the mint-authorization id bound to `controller`. The outcome
    /// is three-way: found, not configured (`None`), or error.
    pub async fn get_mint_cap_id(&self, controller: &Address) -> LedgerResult<Option<ObjectId>> {
        let treasury = self.refresh().await?;
        let entry = self
            .rpc
            .get_dynamic_field_object(&treasury.controllers_table, &json!(controller))
            .await?;
        match entry {
            None => Ok(None),
            Some(raw) => Ok(Some(decode::decode_controller_entry(&raw)?)),
        }
    }

    /// Read the allowance attached to one mint authorization, in the token's
    /// smallest unit. `None` when no allowance entry exists.
    pub async fn get_mint_allowance(&self, mint_cap: &ObjectId) -> LedgerResult<Option<u64>> {
        let treasury = self.refresh().await?;
        let entry = self
            .rpc
            .get_dynamic_field_object(&treasury.allowances_table, &json!(mint_cap))
            .await?;
        match entry {
            None => Ok(None),
            Some(raw) => Ok(Some(decode::decode_allowance_entry(&raw)?)),
        }
    }

    pub async fn get_object_owner(&self, id: &ObjectId) -> LedgerResult<ObjectOwner> {
        Ok(self.rpc.get_object(id).await?.owner)
    }

    pub async fn is_paused(&self, epoch: EpochSelector) -> LedgerResult<bool> {
        self.rpc
            .is_paused(&self.coin_type.to_string(), epoch)
            .await
    }

    pub async fn is_blocklisted(
        &self,
        address: &Address,
        epoch: EpochSelector,
    ) -> LedgerResult<bool> {
        self.rpc
            .is_blocklisted(&self.coin_type.to_string(), address, epoch)
            .await
    }

    /// Full history of blocklist-addition events for this coin type.
    pub async fn query_blocklist_events(&self) -> LedgerResult<Vec<EventRecord>> {
        self.rpc.query_events(&self.blocklisted_event_type()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_id(last: char) -> String {
        format!("0x{}{}", "0".repeat(63), last)
    }

    fn client() -> TreasuryClient {
        TreasuryClient::new(
            LedgerRpc::new("http://127.0.0.1:9000"),
            hex_id('1').parse().unwrap(),
            hex_id('9'),
            TypeTag::parse(&format!("{}::usdx::USDX", hex_id('8'))).unwrap(),
        )
    }

    #[test]
    fn test_call_shape() {
        let c = client();
        let call = c.call("pause", vec![]);
        assert_eq!(call.module, "treasury");
        assert_eq!(call.function, "pause");
        assert_eq!(call.type_args, vec![format!("{}::usdx::USDX", hex_id('8'))]);
        // Treasury object is always the first argument.
        assert_eq!(call.args[0], CallArg::object(&hex_id('1').parse().unwrap()));
    }

    #[test]
    fn test_rotation_calls_are_one_atomic_pair() {
        let c = client();
        let new: Address = hex_id('a').parse().unwrap();
        let old: Address = hex_id('b').parse().unwrap();
        let cap: ObjectId = hex_id('c').parse().unwrap();
        let calls = c.rotation_calls(&new, &old, &cap);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].function, "configure_controller");
        assert_eq!(calls[1].function, "remove_controller");
    }

    #[test]
    fn test_role_rotation_calls_only_populated_fields() {
        let c = client();
        let rotation = RoleRotation {
            new_pauser: Some(hex_id('a').parse().unwrap()),
            new_owner: Some(hex_id('b').parse().unwrap()),
            ..RoleRotation::default()
        };
        let calls = c.role_rotation_calls(&rotation);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].function, "update_pauser");
        assert_eq!(calls[1].function, "transfer_ownership");
    }

    #[test]
    fn test_empty_role_rotation_detected() {
        assert!(RoleRotation::default().is_empty());
        let rotation = RoleRotation {
            new_blocklister: Some(hex_id('a').parse().unwrap()),
            ..RoleRotation::default()
        };
        assert!(!rotation.is_empty());
    }

    #[test]
    fn test_blocklisted_event_type() {
        assert_eq!(
            client().blocklisted_event_type(),
            format!("{}::treasury::Blocklisted", hex_id('9'))
        );
    }
}
