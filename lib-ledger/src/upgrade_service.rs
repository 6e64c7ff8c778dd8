//! Client wrapper for one remote upgrade-service record.
//!
//! Same shape as the treasury wrapper for a simpler record: the service
//! guards a code-upgrade capability for one contract package, and its admin
//! transfers through the same two-phase propose/accept pattern as treasury
//! ownership.

use crate::decode::{self, UpgradeServiceObject};
use crate::error::{LedgerError, LedgerResult};
use crate::receipt::TransactionReceipt;
use crate::rpc::{CallArg, LedgerRpc, MoveCall, TransactionData, TransactionKind};
use crate::signer::Signer;
use crate::treasury::CallOptions;
use crate::type_tag::TypeTag;
use crate::types::{Address, ObjectId, Role};

const UPGRADE_SERVICE_MODULE: &str = "upgrade_service";

/// Typed operations against one upgrade-service object.
pub struct UpgradeServiceClient {
    rpc: LedgerRpc,
    pub service_id: ObjectId,
    pub package_id: String,
    pub otw_type: TypeTag,
}

impl UpgradeServiceClient {
    pub fn new(rpc: LedgerRpc, service_id: ObjectId, package_id: String, otw_type: TypeTag) -> Self {
        UpgradeServiceClient {
            rpc,
            service_id,
            package_id,
            otw_type,
        }
    }

    /// Build from a known object id by resolving its type remotely.
    pub async fn from_object_id(rpc: LedgerRpc, service_id: ObjectId) -> LedgerResult<Self> {
        let raw = rpc.get_object(&service_id).await?;
        let tag = TypeTag::parse(&raw.object_type)?;
        if !tag.matches_entry(UPGRADE_SERVICE_MODULE, "UpgradeService") {
            return Err(LedgerError::Shape {
                path: "object_type".to_string(),
                expected: format!(
                    "an upgrade_service::UpgradeService object, got '{}'",
                    raw.object_type
                ),
            });
        }
        let package_id = tag.package.clone();
        let otw_type = *tag.type_param.ok_or_else(|| LedgerError::Shape {
            path: "object_type".to_string(),
            expected: "a witness type parameter".to_string(),
        })?;
        Ok(Self::new(rpc, service_id, package_id, otw_type))
    }

    pub fn rpc(&self) -> &LedgerRpc {
        &self.rpc
    }

    fn call(&self, function: &str, mut args: Vec<CallArg>) -> MoveCall {
        let mut full_args = vec![CallArg::object(&self.service_id)];
        full_args.append(&mut args);
        MoveCall {
            package: self.package_id.clone(),
            module: UPGRADE_SERVICE_MODULE.to_string(),
            function: function.to_string(),
            type_args: vec![self.otw_type.to_string()],
            args: full_args,
        }
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

    /// Deposit the package's upgrade capability into the service.
    pub async fn deposit_upgrade_cap(
        &self,
        signer: &Signer,
        upgrade_cap: &ObjectId,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        let call = self.call("deposit", vec![CallArg::object(upgrade_cap)]);
        self.submit(signer, vec![call], opts).await
    }

    /// Propose a new admin. Takes effect only after the matching accept call
    /// signed by the proposed admin's key.
    pub async fn change_admin(
        &self,
        signer: &Signer,
        new_admin: &Address,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        let call = self.call("change_admin", vec![CallArg::pure(new_admin)]);
        self.submit(signer, vec![call], opts).await
    }

    /// Accept a pending admin transfer. Must be signed by the pending
    /// admin's key.
    pub async fn accept_admin(
        &self,
        signer: &Signer,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        let call = self.call("accept_admin", vec![]);
        self.submit(signer, vec![call], opts).await
    }

    /// Authorize and commit an upgrade of the wrapped package, identified by
    /// the digest of the new module set.
    pub async fn upgrade(
        &self,
        signer: &Signer,
        modules_digest: &str,
        opts: &CallOptions,
    ) -> LedgerResult<TransactionReceipt> {
        let call = self.call("upgrade", vec![CallArg::pure(modules_digest)]);
        self.submit(signer, vec![call], opts).await
    }

    // ========================================================================
    // Read operations
    // ========================================================================

    /// Fetch and decode the full service record.
    pub async fn refresh(&self) -> LedgerResult<UpgradeServiceObject> {
        let raw = self.rpc.get_object(&self.service_id).await?;
        decode::decode_upgrade_service(&raw)
    }

    pub async fn get_admin_role(&self) -> LedgerResult<Role> {
        Ok(self.refresh().await?.admin)
    }

    pub async fn get_admin(&self) -> LedgerResult<Address> {
        Ok(self.refresh().await?.admin.active)
    }

    pub async fn get_pending_admin(&self) -> LedgerResult<Option<Address>> {
        Ok(self.refresh().await?.admin.pending)
    }

    pub async fn get_upgrade_cap_package_id(&self) -> LedgerResult<ObjectId> {
        Ok(self.refresh().await?.package_id)
    }

    pub async fn get_upgrade_cap_version(&self) -> LedgerResult<u64> {
        Ok(self.refresh().await?.version)
    }

    pub async fn get_upgrade_cap_policy(&self) -> LedgerResult<u8> {
        Ok(self.refresh().await?.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_id(last: char) -> String {
        format!("0x{}{}", "0".repeat(63), last)
    }

    fn client() -> UpgradeServiceClient {
        UpgradeServiceClient::new(
            LedgerRpc::new("http://127.0.0.1:9000"),
            hex_id('1').parse().unwrap(),
            hex_id('9'),
            TypeTag::parse(&format!("{}::usdx::USDX", hex_id('8'))).unwrap(),
        )
    }

    #[test]
    fn test_call_shape() {
        let c = client();
        let call = c.call("accept_admin", vec![]);
        assert_eq!(call.module, "upgrade_service");
        assert_eq!(call.args.len(), 1);
        assert_eq!(call.args[0], CallArg::object(&hex_id('1').parse().unwrap()));
        assert_eq!(call.type_args.len(), 1);
    }
}
