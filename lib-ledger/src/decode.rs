//! Versioned decoders from raw remote object content to typed records.
//!
//! Every assumption about the remote field layout lives here. Decoders are
//! pure functions over the nested JSON content of a `RawObject`; a missing or
//! mis-shaped field fails immediately with the path that was expected, so a
//! remote schema change surfaces as one obvious error in one module.

use crate::error::{LedgerError, LedgerResult};
use crate::rpc::RawObject;
use crate::type_tag::TypeTag;
use crate::types::{Address, CoinMetadata, ObjectId, Role, TreasuryRoles};
use serde_json::Value;

/// Decoded treasury record.
#[derive(Debug, Clone, PartialEq)]
pub struct TreasuryObject {
    pub id: ObjectId,
    pub coin_type: TypeTag,
    pub roles: TreasuryRoles,
    pub controllers_table: ObjectId,
    pub allowances_table: ObjectId,
    pub total_supply: u64,
    pub compatible_versions: Vec<u64>,
    pub metadata: CoinMetadata,
}

/// Decoded upgrade-service record.
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeServiceObject {
    pub id: ObjectId,
    pub admin: Role,
    pub package_id: ObjectId,
    pub version: u64,
    pub policy: u8,
}

pub fn decode_treasury(raw: &RawObject) -> LedgerResult<TreasuryObject> {
    let tag = TypeTag::parse(&raw.object_type)?;
    if !tag.matches_entry("treasury", "Treasury") {
        return Err(shape("object_type", "a treasury::Treasury object"));
    }
    let coin_type = *tag
        .type_param
        .ok_or_else(|| shape("object_type", "a coin type parameter"))?;

    let content = &raw.content;
    let roles = field(content, "roles")?;
    Ok(TreasuryObject {
        id: raw.object_id.clone(),
        coin_type,
        roles: TreasuryRoles {
            owner: role_field(roles, "roles.owner", "owner")?,
            master_minter: single_phase_role(roles, "roles.master_minter", "master_minter")?,
            blocklister: single_phase_role(roles, "roles.blocklister", "blocklister")?,
            pauser: single_phase_role(roles, "roles.pauser", "pauser")?,
            metadata_updater: single_phase_role(
                roles,
                "roles.metadata_updater",
                "metadata_updater",
            )?,
        },
        controllers_table: table_id(content, "controllers")?,
        allowances_table: table_id(content, "mint_allowances")?,
        total_supply: u64_field(content, "total_supply")?,
        compatible_versions: version_list(content, "compatible_versions")?,
        metadata: metadata_field(content)?,
    })
}

pub fn decode_upgrade_service(raw: &RawObject) -> LedgerResult<UpgradeServiceObject> {
    let tag = TypeTag::parse(&raw.object_type)?;
    if !tag.matches_entry("upgrade_service", "UpgradeService") {
        return Err(shape("object_type", "an upgrade_service::UpgradeService object"));
    }

    let content = &raw.content;
    let cap = field(content, "upgrade_cap")?;
    Ok(UpgradeServiceObject {
        id: raw.object_id.clone(),
        admin: decode_role(field(content, "admin")?, "admin")?,
        package_id: id_field(cap, "upgrade_cap.package", "package")?,
        version: u64_field_at(cap, "upgrade_cap.version", "version")?,
        policy: u8_field(cap, "upgrade_cap.policy", "policy")?,
    })
}

/// Decode the value object of one controllers-table entry: the bound
/// mint-authorization id.
pub fn decode_controller_entry(raw: &RawObject) -> LedgerResult<ObjectId> {
    id_field(&raw.content, "value", "value")
}

/// Decode the value object of one allowances-table entry: the allowance in
/// the token's smallest unit.
pub fn decode_allowance_entry(raw: &RawObject) -> LedgerResult<u64> {
    u64_field_at(&raw.content, "value", "value")
}

/// Decode the key of one collection entry as an address.
pub fn decode_address_key(name: &Value, path: &str) -> LedgerResult<Address> {
    address_value(name, path)
}

/// Decode the key of one collection entry as an object id.
pub fn decode_object_id_key(name: &Value, path: &str) -> LedgerResult<ObjectId> {
    name.as_str()
        .ok_or_else(|| shape(path, "an object id string"))?
        .parse()
}

fn shape(path: &str, expected: &str) -> LedgerError {
    LedgerError::Shape {
        path: path.to_string(),
        expected: expected.to_string(),
    }
}

fn field<'a>(value: &'a Value, key: &str) -> LedgerResult<&'a Value> {
    value.get(key).ok_or_else(|| shape(key, "a present field"))
}

fn field_at<'a>(value: &'a Value, path: &str, key: &str) -> LedgerResult<&'a Value> {
    value.get(key).ok_or_else(|| shape(path, "a present field"))
}

fn address_value(value: &Value, path: &str) -> LedgerResult<Address> {
    value
        .as_str()
        .ok_or_else(|| shape(path, "an address string"))?
        .parse()
}

fn id_field(value: &Value, path: &str, key: &str) -> LedgerResult<ObjectId> {
    field_at(value, path, key)?
        .as_str()
        .ok_or_else(|| shape(path, "an object id string"))?
        .parse()
}

/// 64-bit quantities travel as decimal strings; smaller numbers as JSON
/// numbers. Accept both here so one remote encoding change does not fan out.
fn parse_u64(value: &Value, path: &str) -> LedgerResult<u64> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| shape(path, "a u64 (number or decimal string)"))
}

fn u64_field(value: &Value, key: &str) -> LedgerResult<u64> {
    parse_u64(field(value, key)?, key)
}

fn u64_field_at(value: &Value, path: &str, key: &str) -> LedgerResult<u64> {
    parse_u64(field_at(value, path, key)?, path)
}

fn u8_field(value: &Value, path: &str, key: &str) -> LedgerResult<u8> {
    let n = u64_field_at(value, path, key)?;
    u8::try_from(n).map_err(|_| shape(path, "a u8"))
}

fn str_field(value: &Value, path: &str, key: &str) -> LedgerResult<String> {
    Ok(field_at(value, path, key)?
        .as_str()
        .ok_or_else(|| shape(path, "a string"))?
        .to_string())
}

/// A role on the wire is a record with an active/pending address pair.
fn decode_role(value: &Value, path: &str) -> LedgerResult<Role> {
    let active = address_value(field_at(value, &format!("{}.active", path), "active")?,
        &format!("{}.active", path))?;
    let pending = match field_at(value, &format!("{}.pending", path), "pending")? {
        Value::Null => None,
        v => Some(address_value(v, &format!("{}.pending", path))?),
    };
    Ok(Role { active, pending })
}

fn role_field(roles: &Value, path: &str, key: &str) -> LedgerResult<Role> {
    decode_role(field_at(roles, path, key)?, path)
}

/// Operational roles carry the same active/pending record shape but never a
/// pending value; decode and take the active holder.
fn single_phase_role(roles: &Value, path: &str, key: &str) -> LedgerResult<Address> {
    Ok(role_field(roles, path, key)?.active)
}

fn table_id(content: &Value, key: &str) -> LedgerResult<ObjectId> {
    let table = field(content, key)?;
    id_field(table, &format!("{}.id", key), "id")
}

fn version_list(content: &Value, key: &str) -> LedgerResult<Vec<u64>> {
    let list = field(content, key)?
        .as_array()
        .ok_or_else(|| shape(key, "an array of versions"))?;
    let mut versions = Vec::with_capacity(list.len());
    for (i, item) in list.iter().enumerate() {
        versions.push(parse_u64(item, &format!("{}[{}]", key, i))?);
    }
    versions.sort_unstable();
    Ok(versions)
}

fn metadata_field(content: &Value) -> LedgerResult<CoinMetadata> {
    let meta = field(content, "metadata")?;
    Ok(CoinMetadata {
        name: str_field(meta, "metadata.name", "name")?,
        symbol: str_field(meta, "metadata.symbol", "symbol")?,
        description: str_field(meta, "metadata.description", "description")?,
        icon_url: str_field(meta, "metadata.icon_url", "icon_url")?,
        decimals: u8_field(meta, "metadata.decimals", "decimals")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::ObjectOwner;
    use serde_json::json;

    fn addr(last: char) -> String {
        format!("0x{}{}", "0".repeat(63), last)
    }

    fn role_json(active: &str, pending: Option<&str>) -> Value {
        json!({ "active": active, "pending": pending })
    }

    fn treasury_raw() -> RawObject {
        RawObject {
            object_id: addr('1').parse().unwrap(),
            version: 5,
            object_type: format!("{}::treasury::Treasury<{}::usdx::USDX>", addr('9'), addr('8')),
            owner: ObjectOwner::Shared,
            content: json!({
                "roles": {
                    "owner": role_json(&addr('a'), Some(&addr('b'))),
                    "master_minter": role_json(&addr('c'), None),
                    "blocklister": role_json(&addr('d'), None),
                    "pauser": role_json(&addr('e'), None),
                    "metadata_updater": role_json(&addr('f'), None),
                },
                "controllers": { "id": addr('2') },
                "mint_allowances": { "id": addr('3') },
                "total_supply": "1000000",
                "compatible_versions": ["2", 1],
                "metadata": {
                    "name": "USD Example",
                    "symbol": "USDX",
                    "description": "Example dollar",
                    "icon_url": "https://example.com/usdx.svg",
                    "decimals": 6
                }
            }),
        }
    }

    #[test]
    fn test_decode_treasury() {
        let treasury = decode_treasury(&treasury_raw()).unwrap();
        assert_eq!(treasury.coin_type.name, "USDX");
        assert_eq!(treasury.roles.owner.active.as_str(), addr('a'));
        assert_eq!(
            treasury.roles.owner.pending.as_ref().unwrap().as_str(),
            addr('b')
        );
        assert_eq!(treasury.roles.master_minter.as_str(), addr('c'));
        assert_eq!(treasury.controllers_table.as_str(), addr('2'));
        assert_eq!(treasury.total_supply, 1_000_000);
        // Mixed string/number versions decode and come back sorted.
        assert_eq!(treasury.compatible_versions, vec![1, 2]);
        assert_eq!(treasury.metadata.decimals, 6);
    }

    #[test]
    fn test_decode_treasury_rejects_wrong_type() {
        let mut raw = treasury_raw();
        raw.object_type = format!("{}::coin::Coin", addr('9'));
        assert!(decode_treasury(&raw).is_err());
    }

    #[test]
    fn test_decode_treasury_requires_coin_type_param() {
        let mut raw = treasury_raw();
        raw.object_type = format!("{}::treasury::Treasury", addr('9'));
        let err = decode_treasury(&raw).unwrap_err();
        assert!(err.to_string().contains("coin type parameter"));
    }

    #[test]
    fn test_decode_treasury_missing_field_names_path() {
        let mut raw = treasury_raw();
        raw.content["roles"]
            .as_object_mut()
            .unwrap()
            .remove("pauser");
        let err = decode_treasury(&raw).unwrap_err();
        assert!(err.to_string().contains("roles.pauser"));
    }

    #[test]
    fn test_decode_treasury_bad_supply_names_path() {
        let mut raw = treasury_raw();
        raw.content["total_supply"] = json!("not-a-number");
        let err = decode_treasury(&raw).unwrap_err();
        assert!(err.to_string().contains("total_supply"));
    }

    fn upgrade_service_raw() -> RawObject {
        RawObject {
            object_id: addr('4').parse().unwrap(),
            version: 2,
            object_type: format!(
                "{}::upgrade_service::UpgradeService<{}::usdx::USDX>",
                addr('9'),
                addr('8')
            ),
            owner: ObjectOwner::Shared,
            content: json!({
                "admin": role_json(&addr('a'), None),
                "upgrade_cap": {
                    "package": addr('7'),
                    "version": "3",
                    "policy": 0
                }
            }),
        }
    }

    #[test]
    fn test_decode_upgrade_service() {
        let service = decode_upgrade_service(&upgrade_service_raw()).unwrap();
        assert_eq!(service.admin.active.as_str(), addr('a'));
        assert!(service.admin.pending.is_none());
        assert_eq!(service.package_id.as_str(), addr('7'));
        assert_eq!(service.version, 3);
        assert_eq!(service.policy, 0);
    }

    #[test]
    fn test_decode_upgrade_service_missing_cap_field() {
        let mut raw = upgrade_service_raw();
        raw.content["upgrade_cap"]
            .as_object_mut()
            .unwrap()
            .remove("policy");
        let err = decode_upgrade_service(&raw).unwrap_err();
        assert!(err.to_string().contains("upgrade_cap.policy"));
    }

    #[test]
    fn test_decode_table_entries() {
        let entry = RawObject {
            object_id: addr('5').parse().unwrap(),
            version: 1,
            object_type: format!("{}::dynamic_field::Field", addr('2')),
            owner: ObjectOwner::Shared,
            content: json!({ "value": addr('6') }),
        };
        assert_eq!(
            decode_controller_entry(&entry).unwrap().as_str(),
            addr('6')
        );

        let allowance = RawObject {
            content: json!({ "value": "250000" }),
            ..entry
        };
        assert_eq!(decode_allowance_entry(&allowance).unwrap(), 250_000);
    }

    #[test]
    fn test_decode_keys() {
        let name = json!(addr('a'));
        assert_eq!(
            decode_address_key(&name, "controllers.key").unwrap().as_str(),
            addr('a')
        );
        assert!(decode_address_key(&json!(42), "controllers.key").is_err());
        assert_eq!(
            decode_object_id_key(&name, "allowances.key").unwrap().as_str(),
            addr('a')
        );
    }
}
