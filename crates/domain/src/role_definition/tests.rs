use std::sync::Arc;

use proptest::prelude::*;
use rolegate_core::AppError;

use crate::permission::{PermissionCatalog, PermissionEnum, PermissionSpec};
use crate::role::{RoleEnum, RoleSpec};
use crate::value::EnumValue;

use super::RoleDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MerchantPermission {
    MarkAsSoldOut,
    BulkOrderGoods,
    CommunicateWithManufacturers,
    EditProduct,
    CreateProduct,
    SellProduct,
    DeleteTransaction,
    ViewTransactions,
}

impl PermissionEnum for MerchantPermission {
    const CATALOG: &'static str = "merchant_permissions";

    fn all() -> &'static [Self] {
        &[
            Self::MarkAsSoldOut,
            Self::BulkOrderGoods,
            Self::CommunicateWithManufacturers,
            Self::EditProduct,
            Self::CreateProduct,
            Self::SellProduct,
            Self::DeleteTransaction,
            Self::ViewTransactions,
        ]
    }

    fn value(&self) -> EnumValue {
        EnumValue::from(match self {
            Self::MarkAsSoldOut => "mark_as_sold_out",
            Self::BulkOrderGoods => "bulk_order_goods",
            Self::CommunicateWithManufacturers => "communicate_with_manufacturers",
            Self::EditProduct => "edit_product",
            Self::CreateProduct => "create_product",
            Self::SellProduct => "sell_product",
            Self::DeleteTransaction => "delete_transaction",
            Self::ViewTransactions => "view_transactions",
        })
    }

    fn key(&self) -> &'static str {
        match self {
            Self::MarkAsSoldOut => "MarkAsSoldOut",
            Self::BulkOrderGoods => "BulkOrderGoods",
            Self::CommunicateWithManufacturers => "CommunicateWithManufacturers",
            Self::EditProduct => "EditProduct",
            Self::CreateProduct => "CreateProduct",
            Self::SellProduct => "SellProduct",
            Self::DeleteTransaction => "DeleteTransaction",
            Self::ViewTransactions => "ViewTransactions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MerchantRole {
    Distributor,
    RetailManager,
    CustomerAttendant,
    Customer,
}

impl RoleEnum for MerchantRole {
    type Permission = MerchantPermission;

    const DEFINITION: &'static str = "merchant_roles";
    const USES_HIERARCHY: bool = true;
    const DELETE_PIVOT_ON_REMOVE: bool = true;

    fn all() -> &'static [Self] {
        &[
            Self::Distributor,
            Self::RetailManager,
            Self::CustomerAttendant,
            Self::Customer,
        ]
    }

    fn value(&self) -> EnumValue {
        EnumValue::Integer(match self {
            Self::Distributor => 1,
            Self::RetailManager => 2,
            Self::CustomerAttendant => 3,
            Self::Customer => 4,
        })
    }

    fn key(&self) -> &'static str {
        match self {
            Self::Distributor => "Distributor",
            Self::RetailManager => "RetailManager",
            Self::CustomerAttendant => "CustomerAttendant",
            Self::Customer => "Customer",
        }
    }

    fn description(&self) -> Option<&'static str> {
        match self {
            Self::Distributor => Some("Distributes goods to customers"),
            Self::RetailManager => Some("Manages products"),
            _ => None,
        }
    }

    fn grants() -> Vec<(Self, Vec<MerchantPermission>)> {
        vec![
            (
                Self::Distributor,
                vec![
                    MerchantPermission::BulkOrderGoods,
                    MerchantPermission::CommunicateWithManufacturers,
                    MerchantPermission::ViewTransactions,
                    MerchantPermission::DeleteTransaction,
                ],
            ),
            (
                Self::RetailManager,
                vec![
                    MerchantPermission::MarkAsSoldOut,
                    MerchantPermission::EditProduct,
                    MerchantPermission::CreateProduct,
                ],
            ),
            (
                Self::CustomerAttendant,
                vec![MerchantPermission::SellProduct],
            ),
        ]
    }
}

fn merchant_definition() -> RoleDefinition {
    RoleDefinition::from_enum::<MerchantRole>()
        .unwrap_or_else(|error| panic!("merchant definition should build: {error}"))
}

fn flat_catalog() -> Arc<PermissionCatalog> {
    let catalog = PermissionCatalog::new(
        "permissions",
        vec![
            PermissionSpec::new("delete_product", "DeleteProduct"),
            PermissionSpec::new("edit_product", "EditProduct"),
            PermissionSpec::new("create_product", "CreateProduct"),
            PermissionSpec::new("buy_product", "BuyProduct"),
        ],
    )
    .unwrap_or_else(|error| panic!("catalog should build: {error}"));

    Arc::new(catalog)
}

fn value_list(roles: &[crate::role::Role]) -> Vec<EnumValue> {
    roles.iter().map(|role| role.value().clone()).collect()
}

#[test]
fn lower_and_higher_roles_follow_declaration_order() {
    let definition = merchant_definition();

    let lower = definition.lower_roles(&MerchantRole::Distributor.value());
    assert!(lower.is_ok());
    assert_eq!(
        value_list(&lower.unwrap_or_default()),
        vec![
            EnumValue::Integer(2),
            EnumValue::Integer(3),
            EnumValue::Integer(4),
        ]
    );

    let higher = definition.higher_roles(&MerchantRole::CustomerAttendant.value());
    assert_eq!(
        value_list(&higher.unwrap_or_default()),
        vec![EnumValue::Integer(1), EnumValue::Integer(2)]
    );

    let top = definition.higher_roles(&MerchantRole::Distributor.value());
    assert!(top.unwrap_or_default().is_empty());
}

#[test]
fn hierarchy_grants_lower_permissions_but_not_higher_ones() {
    let definition = merchant_definition();
    let permissions = definition.get_permissions(MerchantRole::RetailManager.value());
    assert!(permissions.is_ok());
    let permissions = permissions.unwrap_or_default();

    assert!(permissions.contains(&MerchantPermission::SellProduct.value()));
    assert!(permissions.contains(&MerchantPermission::EditProduct.value()));
    assert!(!permissions.contains(&MerchantPermission::BulkOrderGoods.value()));
    assert_eq!(permissions.len(), 4);
}

#[test]
fn declared_role_without_mapping_has_no_permissions() {
    let definition = merchant_definition();
    let permissions = definition.get_permissions(MerchantRole::Customer.value());
    assert!(permissions.is_ok());
    assert!(permissions.unwrap_or_default().is_empty());
}

#[test]
fn undeclared_role_is_an_unknown_role_error() {
    let definition = merchant_definition();
    let result = definition.get_permissions(99_i64);
    assert!(matches!(result, Err(AppError::UnknownRole { .. })));
}

#[test]
fn hierarchy_disabled_returns_only_own_grants_and_no_neighbours() {
    let definition = RoleDefinition::builder("roles", flat_catalog())
        .role(RoleSpec::new("super_admin", "SuperAdmin"))
        .role(RoleSpec::new("admin", "Admin"))
        .role(RoleSpec::new("customer", "Customer"))
        .grant("super_admin", ["delete_product"])
        .grant("admin", ["edit_product", "create_product"])
        .grant("customer", ["buy_product"])
        .build();
    assert!(definition.is_ok());
    let definition = definition.unwrap_or_else(|_| unreachable!());

    let admin = definition.get_permissions("admin").unwrap_or_default();
    assert_eq!(
        admin.values(),
        vec![
            EnumValue::from("create_product"),
            EnumValue::from("edit_product"),
        ]
    );
    assert!(
        definition
            .lower_roles(&EnumValue::from("admin"))
            .unwrap_or_default()
            .is_empty()
    );
    assert!(
        definition
            .higher_roles(&EnumValue::from("admin"))
            .unwrap_or_default()
            .is_empty()
    );
}

#[test]
fn reordered_mapping_fails_with_hierarchy_error() {
    let result = RoleDefinition::builder("roles", flat_catalog())
        .role(RoleSpec::new("super_admin", "SuperAdmin"))
        .role(RoleSpec::new("admin", "Admin"))
        .grant("admin", ["edit_product"])
        .grant("super_admin", ["delete_product"])
        .build();

    match result {
        Err(AppError::InvalidRoleHierarchy { role, definition }) => {
            assert_eq!(role, "admin");
            assert_eq!(definition, "roles");
        }
        other => panic!("expected hierarchy error, got {other:?}"),
    }
}

#[test]
fn mapping_with_extra_role_fails_with_hierarchy_error() {
    let result = RoleDefinition::builder("roles", flat_catalog())
        .role(RoleSpec::new("admin", "Admin"))
        .grant("admin", ["edit_product"])
        .grant("ghost", ["delete_product"])
        .build();

    assert!(matches!(result, Err(AppError::InvalidRoleHierarchy { .. })));
}

#[test]
fn duplicate_role_keys_are_rejected() {
    let result = RoleDefinition::builder("roles", flat_catalog())
        .role(RoleSpec::new("admin", "Admin"))
        .role(RoleSpec::new("owner", "Admin"))
        .build();

    assert!(
        matches!(result, Err(AppError::Validation(ref message)) if message.contains("role key 'Admin'"))
    );
}

#[test]
fn grants_outside_catalog_are_rejected() {
    let result = RoleDefinition::builder("roles", flat_catalog())
        .role(RoleSpec::new("admin", "Admin"))
        .grant("admin", ["fly_plane"])
        .build();

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn role_metadata_uses_descriptions_and_titles() {
    let definition = merchant_definition();
    let distributor = definition.role(&MerchantRole::Distributor.value());
    assert!(distributor.is_ok());
    let distributor = distributor.unwrap_or_else(|_| unreachable!());
    assert_eq!(distributor.description(), "Distributes goods to customers");
    assert_eq!(distributor.title(), "Distributor");

    let attendant = definition.role(&MerchantRole::CustomerAttendant.value());
    assert_eq!(
        attendant.map(|role| role.description().to_owned()).unwrap_or_default(),
        "Customer attendant"
    );
}

#[test]
fn stored_integer_values_decode_to_roles() {
    let definition = merchant_definition();
    let decoded = definition.decode_stored("2");
    assert_eq!(
        decoded.map(|role| role.key().to_owned()).unwrap_or_default(),
        "RetailManager"
    );
    assert!(matches!(
        definition.decode_stored("retail"),
        Err(AppError::UnknownRole { .. })
    ));
}

#[test]
fn select_pairs_follow_rank() {
    let definition = merchant_definition();
    let pairs = definition.as_select();
    assert_eq!(pairs.len(), 4);
    assert_eq!(pairs[0], (EnumValue::Integer(1), "Distributor".to_owned()));
    assert_eq!(pairs[3], (EnumValue::Integer(4), "Customer".to_owned()));
}

#[test]
fn named_key_lookup_materializes_role() {
    let definition = merchant_definition();
    let role = definition.by_key("RetailManager");
    assert!(matches!(role, Some(Ok(_))));
    assert!(definition.by_key("Janitor").is_none());
}

const PERMISSION_POOL: [&str; 6] = [
    "delete_product",
    "edit_product",
    "create_product",
    "buy_product",
    "sell_product",
    "view_transaction",
];

fn generated_definition(grants: &[Vec<usize>], role_count: usize) -> RoleDefinition {
    let catalog = PermissionCatalog::new(
        "pool",
        PERMISSION_POOL
            .iter()
            .map(|value| PermissionSpec::new(*value, value.to_uppercase()))
            .collect(),
    )
    .unwrap_or_else(|error| panic!("pool catalog should build: {error}"));

    let mut builder = RoleDefinition::builder("generated", Arc::new(catalog)).use_hierarchy(true);
    for index in 0..role_count {
        builder = builder.role(RoleSpec::new(
            EnumValue::Integer(index as i64),
            format!("Role{index}"),
        ));
    }
    for (index, picks) in grants.iter().enumerate().take(role_count) {
        let values: Vec<&str> = picks.iter().map(|pick| PERMISSION_POOL[*pick]).collect();
        builder = builder.grant(EnumValue::Integer(index as i64), values);
    }

    builder
        .build()
        .unwrap_or_else(|error| panic!("generated definition should build: {error}"))
}

proptest! {
    #[test]
    fn higher_roles_hold_every_lower_role_permission(
        role_count in 1usize..6,
        grants in proptest::collection::vec(
            proptest::collection::vec(0usize..PERMISSION_POOL.len(), 0..4),
            0..6,
        ),
    ) {
        let definition = generated_definition(&grants, role_count);

        for rank in 0..role_count {
            let role = EnumValue::Integer(rank as i64);
            let own = definition.get_permissions(role.clone()).unwrap_or_default();
            let lower = definition.lower_roles(&role).unwrap_or_default();
            prop_assert_eq!(lower.len(), role_count - rank - 1);

            for lower_role in lower {
                let inherited = definition
                    .get_permissions(lower_role.value().clone())
                    .unwrap_or_default();
                prop_assert!(inherited.values().iter().all(|value| own.contains(value)));
            }
        }
    }
}
