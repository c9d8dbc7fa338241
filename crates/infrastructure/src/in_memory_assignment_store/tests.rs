use std::sync::Arc;

use rolegate_application::{
    AccessService, AssignmentStore, PivotRemoval, RelationAssignmentStore, RelationScope, Resolver,
};
use rolegate_core::EntityRef;
use rolegate_domain::{
    Condition, Conditions, DefinitionsDocument, EnumValue, PivotColumns, PivotTable,
};
use serde_json::json;

use super::InMemoryAssignmentStore;

fn entity(collection: &str, key: &str) -> EntityRef {
    EntityRef::new(collection, key).unwrap_or_else(|_| unreachable!())
}

fn scope(conditions: Conditions) -> RelationScope {
    RelationScope {
        owner: entity("users", "1"),
        related: entity("merchants", "10"),
        relation: "merchants".to_owned(),
        pivot: PivotTable {
            table: "merchant_user".to_owned(),
            foreign_pivot_key: "user_id".to_owned(),
            related_pivot_key: "merchant_id".to_owned(),
            timestamps: true,
        },
        conditions,
    }
}

fn columns(value: serde_json::Value) -> PivotColumns {
    match value {
        serde_json::Value::Object(map) => map,
        _ => PivotColumns::new(),
    }
}

#[tokio::test]
async fn role_assignments_are_unique_per_entity() {
    let store = InMemoryAssignmentStore::new();
    let user = entity("users", "1");

    let roles = [EnumValue::from("admin"), EnumValue::from("admin")];
    assert!(store.insert_role_assignments(&user, &roles).await.is_ok());
    assert!(
        store
            .insert_role_assignments(&user, &[EnumValue::from("admin")])
            .await
            .is_ok()
    );

    let listed = store.list_role_assignments(&user).await;
    assert!(listed.is_ok());
    assert_eq!(listed.unwrap_or_default().len(), 1);
}

#[tokio::test]
async fn role_assignments_do_not_leak_across_entities() {
    let store = InMemoryAssignmentStore::new();
    let left = entity("users", "1");
    let right = entity("teams", "1");

    assert!(
        store
            .insert_role_assignments(&left, &[EnumValue::from("admin")])
            .await
            .is_ok()
    );

    let listed = store.list_role_assignments(&right).await;
    assert!(listed.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn delete_without_filter_removes_every_grant() {
    let store = InMemoryAssignmentStore::new();
    let user = entity("users", "1");
    let permissions = [EnumValue::from("edit_product"), EnumValue::from("buy_product")];
    assert!(store.insert_permission_grants(&user, &permissions).await.is_ok());

    let partial = store
        .delete_permission_grants(&user, Some(&permissions[..1]))
        .await;
    assert_eq!(partial.unwrap_or_default(), 1);

    let rest = store.delete_permission_grants(&user, None).await;
    assert_eq!(rest.unwrap_or_default(), 1);
    assert!(
        store
            .list_permission_grants(&user)
            .await
            .unwrap_or_default()
            .is_empty()
    );
}

#[tokio::test]
async fn integer_roles_are_stored_as_text() {
    let store = InMemoryAssignmentStore::new();
    let user = entity("users", "1");
    assert!(
        store
            .insert_role_assignments(&user, &[EnumValue::Integer(2)])
            .await
            .is_ok()
    );

    let listed = store.list_role_assignments(&user).await.unwrap_or_default();
    assert_eq!(listed[0].role, "2");
}

#[tokio::test]
async fn attach_updates_pivot_of_existing_role() {
    let store = InMemoryAssignmentStore::new();
    let scope = scope(Conditions::new());

    let first = store
        .attach_relation_roles(&scope, &[EnumValue::Integer(3)], &columns(json!({"level": 1})))
        .await;
    assert!(first.is_ok());
    let second = store
        .attach_relation_roles(&scope, &[EnumValue::Integer(3)], &columns(json!({"level": 4})))
        .await;
    assert!(second.is_ok());

    let rows = store.list_relation_roles(&scope).await.unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].pivot.get("level"), Some(&json!(4)));
    assert!(rows[0].created_at.is_some());
}

#[tokio::test]
async fn null_role_removal_keeps_rows_but_hides_them() {
    let store = InMemoryAssignmentStore::new();
    let scope = scope(Conditions::new());
    assert!(
        store
            .attach_relation_roles(&scope, &[EnumValue::from("admin")], &PivotColumns::new())
            .await
            .is_ok()
    );

    let affected = store
        .detach_relation_roles(&scope, None, PivotRemoval::NullRole)
        .await;
    assert_eq!(affected.unwrap_or_default(), 1);
    assert!(
        store
            .list_relation_roles(&scope)
            .await
            .unwrap_or_default()
            .is_empty()
    );
    assert_eq!(
        store
            .pivot_rows
            .read()
            .await
            .get("merchant_user")
            .map(Vec::len),
        Some(1)
    );
}

#[tokio::test]
async fn conditions_restrict_detach() {
    let store = InMemoryAssignmentStore::new();
    let unfiltered = scope(Conditions::new());
    assert!(
        store
            .attach_relation_roles(
                &unfiltered,
                &[EnumValue::Integer(1)],
                &columns(json!({"department": "sales"})),
            )
            .await
            .is_ok()
    );

    let support = scope([Condition::equals("department", "support")].into_iter().collect());
    let affected = store
        .detach_relation_roles(&support, None, PivotRemoval::DeleteRow)
        .await;
    assert_eq!(affected.unwrap_or_default(), 0);
    assert_eq!(
        store
            .list_relation_roles(&unfiltered)
            .await
            .unwrap_or_default()
            .len(),
        1
    );
}

const DOCUMENT: &str = r#"{
    "permission_catalogs": [
        {
            "name": "permissions",
            "permissions": [
                {"value": "delete_product", "key": "DeleteProduct"},
                {"value": "edit_product", "key": "EditProduct"},
                {"value": "buy_product", "key": "BuyProduct"}
            ]
        }
    ],
    "role_definitions": [
        {
            "name": "roles",
            "permission_catalog": "permissions",
            "roles": [
                {"value": "admin", "key": "Admin"},
                {"value": "customer", "key": "Customer"}
            ],
            "grants": [
                {"role": "admin", "permissions": ["delete_product", "edit_product"]},
                {"role": "customer", "permissions": ["buy_product"]}
            ]
        }
    ],
    "registry": {"default": "roles"}
}"#;

fn filtered(condition: Condition) -> RelationScope {
    scope([condition].into_iter().collect())
}

#[tokio::test]
async fn conditions_see_role_keys_and_timestamps() {
    let store = InMemoryAssignmentStore::new();
    let attached = store
        .attach_relation_roles(
            &scope(Conditions::new()),
            &[EnumValue::Integer(1), EnumValue::Integer(2)],
            &PivotColumns::new(),
        )
        .await;
    assert!(attached.is_ok());

    let by_role = store
        .list_relation_roles(&filtered(Condition::equals("role", "1")))
        .await;
    let by_role = by_role.unwrap_or_default();
    assert_eq!(by_role.len(), 1);
    assert_eq!(by_role[0].role, "1");

    let stamped = store
        .list_relation_roles(&filtered(Condition::not_null("created_at")))
        .await;
    assert_eq!(stamped.unwrap_or_default().len(), 2);

    let by_key = store
        .list_relation_roles(&filtered(Condition::equals("merchant_id", "10")))
        .await;
    assert_eq!(by_key.unwrap_or_default().len(), 2);

    let detached = store
        .detach_relation_roles(
            &filtered(Condition::equals("role", 2)),
            None,
            PivotRemoval::DeleteRow,
        )
        .await;
    assert_eq!(detached.unwrap_or_default(), 1);
}

#[tokio::test]
async fn custom_role_column_is_visible_to_conditions() {
    let store = InMemoryAssignmentStore::new().with_role_column("membership_role");
    assert!(store.is_ok());
    let Ok(store) = store else { unreachable!() };
    assert!(
        store
            .attach_relation_roles(
                &scope(Conditions::new()),
                &[EnumValue::from("owner")],
                &PivotColumns::new(),
            )
            .await
            .is_ok()
    );

    let listed = store
        .list_relation_roles(&filtered(Condition::equals("membership_role", "owner")))
        .await;
    assert_eq!(listed.unwrap_or_default().len(), 1);
    assert!(
        InMemoryAssignmentStore::new()
            .with_role_column("role; drop")
            .is_err()
    );
}

#[tokio::test]
async fn relation_grants_ignore_conditions_and_other_pairs() {
    let store = InMemoryAssignmentStore::new();
    let unfiltered = scope(Conditions::new());
    let filtered = scope([Condition::equals("department", "sales")].into_iter().collect());
    let mut other = scope(Conditions::new());
    other.related = entity("merchants", "11");

    let permissions = [EnumValue::from("edit_product"), EnumValue::from("sell_product")];
    assert!(
        store
            .insert_relation_permission_grants(&unfiltered, &permissions)
            .await
            .is_ok()
    );

    let listed = store.list_relation_permission_grants(&filtered).await;
    assert_eq!(listed.unwrap_or_default().len(), 2);
    let listed = store.list_relation_permission_grants(&other).await;
    assert!(listed.unwrap_or_default().is_empty());

    let removed = store
        .delete_relation_permission_grants(&unfiltered, Some(&permissions[..1]))
        .await;
    assert_eq!(removed.unwrap_or_default(), 1);
    let removed = store.delete_relation_permission_grants(&unfiltered, None).await;
    assert_eq!(removed.unwrap_or_default(), 1);
}

#[tokio::test]
async fn access_service_runs_on_the_in_memory_store() {
    let parts =
        DefinitionsDocument::from_json_str(DOCUMENT).and_then(DefinitionsDocument::into_parts);
    assert!(parts.is_ok());
    let Ok((registry, relations)) = parts else {
        unreachable!()
    };

    let store = Arc::new(InMemoryAssignmentStore::new());
    let service = AccessService::new(
        store.clone(),
        store,
        Arc::new(registry),
        Arc::new(relations),
    );
    let user = service.entity(entity("users", "7"));

    assert!(user.assign("customer").await.is_ok());
    assert!(user.give("edit_product").await.is_ok());

    assert!(user.holds(["buy_product", "edit_product"]).await.unwrap_or_default());
    assert!(user.authorize("delete_product").await.is_err());
}
