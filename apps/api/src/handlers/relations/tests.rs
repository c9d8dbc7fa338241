use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::{
    relation_assign_roles_handler, relation_authorize_handler, relation_can_handler,
    relation_give_permissions_handler, relation_has_role_handler, relation_holds_handler,
    relation_list_direct_permissions_handler, relation_list_roles_handler,
    relation_remove_roles_handler, relation_revoke_permissions_handler,
};
use crate::handlers::test_fixtures::{app_state, status_of};

fn request<T: DeserializeOwned>(body: Value) -> Json<T> {
    match serde_json::from_value(body) {
        Ok(value) => Json(value),
        Err(error) => panic!("invalid test request: {error}"),
    }
}

fn scoped(extra: Value) -> Value {
    let mut body = json!({
        "owner": {"collection": "users", "key": "1"},
        "related": {"collection": "merchants", "key": "10"}
    });
    if let (Value::Object(body), Value::Object(extra)) = (&mut body, extra) {
        body.extend(extra);
    }
    body
}

#[tokio::test]
async fn relation_roles_inherit_lower_permissions() {
    let state = app_state();

    let assigned = relation_assign_roles_handler(
        State(state.clone()),
        request(scoped(json!({"roles": [1], "pivot": {"department": "sales"}}))),
    )
    .await;
    assert!(assigned.is_ok());

    let listed =
        relation_list_roles_handler(State(state.clone()), request(scoped(json!({})))).await;
    let Ok(Json(listed)) = listed else {
        unreachable!()
    };
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].key, "Manager");

    let holds = relation_holds_handler(
        State(state),
        request(scoped(json!({"permissions": ["manage_staff", "sell"]}))),
    )
    .await;
    assert!(matches!(holds, Ok(Json(ref response)) if response.granted));
}

#[tokio::test]
async fn pivot_conditions_narrow_the_scope() {
    let state = app_state();
    assert!(
        relation_assign_roles_handler(
            State(state.clone()),
            request(scoped(json!({"roles": [2], "pivot": {"department": "sales"}}))),
        )
        .await
        .is_ok()
    );

    let support = relation_has_role_handler(
        State(state.clone()),
        request(scoped(json!({
            "roles": [2],
            "calls": [{"method": "wherePivot", "arguments": ["department", "support"]}]
        }))),
    )
    .await;
    assert!(matches!(support, Ok(Json(ref response)) if !response.granted));

    let sales = relation_has_role_handler(
        State(state),
        request(scoped(json!({
            "roles": [2],
            "calls": [{"method": "wherePivot", "arguments": ["department", "sales"]}]
        }))),
    )
    .await;
    assert!(matches!(sales, Ok(Json(ref response)) if response.granted));
}

#[tokio::test]
async fn removed_relation_roles_deny_authorization() {
    let state = app_state();
    assert!(
        relation_assign_roles_handler(State(state.clone()), request(scoped(json!({"roles": [2]}))))
            .await
            .is_ok()
    );
    assert!(
        relation_remove_roles_handler(State(state.clone()), request(scoped(json!({}))))
            .await
            .is_ok()
    );

    let denied = relation_authorize_handler(
        State(state),
        request(scoped(json!({"permissions": ["sell"]}))),
    )
    .await;
    let Err(error) = denied else {
        unreachable!()
    };
    assert_eq!(status_of(error), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn non_pivot_relations_are_unprocessable() {
    let listed = relation_list_roles_handler(
        State(app_state()),
        request(json!({
            "owner": {"collection": "users", "key": "1"},
            "related": {"collection": "profiles", "key": "3"},
            "relation": "profile"
        })),
    )
    .await;
    let Err(error) = listed else {
        unreachable!()
    };
    assert_eq!(status_of(error), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn undefined_chained_methods_are_rejected() {
    let listed = relation_list_roles_handler(
        State(app_state()),
        request(scoped(json!({"calls": [{"method": "archived"}]}))),
    )
    .await;
    assert!(listed.is_err());
}

#[tokio::test]
async fn relation_grants_apply_to_the_pair_only() {
    let state = app_state();
    let given = relation_give_permissions_handler(
        State(state.clone()),
        request(scoped(json!({"permissions": ["sell"]}))),
    )
    .await;
    assert!(matches!(given, Ok(Json(ref response)) if response.changed));

    let can = relation_can_handler(
        State(state.clone()),
        request(scoped(json!({"permission": "sell"}))),
    )
    .await;
    assert!(matches!(can, Ok(Json(ref response)) if response.granted));

    let elsewhere = relation_can_handler(
        State(state.clone()),
        request(json!({
            "owner": {"collection": "users", "key": "1"},
            "related": {"collection": "merchants", "key": "11"},
            "permission": "sell"
        })),
    )
    .await;
    assert!(matches!(elsewhere, Ok(Json(ref response)) if !response.granted));

    assert!(
        relation_revoke_permissions_handler(State(state.clone()), request(scoped(json!({}))))
            .await
            .is_ok()
    );
    let direct =
        relation_list_direct_permissions_handler(State(state), request(scoped(json!({})))).await;
    assert!(matches!(direct, Ok(Json(ref listed)) if listed.is_empty()));
}

#[tokio::test]
async fn relation_give_rejects_foreign_permissions() {
    let given = relation_give_permissions_handler(
        State(app_state()),
        request(scoped(json!({"permissions": ["delete_product"]}))),
    )
    .await;
    let Err(error) = given else {
        unreachable!()
    };
    assert_eq!(status_of(error), StatusCode::BAD_REQUEST);
}
