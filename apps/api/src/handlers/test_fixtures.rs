use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use rolegate_application::AccessService;
use rolegate_domain::DefinitionsDocument;
use rolegate_infrastructure::InMemoryAssignmentStore;

use crate::error::ApiError;
use crate::state::AppState;

const DOCUMENT: &str = r#"{
    "permission_catalogs": [
        {
            "name": "permissions",
            "permissions": [
                {"value": "delete_product", "key": "DeleteProduct"},
                {"value": "edit_product", "key": "EditProduct"},
                {"value": "buy_product", "key": "BuyProduct"}
            ]
        },
        {
            "name": "merchant_permissions",
            "permissions": [
                {"value": "manage_staff", "key": "ManageStaff"},
                {"value": "sell", "key": "Sell"}
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
        },
        {
            "name": "merchant_roles",
            "permission_catalog": "merchant_permissions",
            "use_hierarchy": true,
            "roles": [
                {"value": 1, "key": "Manager"},
                {"value": 2, "key": "Attendant"}
            ],
            "grants": [
                {"role": 1, "permissions": ["manage_staff"]},
                {"role": 2, "permissions": ["sell"]}
            ]
        }
    ],
    "registry": {"default": "roles", "scopes": {"merchant_user": "merchant_roles"}},
    "relations": [
        {
            "owner": "users",
            "name": "merchants",
            "related": "merchants",
            "kind": "belongs_to_many",
            "table": "merchant_user",
            "foreign_pivot_key": "user_id",
            "related_pivot_key": "merchant_id"
        },
        {
            "owner": "users",
            "name": "profile",
            "related": "profiles",
            "kind": "has_one"
        }
    ],
    "scopes": []
}"#;

pub(crate) fn app_state() -> AppState {
    let parts =
        DefinitionsDocument::from_json_str(DOCUMENT).and_then(DefinitionsDocument::into_parts);
    let Ok((registry, relations)) = parts else {
        panic!("test definitions document must be valid");
    };

    let store = Arc::new(InMemoryAssignmentStore::new());
    AppState {
        access_service: AccessService::new(
            store.clone(),
            store,
            Arc::new(registry),
            Arc::new(relations),
        ),
        pool: None,
    }
}

pub(crate) fn status_of(error: ApiError) -> StatusCode {
    error.into_response().status()
}
