use async_trait::async_trait;
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{
    EnumValue, IntoValues, NamedCheck, PermissionSet, RoleDefinition, RoleSet,
};

/// Role and permission queries shared by entity and relation scopes.
///
/// Implementors provide storage access; membership checks and
/// authorization are derived from it. Nothing is cached: every query reads
/// the store again.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Returns the definition resolving this scope.
    fn definition(&self) -> &RoleDefinition;

    /// Returns the assigned roles.
    async fn roles(&self) -> AppResult<RoleSet>;

    /// Returns every permission held, role-derived and direct.
    async fn permissions(&self) -> AppResult<PermissionSet>;

    /// Assigns already flattened role values.
    async fn assign_values(&self, roles: Vec<EnumValue>) -> AppResult<bool>;

    /// Removes already flattened role values; an empty list removes all.
    async fn remove_role_values(&self, roles: Vec<EnumValue>) -> AppResult<bool>;

    /// Assigns roles; fails with `InvalidArgument` on empty input or an
    /// undeclared role, before anything is written.
    async fn assign<V>(&self, roles: V) -> AppResult<bool>
    where
        V: IntoValues + Send,
    {
        self.assign_values(roles.into_values()).await
    }

    /// Removes roles; empty input removes every role.
    async fn remove_roles<V>(&self, roles: V) -> AppResult<bool>
    where
        V: IntoValues + Send,
    {
        self.remove_role_values(roles.into_values()).await
    }

    /// Alias of [`Resolver::remove_roles`].
    async fn remove_role<V>(&self, roles: V) -> AppResult<bool>
    where
        V: IntoValues + Send,
    {
        self.remove_role_values(roles.into_values()).await
    }

    /// Removes every role.
    async fn remove_all_roles(&self) -> AppResult<bool> {
        self.remove_role_values(Vec::new()).await
    }

    /// Returns whether every given role is assigned; empty input is `false`.
    async fn has_role<V>(&self, roles: V) -> AppResult<bool>
    where
        V: IntoValues + Send,
    {
        let values = roles.into_values();
        if values.is_empty() {
            return Ok(false);
        }

        Ok(self.roles().await?.contains_all(&values))
    }

    /// Alias of [`Resolver::has_role`].
    async fn has_roles<V>(&self, roles: V) -> AppResult<bool>
    where
        V: IntoValues + Send,
    {
        self.has_role(roles).await
    }

    /// Returns whether every given permission is held.
    async fn holds<V>(&self, permissions: V) -> AppResult<bool>
    where
        V: IntoValues + Send,
    {
        let values = permissions.into_values();
        if values.is_empty() {
            return Err(AppError::InvalidArgument(
                "at least one permission must be passed".to_owned(),
            ));
        }

        Ok(self.permissions().await?.contains_all(&values))
    }

    /// Returns whether a single permission is held; unknown values are
    /// simply not held.
    async fn can<P>(&self, permission: P) -> AppResult<bool>
    where
        P: Into<EnumValue> + Send,
    {
        let value = permission.into();
        Ok(self.permissions().await?.contains(&value))
    }

    /// Fails with `PermissionDenied` unless every permission is held.
    async fn authorize<V>(&self, permissions: V) -> AppResult<()>
    where
        V: IntoValues + Send,
    {
        if self.holds(permissions).await? {
            Ok(())
        } else {
            Err(AppError::permission_denied())
        }
    }

    /// Fails with `PermissionDenied` unless every role is assigned.
    async fn authorize_role<V>(&self, roles: V) -> AppResult<()>
    where
        V: IntoValues + Send,
    {
        if self.has_role(roles).await? {
            Ok(())
        } else {
            Err(AppError::permission_denied())
        }
    }

    /// Like [`Resolver::authorize_role`], rejecting empty input.
    async fn authorize_roles<V>(&self, roles: V) -> AppResult<()>
    where
        V: IntoValues + Send,
    {
        let values = roles.into_values();
        if values.is_empty() {
            return Err(AppError::InvalidArgument(
                "at least one role must be passed".to_owned(),
            ));
        }

        self.authorize_role(values).await
    }

    /// Evaluates a check named like `isAdmin` or `canEditProduct`.
    async fn has_named(&self, name: &str) -> AppResult<bool> {
        let check = NamedCheck::parse(name).ok_or_else(|| {
            AppError::InvalidArgument(format!("Call to undefined method {name}()"))
        })?;

        match check {
            NamedCheck::Role(key) => {
                let role = self.definition().by_key(key.as_str()).ok_or_else(|| {
                    AppError::InvalidArgument(format!(
                        "the role key '{key}' does not exist on the '{}' definition",
                        self.definition().name()
                    ))
                })??;
                self.has_role(role.value().clone()).await
            }
            NamedCheck::Permission(key) => {
                let value = self
                    .definition()
                    .catalog()
                    .by_key(key.as_str())
                    .map(|permission| permission.value().clone())
                    .ok_or_else(|| {
                        AppError::InvalidArgument(format!(
                            "the permission key '{key}' does not exist on the '{}' catalog",
                            self.definition().catalog().name()
                        ))
                    })?;
                self.can(value).await
            }
        }
    }
}
