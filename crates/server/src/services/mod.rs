//! Business logic: validation, authorization, and the mutation pipeline.
//!
//! Every mutating operation follows the same sequence: authorize (role gate
//! already passed in middleware, ownership resolved here), validate domain
//! constraints, pre-check uniqueness/existence against the Entity Store,
//! write, commit, invalidate the affected cache keys, then propagate to the
//! search index best-effort. The commit is the durability boundary; nothing
//! after it can fail the request or undo the write.

pub mod auth;
pub mod inventory;
pub mod items;
pub mod search;
pub mod shops;

use localmart_core::Email;
use serde_json::Value;

use crate::db::{EntityKind, EntityStore, Filter, Record};
use crate::error::AppError;
use crate::models::{Shop, User};

/// Outcome of an update-path mutation.
///
/// `NoChanges` is the idempotence short-circuit: the field delta against the
/// stored record was empty, so no write, cache invalidation, or index
/// propagation happened.
#[derive(Debug)]
pub enum Mutation<T> {
    Applied(T),
    NoChanges(T),
}

/// A read served through the cache, tagged with where it came from.
#[derive(Debug)]
pub struct CachedRead {
    pub body: Value,
    pub from_cache: bool,
}

/// Look up a user by normalized email.
pub(crate) async fn find_user_by_email(
    store: &EntityStore,
    email: &Email,
) -> Result<Option<User>, AppError> {
    let record = store
        .get_one(EntityKind::User, &vec![("email", Filter::equals(email))])
        .await?;
    match record {
        Some(Record::User(user)) => Ok(Some(user)),
        _ => Ok(None),
    }
}

/// Resolve the account behind an authenticated session.
///
/// The session stores the email snapshot; the account row is the source of
/// truth for the user's id during ownership checks.
pub(crate) async fn resolve_session_user(
    store: &EntityStore,
    email: &Email,
) -> Result<User, AppError> {
    find_user_by_email(store, email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account not found".to_owned()))
}

/// Ownership check: the user must own the shop, unless they are an admin.
pub(crate) fn ensure_owner(user: &User, shop: &Shop, denial: &str) -> Result<(), AppError> {
    if user.role.is_admin() || shop.owner_id == user.id {
        Ok(())
    } else {
        Err(AppError::Forbidden(denial.to_owned()))
    }
}

/// Load a shop by id, or report it missing.
pub(crate) async fn load_shop(
    store: &EntityStore,
    shop_id: localmart_core::ShopId,
) -> Result<Option<Shop>, AppError> {
    let record = store
        .get_one(EntityKind::Shop, &vec![("shop_id", Filter::equals(shop_id))])
        .await?;
    match record {
        Some(Record::Shop(shop)) => Ok(Some(shop)),
        _ => Ok(None),
    }
}

// =============================================================================
// Field validation
// =============================================================================

pub(crate) fn validate_full_name(full_name: &str) -> Result<String, AppError> {
    let trimmed = full_name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Invalid fullName".to_owned()));
    }
    if trimmed.len() < 2 || trimmed.len() > 50 {
        return Err(AppError::Validation(
            "Full name should be between 2 and 50 characters".to_owned(),
        ));
    }
    if !trimmed.chars().all(|c| c.is_alphanumeric() || c == ' ') {
        return Err(AppError::Validation(
            "Only alphanumeric characters and spaces are allowed for full name".to_owned(),
        ));
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn validate_shop_name(shop_name: &str) -> Result<String, AppError> {
    let trimmed = shop_name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Invalid shop name".to_owned()));
    }
    if trimmed.len() < 2 || trimmed.len() > 100 {
        return Err(AppError::Validation(
            "Shop name should be between 2 and 100 characters".to_owned(),
        ));
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn validate_address(address: &str) -> Result<String, AppError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Invalid address".to_owned()));
    }
    if trimmed.len() < 5 || trimmed.len() > 200 {
        return Err(AppError::Validation(
            "Address should be between 5 and 200 characters".to_owned(),
        ));
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn validate_contact(contact: &str) -> Result<String, AppError> {
    let trimmed = contact.trim();
    if trimmed.len() < 10 || trimmed.len() > 15 {
        return Err(AppError::Validation(
            "Contact should be between 10 and 15 characters".to_owned(),
        ));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ')
    {
        return Err(AppError::Validation(
            "Contact should only contain digits, +, -, and spaces".to_owned(),
        ));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use localmart_core::{Role, ShopId, UserId};

    fn user_with_role(role: Role) -> User {
        User {
            id: UserId::generate(),
            email: Email::parse("someone@example.com").unwrap(),
            password_hash: String::new(),
            role,
            full_name: None,
            created_at: Utc::now(),
            updated_at: None,
            note: None,
        }
    }

    fn shop_owned_by(owner_id: UserId) -> Shop {
        Shop {
            shop_id: ShopId::generate(),
            owner_id,
            full_name: "Asha Verma".to_owned(),
            shop_name: "Verma Handicrafts".to_owned(),
            address: "14 Bazaar Road".to_owned(),
            contact: None,
            description: None,
            is_open: true,
            latitude: 28.6139,
            longitude: 77.2090,
            created_at: Utc::now(),
            updated_at: None,
            note: None,
        }
    }

    #[test]
    fn test_ensure_owner_accepts_owner() {
        let user = user_with_role(Role::Vendor);
        let shop = shop_owned_by(user.id);
        assert!(ensure_owner(&user, &shop, "denied").is_ok());
    }

    #[test]
    fn test_ensure_owner_rejects_other_vendor() {
        let user = user_with_role(Role::Vendor);
        let shop = shop_owned_by(UserId::generate());
        let err = ensure_owner(&user, &shop, "You can only add items to your own shop.")
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_ensure_owner_admin_bypass() {
        let admin = user_with_role(Role::Admin);
        let shop = shop_owned_by(UserId::generate());
        assert!(ensure_owner(&admin, &shop, "denied").is_ok());

        let super_admin = user_with_role(Role::SuperAdmin);
        assert!(ensure_owner(&super_admin, &shop, "denied").is_ok());
    }

    #[test]
    fn test_validate_full_name() {
        assert_eq!(validate_full_name(" Asha Verma ").unwrap(), "Asha Verma");
        assert!(validate_full_name("").is_err());
        assert!(validate_full_name("A").is_err());
        assert!(validate_full_name(&"x".repeat(51)).is_err());
        assert!(validate_full_name("Asha! Verma").is_err());
    }

    #[test]
    fn test_validate_shop_name_bounds() {
        assert_eq!(validate_shop_name("Verma Handicrafts").unwrap(), "Verma Handicrafts");
        assert!(validate_shop_name(" ").is_err());
        assert!(validate_shop_name("V").is_err());
        assert!(validate_shop_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_address_bounds() {
        assert!(validate_address("14 Bazaar Road").is_ok());
        assert!(validate_address("abc").is_err());
        assert!(validate_address(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_contact() {
        assert_eq!(validate_contact("+91 98765-4321").unwrap(), "+91 98765-4321");
        assert!(validate_contact("12345").is_err());
        assert!(validate_contact("98765432101abc!").is_err());
    }
}
