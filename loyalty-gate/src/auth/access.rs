//! Access predicates
//!
//! Pure functions over a [`Principal`] and a target shop. Every route
//! handler calls one of these before touching shop data.
//!
//! | Role | access shop | modify shop | permission |
//! |------|-------------|-------------|------------|
//! | SUPER_ADMIN | always | always | always |
//! | SHOP_ADMIN | own shop | own shop | own shop (or no shop given) |
//! | SHOP_STAFF | own shop | never | own shop and in effective set |
//! | CUSTOMER | always | never | never |
//! | unrecognized | never | never | never |
//!
//! Customer access here is shop-level only; record ownership is checked
//! separately by [`can_access_customer_record`].

use shared::models::{Permission, Role};

use super::principal::Principal;

/// May the principal read resources scoped to `shop_id`?
pub fn can_access_shop(principal: &Principal, shop_id: &str) -> bool {
    match principal.role {
        Role::SuperAdmin => true,
        Role::ShopAdmin | Role::ShopStaff => principal.is_member_of(shop_id),
        Role::Customer => true,
        Role::Unrecognized => false,
    }
}

/// May the principal change shop-level resources of `shop_id`?
///
/// Staff mutations go through [`has_permission`] instead.
pub fn can_modify_shop(principal: &Principal, shop_id: &str) -> bool {
    match principal.role {
        Role::SuperAdmin => true,
        Role::ShopAdmin => principal.is_member_of(shop_id),
        Role::ShopStaff | Role::Customer | Role::Unrecognized => false,
    }
}

/// Does the principal hold `permission`, optionally within `shop_id`?
pub fn has_permission(
    principal: &Principal,
    permission: Permission,
    shop_id: Option<&str>,
) -> bool {
    match principal.role {
        Role::SuperAdmin => true,
        Role::ShopAdmin => shop_id.is_none_or(|shop| principal.is_member_of(shop)),
        Role::ShopStaff => {
            shop_id.is_some_and(|shop| principal.is_member_of(shop))
                && principal.effective_permissions().contains(permission)
        }
        Role::Customer | Role::Unrecognized => false,
    }
}

/// True if at least one of `permissions` holds; stops at the first match
pub fn has_any_permission(
    principal: &Principal,
    permissions: &[Permission],
    shop_id: Option<&str>,
) -> bool {
    permissions
        .iter()
        .any(|&permission| has_permission(principal, permission, shop_id))
}

/// True if every one of `permissions` holds; stops at the first miss
///
/// An empty list is vacuously true, except for unrecognized roles.
pub fn has_all_permissions(
    principal: &Principal,
    permissions: &[Permission],
    shop_id: Option<&str>,
) -> bool {
    principal.role != Role::Unrecognized
        && permissions
            .iter()
            .all(|&permission| has_permission(principal, permission, shop_id))
}

/// Record-level check for customer-owned data (loyalty cards, history)
///
/// Customers only see their own records; shop staff need `VIEW_CUSTOMERS`
/// in the shop the record is being read through.
pub fn can_access_customer_record(principal: &Principal, owner_id: &str, shop_id: &str) -> bool {
    match principal.role {
        Role::SuperAdmin => true,
        Role::Customer => principal.id == owner_id,
        Role::ShopAdmin => principal.is_member_of(shop_id),
        Role::ShopStaff => has_permission(principal, Permission::ViewCustomers, Some(shop_id)),
        Role::Unrecognized => false,
    }
}

/// Does the principal hold one of `roles`?
pub fn has_role(principal: &Principal, roles: &[Role]) -> bool {
    principal.role != Role::Unrecognized && roles.contains(&principal.role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{PermissionSet, StaffRole};

    fn unrecognized() -> Principal {
        Principal::new("x1", Role::Unrecognized, Some("shop_1".into()), None, None)
    }

    #[test]
    fn test_super_admin_always_allowed() {
        let p = Principal::super_admin("root");
        for shop in ["shop_1", "shop_2", ""] {
            assert!(can_access_shop(&p, shop));
            assert!(can_modify_shop(&p, shop));
            for permission in Permission::ALL {
                assert!(has_permission(&p, permission, Some(shop)));
                assert!(has_permission(&p, permission, None));
            }
        }
    }

    #[test]
    fn test_customer_never_holds_permissions() {
        let p = Principal::customer("c1");
        for permission in Permission::ALL {
            assert!(!has_permission(&p, permission, Some("shop_1")));
            assert!(!has_permission(&p, permission, None));
        }
        assert!(!can_modify_shop(&p, "shop_1"));
        assert!(can_access_shop(&p, "shop_1"));
        assert!(can_access_shop(&p, "shop_2"));
    }

    #[test]
    fn test_shop_admin_own_shop_only() {
        let p = Principal::shop_admin("a1", "shop_1");
        for permission in Permission::ALL {
            assert!(has_permission(&p, permission, Some("shop_1")));
            assert!(has_permission(&p, permission, None));
            assert!(!has_permission(&p, permission, Some("shop_2")));
        }
        assert!(can_access_shop(&p, "shop_1"));
        assert!(!can_access_shop(&p, "shop_2"));
        assert!(can_modify_shop(&p, "shop_1"));
        assert!(!can_modify_shop(&p, "shop_2"));
    }

    #[test]
    fn test_cashier_defaults() {
        let p = Principal::shop_staff("s1", "shop_1", StaffRole::Cashier);
        assert!(!has_permission(&p, Permission::ManageMenu, Some("shop_1")));
        assert!(has_permission(&p, Permission::ViewCustomers, Some("shop_1")));
        assert!(!has_permission(&p, Permission::ManageMenu, Some("shop_2")));
        assert!(!has_permission(&p, Permission::ViewCustomers, Some("shop_2")));
    }

    #[test]
    fn test_manager_scenario() {
        let p = Principal::shop_staff("m1", "shop_1", StaffRole::Manager);
        assert!(has_permission(&p, Permission::ManageStaff, Some("shop_1")));
        assert!(!has_permission(&p, Permission::ManageStaff, Some("shop_2")));
    }

    #[test]
    fn test_staff_never_modifies_shop() {
        let p = Principal::shop_staff("m1", "shop_1", StaffRole::Owner);
        assert!(can_access_shop(&p, "shop_1"));
        assert!(!can_modify_shop(&p, "shop_1"));
    }

    #[test]
    fn test_staff_requires_target_shop() {
        let p = Principal::shop_staff("m1", "shop_1", StaffRole::Manager);
        assert!(!has_permission(&p, Permission::ViewMenu, None));
    }

    #[test]
    fn test_staff_without_shop_fails_closed() {
        let p = Principal::new("s1", Role::ShopStaff, None, Some(StaffRole::Manager), None);
        assert!(!can_access_shop(&p, "shop_1"));
        assert!(!can_access_shop(&p, ""));
        assert!(!has_permission(&p, Permission::ViewMenu, Some("shop_1")));
        assert!(!has_permission(&p, Permission::ViewMenu, None));
    }

    #[test]
    fn test_explicit_permissions_override_table() {
        let p = Principal::shop_staff("s1", "shop_1", StaffRole::Cashier)
            .with_explicit_permissions([Permission::ManageMenu].into_iter().collect());
        assert!(has_permission(&p, Permission::ManageMenu, Some("shop_1")));
        assert!(!has_permission(&p, Permission::ViewCustomers, Some("shop_1")));
    }

    #[test]
    fn test_empty_explicit_permissions_deny_everything() {
        let p = Principal::shop_staff("s1", "shop_1", StaffRole::Manager)
            .with_explicit_permissions(PermissionSet::new());
        for permission in Permission::ALL {
            assert!(!has_permission(&p, permission, Some("shop_1")));
        }
    }

    #[test]
    fn test_unrecognized_role_fails_everything() {
        let p = unrecognized();
        assert!(!can_access_shop(&p, "shop_1"));
        assert!(!can_modify_shop(&p, "shop_1"));
        for permission in Permission::ALL {
            assert!(!has_permission(&p, permission, Some("shop_1")));
            assert!(!has_permission(&p, permission, None));
        }
        assert!(!has_any_permission(&p, &Permission::ALL, Some("shop_1")));
        assert!(!has_all_permissions(&p, &[], Some("shop_1")));
        assert!(!can_access_customer_record(&p, "x1", "shop_1"));
        assert!(!has_role(&p, &[Role::Unrecognized]));
    }

    #[test]
    fn test_any_and_all() {
        let p = Principal::shop_staff("s1", "shop_1", StaffRole::Barista);
        let mixed = [Permission::ManageMenu, Permission::ViewMenu];

        assert!(has_any_permission(&p, &mixed, Some("shop_1")));
        assert!(!has_all_permissions(&p, &mixed, Some("shop_1")));
        assert!(has_all_permissions(
            &p,
            &[Permission::ViewMenu, Permission::CreateTransaction],
            Some("shop_1")
        ));
        assert!(!has_any_permission(&p, &mixed, Some("shop_2")));

        assert!(!has_any_permission(&p, &[], Some("shop_1")));
        assert!(has_all_permissions(&p, &[], Some("shop_1")));
    }

    #[test]
    fn test_customer_record_ownership() {
        let owner = Principal::customer("c1");
        let other = Principal::customer("c2");
        assert!(can_access_customer_record(&owner, "c1", "shop_1"));
        assert!(!can_access_customer_record(&other, "c1", "shop_1"));

        let cashier = Principal::shop_staff("s1", "shop_1", StaffRole::Cashier);
        assert!(can_access_customer_record(&cashier, "c1", "shop_1"));
        assert!(!can_access_customer_record(&cashier, "c1", "shop_2"));

        let limited = cashier.with_explicit_permissions(PermissionSet::new());
        assert!(!can_access_customer_record(&limited, "c1", "shop_1"));

        let admin = Principal::shop_admin("a1", "shop_1");
        assert!(can_access_customer_record(&admin, "c1", "shop_1"));
        assert!(!can_access_customer_record(&admin, "c1", "shop_2"));
    }

    #[test]
    fn test_predicates_are_idempotent() {
        let p = Principal::shop_staff("s1", "shop_1", StaffRole::Barista);
        let first = (
            can_access_shop(&p, "shop_1"),
            has_permission(&p, Permission::ManageCustomerLoyalty, Some("shop_1")),
        );
        for _ in 0..10 {
            assert_eq!(
                first,
                (
                    can_access_shop(&p, "shop_1"),
                    has_permission(&p, Permission::ManageCustomerLoyalty, Some("shop_1")),
                )
            );
        }
    }

    #[test]
    fn test_shop_id_match_is_exact() {
        let p = Principal::shop_admin("a1", "shop_1");
        assert!(!can_access_shop(&p, "SHOP_1"));
        assert!(!can_access_shop(&p, "shop_1 "));
    }
}
