//! # Role-Based Access Control
//!
//! Administrative entry points (configuration, role management) are gated by
//! two roles stored in instance storage:
//!
//! | Role         | May do                                             |
//! |--------------|------------------------------------------------------|
//! | `SuperAdmin` | everything an Admin can, plus `transfer_super_admin` |
//! | `Admin`      | grant / revoke `Admin`, update configuration         |
//!
//! Exactly one address holds `SuperAdmin` at a time. It is set by `init` and
//! moved with `transfer_super_admin`; `revoke_role` cannot remove it.
//!
//! Contract participants (payers, payees, verifiers) need no role.

use soroban_sdk::{contracttype, Address, Env};

use crate::events;
use crate::storage::bump_instance;
use crate::Error;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    SuperAdmin,
    Admin,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
enum RbacKey {
    Role(Address),
    SuperAdmin,
}

/// Record `super_admin` as the first SuperAdmin.
pub fn init_super_admin(env: &Env, super_admin: &Address) -> Result<(), Error> {
    if env.storage().instance().has(&RbacKey::SuperAdmin) {
        return Err(Error::AlreadyInitialized);
    }
    env.storage()
        .instance()
        .set(&RbacKey::SuperAdmin, super_admin);
    set_role(env, super_admin, Role::SuperAdmin);
    bump_instance(env);
    events::emit_role_set(env, super_admin.clone(), super_admin.clone(), Role::SuperAdmin);
    Ok(())
}

pub fn role_of(env: &Env, address: Address) -> Option<Role> {
    env.storage().instance().get(&RbacKey::Role(address))
}

pub fn has_role(env: &Env, address: Address, role: Role) -> bool {
    role_of(env, address) == Some(role)
}

fn set_role(env: &Env, target: &Address, role: Role) {
    env.storage()
        .instance()
        .set(&RbacKey::Role(target.clone()), &role);
}

/// Fails with `Unauthorized` unless `caller` holds `Admin` or `SuperAdmin`.
pub fn require_admin_or_above(env: &Env, caller: &Address) -> Result<(), Error> {
    match role_of(env, caller.clone()) {
        Some(Role::SuperAdmin) | Some(Role::Admin) => Ok(()),
        None => Err(Error::Unauthorized),
    }
}

pub fn grant_role(env: &Env, caller: &Address, target: &Address, role: Role) -> Result<(), Error> {
    caller.require_auth();
    require_admin_or_above(env, caller)?;
    if role == Role::SuperAdmin {
        // SuperAdmin moves only through `transfer_super_admin`.
        return Err(Error::Unauthorized);
    }
    if has_role(env, target.clone(), Role::SuperAdmin) {
        return Err(Error::Unauthorized);
    }
    set_role(env, target, role);
    bump_instance(env);
    events::emit_role_set(env, caller.clone(), target.clone(), role);
    Ok(())
}

pub fn revoke_role(env: &Env, caller: &Address, target: &Address) -> Result<(), Error> {
    caller.require_auth();
    require_admin_or_above(env, caller)?;
    match role_of(env, target.clone()) {
        None => Err(Error::RoleNotFound),
        Some(Role::SuperAdmin) => Err(Error::Unauthorized),
        Some(Role::Admin) => {
            env.storage()
                .instance()
                .remove(&RbacKey::Role(target.clone()));
            bump_instance(env);
            events::emit_role_del(env, caller.clone(), target.clone());
            Ok(())
        }
    }
}

pub fn transfer_super_admin(
    env: &Env,
    current: &Address,
    new_super_admin: &Address,
) -> Result<(), Error> {
    current.require_auth();
    if !has_role(env, current.clone(), Role::SuperAdmin) {
        return Err(Error::Unauthorized);
    }
    env.storage()
        .instance()
        .remove(&RbacKey::Role(current.clone()));
    env.storage()
        .instance()
        .set(&RbacKey::SuperAdmin, new_super_admin);
    set_role(env, new_super_admin, Role::SuperAdmin);
    bump_instance(env);
    events::emit_role_del(env, current.clone(), current.clone());
    events::emit_role_set(
        env,
        current.clone(),
        new_super_admin.clone(),
        Role::SuperAdmin,
    );
    Ok(())
}
