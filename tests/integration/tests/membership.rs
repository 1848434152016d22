//! Group membership traversal over the fixture tree.

use ad_directory::{DirectorySettings, Entity, EntityClass};

use crate::common::{
    dns, sorted, TestEnv, ASMITH, BASE, BNESTED, CYCLE_A, CYCLE_B, ENGINEERING, JHUNT,
    PLATFORM, STAFF,
};

fn group(env: &TestEnv, dn: &str) -> Entity {
    env.directory.from_dn(EntityClass::Group, dn).unwrap().unwrap()
}

fn user(env: &TestEnv, dn: &str) -> Entity {
    env.directory.from_dn(EntityClass::User, dn).unwrap().unwrap()
}

#[test]
fn groups_and_is_member_agree() {
    let env = TestEnv::new();
    let jhunt = user(&env, JHUNT);

    let groups = env.directory.groups(&jhunt).unwrap();
    assert_eq!(dns(&groups), sorted(&[STAFF, CYCLE_B]));

    for group in &groups {
        assert!(env.directory.is_member(group, &jhunt));
    }
    assert!(!env.directory.is_member(&group(&env, ENGINEERING), &jhunt));
}

#[test]
fn direct_member_users() {
    let env = TestEnv::new();
    let staff = group(&env, STAFF);

    let users = env.directory.member_users(&staff, false).unwrap();
    assert_eq!(dns(&users), sorted(&[JHUNT]));
}

#[test]
fn recursive_member_users_are_unique() {
    let env = TestEnv::new();
    let staff = group(&env, STAFF);

    let users = env.directory.member_users(&staff, true).unwrap();
    assert_eq!(dns(&users), sorted(&[JHUNT, ASMITH, BNESTED]));
    assert!(users.iter().all(|u| u.class() == EntityClass::User));
}

#[test]
fn recursive_member_groups() {
    let env = TestEnv::new();
    let staff = group(&env, STAFF);

    let direct = env.directory.member_groups(&staff, false).unwrap();
    assert_eq!(dns(&direct), sorted(&[ENGINEERING]));

    let nested = env.directory.member_groups(&staff, true).unwrap();
    assert_eq!(dns(&nested), sorted(&[ENGINEERING, PLATFORM]));
}

#[test]
fn cyclic_groups_terminate() {
    let env = TestEnv::new();
    let cycle_a = group(&env, CYCLE_A);

    let groups = env.directory.member_groups(&cycle_a, true).unwrap();
    assert_eq!(dns(&groups), sorted(&[CYCLE_B]));

    let users = env.directory.member_users(&cycle_a, true).unwrap();
    assert_eq!(dns(&users), sorted(&[JHUNT]));
}

#[test]
fn depth_limit_stops_descent() {
    let env = TestEnv::with_settings(DirectorySettings::new(BASE).max_membership_depth(1));
    let staff = group(&env, STAFF);

    let users = env.directory.member_users(&staff, true).unwrap();
    assert_eq!(dns(&users), sorted(&[JHUNT, ASMITH]));

    let env = TestEnv::with_settings(DirectorySettings::new(BASE).max_membership_depth(0));
    let staff = group(&env, STAFF);
    let users = env.directory.member_users(&staff, true).unwrap();
    assert_eq!(dns(&users), sorted(&[JHUNT]));
}

#[test]
fn group_without_members() {
    let env = TestEnv::new();
    let bnested = user(&env, BNESTED);

    // Users have no member attribute.
    assert!(env.directory.member_users(&bnested, true).unwrap().is_empty());
}
