//! Query and attribute decoding tests.

use ad_directory::{DirectoryError, DirectorySettings, EntityClass, Query, Value};
use chrono::{TimeZone, Utc};

use crate::common::{
    dns, sorted, MemoryDirectory, TestEnv, ASMITH, BASE, ENGINEERING, JHUNT, PC01, PLATFORM,
    STAFF,
};

#[test]
fn user_queries_exclude_computers() {
    let env = TestEnv::new();

    let users = env
        .directory
        .find_all(EntityClass::User, &Query::new().any("sn", ["Hunt", "Smith"]))
        .unwrap();
    assert_eq!(dns(&users), sorted(&[JHUNT, ASMITH]));

    let computers = env
        .directory
        .find_all(EntityClass::Computer, &Query::new().eq("sn", "Hunt"))
        .unwrap();
    assert_eq!(dns(&computers), sorted(&[PC01]));
}

#[test]
fn wildcards_are_passed_through() {
    let env = TestEnv::new();

    let groups = env
        .directory
        .find_all(
            EntityClass::Group,
            &Query::new().eq("description", "OldGroup_*"),
        )
        .unwrap();
    assert_eq!(dns(&groups), sorted(&[ENGINEERING, PLATFORM]));
}

#[test]
fn within_narrows_the_search_base() {
    let env = TestEnv::new();
    let query = Query::new().eq("sn", "*").within("ou=Staff");

    let users = env.directory.find_all(EntityClass::User, &query).unwrap();
    assert_eq!(dns(&users), sorted(&[JHUNT, ASMITH]));
}

#[test]
fn exists_and_first() {
    let env = TestEnv::new();

    assert!(env
        .directory
        .exists(EntityClass::User, &Query::new().eq("samaccountname", "jhunt"))
        .unwrap());
    assert!(!env
        .directory
        .exists(EntityClass::User, &Query::new().eq("samaccountname", "nobody"))
        .unwrap());

    let first = env
        .directory
        .find_first(EntityClass::Group, &Query::new().eq("cn", "Staff"))
        .unwrap()
        .unwrap();
    assert!(first.dn_matches(STAFF));
}

#[test]
fn unreachable_directory_is_not_an_empty_result() {
    let env = TestEnv::with_client(MemoryDirectory::unreachable(), DirectorySettings::new(BASE));

    assert!(!env.directory.is_connected());
    let err = env
        .directory
        .find_all(EntityClass::User, &Query::new().eq("sn", "Hunt"))
        .unwrap_err();
    assert!(matches!(err, DirectoryError::NotConnected));
    assert!(err.is_connection_error());
    assert_eq!(env.client.searches(), 0);
}

#[test]
fn member_of_resolves_to_groups() {
    let env = TestEnv::new();
    let jhunt = env.directory.from_dn(EntityClass::User, JHUNT).unwrap().unwrap();

    let value = env.directory.get_attr(&jhunt, "memberOf").unwrap();
    let groups = value.as_entities().unwrap();
    assert!(groups.iter().all(|g| g.class() == EntityClass::Group));
    assert!(groups.iter().any(|g| g.dn_matches(STAFF)));
}

#[test]
fn member_resolves_users_and_groups_once() {
    let env = TestEnv::new();
    let staff = env.directory.from_dn(EntityClass::Group, STAFF).unwrap().unwrap();

    let value = env.directory.get_attr(&staff, "member").unwrap();
    let members = value.as_entities().unwrap();
    assert_eq!(dns(members), sorted(&[JHUNT, ENGINEERING]));

    let jhunt = members.iter().find(|m| m.dn_matches(JHUNT)).unwrap();
    assert_eq!(jhunt.class(), EntityClass::User);
    let engineering = members.iter().find(|m| m.dn_matches(ENGINEERING)).unwrap();
    assert_eq!(engineering.class(), EntityClass::Group);
}

#[test]
fn scalar_attributes_and_unknown_names() {
    let env = TestEnv::new();
    let jhunt = env.directory.from_dn(EntityClass::User, JHUNT).unwrap().unwrap();

    assert_eq!(env.directory.get_attr(&jhunt, "sn").unwrap().as_str(), Some("Hunt"));
    assert_eq!(
        env.directory.get_attr(&jhunt, "whenCreated").unwrap().as_time(),
        Some(&Utc.with_ymd_and_hms(2017, 9, 20, 13, 21, 27).unwrap())
    );
    assert!(matches!(
        env.directory.get_attr(&jhunt, "telephoneNumber"),
        Err(DirectoryError::UnknownAttribute(_))
    ));
}

#[test]
fn guid_queries_match_binary_values() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let jhunt = env
        .directory
        .from_dn(EntityClass::User, JHUNT)?
        .ok_or_else(|| anyhow::anyhow!("fixture user missing"))?;

    let Value::Text(hex_guid) = jhunt.attribute("objectGUID")? else {
        anyhow::bail!("objectGUID should decode to hex text");
    };
    assert_eq!(hex::decode(&hex_guid)?.len(), 16);
    assert!(jhunt.object_guid().is_some());

    let found = env
        .directory
        .find_first(EntityClass::User, &Query::new().eq("objectGUID", hex_guid))?;
    assert_eq!(found.as_ref(), Some(&jhunt));
    Ok(())
}

#[test]
fn sid_is_rendered_in_string_form() {
    let env = TestEnv::new();
    let jhunt = env.directory.from_dn(EntityClass::User, JHUNT).unwrap().unwrap();

    assert_eq!(
        jhunt.sid().unwrap(),
        "S-1-5-21-1004336348-1177238915-682003330-1001"
    );
}

#[test]
fn account_state_from_flags() {
    let env = TestEnv::new();
    let jhunt = env.directory.from_dn(EntityClass::User, JHUNT).unwrap().unwrap();

    assert_eq!(jhunt.user_account_control(), 512);
    assert!(!jhunt.is_disabled());
    assert!(!jhunt.is_locked());
    assert!(!jhunt.is_expired());
    assert!(jhunt.can_login());
}
