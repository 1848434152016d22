//! Attribute updates, renames and password checks.

use ad_directory::{
    DirectoryError, DirectorySettings, Entity, EntityClass, ModOp, Value, WireValue,
};

use crate::common::{fixture_entries, MemoryDirectory, TestEnv, BASE, JHUNT, PASSWORD};

fn jhunt(env: &TestEnv) -> Entity {
    env.directory.from_dn(EntityClass::User, JHUNT).unwrap().unwrap()
}

#[test]
fn replace_and_reload() {
    let env = TestEnv::new();
    let mut user = jhunt(&env);

    env.directory.update_attribute(&mut user, "sn", "Hunter").unwrap();
    assert_eq!(user.attribute("sn").unwrap().as_str(), Some("Hunter"));

    let (dn, mods) = env.client.modifications().pop().unwrap();
    assert_eq!(dn, JHUNT);
    assert_eq!(mods[0].op, ModOp::Replace);

    // The cached copy was invalidated by the update.
    let fresh = jhunt(&env);
    assert_eq!(fresh.attribute("sn").unwrap().as_str(), Some("Hunter"));
}

#[test]
fn absent_attribute_is_added() {
    let env = TestEnv::new();
    let mut user = jhunt(&env);

    env.directory
        .update_attribute(&mut user, "telephoneNumber", "+44 20 7946 0000")
        .unwrap();

    let (_, mods) = env.client.modifications().pop().unwrap();
    assert_eq!(mods[0].op, ModOp::Add);
    assert_eq!(
        user.attribute("telephonenumber").unwrap().as_str(),
        Some("+44 20 7946 0000")
    );
}

#[test]
fn empty_value_deletes() {
    let env = TestEnv::new();
    let mut user = jhunt(&env);

    env.directory
        .update_attribute(&mut user, "givenName", Value::Absent)
        .unwrap();

    let (_, mods) = env.client.modifications().pop().unwrap();
    assert_eq!(mods[0].op, ModOp::Delete);
    assert!(mods[0].values.is_empty());
    assert!(matches!(
        user.attribute("givenName"),
        Err(DirectoryError::UnknownAttribute(_))
    ));
}

#[test]
fn setting_cn_renames_the_entry() {
    let env = TestEnv::new();
    let mut user = jhunt(&env);

    env.directory.update_attribute(&mut user, "cn", "Jim Hunt").unwrap();

    assert_eq!(user.dn(), "cn=Jim Hunt,ou=Staff,dc=example,dc=org");
    assert_eq!(user.attribute("cn").unwrap().as_str(), Some("Jim Hunt"));
    assert_eq!(
        user.attribute("sAMAccountName").unwrap().as_str(),
        Some("Jim Hunt")
    );
    assert_eq!(
        env.client.renames(),
        vec![(JHUNT.to_string(), "cn=Jim Hunt".to_string())]
    );

    // The old DN is gone from both the directory and the cache.
    assert!(env.directory.from_dn(EntityClass::User, JHUNT).unwrap().is_none());
}

#[test]
fn passwords_are_written_as_quoted_utf16() {
    let env = TestEnv::new();
    let mut user = jhunt(&env);

    env.directory
        .update_attribute(&mut user, "unicodePwd", "Secret1!")
        .unwrap();

    let (_, mods) = env.client.modifications().pop().unwrap();
    let expected: Vec<u8> = "\"Secret1!\""
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect();
    assert_eq!(mods[0].values, vec![WireValue::Binary(expected)]);

    // Never readable back.
    assert!(user.attribute("unicodePwd").unwrap().is_absent());
}

#[test]
fn several_attributes_in_one_modify() {
    let env = TestEnv::new();
    let mut user = jhunt(&env);

    env.directory
        .update_attributes(
            &mut user,
            [
                ("sn", Value::from("Hunter")),
                ("description", Value::from(vec!["a".to_string(), "b".to_string()])),
            ],
        )
        .unwrap();

    let modifications = env.client.modifications();
    assert_eq!(modifications.len(), 1);
    assert_eq!(modifications[0].1.len(), 2);
    assert_eq!(
        user.attribute("description").unwrap(),
        Value::List(vec!["a".to_string(), "b".to_string()])
    );
}

#[test]
fn pending_entities_cannot_be_updated() {
    let env = TestEnv::new();
    let mut pending = Entity::pending(EntityClass::User, "cn=New,ou=Staff,dc=example,dc=org");

    let err = env
        .directory
        .update_attribute(&mut pending, "sn", "New")
        .unwrap_err();
    assert!(matches!(err, DirectoryError::NewRecord));
    assert!(env.client.modifications().is_empty());
}

#[test]
fn rejected_modify_surfaces_result_code() {
    let client = MemoryDirectory::new(fixture_entries()).read_only(JHUNT);
    let env = TestEnv::with_client(client, DirectorySettings::new(BASE));
    let mut user = jhunt(&env);

    let err = env
        .directory
        .update_attribute(&mut user, "sn", "Hunter")
        .unwrap_err();
    assert!(matches!(err, DirectoryError::Operation { code: 50, .. }));
    assert!(env.directory.has_error());
    assert_eq!(env.directory.error_code(), 50);
    assert_eq!(env.directory.error(), "insufficient access rights");

    // The entity is left untouched.
    assert_eq!(user.attribute("sn").unwrap().as_str(), Some("Hunt"));
}

#[test]
fn authenticate_binds_as_the_account() {
    let env = TestEnv::new();
    let user = jhunt(&env);

    assert!(env.directory.authenticate(&user, PASSWORD).unwrap());
    assert!(!env.directory.has_error());

    assert!(!env.directory.authenticate(&user, "wrong").unwrap());
    assert_eq!(env.directory.error_code(), 49);
}

#[test]
fn empty_password_never_reaches_the_directory() {
    let env = TestEnv::new();
    let user = jhunt(&env);
    let searches = env.client.searches();

    assert!(!env.directory.authenticate(&user, "").unwrap());
    assert_eq!(env.client.searches(), searches);
}
