//! Tests for the identity provisioning service.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::{fixture, rstest};
use serde_json::{Map, json};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    CollectionFeed, MockHierarchicalStore, MockScopeLease, MockSessionContext, NoopScopeLease,
};

type TestService =
    IdentityProvisioningService<MockHierarchicalStore, MockSessionContext, NoopScopeLease>;

fn make_service(store: MockHierarchicalStore) -> TestService {
    make_service_with_session(store, MockSessionContext::new())
}

fn make_service_with_session(
    store: MockHierarchicalStore,
    session: MockSessionContext,
) -> TestService {
    IdentityProvisioningService::new(Arc::new(store), Arc::new(session), Arc::new(NoopScopeLease))
}

fn path(raw: &str) -> StorePath {
    StorePath::parse(raw).expect("valid path")
}

fn user_entry(key: &str, username: &str) -> StoreEntry {
    StoreEntry::new(
        key,
        json!({
            "username": username,
            "password": "pw",
            "role": "member",
            "name": "Someone",
            "phone": "000",
        }),
    )
}

#[fixture]
fn scope() -> Scope {
    Scope::new("north").expect("valid scope")
}

#[fixture]
fn signup() -> Signup {
    Signup {
        key: SignupKey::new("-s1").expect("valid key"),
        name: "Ann Example".to_owned(),
        phone: "555".to_owned(),
        password: Password::new("chosen"),
    }
}

fn user_key(raw: &str) -> UserKey {
    UserKey::new(raw).expect("valid key")
}

fn username(raw: &str) -> Username {
    Username::new(raw).expect("valid username")
}

fn existing_bob_and_carl() -> Vec<StoreEntry> {
    vec![user_entry("1", "bob"), user_entry("2", "carl")]
}

#[rstest]
#[tokio::test]
async fn approve_user_suffixes_colliding_username_and_removes_signup(
    scope: Scope,
    signup: Signup,
) {
    let mut store = MockHierarchicalStore::new();
    store
        .expect_list()
        .with(eq(path("north/users")))
        .times(1)
        .return_once(|_| {
            Ok(vec![
                user_entry("-u1", "555"),
                user_entry("-u2", "555a"),
                user_entry("-u3", "555b"),
            ])
        });
    store
        .expect_push()
        .withf(|target, value| {
            *target == path("north/users")
                && *value
                    == json!({
                        "username": "555c",
                        "password": "chosen",
                        "role": "member",
                        "name": "Ann Example",
                        "phone": "555",
                    })
        })
        .times(1)
        .return_once(|_, _| Ok("-u4".to_owned()));
    store
        .expect_remove()
        .with(eq(path("signup/north/-s1")))
        .times(1)
        .return_once(|_| Ok(()));

    let user = make_service(store)
        .approve_user(&scope, &signup)
        .await
        .expect("approval succeeds");

    assert_eq!(user.key, user_key("-u4"));
    assert_eq!(user.username, username("555c"));
    assert_eq!(user.role, Role::Member);
}

#[rstest]
#[tokio::test]
async fn approve_user_keeps_phone_when_free(scope: Scope, signup: Signup) {
    let mut store = MockHierarchicalStore::new();
    store
        .expect_list()
        .times(1)
        .return_once(|_| Ok(existing_bob_and_carl()));
    store
        .expect_push()
        .withf(|_, value| value.get("username") == Some(&json!("555")))
        .times(1)
        .return_once(|_, _| Ok("-u9".to_owned()));
    store.expect_remove().times(1).return_once(|_| Ok(()));

    let user = make_service(store)
        .approve_user(&scope, &signup)
        .await
        .expect("approval succeeds");
    assert_eq!(user.username, username("555"));
}

#[rstest]
#[tokio::test]
async fn approve_user_leaves_signup_when_push_fails(scope: Scope, signup: Signup) {
    let mut store = MockHierarchicalStore::new();
    store.expect_list().times(1).return_once(|_| Ok(Vec::new()));
    store
        .expect_push()
        .times(1)
        .return_once(|_, _| Err(StoreError::connection("offline")));
    store.expect_remove().times(0);

    let error = make_service(store)
        .approve_user(&scope, &signup)
        .await
        .expect_err("push failure propagates");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn approve_user_surfaces_failed_signup_removal(scope: Scope, signup: Signup) {
    let mut store = MockHierarchicalStore::new();
    store.expect_list().times(1).return_once(|_| Ok(Vec::new()));
    store
        .expect_push()
        .times(1)
        .return_once(|_, _| Ok("-u1".to_owned()));
    store
        .expect_remove()
        .times(1)
        .return_once(|_| Err(StoreError::rejected("/signup/north/-s1", "permission denied")));

    let error = make_service(store)
        .approve_user(&scope, &signup)
        .await
        .expect_err("removal failure propagates");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn approve_user_fails_when_candidates_exhausted(scope: Scope, signup: Signup) {
    let mut store = MockHierarchicalStore::new();
    store.expect_list().times(1).return_once(|_| {
        Ok(vec![
            user_entry("-u1", "555"),
            user_entry("-u2", "5551"),
            user_entry("-u3", "5552"),
        ])
    });
    store.expect_push().times(0);
    store.expect_remove().times(0);

    let error = make_service(store)
        .with_suffix_policy(SuffixPolicy::Numeric { max_attempts: 2 })
        .approve_user(&scope, &signup)
        .await
        .expect_err("no free username");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.details().and_then(|d| d.get("attempts")),
        Some(&json!(3))
    );
}

#[rstest]
#[tokio::test]
async fn approve_user_rejects_blank_phone(scope: Scope, mut signup: Signup) {
    signup.phone = "  ".to_owned();
    let mut store = MockHierarchicalStore::new();
    store.expect_list().times(0);
    store.expect_push().times(0);

    let error = make_service(store)
        .approve_user(&scope, &signup)
        .await
        .expect_err("blank phone");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn approve_user_does_not_touch_store_without_lease(scope: Scope, signup: Signup) {
    let mut store = MockHierarchicalStore::new();
    store.expect_list().times(0);
    store.expect_push().times(0);
    let mut lease = MockScopeLease::new();
    lease
        .expect_acquire()
        .times(1)
        .return_once(|_| Err(LeaseError::unavailable("lock service down")));

    let service = IdentityProvisioningService::new(
        Arc::new(store),
        Arc::new(MockSessionContext::new()),
        Arc::new(lease),
    );
    let error = service
        .approve_user(&scope, &signup)
        .await
        .expect_err("lease failure");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[case("bob", false, None)]
#[case("dave", true, Some("dave"))]
#[case("carl", true, Some("carl"))]
#[tokio::test]
async fn update_user_guards_against_username_collisions(
    scope: Scope,
    #[case] requested: &str,
    #[case] expected_applied: bool,
    #[case] expected_written: Option<&'static str>,
) {
    let mut store = MockHierarchicalStore::new();
    store
        .expect_list()
        .times(1)
        .return_once(|_| Ok(existing_bob_and_carl()));
    store
        .expect_update()
        .withf(move |target, fields: &Map<String, Value>| {
            *target == path("north/users/2")
                && fields.get("username").and_then(Value::as_str) == expected_written
                && fields.get("name") == Some(&json!("Carl"))
        })
        .times(1)
        .return_once(|_, _| Ok(()));

    let update = UserUpdate::new(user_key("2"))
        .with_username(username(requested))
        .with_name("Carl");
    let applied = make_service(store)
        .update_user(&scope, update)
        .await
        .expect("update succeeds");
    assert_eq!(applied, expected_applied);
}

#[rstest]
#[tokio::test]
async fn update_user_strips_password(scope: Scope) {
    let mut store = MockHierarchicalStore::new();
    store
        .expect_list()
        .times(1)
        .return_once(|_| Ok(existing_bob_and_carl()));
    store
        .expect_update()
        .withf(|_, fields: &Map<String, Value>| {
            !fields.contains_key("password")
                && !fields.contains_key("key")
                && fields.get("phone") == Some(&json!("123"))
                && fields.get("username") == Some(&json!("dave"))
        })
        .times(1)
        .return_once(|_, _| Ok(()));

    let update = UserUpdate::new(user_key("2"))
        .with_username(username("dave"))
        .with_password(Password::new("x"))
        .with_phone("123");
    let applied = make_service(store)
        .update_user(&scope, update)
        .await
        .expect("update succeeds");
    assert!(applied);
}

#[rstest]
#[tokio::test]
async fn update_user_rejects_unknown_key(scope: Scope) {
    let mut store = MockHierarchicalStore::new();
    store
        .expect_list()
        .times(1)
        .return_once(|_| Ok(existing_bob_and_carl()));
    store.expect_update().times(0);

    let error = make_service(store)
        .update_user(&scope, UserUpdate::new(user_key("9")).with_phone("1"))
        .await
        .expect_err("missing user");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn update_user_skips_write_when_only_password_supplied(scope: Scope) {
    let mut store = MockHierarchicalStore::new();
    store
        .expect_list()
        .times(1)
        .return_once(|_| Ok(existing_bob_and_carl()));
    store.expect_update().times(0);

    let update = UserUpdate::new(user_key("2")).with_password(Password::new("x"));
    let applied = make_service(store)
        .update_user(&scope, update)
        .await
        .expect("nothing to write");
    assert!(!applied);
}

#[rstest]
#[tokio::test]
async fn update_user_propagates_store_failure(scope: Scope) {
    let mut store = MockHierarchicalStore::new();
    store
        .expect_list()
        .times(1)
        .return_once(|_| Ok(existing_bob_and_carl()));
    store
        .expect_update()
        .times(1)
        .return_once(|_, _| Err(StoreError::connection("timeout")));

    let error = make_service(store)
        .update_user(&scope, UserUpdate::new(user_key("2")).with_role(Role::Admin))
        .await
        .expect_err("write failure");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn reset_password_delegates_with_username_as_credential(scope: Scope) {
    let mut session = MockSessionContext::new();
    session
        .expect_change_password()
        .withf(|scope, account, credential| {
            scope.as_ref() == "north" && account.as_ref() == "2" && credential.expose() == "carl"
        })
        .times(1)
        .return_once(|_, _, _| Ok(()));
    let mut store = MockHierarchicalStore::new();
    store.expect_update().times(0);

    let user = UserRecord {
        username: username("carl"),
        password: None,
        role: Role::Member,
        name: "Carl".to_owned(),
        phone: "000".to_owned(),
    }
    .into_user(user_key("2"));

    make_service_with_session(store, session)
        .reset_password(&scope, &user)
        .await
        .expect("reset succeeds");
}

#[rstest]
#[case(SessionError::unknown_account("2"), ErrorCode::NotFound)]
#[case(SessionError::rejected("weak"), ErrorCode::Forbidden)]
#[case(SessionError::no_active_session(), ErrorCode::Forbidden)]
#[tokio::test]
async fn reset_password_maps_session_errors(
    scope: Scope,
    #[case] failure: SessionError,
    #[case] expected: ErrorCode,
) {
    let mut session = MockSessionContext::new();
    session
        .expect_change_password()
        .times(1)
        .return_once(move |_, _, _| Err(failure));
    let user = UserRecord {
        username: username("carl"),
        password: None,
        role: Role::Member,
        name: String::new(),
        phone: String::new(),
    }
    .into_user(user_key("2"));

    let error = make_service_with_session(MockHierarchicalStore::new(), session)
        .reset_password(&scope, &user)
        .await
        .expect_err("session failure");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn remove_user_deletes_user_node(scope: Scope) {
    let mut store = MockHierarchicalStore::new();
    store
        .expect_remove()
        .with(eq(path("north/users/2")))
        .times(1)
        .return_once(|_| Ok(()));

    make_service(store)
        .remove_user(&scope, &user_key("2"))
        .await
        .expect("removal succeeds");
}

#[rstest]
#[tokio::test]
async fn remove_signup_deletes_signup_node(scope: Scope) {
    let mut store = MockHierarchicalStore::new();
    store
        .expect_remove()
        .with(eq(path("signup/north/-s1")))
        .times(1)
        .return_once(|_| Ok(()));

    make_service(store)
        .remove_signup(&scope, &SignupKey::new("-s1").expect("valid key"))
        .await
        .expect("removal succeeds");
}

#[rstest]
#[tokio::test]
async fn watch_users_decodes_feed(scope: Scope) {
    let (_publisher, feed) = CollectionFeed::channel(existing_bob_and_carl());
    let mut store = MockHierarchicalStore::new();
    store
        .expect_subscribe()
        .with(eq(path("north/users")))
        .times(1)
        .return_once(move |_| Ok(feed));

    let live = make_service(store)
        .watch_users(&scope)
        .await
        .expect("subscription starts");
    let usernames: Vec<String> = live
        .current()
        .into_iter()
        .map(|user| user.username.into())
        .collect();
    assert_eq!(usernames, ["bob", "carl"]);
}

#[rstest]
#[tokio::test]
async fn watch_signups_uses_custom_layout(scope: Scope) {
    let (_publisher, feed) = CollectionFeed::channel(Vec::new());
    let mut store = MockHierarchicalStore::new();
    store
        .expect_subscribe()
        .with(eq(path("pending/north")))
        .times(1)
        .return_once(move |_| Ok(feed));

    let layout = CollectionLayout::new("pending", "members").expect("valid layout");
    let live = make_service(store)
        .with_layout(layout)
        .watch_signups(&scope)
        .await
        .expect("subscription starts");
    assert_eq!(live.path(), &path("pending/north"));
    assert!(live.current().is_empty());
}

#[rstest]
#[tokio::test]
async fn current_scope_requires_session() {
    let mut session = MockSessionContext::new();
    session
        .expect_congregation()
        .times(1)
        .return_once(|| Err(SessionError::no_active_session()));

    let error = make_service_with_session(MockHierarchicalStore::new(), session)
        .current_scope()
        .await
        .expect_err("no session");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn approve_user_copies_padded_phone_verbatim(scope: Scope, mut signup: Signup) {
    signup.phone = "555 ".to_owned();
    let mut store = MockHierarchicalStore::new();
    store
        .expect_list()
        .times(1)
        .return_once(|_| Ok(vec![user_entry("-u1", "555")]));
    store
        .expect_push()
        .withf(|_, value| {
            value.get("username") == Some(&json!("555 "))
                && value.get("phone") == Some(&json!("555 "))
        })
        .times(1)
        .return_once(|_, _| Ok("-u2".to_owned()));
    store.expect_remove().times(1).return_once(|_| Ok(()));

    let user = make_service(store)
        .approve_user(&scope, &signup)
        .await
        .expect("padded phone is approved");
    assert_eq!(user.username.as_ref(), "555 ");
}

#[rstest]
#[tokio::test]
async fn update_user_without_username_writes_and_reports_false(scope: Scope) {
    let mut store = MockHierarchicalStore::new();
    store
        .expect_list()
        .times(1)
        .return_once(|_| Ok(existing_bob_and_carl()));
    store
        .expect_update()
        .withf(|target, fields: &Map<String, Value>| {
            *target == path("north/users/2")
                && fields.len() == 1
                && fields.get("phone") == Some(&json!("123"))
        })
        .times(1)
        .return_once(|_, _| Ok(()));

    let applied = make_service(store)
        .update_user(&scope, UserUpdate::new(user_key("2")).with_phone("123"))
        .await
        .expect("update succeeds");
    assert!(!applied);
}
