//! Login, registration and role persistence against the fake API.

#![allow(clippy::unwrap_used)]

use lapak_core::{PhoneNumber, Role};
use lapak_integration_tests::{Account, FakeApi};
use lapak_storefront::api::ApiClient;
use lapak_storefront::session::{AuthError, SessionStore};
use lapak_storefront::storage::FileStore;
use secrecy::{ExposeSecret, SecretString};

fn phone() -> PhoneNumber {
    PhoneNumber::parse("081234567890").unwrap()
}

#[tokio::test]
async fn test_login_persists_profile_and_installs_token() {
    let fake = FakeApi::spawn().await;
    fake.insert_account(
        "081234567890",
        Account {
            name: "Bu Ani".to_string(),
            password: "rahasia123".to_string(),
            role: Role::Admin,
        },
    );
    let api = ApiClient::new(&fake.api_config()).unwrap();
    let dir = tempfile::tempdir().unwrap();

    {
        let (mut session, _) = SessionStore::open(FileStore::new(dir.path()));
        let logged_in = session
            .login(&api, &phone(), &SecretString::from("rahasia123"))
            .await
            .unwrap();
        assert_eq!(logged_in.role, Role::Admin);
        assert_eq!(logged_in.customer_name_or("Tamu"), "Bu Ani");
    }

    // The token is now attached to API requests
    api.list_products().await.unwrap();
    assert_eq!(
        fake.authorization_headers(),
        [Some("Bearer token-081234567890".to_string())]
    );

    // And the session survives a restart
    let (session, problem) = SessionStore::open(FileStore::new(dir.path()));
    assert!(problem.is_none());
    assert!(session.session().is_logged_in());
    assert_eq!(session.role(), Role::Admin);
    assert_eq!(
        session.session().token().unwrap().expose_secret(),
        "token-081234567890"
    );
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let fake = FakeApi::spawn().await;
    fake.insert_account(
        "081234567890",
        Account {
            name: "Bu Ani".to_string(),
            password: "rahasia123".to_string(),
            role: Role::Customer,
        },
    );
    let api = ApiClient::new(&fake.api_config()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = SessionStore::open(FileStore::new(dir.path()));

    let err = session
        .login(&api, &phone(), &SecretString::from("salah"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(!session.session().is_logged_in());
}

#[tokio::test]
async fn test_register_then_duplicate() {
    let fake = FakeApi::spawn().await;
    let api = ApiClient::new(&fake.api_config()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = SessionStore::open(FileStore::new(dir.path()));

    let registered = session
        .register(&api, "Budi", &phone(), &SecretString::from("pw-budi"))
        .await
        .unwrap();
    assert_eq!(registered.role, Role::Customer);
    assert_eq!(registered.customer_name_or("Tamu"), "Budi");

    let err = session
        .register(&api, "Budi Lagi", &phone(), &SecretString::from("pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccountExists));

    let err = session
        .register(&api, "  ", &phone(), &SecretString::from("pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::MissingName));
}

#[tokio::test]
async fn test_role_switch_and_logout_across_restarts() {
    let fake = FakeApi::spawn().await;
    let api = ApiClient::new(&fake.api_config()).unwrap();
    let dir = tempfile::tempdir().unwrap();

    {
        let (mut session, _) = SessionStore::open(FileStore::new(dir.path()));
        assert_eq!(session.switch_role().unwrap(), Role::Admin);
    }
    {
        let (mut session, _) = SessionStore::open(FileStore::new(dir.path()));
        assert_eq!(session.role(), Role::Admin);
        session.logout(&api).unwrap();
    }

    let (session, _) = SessionStore::open(FileStore::new(dir.path()));
    assert_eq!(session.role(), Role::Customer);
}
