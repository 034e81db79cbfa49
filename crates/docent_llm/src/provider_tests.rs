use assert_matches::assert_matches;
use docent_config::providers::{GoogleConfig, OpenaiConfig};
use pretty_assertions::assert_eq;

use super::*;

const UNSET: &str = "DOCENT_TEST_KEY_THAT_IS_NOT_SET";

fn config() -> ProvidersConfig {
    ProvidersConfig {
        google: GoogleConfig {
            api_key_env: UNSET.to_owned(),
            base_url: "http://localhost/google".to_owned(),
        },
        openai: OpenaiConfig {
            api_key_env: UNSET.to_owned(),
            base_url: "http://localhost/openai".to_owned(),
        },
    }
}

#[test]
fn test_resolve_credential_explicit_wins() {
    let key = resolve_credential(ProviderId::Google, "PATH", Some("explicit".to_owned())).unwrap();

    assert_eq!(key, "explicit");
}

#[test]
fn test_resolve_credential_from_env() {
    // `PATH` is set in any environment the tests run in.
    let key = resolve_credential(ProviderId::Openai, "PATH", None).unwrap();

    assert_eq!(Some(key), std::env::var("PATH").ok());
}

#[test]
fn test_resolve_credential_missing() {
    for explicit in [None, Some(String::new()), Some("  ".to_owned())] {
        let error = resolve_credential(ProviderId::Google, UNSET, explicit).unwrap_err();

        assert_eq!(error.kind(), crate::ErrorKind::MissingCredential);
    }
}

#[test]
fn test_get_provider() {
    let config = config();

    assert_matches!(
        get_provider(ProviderId::Google, &config, None),
        Err(Error::MissingCredential {
            provider: ProviderId::Google,
            ..
        })
    );
    assert_matches!(
        get_provider(ProviderId::Openai, &config, None),
        Err(Error::MissingCredential {
            provider: ProviderId::Openai,
            ..
        })
    );

    assert!(get_provider(ProviderId::Google, &config, Some("key".to_owned())).is_ok());
    assert!(get_provider(ProviderId::Openai, &config, Some("key".to_owned())).is_ok());
}
