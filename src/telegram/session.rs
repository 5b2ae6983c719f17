//! Session persistence: a base64 blob in the environment for deployed
//! runs, a plain file for local ones. The login tool produces both.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use grammers_session::Session;

use crate::core::config::AppConfig;
use crate::errors::DigestError;

/// Decode a base64 session blob produced by [`encode`].
pub fn decode(blob: &str) -> Result<Session, DigestError> {
    let bytes = STANDARD
        .decode(blob.trim())
        .map_err(|e| DigestError::Auth(format!("session blob is not valid base64: {e}")))?;
    Session::load(&bytes)
        .map_err(|e| DigestError::Auth(format!("session blob does not deserialize: {e}")))
}

/// Encode a session for transport through an environment variable.
#[must_use]
pub fn encode(session: &Session) -> String {
    STANDARD.encode(session.save())
}

/// Session for the daily run. The env blob wins; the session file from a
/// local login is the fallback.
pub fn load(config: &AppConfig) -> Result<Session, DigestError> {
    if let Some(blob) = &config.session_base64 {
        return decode(blob);
    }
    if !config.api.session_file.exists() {
        return Err(DigestError::Config(format!(
            "TELEGRAM_SESSION is not set and {} does not exist; run the login tool first",
            config.api.session_file.display()
        )));
    }
    Session::load_file(&config.api.session_file)
        .map_err(|e| DigestError::Auth(format!("failed to load session file: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chrono_tz::Asia::Seoul;
    use url::Url;

    use crate::core::config::ApiCredentials;
    use crate::core::models::ChannelRef;

    fn test_config(blob: Option<&str>, file: PathBuf) -> AppConfig {
        AppConfig {
            api: ApiCredentials {
                api_id: 1,
                api_hash: "hash".to_string(),
                session_file: file,
            },
            session_base64: blob.map(str::to_string),
            channel: ChannelRef::Name("ahboyreads".to_string()),
            gemini_api_key: "key".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            gemini_rpm: 15,
            slack_webhook_url: Url::parse("https://hooks.slack.com/services/T/B/X").unwrap(),
            timezone: Seoul,
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let session = Session::new();
        let blob = encode(&session);
        assert!(!blob.is_empty());
        decode(&blob).expect("fresh session should decode");
    }

    #[test]
    fn decode_rejects_bad_base64() {
        let err = decode("not-base64!!!").map(|_| ()).unwrap_err();
        assert!(matches!(err, DigestError::Auth(_)));
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn decode_rejects_garbage_bytes() {
        let garbage = STANDARD.encode([0xff, 0x00, 0x13, 0x37]);
        let err = decode(&garbage).map(|_| ()).unwrap_err();
        assert!(matches!(err, DigestError::Auth(_)));
    }

    #[test]
    fn load_prefers_env_blob() {
        let session = Session::new();
        let config = test_config(Some(&encode(&session)), PathBuf::from("/nonexistent"));
        load(&config).expect("env blob should win over missing file");
    }

    #[test]
    fn load_falls_back_to_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("digest.session");
        std::fs::File::create(&path).unwrap();
        Session::new().save_to_file(&path).unwrap();

        let config = test_config(None, path);
        load(&config).expect("session file should load");
    }

    #[test]
    fn load_without_any_session_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(None, dir.path().join("missing.session"));

        let err = load(&config).map(|_| ()).unwrap_err();
        assert!(matches!(err, DigestError::Config(_)));
        assert!(err.to_string().contains("login"));
    }
}
