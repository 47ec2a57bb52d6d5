//! Hashing and encoding helpers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use minijinja::Error;
use sha2::{Digest, Sha256, Sha512};

use super::{helper_error, FunctionRegistry};

pub(crate) fn register(registry: &mut FunctionRegistry) {
    registry.add("sha256", |s: String| hex::encode(Sha256::digest(s.as_bytes())));
    registry.add("sha512", |s: String| hex::encode(Sha512::digest(s.as_bytes())));
    registry.add("b64enc", |s: String| STANDARD.encode(s.as_bytes()));
    registry.add("b64dec", b64dec);
    registry.add("hexEncode", |s: String| hex::encode(s.as_bytes()));
    registry.add("urlQuery", |s: String| -> String {
        url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
    });
}

fn b64dec(s: String) -> Result<String, Error> {
    let bytes = STANDARD
        .decode(s.trim())
        .map_err(|e| helper_error("invalid base64 input", e))?;
    String::from_utf8(bytes).map_err(|e| helper_error("decoded base64 is not UTF-8", e))
}

#[cfg(test)]
mod tests {
    use super::super::pure_functions;
    use super::super::testing::{eval, eval_pure};

    #[test]
    fn test_hashes() {
        assert_eq!(
            eval_pure("{{ sha256('abc') }}"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(eval_pure("{{ sha512('') | length }}"), "128");
    }

    #[test]
    fn test_base64_round_trip() {
        assert_eq!(eval_pure("{{ b64enc('hello') }}"), "aGVsbG8=");
        assert_eq!(eval_pure("{{ b64dec('aGVsbG8=') }}"), "hello");
        assert!(eval(&pure_functions(), "{{ b64dec('***') }}").is_err());
    }

    #[test]
    fn test_hex_and_url() {
        assert_eq!(eval_pure("{{ hexEncode('hi') }}"), "6869");
        assert_eq!(eval_pure("{{ urlQuery('a b&c') }}"), "a+b%26c");
    }
}
