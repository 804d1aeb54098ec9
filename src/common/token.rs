// src/common/token.rs

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};

/// Bytes de entropia de cada token (256 bits).
const TOKEN_BYTES: usize = 32;

/// Tamanho do token já codificado em base64 url-safe sem padding.
pub const TOKEN_LEN: usize = 43;

/// Gera um token opaco e imprevisível para os links públicos.
/// Não deriva de nenhum id nem do relógio.
pub fn generate_access_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Filtro barato antes de ir ao banco: qualquer coisa fora do formato
/// é tratada como "não encontrado" pelo chamador.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_tokens_are_url_safe_and_well_formed() {
        let token = generate_access_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(is_well_formed(&token));
        assert!(!token.contains('+') && !token.contains('/') && !token.contains('='));
    }

    #[test]
    fn generated_tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..1_000).map(|_| generate_access_token()).collect();
        assert_eq!(tokens.len(), 1_000);
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("abc"));
        assert!(!is_well_formed(&"a".repeat(TOKEN_LEN + 1)));
        assert!(!is_well_formed(&format!("{}/", "a".repeat(TOKEN_LEN - 1))));
    }
}
