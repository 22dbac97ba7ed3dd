//! Transformações de valor por tipo de mascaramento.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::cache::canonical_json;
use crate::types::config::MaskingConfig;
use crate::types::rules::{MaskingType, PartialPattern};

/// Caractere usado nas posições mascaradas.
pub const MASK_CHAR: char = '*';

/// Prefixo dos valores gerados por `hash`.
pub const HASH_PREFIX: &str = "hash:";

/// Prefixo dos valores gerados por `tokenize`.
pub const TOKEN_PREFIX: &str = "tok_";

const TOKEN_HEX_LEN: usize = 24;

const HASH_HEX_LEN: usize = 64;

/// Aplica as transformações de mascaramento.
#[derive(Debug, Clone)]
pub struct Transformer {
    placeholder: String,
    redaction_marker: String,
    hash_salt: String,
    token_secret: String,
    partial_min_length: usize,
}

impl Transformer {
    /// Cria a partir da configuração.
    pub fn from_config(config: &MaskingConfig) -> Self {
        Self {
            placeholder: config.placeholder.clone(),
            redaction_marker: config.redaction_marker.clone(),
            hash_salt: config.hash_salt.clone(),
            token_secret: config.token_secret.clone(),
            partial_min_length: config.partial_min_length,
        }
    }

    /// Placeholder do mascaramento `full`.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Marcador do mascaramento `redact`.
    pub fn redaction_marker(&self) -> &str {
        &self.redaction_marker
    }

    /// Aplica o tipo de mascaramento ao valor.
    ///
    /// Retorna `None` quando a transformação não se aplica: valor `null`,
    /// ou valor que não é string para `full`/`partial`.
    ///
    /// `hash` e `tokenize` só preservam valores com o formato exato da
    /// própria saída (prefixo + hex do tamanho certo).
    pub fn apply(&self, masking_type: MaskingType, value: &Value) -> Option<Value> {
        if value.is_null() {
            return None;
        }

        match masking_type {
            MaskingType::Full => value
                .as_str()
                .map(|_| Value::String(self.placeholder.clone())),
            MaskingType::Partial(pattern) => value
                .as_str()
                .map(|s| Value::String(self.partial(pattern, s))),
            MaskingType::Hash => match value.as_str() {
                Some(s) if is_digest(s, HASH_PREFIX, HASH_HEX_LEN) => Some(value.clone()),
                _ => Some(Value::String(self.hash(value))),
            },
            MaskingType::Tokenize => match value.as_str() {
                Some(s) if is_digest(s, TOKEN_PREFIX, TOKEN_HEX_LEN) => Some(value.clone()),
                _ => Some(Value::String(self.tokenize(value))),
            },
            MaskingType::Redact => Some(Value::String(self.redaction_marker.clone())),
        }
    }

    /// Mascaramento parcial segundo o padrão.
    ///
    /// Valores curtos demais caem para o placeholder de `full`.
    pub fn partial(&self, pattern: PartialPattern, value: &str) -> String {
        if value == self.placeholder || value.chars().count() < self.partial_min_length {
            return self.placeholder.clone();
        }

        let masked = match pattern {
            PartialPattern::Cpf => mask_slots(value, |c| c.is_ascii_digit(), |_| 3, 2),
            PartialPattern::Cnpj => mask_slots(value, |c| c.is_ascii_digit(), |_| 2, 2),
            PartialPattern::Phone => mask_slots(
                value,
                |c| c.is_ascii_digit(),
                // DDI + DDD quando houver DDI, senão só o DDD
                |slots| if slots >= 12 { 4 } else { 2 },
                2,
            ),
            PartialPattern::Email => mask_email(value),
            PartialPattern::Generic => mask_slots(value, |c| !c.is_whitespace(), |_| 2, 2),
        };

        masked.unwrap_or_else(|| self.placeholder.clone())
    }

    /// Digest determinístico e irreversível.
    pub fn hash(&self, value: &Value) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.hash_salt.as_bytes());
        hasher.update([0]);
        hasher.update(canonical_json(value).as_bytes());
        format!("{}{}", HASH_PREFIX, hex::encode(hasher.finalize()))
    }

    /// Substituto opaco; reverter exige um cofre externo.
    pub fn tokenize(&self, value: &Value) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"sigilo-token");
        hasher.update([0]);
        hasher.update(self.token_secret.as_bytes());
        hasher.update([0]);
        hasher.update(canonical_json(value).as_bytes());
        let digest = hex::encode(hasher.finalize());
        format!("{}{}", TOKEN_PREFIX, &digest[..TOKEN_HEX_LEN])
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::from_config(&MaskingConfig::default())
    }
}

/// Se `value` tem exatamente o formato `prefixo + hex` gerado aqui.
fn is_digest(value: &str, prefix: &str, hex_len: usize) -> bool {
    value.strip_prefix(prefix).is_some_and(|digest| {
        digest.len() == hex_len
            && digest
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    })
}

/// Mascara as posições "slot" do meio, mantendo as primeiras e últimas.
///
/// Posições já mascaradas contam como slot, o que torna a operação
/// idempotente. Caracteres que não são slot (pontuação) são mantidos.
/// Retorna `None` se não sobrar nada para mascarar.
fn mask_slots(
    value: &str,
    is_slot: impl Fn(char) -> bool,
    keep_first: impl Fn(usize) -> usize,
    keep_last: usize,
) -> Option<String> {
    let is_slot = |c: char| c == MASK_CHAR || is_slot(c);
    let slots = value.chars().filter(|c| is_slot(*c)).count();
    let keep_first = keep_first(slots);

    if slots <= keep_first + keep_last {
        return None;
    }

    let mut index = 0;
    let masked = value
        .chars()
        .map(|c| {
            if !is_slot(c) {
                return c;
            }
            let keep = index < keep_first || index >= slots - keep_last;
            index += 1;
            if keep {
                c
            } else {
                MASK_CHAR
            }
        })
        .collect();

    Some(masked)
}

fn mask_email(value: &str) -> Option<String> {
    let (local, domain) = value.rsplit_once('@')?;
    if local.is_empty() || domain.is_empty() {
        return None;
    }

    // Asteriscos de uma passada anterior não contam como texto visível
    let visible: String = local.trim_end_matches(MASK_CHAR).chars().take(2).collect();
    Some(format!("{}***@{}", visible, domain))
}
