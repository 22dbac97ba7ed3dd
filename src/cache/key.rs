//! Derivação determinística de chaves de cache.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::SigiloResult;

/// Gera a chave de cache para os parâmetros de uma consulta.
///
/// A chave é `namespace:` + hash SHA256 do JSON canônico dos parâmetros
/// (chaves de objeto ordenadas recursivamente), então dois objetos com as
/// mesmas chaves e valores geram a mesma chave independente da ordem.
pub fn derive_key<T: Serialize + ?Sized>(namespace: &str, params: &T) -> SigiloResult<String> {
    let value = serde_json::to_value(params)?;
    Ok(derive_key_from_value(namespace, &value))
}

/// Mesma derivação de [`derive_key`], a partir de um `Value` já montado.
pub fn derive_key_from_value(namespace: &str, params: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(params).as_bytes());
    format!("{}:{}", namespace, hex::encode(hasher.finalize()))
}

/// Serializa um `Value` com as chaves de objeto ordenadas.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
