//! Agregações simples sobre resultados de consulta.
//!
//! Usadas pelos relatórios de agenda: contagem total, contagem por grupo
//! e média de um campo numérico.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Grupo usado quando o registro não tem o campo de agrupamento.
pub const MISSING_GROUP: &str = "unknown";

/// Estatísticas de um grupo.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroupStats {
    /// Registros no grupo.
    pub count: usize,

    /// Média do campo numérico (só valores numéricos contam).
    pub average: Option<f64>,

    #[serde(skip)]
    sum: f64,

    #[serde(skip)]
    numeric: usize,
}

impl GroupStats {
    fn push(&mut self, value: Option<f64>) {
        self.count += 1;
        if let Some(v) = value {
            self.sum += v;
            self.numeric += 1;
            self.average = Some(self.sum / self.numeric as f64);
        }
    }
}

/// Resumo de um conjunto de registros.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    /// Total de registros.
    pub total: usize,

    /// Estatísticas por grupo, em ordem alfabética.
    pub groups: BTreeMap<String, GroupStats>,
}

/// Agrupa os registros por `group_by` e calcula a média de
/// `numeric_field` por grupo.
///
/// Campos numéricos ausentes ou não numéricos são ignorados na média,
/// mas o registro conta no grupo.
pub fn summarize(records: &[Value], group_by: &str, numeric_field: Option<&str>) -> Summary {
    let mut summary = Summary::default();

    for record in records {
        summary.total += 1;

        let group = record
            .get(group_by)
            .and_then(group_label)
            .unwrap_or_else(|| MISSING_GROUP.to_string());

        let value = numeric_field
            .and_then(|field| record.get(field))
            .and_then(Value::as_f64);

        summary.groups.entry(group).or_default().push(value);
    }

    summary
}

fn group_label(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
