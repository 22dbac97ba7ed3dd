//! Trilha de auditoria persistente (SQLite).
//!
//! Cada operação de mascaramento gera um [`MaskingAudit`]; o `AuditLog`
//! guarda esses registros para consulta posterior (`sigilo audit`).

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::types::audit::{ConfidentialityLevel, MaskingAudit};
use crate::types::context::View;
use crate::SigiloResult;

const SELECT_AUDIT: &str = "SELECT id, user_id, role, view, emergency_access, confidentiality,
        masked_fields, exempted_fields, timestamp
 FROM masking_audit";

/// Log de auditoria em SQLite.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Cria ou abre o banco de auditoria.
    pub fn new(db_path: &Path) -> SigiloResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Self::init(Connection::open(db_path)?)
    }

    /// Banco em memória (testes e execuções sem persistência).
    pub fn in_memory() -> SigiloResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> SigiloResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS masking_audit (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                role TEXT NOT NULL,
                view TEXT NOT NULL,
                emergency_access BOOLEAN NOT NULL,
                confidentiality TEXT NOT NULL,
                masked_fields TEXT NOT NULL,
                exempted_fields TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_audit_user ON masking_audit(user_id);
            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON masking_audit(timestamp);
        "#,
        )?;

        Ok(Self { conn })
    }

    /// Grava um registro.
    pub fn record(&self, audit: &MaskingAudit) -> SigiloResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO masking_audit
                (id, user_id, role, view, emergency_access, confidentiality,
                 masked_fields, exempted_fields, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                audit.id,
                audit.user_id,
                audit.role,
                audit.view.to_string(),
                audit.emergency_access,
                audit.confidentiality.to_string(),
                serde_json::to_string(&audit.masked_fields)?,
                serde_json::to_string(&audit.exempted_fields)?,
                audit.timestamp.to_rfc3339(),
            ],
        )?;

        tracing::debug!(
            audit_id = %audit.id,
            user_id = %audit.user_id,
            masked_fields = audit.masked_fields.len(),
            "Audit record stored"
        );

        Ok(())
    }

    /// Registros mais recentes primeiro.
    pub fn recent(&self, limit: usize) -> SigiloResult<Vec<MaskingAudit>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_AUDIT} ORDER BY timestamp DESC LIMIT ?"
        ))?;

        let records = stmt
            .query_map(params![limit as i64], audit_from_row)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(records)
    }

    /// Registros de um usuário, mais recentes primeiro.
    pub fn for_user(&self, user_id: &str, limit: usize) -> SigiloResult<Vec<MaskingAudit>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_AUDIT} WHERE user_id = ? ORDER BY timestamp DESC LIMIT ?"
        ))?;

        let records = stmt
            .query_map(params![user_id, limit as i64], audit_from_row)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(records)
    }

    /// Total de registros.
    pub fn count(&self) -> SigiloResult<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM masking_audit", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog").finish_non_exhaustive()
    }
}

fn audit_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MaskingAudit> {
    Ok(MaskingAudit {
        id: row.get(0)?,
        user_id: row.get(1)?,
        role: row.get(2)?,
        view: View::parse(&row.get::<_, String>(3)?).unwrap_or(View::Audit),
        emergency_access: row.get(4)?,
        // Nível ilegível conta como o mais restrito
        confidentiality: ConfidentialityLevel::parse(&row.get::<_, String>(5)?)
            .unwrap_or(ConfidentialityLevel::HighlyConfidential),
        masked_fields: serde_json::from_str(&row.get::<_, String>(6)?).unwrap_or_default(),
        exempted_fields: serde_json::from_str(&row.get::<_, String>(7)?).unwrap_or_default(),
        timestamp: row
            .get::<_, String>(8)?
            .parse()
            .unwrap_or_else(|_| Utc::now()),
    })
}
