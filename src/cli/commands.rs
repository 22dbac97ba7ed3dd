//! Implementação dos comandos CLI do Sigilo.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::cache::derive_key_from_value;
use crate::masking::MaskingEngine;
use crate::types::config::Config;
use crate::types::context::{MaskingContext, View};
use crate::SigiloResult;

/// Opções do comando `mask`.
#[derive(Debug, Clone)]
pub struct MaskOptions {
    pub input: PathBuf,
    pub view: String,
    pub role: String,
    pub user: String,
    pub purposes: Vec<String>,
    pub consent: bool,
    pub emergency: bool,
    pub show_audit: bool,
}

/// Initializes configuration in the specified directory.
pub async fn init(path: Option<PathBuf>) -> SigiloResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join("sigilo.toml");

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    // .sigilo/ guarda o banco de auditoria
    let data_dir = target_dir.join(".sigilo");
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!(".sigilo/ directory created");
    }

    update_gitignore(&target_dir)?;

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("Sigilo initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!("Data directory: .sigilo/");
    println!();
    println!("Next steps:");
    println!("  1. Set masking.hash_salt and masking.token_secret in sigilo.toml");
    println!("  2. Check the active rules: sigilo rules");
    println!("  3. Validate the setup: sigilo doctor");

    Ok(())
}

/// Updates or creates .gitignore to include .sigilo/
fn update_gitignore(target_dir: &Path) -> SigiloResult<()> {
    let gitignore_path = target_dir.join(".gitignore");
    let entry = ".sigilo/";
    let comment = "# Sigilo - local audit database";

    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path)?;

        if content
            .lines()
            .any(|line| line.trim() == entry || line.trim() == ".sigilo")
        {
            tracing::debug!(".gitignore already contains .sigilo/");
            return Ok(());
        }

        let mut new_content = content.trim_end().to_string();
        if !new_content.is_empty() {
            new_content.push_str("\n\n");
        }
        new_content.push_str(comment);
        new_content.push('\n');
        new_content.push_str(entry);
        new_content.push('\n');

        std::fs::write(&gitignore_path, new_content)?;
        println!(".gitignore updated with .sigilo/");
    } else {
        std::fs::write(&gitignore_path, format!("{}\n{}\n", comment, entry))?;
        println!(".gitignore created with .sigilo/");
    }

    Ok(())
}

/// Mascara um documento JSON e imprime o resultado.
pub async fn mask(options: MaskOptions, config: &Config) -> SigiloResult<()> {
    let raw = read_input(&options.input)?;
    let data: Value = serde_json::from_str(&raw)?;

    let mut context = MaskingContext::new(options.user, options.role, View::parse(&options.view)?)
        .with_consent(options.consent)
        .with_emergency_access(options.emergency);
    for purpose in options.purposes {
        context = context.with_purpose(purpose);
    }

    let engine = MaskingEngine::from_config(&config.masking)?;
    let outcome = engine.mask(&data, &context)?;

    record_audit(config, &outcome.audit)?;

    println!("{}", serde_json::to_string_pretty(&outcome.data)?);

    if options.show_audit {
        eprintln!("{}", serde_json::to_string_pretty(&outcome.audit)?);
    }

    Ok(())
}

#[cfg(feature = "sqlite")]
fn record_audit(config: &Config, audit: &crate::types::audit::MaskingAudit) -> SigiloResult<()> {
    if config.audit.enabled {
        crate::audit::AuditLog::new(&config.audit.db_path)?.record(audit)?;
    }
    Ok(())
}

#[cfg(not(feature = "sqlite"))]
fn record_audit(_config: &Config, _audit: &crate::types::audit::MaskingAudit) -> SigiloResult<()> {
    Ok(())
}

fn read_input(input: &Path) -> SigiloResult<String> {
    if input.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

/// Lista as regras ativas em ordem de prioridade.
pub async fn rules(json: bool, config: &Config) -> SigiloResult<()> {
    let engine = MaskingEngine::from_config(&config.masking)?;
    let rules = engine.rules()?;

    if json {
        let definitions: Vec<_> = rules.iter().map(|r| r.to_definition()).collect();
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(());
    }

    println!("Active masking rules ({}):\n", rules.len());
    println!(
        "  {:>8}  {:<28} {:<16} {:<10} {:<7} fields",
        "priority", "id", "type", "category", "view"
    );

    for rule in &rules {
        let conditional = if rule.conditions.is_some() { " *" } else { "" };
        println!(
            "  {:>8}  {:<28} {:<16} {:<10} {:<7} {}{}",
            rule.priority,
            rule.id,
            rule.masking_type.to_string(),
            rule.category.to_string(),
            rule.applies_to.to_string(),
            rule.field_patterns.join(", "),
            conditional
        );
    }

    if rules.iter().any(|r| r.conditions.is_some()) {
        println!();
        println!("  * rule has role/purpose/consent conditions");
    }

    Ok(())
}

/// Deriva a chave de cache de uma consulta.
pub fn key(namespace: &str, params: &str) -> SigiloResult<()> {
    let params: Value = serde_json::from_str(params)?;
    println!("{}", derive_key_from_value(namespace, &params));
    Ok(())
}

/// Mostra os registros de auditoria mais recentes.
#[cfg(feature = "sqlite")]
pub async fn audit(limit: usize, user: Option<&str>, config: &Config) -> SigiloResult<()> {
    use crate::audit::AuditLog;

    if !config.audit.enabled {
        println!("Audit trail is disabled in the configuration.");
        return Ok(());
    }

    let db_path = &config.audit.db_path;
    if !db_path.exists() {
        println!("No audit records yet.");
        println!("Run 'sigilo mask' to start recording.");
        return Ok(());
    }

    let log = AuditLog::new(db_path)?;
    let records = match user {
        Some(user) => log.for_user(user, limit)?,
        None => log.recent(limit)?,
    };

    println!("Audit trail ({} of {} records):\n", records.len(), log.count()?);

    for record in &records {
        let emergency = if record.emergency_access {
            " [EMERGENCY]"
        } else {
            ""
        };
        println!(
            "  {} {} {}/{} view={} masked={} exempted={} level={}{}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            &record.id[..8.min(record.id.len())],
            record.user_id,
            record.role,
            record.view,
            record.masked_fields.len(),
            record.exempted_fields.len(),
            record.confidentiality,
            emergency
        );
    }

    Ok(())
}

/// Mostra os registros de auditoria mais recentes.
#[cfg(not(feature = "sqlite"))]
pub async fn audit(_limit: usize, _user: Option<&str>, _config: &Config) -> SigiloResult<()> {
    println!("Sigilo was built without the 'sqlite' feature; audit trail unavailable.");
    Ok(())
}

/// Diagnostica problemas de configuração.
pub async fn doctor(config_path: &Path, config: &Config) -> SigiloResult<()> {
    println!("Diagnosing Sigilo configuration...\n");

    let mut issues: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if config_path.exists() {
        match Config::load(config_path) {
            Ok(_) => println!("✓ Configuration loaded from {}", config_path.display()),
            Err(e) => issues.push(format!("{} is invalid: {}", config_path.display(), e)),
        }
    } else {
        warnings.push(format!(
            "{} not found, using defaults (run 'sigilo init')",
            config_path.display()
        ));
    }

    match MaskingEngine::from_config(&config.masking) {
        Ok(engine) => {
            let count = engine.rules().map(|r| r.len()).unwrap_or(0);
            println!("✓ {} masking rules registered", count);
            if count == 0 {
                warnings.push("No masking rules registered - data passes through unmasked".to_string());
            }
        }
        Err(e) => issues.push(format!("Masking rules rejected: {}", e)),
    }

    if config.masking.hash_salt.is_empty() {
        warnings.push("masking.hash_salt is empty - hashes are guessable for short values".to_string());
    }
    if config.masking.token_secret.is_empty() {
        warnings.push("masking.token_secret is empty - tokens can be recomputed".to_string());
    }
    if config.masking.placeholder == config.masking.redaction_marker {
        issues.push("masking.placeholder and masking.redaction_marker must differ".to_string());
    }

    if config.cache.enabled {
        if config.cache.ttl_secs == 0 {
            warnings.push("cache.ttl_secs is 0 - every entry expires immediately".to_string());
        }
        if config.cache.capacity == 0 {
            warnings.push("cache.capacity is 0 - cache is unbounded".to_string());
        }
        println!(
            "✓ Cache: capacity {}, TTL {}s",
            config.cache.capacity, config.cache.ttl_secs
        );
    } else {
        println!("○ Cache is disabled");
    }

    if !matches!(config.general.log_format.as_str(), "text" | "json") {
        warnings.push(format!(
            "Unknown log format '{}' (expected text or json)",
            config.general.log_format
        ));
    }

    check_audit(config, &mut issues);

    println!();
    if issues.is_empty() && warnings.is_empty() {
        println!("✓ All good! Sigilo is ready.");
    } else {
        if !warnings.is_empty() {
            println!("Warnings:");
            for warning in warnings {
                println!("  ⚠ {}", warning);
            }
        }
        if !issues.is_empty() {
            println!("Problems:");
            for issue in issues {
                println!("  ✗ {}", issue);
            }
        }
    }

    Ok(())
}

#[cfg(feature = "sqlite")]
fn check_audit(config: &Config, issues: &mut Vec<String>) {
    if !config.audit.enabled {
        println!("○ Audit trail is disabled");
        return;
    }

    let db_path = &config.audit.db_path;
    if !db_path.exists() {
        println!("○ Audit database not created yet ({})", db_path.display());
        return;
    }

    match crate::audit::AuditLog::new(db_path).and_then(|log| log.count()) {
        Ok(count) => println!("✓ Audit database OK ({} records)", count),
        Err(e) => issues.push(format!("Audit database unreadable: {}", e)),
    }
}

#[cfg(not(feature = "sqlite"))]
fn check_audit(config: &Config, _issues: &mut Vec<String>) {
    if config.audit.enabled {
        println!("○ Audit trail requested but built without the 'sqlite' feature");
    }
}

/// Mostra versão.
pub fn version() {
    println!("sigilo {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("LGPD-aware query cache and field masking engine");
}
