//! Interface de linha de comando do Sigilo.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sigilo - cache de consultas e mascaramento de dados pessoais (LGPD).
#[derive(Parser, Debug)]
#[command(name = "sigilo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = "sigilo.toml")]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inicializa configuração no diretório atual.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Mascara um documento JSON.
    Mask {
        /// Arquivo JSON de entrada ("-" para stdin).
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Visão de saída (list, detail, export, audit).
        #[arg(long, default_value = "detail")]
        view: String,

        /// Papel do usuário.
        #[arg(short, long, default_value = "viewer")]
        role: String,

        /// Identificador do usuário.
        #[arg(short, long, default_value = "cli")]
        user: String,

        /// Finalidade declarada (pode repetir).
        #[arg(short, long = "purpose")]
        purposes: Vec<String>,

        /// O titular deu consentimento.
        #[arg(long)]
        consent: bool,

        /// Acesso de emergência (libera dados médicos).
        #[arg(long)]
        emergency: bool,

        /// Mostra o registro de auditoria no stderr.
        #[arg(long)]
        show_audit: bool,
    },

    /// Lista as regras de mascaramento ativas.
    Rules {
        /// Saída em JSON.
        #[arg(long)]
        json: bool,
    },

    /// Deriva a chave de cache de uma consulta.
    Key {
        /// Namespace da chave (ex.: appointments).
        namespace: String,

        /// Parâmetros da consulta em JSON.
        #[arg(default_value = "{}")]
        params: String,
    },

    /// Mostra os registros de auditoria mais recentes.
    Audit {
        /// Número máximo de registros.
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Filtra por usuário.
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Diagnostica problemas de configuração.
    Doctor,

    /// Mostra versão.
    Version,
}
