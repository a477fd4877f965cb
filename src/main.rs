//! # Vendas ETL - CLI
//!
//! ## Visão Geral
//! Cada subcomando executa uma etapa do modelo estrela; `pipeline` executa
//! preparação, dimensões e enriquecimento em sequência.
//!
//! ## Princípios de Engenharia
//! - **Fail-Fast**: qualquer erro aborta com código de saída diferente de zero.
//! - **Observabilidade**: logs estruturados com tempos de execução por etapa.

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use vendas_etl::dimension::{self, ParametrosDimensao};
use vendas_etl::{Config, DimensionConfig, EtlError, MetodoChave, analysis, enricher, logging, processor};

#[derive(Debug, Parser)]
#[command(name = "vendas_etl", version, about = "ETL em estrela da base de vendas pet")]
struct Cli {
    /// Arquivo de configuração TOML (padrão: ./vendas_etl.toml, se existir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Logs em JSON (uma linha por evento).
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    comando: Comando,
}

#[derive(Debug, Subcommand)]
enum Comando {
    /// CSV bruto -> partes Parquet -> vendas_completo.parquet
    Preparar,

    /// Gera uma dimensão.
    Dimensao {
        #[arg(value_enum)]
        tipo: TipoDimensao,

        /// Arquivo de entrada (parquet ou csv). Sem ele, usa a lista da configuração.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Coluna com o nome/descrição na base de entrada.
        #[arg(long)]
        col_nome: Option<String>,

        /// Coluna de categoria na base de entrada (opcional).
        #[arg(long)]
        col_categoria: Option<String>,

        /// Dimensão existente para preservar ids (parquet/csv).
        #[arg(long)]
        existing_dim: Option<PathBuf>,

        /// Diretório de saída (padrão: caminhos.dimensoes).
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Método de geração do id.
        #[arg(long, value_enum, default_value_t = MetodoChave::Sequencial)]
        method: MetodoChave,
    },

    /// Reconstrói as quatro dimensões, preservando ids já gravados.
    Dimensoes {
        #[arg(long, value_enum, default_value_t = MetodoChave::Sequencial)]
        method: MetodoChave,
    },

    /// Junta o fato com as dimensões e gera relatórios de não-casados.
    Enriquecer,

    /// Exporta KPIs mensais.
    Kpi,

    /// Nulos por coluna e receitas zeradas.
    Sanidade,

    /// preparar -> dimensoes -> enriquecer
    Pipeline {
        #[arg(long, value_enum, default_value_t = MetodoChave::Sequencial)]
        method: MetodoChave,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TipoDimensao {
    Produto,
    Centro,
    Formapagto,
    Responsavel,
}

impl TipoDimensao {
    fn config<'a>(&self, cfg: &'a Config) -> &'a DimensionConfig {
        match self {
            TipoDimensao::Produto => &cfg.dimensoes.produto,
            TipoDimensao::Centro => &cfg.dimensoes.centro,
            TipoDimensao::Formapagto => &cfg.dimensoes.formapagto,
            TipoDimensao::Responsavel => &cfg.dimensoes.responsavel,
        }
    }
}

fn executar(cli: Cli) -> Result<(), EtlError> {
    let config = Config::resolve(cli.config.as_deref())?;

    match cli.comando {
        Comando::Preparar => {
            processor::preparar_dados(&config)?;
        }
        Comando::Dimensao {
            tipo,
            input,
            col_nome,
            col_categoria,
            existing_dim,
            out_dir,
            method,
        } => {
            let params = ParametrosDimensao {
                input,
                col_nome,
                col_categoria,
                existing_dim,
                out_dir: out_dir.unwrap_or_else(|| config.caminhos.dimensoes.clone()),
                metodo: method,
            };
            dimension::executar_dimensao(tipo.config(&config), &params)?;
        }
        Comando::Dimensoes { method } => {
            dimension::executar_todas(&config, method)?;
        }
        Comando::Enriquecer => {
            enricher::executar_enriquecimento(&config)?;
        }
        Comando::Kpi => {
            analysis::exportar_kpi(&config)?;
        }
        Comando::Sanidade => {
            analysis::executar_sanidade(&config)?;
        }
        Comando::Pipeline { method } => {
            processor::preparar_dados(&config)?;
            dimension::executar_todas(&config, method)?;
            enricher::executar_enriquecimento(&config)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.json_logs);

    let global_timer = Instant::now();
    info!(comando = ?cli.comando, "Iniciando ETL");

    match executar(cli) {
        Ok(()) => {
            info!(elapsed = ?global_timer.elapsed(), "Fim da execução");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
