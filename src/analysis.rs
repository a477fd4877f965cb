//! Análises sobre o fato: KPIs mensais, auditoria de meses atípicos e
//! checagem de sanidade.

use polars::prelude::*;
use tracing::{info, warn};

use std::path::PathBuf;

use crate::errors::EtlError;
use crate::models::Config;
use crate::processor::{COLUNA_ANO_MES, COLUNA_RECEITA};
use crate::storage;

/// Receita, pedidos distintos, itens e ticket médio por `ano_mes`.
///
/// `ticket_medio = receita / max(pedidos, 1)`. Sem coluna de pedido, cada
/// linha conta como um pedido; sem `quantidade`, a coluna `itens` é omitida.
///
/// # Errors
///
/// `EtlError::ColunaNaoEncontrada` se faltar `ano_mes` ou `receita`.
pub fn kpi_mensal(
    df: &DataFrame,
    coluna_pedido: &str,
    coluna_quantidade: &str,
) -> Result<DataFrame, EtlError> {
    storage::exigir_coluna(df, COLUNA_ANO_MES, "fato")?;
    storage::exigir_coluna(df, COLUNA_RECEITA, "fato")?;

    let mut aggs = vec![col(COLUNA_RECEITA).sum().alias("receita")];
    if storage::tem_coluna(df, coluna_pedido) {
        aggs.push(col(coluna_pedido).n_unique().alias("pedidos"));
    } else {
        aggs.push(len().alias("pedidos"));
    }
    if storage::tem_coluna(df, coluna_quantidade) {
        aggs.push(col(coluna_quantidade).sum().alias("itens"));
    }

    let pedidos = col("pedidos").cast(DataType::Float64);
    let kpi = df
        .clone()
        .lazy()
        .filter(col(COLUNA_ANO_MES).is_not_null())
        .group_by([col(COLUNA_ANO_MES)])
        .agg(aggs)
        .with_column(
            when(pedidos.clone().gt(lit(1.0)))
                .then(col("receita") / pedidos)
                .otherwise(col("receita"))
                .alias("ticket_medio"),
        )
        .sort([COLUNA_ANO_MES], SortMultipleOptions::default())
        .collect()?;

    Ok(kpi)
}

/// Multiplicador do intervalo interquartil para o limite de outlier.
pub const FATOR_IQR: f64 = 1.5;

/// Meses fora do padrão de receita.
#[derive(Debug, Clone)]
pub struct AuditoriaKpi {
    /// `q3 + 1.5 * (q3 - q1)` da receita mensal; `None` sem meses.
    pub limite_superior: Option<f64>,
    pub outliers: DataFrame,
    /// Meses com receita nula ou zero.
    pub receita_zero: DataFrame,
}

/// Aplica a regra do IQR sobre a coluna `receita` do KPI mensal.
///
/// Quartis com interpolação linear.
pub fn auditar_kpi(kpi: &DataFrame) -> Result<AuditoriaKpi, EtlError> {
    storage::exigir_coluna(kpi, "receita", "KPI mensal")?;

    let quartis = kpi
        .clone()
        .lazy()
        .select([
            col("receita")
                .quantile(lit(0.25), QuantileMethod::Linear)
                .alias("q1"),
            col("receita")
                .quantile(lit(0.75), QuantileMethod::Linear)
                .alias("q3"),
        ])
        .collect()?;

    let quartil = |nome: &str| -> Result<Option<f64>, EtlError> {
        Ok(quartis.column(nome)?.cast(&DataType::Float64)?.f64()?.get(0))
    };
    let limite_superior = match (quartil("q1")?, quartil("q3")?) {
        (Some(q1), Some(q3)) => Some(q3 + FATOR_IQR * (q3 - q1)),
        _ => None,
    };

    let outliers = match limite_superior {
        Some(limite) => kpi
            .clone()
            .lazy()
            .filter(col("receita").gt(lit(limite)))
            .collect()?,
        None => kpi.clear(),
    };

    let receita_zero = kpi
        .clone()
        .lazy()
        .filter(col("receita").fill_null(lit(0.0)).eq(lit(0.0)))
        .collect()?;

    Ok(AuditoriaKpi {
        limite_superior,
        outliers,
        receita_zero,
    })
}

/// Contagem de nulos por coluna e de linhas com receita nula ou zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Sanidade {
    pub linhas: usize,
    pub nulos: Vec<(String, usize)>,
    pub receita_nula_ou_zero: usize,
}

pub fn checar_sanidade(df: &DataFrame) -> Result<Sanidade, EtlError> {
    let nulos = df
        .get_columns()
        .iter()
        .map(|c| (c.name().to_string(), c.null_count()))
        .collect();

    let receita_nula_ou_zero = if storage::tem_coluna(df, COLUNA_RECEITA) {
        df.column(COLUNA_RECEITA)?
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .filter(|v| v.is_none_or(|x| x == 0.0))
            .count()
    } else {
        0
    };

    Ok(Sanidade {
        linhas: df.height(),
        nulos,
        receita_nula_ou_zero,
    })
}

/// Fato enriquecido, se já existir; senão o consolidado.
fn fato_mais_recente(cfg: &Config) -> PathBuf {
    let enriquecido = cfg
        .caminhos
        .processed
        .join(format!("{}.parquet", cfg.fato.arquivo_enriquecido));
    if enriquecido.exists() {
        enriquecido
    } else {
        cfg.caminho_fato_completo()
    }
}

/// Arquivos gravados por [`exportar_kpi`].
#[derive(Debug, Clone)]
pub struct ResumoKpi {
    pub meses: usize,
    pub kpi: PathBuf,
    pub outliers: PathBuf,
    pub receita_zero: PathBuf,
}

/// Grava `kpi_mensal.csv`, `kpi_outliers.csv` e `kpi_receita_zero.csv` no
/// diretório de exports.
pub fn exportar_kpi(cfg: &Config) -> Result<ResumoKpi, EtlError> {
    let fonte = fato_mais_recente(cfg);
    let df = storage::carregar_tabela(&fonte)?;

    let mut kpi = kpi_mensal(&df, &cfg.fato.coluna_pedido, &cfg.preparacao.coluna_quantidade)?;
    let AuditoriaKpi {
        limite_superior,
        mut outliers,
        mut receita_zero,
    } = auditar_kpi(&kpi)?;

    let dir = &cfg.caminhos.exports;
    let resumo = ResumoKpi {
        meses: kpi.height(),
        kpi: dir.join("kpi_mensal.csv"),
        outliers: dir.join("kpi_outliers.csv"),
        receita_zero: dir.join("kpi_receita_zero.csv"),
    };
    storage::gravar_csv_bom(&mut kpi, &resumo.kpi)?;
    storage::gravar_csv_bom(&mut outliers, &resumo.outliers)?;
    storage::gravar_csv_bom(&mut receita_zero, &resumo.receita_zero)?;

    info!(meses = resumo.meses, fonte = %fonte.display(), destino = %dir.display(), "KPI mensal exportado");
    if outliers.height() > 0 {
        warn!(meses = outliers.height(), limite = ?limite_superior, "Meses com receita acima do padrão (IQR)");
    }
    if receita_zero.height() > 0 {
        warn!(meses = receita_zero.height(), "Meses com receita zero");
    }

    Ok(resumo)
}

/// Registra no log o resultado da checagem de sanidade.
pub fn executar_sanidade(cfg: &Config) -> Result<Sanidade, EtlError> {
    let fonte = fato_mais_recente(cfg);
    let df = storage::carregar_tabela(&fonte)?;
    let sanidade = checar_sanidade(&df)?;

    info!(linhas = sanidade.linhas, fonte = %fonte.display(), "Checagem de sanidade");
    for (coluna, nulos) in sanidade.nulos.iter().filter(|(_, n)| *n > 0) {
        info!(coluna = %coluna, nulos, "Nulos por coluna");
    }
    if sanidade.receita_nula_ou_zero > 0 {
        warn!(linhas = sanidade.receita_nula_ou_zero, "Linhas com receita nula ou zero");
    }

    Ok(sanidade)
}
