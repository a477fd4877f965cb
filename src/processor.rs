//! # Preparação do CSV Bruto
//!
//! ## Engenharia de Dados
//! Lê o CSV exportado do sistema de vendas em blocos de tamanho fixo (para
//! limitar o pico de memória), normaliza números em formato local, deriva
//! receita e período, e grava cada bloco como `part_NNN.parquet` antes de
//! ler o próximo. Ao final, as partes são consolidadas no fato completo e
//! as linhas sorteadas de cada bloco formam a amostra `vendas_sample`.
//!
//! Falha em qualquer bloco aborta a execução inteira.

use chrono::{Datelike, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use tracing::{debug, info, warn};

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::errors::EtlError;
use crate::models::{Config, Encoding, Preparacao};
use crate::normalizer::parse_numero;
use crate::storage;

pub const COLUNA_RECEITA: &str = "receita";
pub const COLUNA_PEDIDOS: &str = "pedidos";
pub const COLUNA_ANO: &str = "ano";
pub const COLUNA_MES: &str = "mes";
pub const COLUNA_ANO_MES: &str = "ano_mes";

const SEMENTE_AMOSTRA: u64 = 42;

/// Resultado da preparação.
#[derive(Debug, Clone)]
pub struct ResumoPreparacao {
    pub partes: Vec<PathBuf>,
    pub linhas: usize,
    /// Linhas com número de campos diferente do cabeçalho.
    pub descartadas: usize,
    pub consolidado: PathBuf,
    /// `vendas_sample.parquet`, quando a amostragem está ligada.
    pub amostra: Option<PathBuf>,
}

/// Decodifica um campo conforme o encoding do arquivo; vazio vira nulo.
fn decodificar(bytes: &[u8], encoding: Encoding) -> Option<String> {
    let texto = match encoding {
        // Latin-1 mapeia cada byte diretamente para o code point de mesmo valor
        Encoding::Latin1 => bytes.iter().map(|&b| b as char).collect::<String>(),
        Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
    };
    let texto = texto.trim_start_matches('\u{FEFF}');
    if texto.trim().is_empty() {
        None
    } else {
        Some(texto.to_string())
    }
}

/// Aceita `dd/mm/aaaa` (com hora opcional) ou `aaaa-mm-dd`.
pub fn parse_data(valor: &str) -> Option<NaiveDate> {
    let data = valor.split_whitespace().next()?;
    NaiveDate::parse_from_str(data, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(data, "%Y-%m-%d"))
        .ok()
}

/// Receita bruta; sem ela (nula ou zero), `valor * quantidade`.
pub fn calcular_receita(
    total: Option<f64>,
    valor: Option<f64>,
    quantidade: Option<f64>,
) -> Option<f64> {
    match total {
        Some(t) if t != 0.0 => Some(t),
        _ => valor.zip(quantidade).map(|(v, q)| v * q),
    }
}

/// Converte um bloco de linhas em DataFrame tipado.
pub fn processar_chunk(
    cabecalho: &[String],
    linhas: &[Vec<Option<String>>],
    prep: &Preparacao,
) -> Result<DataFrame, EtlError> {
    let mut colunas: Vec<Column> = Vec::with_capacity(cabecalho.len() + 5);
    let mut numericas: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    let mut datas: Option<Vec<Option<NaiveDate>>> = None;

    // 1. Colunas originais (numéricas convertidas)
    for (i, nome) in cabecalho.iter().enumerate() {
        let valores = linhas.iter().map(|l| l[i].as_deref());

        if prep.colunas_numericas.iter().any(|c| c == nome) {
            let numeros: Vec<Option<f64>> = valores.map(|v| v.and_then(parse_numero)).collect();
            colunas.push(Column::new(nome.as_str().into(), &numeros));
            numericas.push((nome.clone(), numeros));
        } else {
            if *nome == prep.coluna_data {
                datas = Some(valores.clone().map(|v| v.and_then(parse_data)).collect());
            }
            let textos: Vec<Option<&str>> = valores.collect();
            colunas.push(Column::new(nome.as_str().into(), textos));
        }
    }

    // 2. Receita e pedidos
    let numerica = |nome: &str| numericas.iter().find(|(n, _)| n == nome).map(|(_, v)| v);
    let total = numerica(&prep.coluna_valor_total);
    let valor = numerica(&prep.coluna_valor);
    let quantidade = numerica(&prep.coluna_quantidade);

    let receita: Vec<Option<f64>> = (0..linhas.len())
        .map(|i| {
            calcular_receita(
                total.and_then(|t| t[i]),
                valor.and_then(|v| v[i]),
                quantidade.and_then(|q| q[i]),
            )
        })
        .collect();
    colunas.push(Column::new(COLUNA_RECEITA.into(), receita));
    colunas.push(Column::new(COLUNA_PEDIDOS.into(), vec![1i32; linhas.len()]));

    // 3. Período
    if let Some(datas) = datas {
        let anos: Vec<Option<i32>> = datas.iter().map(|d| d.map(|d| d.year())).collect();
        let meses: Vec<Option<i32>> = datas.iter().map(|d| d.map(|d| d.month() as i32)).collect();
        let ano_mes: Vec<Option<String>> = datas
            .iter()
            .map(|d| d.map(|d| format!("{:04}-{:02}", d.year(), d.month())))
            .collect();
        colunas.push(Column::new(COLUNA_ANO.into(), anos));
        colunas.push(Column::new(COLUNA_MES.into(), meses));
        colunas.push(Column::new(COLUNA_ANO_MES.into(), ano_mes));
    }

    Ok(DataFrame::new(colunas)?)
}

fn barra_progresso() -> Result<ProgressBar, EtlError> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} linhas {msg}")
            .map_err(|e| EtlError::Config(format!("Template de progresso inválido: {}", e)))?,
    );
    Ok(pb)
}

fn gravar_parte(
    cabecalho: &[String],
    linhas: &[Vec<Option<String>>],
    prep: &Preparacao,
    dir: &Path,
    numero: usize,
    amostras: &mut Vec<DataFrame>,
) -> Result<PathBuf, EtlError> {
    let mut df = processar_chunk(cabecalho, linhas, prep)?;
    let path = dir.join(format!("part_{:03}.parquet", numero));
    storage::gravar_parquet(&mut df, &path)?;
    debug!(parte = numero, linhas = df.height(), path = %path.display(), "Parte gravada");

    if prep.amostra_por_bloco > 0 && df.height() > 0 {
        amostras.push(amostrar(&df, prep.amostra_por_bloco)?);
    }
    Ok(path)
}

/// Até `n` linhas sorteadas sem reposição, com semente fixa.
pub fn amostrar(df: &DataFrame, n: usize) -> Result<DataFrame, EtlError> {
    Ok(df.sample_n_literal(n.min(df.height()), false, false, Some(SEMENTE_AMOSTRA))?)
}

/// Empilha as amostras dos blocos em `vendas_sample.parquet` e `.csv`.
fn gravar_amostra(amostras: Vec<DataFrame>, dir: &Path) -> Result<Option<PathBuf>, EtlError> {
    let mut iter = amostras.into_iter();
    let Some(mut total) = iter.next() else {
        return Ok(None);
    };
    for df in iter {
        total.vstack_mut(&df)?;
    }

    let parquet = dir.join("vendas_sample.parquet");
    storage::gravar_parquet(&mut total, &parquet)?;
    storage::gravar_csv_bom(&mut total, &dir.join("vendas_sample.csv"))?;

    info!(linhas = total.height(), path = %parquet.display(), "Amostra gravada");
    Ok(Some(parquet))
}

/// Etapa de preparação: CSV bruto -> partes Parquet -> fato consolidado.
///
/// # Errors
///
/// * `EtlError::Io` / `EtlError::Csv` em falhas de leitura do bruto.
/// * `EtlError::Polars` em falhas de escrita.
pub fn preparar_dados(cfg: &Config) -> Result<ResumoPreparacao, EtlError> {
    let timer = Instant::now();
    let prep = &cfg.preparacao;
    let raw = &cfg.caminhos.raw;
    let dir = &cfg.caminhos.processed;
    std::fs::create_dir_all(dir)?;

    // 1. Leitor com separador detectado
    let separador = storage::detectar_separador(raw)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(separador)
        .has_headers(true)
        .from_path(raw)?;

    let cabecalho: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|h| decodificar(h, prep.encoding).unwrap_or_default().trim().to_string())
        .collect();

    let sep_char = separador as char;
    info!(
        path = %raw.display(),
        separador = %sep_char,
        colunas = cabecalho.len(),
        chunk_size = prep.chunk_size,
        "Lendo CSV bruto"
    );

    // 2. Blocos
    let pb = barra_progresso()?;
    let mut partes = Vec::new();
    let mut amostras = Vec::new();
    let mut bloco: Vec<Vec<Option<String>>> = Vec::with_capacity(prep.chunk_size.min(100_000));
    let mut linhas = 0;
    let mut descartadas = 0;

    for record in rdr.byte_records() {
        let record = match record {
            Ok(r) => r,
            Err(e) if matches!(e.kind(), csv::ErrorKind::UnequalLengths { .. }) => {
                descartadas += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        bloco.push(record.iter().map(|f| decodificar(f, prep.encoding)).collect());
        linhas += 1;
        pb.inc(1);

        if bloco.len() == prep.chunk_size {
            partes.push(gravar_parte(&cabecalho, &bloco, prep, dir, partes.len() + 1, &mut amostras)?);
            pb.set_message(format!("({} partes)", partes.len()));
            bloco.clear();
        }
    }

    if !bloco.is_empty() || partes.is_empty() {
        partes.push(gravar_parte(&cabecalho, &bloco, prep, dir, partes.len() + 1, &mut amostras)?);
    }
    pb.finish_with_message(format!("({} partes)", partes.len()));

    if descartadas > 0 {
        warn!(descartadas, "Linhas com número de campos inválido foram ignoradas");
    }

    // 3. Consolidação
    let consolidado = cfg.caminho_fato_completo();
    consolidar_partes(&partes, &consolidado)?;
    let amostra = gravar_amostra(amostras, &cfg.caminhos.sample)?;

    info!(
        linhas,
        partes = partes.len(),
        consolidado = %consolidado.display(),
        elapsed = ?timer.elapsed(),
        "Preparação concluída"
    );

    Ok(ResumoPreparacao {
        partes,
        linhas,
        descartadas,
        consolidado,
        amostra,
    })
}

/// Empilha as partes (mesmo schema) em um único Parquet.
pub fn consolidar_partes(partes: &[PathBuf], destino: &Path) -> Result<(), EtlError> {
    let mut iter = partes.iter();
    let Some(primeira) = iter.next() else {
        return Ok(());
    };

    let mut total = storage::carregar_tabela(primeira)?;
    for parte in iter {
        let df = storage::carregar_tabela(parte)?;
        total.vstack_mut(&df)?;
    }

    storage::gravar_parquet(&mut total, destino)
}
