//! # Camada de Armazenamento
//!
//! Leitura de tabelas por extensão (Parquet ou CSV com separador detectado)
//! e escrita em Parquet comprimido ou CSV UTF-8 com BOM (formato que o Excel
//! abre sem quebrar acentos, usado nos arquivos de revisão manual).

use polars::prelude::*;

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::EtlError;

/// Formatos de tabela reconhecidos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formato {
    Parquet,
    Csv,
}

impl Formato {
    /// Resolve o formato pela extensão (sem diferenciar maiúsculas).
    pub fn from_path(path: &Path) -> Result<Self, EtlError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("parquet") => Ok(Formato::Parquet),
            Some("csv") => Ok(Formato::Csv),
            _ => Err(EtlError::FormatoNaoSuportado(path.to_path_buf())),
        }
    }
}

/// Detecta `;` ou `,` a partir da primeira linha do arquivo.
pub fn detectar_separador(path: &Path) -> Result<u8, EtlError> {
    let file = File::open(path)?;
    let mut primeira = Vec::new();
    BufReader::new(file).read_until(b'\n', &mut primeira)?;

    let pontos_virgula = primeira.iter().filter(|b| **b == b';').count();
    let virgulas = primeira.iter().filter(|b| **b == b',').count();

    Ok(if pontos_virgula > virgulas { b';' } else { b',' })
}

/// Carrega uma tabela Parquet ou CSV inteira para memória.
///
/// CSVs são lidos sem inferência de tipos: toda coluna chega como texto,
/// para que ids e nomes como `"007"` não percam zeros à esquerda.
///
/// # Errors
///
/// * `EtlError::FormatoNaoSuportado` para extensões diferentes de `.parquet`/`.csv`.
/// * `EtlError::Io` / `EtlError::Polars` em falhas de leitura.
pub fn carregar_tabela(path: &Path) -> Result<DataFrame, EtlError> {
    match Formato::from_path(path)? {
        Formato::Parquet => {
            let file = File::open(path)?;
            Ok(ParquetReader::new(file).finish()?)
        }
        Formato::Csv => {
            let separador = detectar_separador(path)?;
            let mut df = CsvReadOptions::default()
                .with_has_header(true)
                .with_infer_schema_length(Some(0))
                .with_parse_options(CsvParseOptions::default().with_separator(separador))
                .try_into_reader_with_file_path(Some(path.to_path_buf()))?
                .finish()?;

            // CSVs gravados por `gravar_csv_bom` trazem BOM no primeiro cabeçalho
            let primeira = df.get_column_names_str().first().map(|c| c.to_string());
            if let Some(nome) = primeira
                && let Some(limpo) = nome.strip_prefix('\u{FEFF}')
            {
                df.rename(&nome, limpo.into())?;
            }
            Ok(df)
        }
    }
}

pub fn tem_coluna(df: &DataFrame, coluna: &str) -> bool {
    df.column(coluna).is_ok()
}

pub fn exigir_coluna(df: &DataFrame, coluna: &str, contexto: &str) -> Result<(), EtlError> {
    if tem_coluna(df, coluna) {
        Ok(())
    } else {
        Err(EtlError::ColunaNaoEncontrada {
            coluna: coluna.to_string(),
            contexto: contexto.to_string(),
        })
    }
}

/// Valores de uma coluna como texto (nulos preservados).
pub fn coluna_texto(df: &DataFrame, coluna: &str) -> Result<Vec<Option<String>>, EtlError> {
    let convertida = df.column(coluna)?.cast(&DataType::String)?;
    let valores = convertida
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(valores)
}

/// Grava em Parquet (Snappy) com estatísticas de min/max/nulos.
pub fn gravar_parquet(df: &mut DataFrame, path: &Path) -> Result<(), EtlError> {
    garantir_diretorio_pai(path)?;
    let file_out = File::create(path)?;

    let stats_options = StatisticsOptions {
        min_value: true,
        max_value: true,
        null_count: true,
        distinct_count: false,
    };

    ParquetWriter::new(file_out)
        .with_compression(ParquetCompression::Snappy)
        .with_statistics(stats_options)
        .finish(df)
        .map_err(|e| EtlError::Polars(format!("Erro ao gravar Parquet '{}': {}", path.display(), e)))?;

    Ok(())
}

/// Grava CSV UTF-8 com BOM, separador vírgula, com cabeçalho.
pub fn gravar_csv_bom(df: &mut DataFrame, path: &Path) -> Result<(), EtlError> {
    garantir_diretorio_pai(path)?;
    let mut file_out = File::create(path)?;

    CsvWriter::new(&mut file_out)
        .include_bom(true)
        .include_header(true)
        .finish(df)
        .map_err(|e| EtlError::Polars(format!("Erro ao gravar CSV '{}': {}", path.display(), e)))?;

    Ok(())
}

fn garantir_diretorio_pai(path: &Path) -> Result<(), EtlError> {
    if let Some(pai) = path.parent()
        && !pai.as_os_str().is_empty()
    {
        fs::create_dir_all(pai)?;
    }
    Ok(())
}
