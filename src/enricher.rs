//! # Enriquecimento do Fato
//!
//! ## Visão Geral
//! Resolve cada chave estrangeira textual do fato (produto, centro de
//! distribuição, forma de pagamento, responsável) para o id substituto da
//! dimensão correspondente, com left join pela chave natural normalizada.
//!
//! ## Garantias
//! - O número de linhas do fato nunca muda (violação é erro fatal).
//! - A ordem das linhas do fato é mantida.
//! - Colunas repassadas que já existem no fato chegam com sufixo `_dim`.
//! - Linhas sem correspondência permanecem no fato (id nulo) e são listadas
//!   uma única vez por chave no relatório de não-casados.

use polars::prelude::*;
use tracing::{info, warn};

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use crate::errors::EtlError;
use crate::models::{Config, DimensionConfig};
use crate::storage;

/// Sufixo aplicado às colunas da dimensão que colidem com o fato.
pub const SUFIXO_DIM: &str = "_dim";

const COLUNA_ORDEM: &str = "__ordem_fato";

/// Resultado de um left join seguro.
#[derive(Debug, Clone)]
pub struct MergeResultado {
    pub fato: DataFrame,
    /// Chaves sem correspondência (deduplicadas pela chave de junção).
    pub nao_casados: DataFrame,
    /// Renomeações aplicadas (`original -> original_dim`).
    pub renomeadas: Vec<(String, String)>,
    /// Colunas do fato substituídas pelas da dimensão (id ou `_dim` de uma
    /// execução anterior).
    pub substituidas: Vec<String>,
}

/// Left join que evita colisões de colunas e preserva a cardinalidade.
///
/// # Arguments
///
/// * `fato` - Tabela fato.
/// * `dim` - Dimensão já carregada.
/// * `left_on` / `right_on` - Chave de junção no fato e na dimensão.
/// * `id_col` - Id substituto da dimensão (sempre repassado, nunca renomeado).
/// * `keep_cols` - Colunas da dimensão a repassar; as ausentes na dimensão são ignoradas.
/// * `contexto_relatorio` - Colunas do fato incluídas no relatório de não-casados.
///
/// # Errors
///
/// * `EtlError::ColunaNaoEncontrada` se `right_on` não existir na dimensão
///   (ou `left_on` no fato).
/// * `EtlError::ContagemDivergente` se o join multiplicar linhas.
#[allow(clippy::too_many_arguments)]
pub fn safe_merge_left(
    fato: &DataFrame,
    dim: &DataFrame,
    dimensao: &str,
    left_on: &str,
    right_on: &str,
    id_col: &str,
    keep_cols: &[String],
    contexto_relatorio: &[&str],
) -> Result<MergeResultado, EtlError> {
    storage::exigir_coluna(dim, right_on, &format!("dimensão '{}'", dimensao))?;
    storage::exigir_coluna(fato, left_on, "fato")?;

    // 1. Colunas a trazer (id primeiro, sem duplicatas, só as que existem)
    let mut cols: Vec<String> = Vec::new();
    for c in std::iter::once(id_col).chain(keep_cols.iter().map(String::as_str)) {
        if c != right_on && storage::tem_coluna(dim, c) && !cols.iter().any(|x| x == c) {
            cols.push(c.to_string());
        }
    }
    storage::exigir_coluna(dim, id_col, &format!("dimensão '{}'", dimensao))?;

    let mut selecao: Vec<&str> = vec![right_on];
    selecao.extend(cols.iter().map(String::as_str));
    let mut dim_subset = dim.select(selecao)?;
    let chave = dim_subset.column(right_on)?.cast(&DataType::String)?;
    dim_subset.with_column(chave)?;

    // 2. Renomeia conflitos; resíduos de enriquecimentos anteriores saem do fato
    let mut base = fato.clone();
    let mut renomeadas = Vec::new();
    let mut substituidas = Vec::new();
    for c in &cols {
        if c == id_col {
            if storage::tem_coluna(&base, c) {
                warn!(dimensao = %dimensao, coluna = %c, "Coluna de id já existente no fato será substituída");
                base = base.drop(c)?;
                substituidas.push(c.clone());
            }
            continue;
        }
        if storage::tem_coluna(&base, c) {
            let novo = format!("{}{}", c, SUFIXO_DIM);
            if storage::tem_coluna(&base, &novo) {
                warn!(dimensao = %dimensao, coluna = %novo, "Coluna já existente no fato será substituída");
                base = base.drop(&novo)?;
                substituidas.push(novo.clone());
            }
            dim_subset.rename(c, novo.as_str().into())?;
            renomeadas.push((c.clone(), novo));
        }
    }

    // 3. Join preservando a ordem original
    let antes = base.height();
    let fato_tinha_right_on = storage::tem_coluna(&base, right_on);
    let base = base.with_row_index(COLUNA_ORDEM.into(), None)?;

    let mut merged = base
        .lazy()
        .join(
            dim_subset.lazy(),
            [col(left_on)],
            [col(right_on)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;

    if merged.height() != antes {
        return Err(EtlError::ContagemDivergente {
            dimensao: dimensao.to_string(),
            antes,
            depois: merged.height(),
        });
    }

    merged = merged.sort([COLUNA_ORDEM], SortMultipleOptions::default())?;
    merged = merged.drop(COLUNA_ORDEM)?;
    if !fato_tinha_right_on && right_on != left_on && storage::tem_coluna(&merged, right_on) {
        merged = merged.drop(right_on)?;
    }

    // 4. Não-casados (id nulo), uma linha por chave
    let mascara = merged.column(id_col)?.is_null();
    let mut colunas_relatorio: Vec<&str> = contexto_relatorio
        .iter()
        .copied()
        .filter(|c| *c != left_on && storage::tem_coluna(&merged, c))
        .collect();
    colunas_relatorio.push(left_on);

    let sem_id = merged.filter(&mascara)?.select(colunas_relatorio)?;
    let nao_casados = deduplicar_por(&sem_id, left_on)?;

    Ok(MergeResultado {
        fato: merged,
        nao_casados,
        renomeadas,
        substituidas,
    })
}

/// Mantém a primeira linha de cada valor da coluna (nulo conta como um valor).
fn deduplicar_por(df: &DataFrame, coluna: &str) -> Result<DataFrame, EtlError> {
    let valores = storage::coluna_texto(df, coluna)?;
    let mut vistos: HashSet<Option<String>> = HashSet::new();
    let indices: Vec<IdxSize> = valores
        .into_iter()
        .enumerate()
        .filter(|(_, v)| vistos.insert(v.clone()))
        .map(|(i, _)| i as IdxSize)
        .collect();

    Ok(df.take(&IdxCa::from_vec(PlSmallStr::EMPTY, indices))?)
}

/// Nome da coluna auxiliar com a chave normalizada do fato.
pub fn coluna_auxiliar(dim: &DimensionConfig) -> String {
    format!("__{}_norm", dim.nome)
}

/// Relatório de não-casados de uma dimensão.
#[derive(Debug, Clone)]
pub struct RelatorioNaoCasados {
    pub dimensao: String,
    pub arquivo: String,
    pub tabela: DataFrame,
}

/// Fato enriquecido e relatórios gerados.
#[derive(Debug, Clone)]
pub struct Enriquecimento {
    pub fato: DataFrame,
    pub relatorios: Vec<RelatorioNaoCasados>,
}

/// Aplica [`safe_merge_left`] uma vez por dimensão.
///
/// Dimensões cuja coluna não existe no fato são puladas com aviso. Se a
/// dimensão não tiver a coluna normalizada, ela é derivada da coluna de nome.
pub fn enriquecer_fato(
    fato: DataFrame,
    dimensoes: &[(&DimensionConfig, DataFrame)],
) -> Result<Enriquecimento, EtlError> {
    let mut fato = fato;
    let mut auxiliares = Vec::new();
    let mut relatorios = Vec::new();

    for (cfg, dim) in dimensoes {
        if !storage::tem_coluna(&fato, &cfg.coluna_fato) {
            warn!(dimensao = %cfg.nome, coluna = %cfg.coluna_fato, "Coluna ausente no fato; dimensão ignorada");
            continue;
        }

        // 1. Chave normalizada auxiliar no fato
        let aux = coluna_auxiliar(cfg);
        let chaves: Vec<Option<String>> = storage::coluna_texto(&fato, &cfg.coluna_fato)?
            .into_iter()
            .map(|v| v.map(|v| cfg.normalizacao.aplicar(&v)))
            .collect();
        fato.with_column(Column::new(aux.as_str().into(), chaves))?;
        auxiliares.push(aux.clone());

        // 2. Chave normalizada na dimensão, se faltar
        let mut dim = dim.clone();
        if !storage::tem_coluna(&dim, &cfg.coluna_normalizada)
            && storage::tem_coluna(&dim, &cfg.coluna_nome)
        {
            let derivada: Vec<Option<String>> = storage::coluna_texto(&dim, &cfg.coluna_nome)?
                .into_iter()
                .map(|v| v.map(|v| cfg.normalizacao.aplicar(&v)))
                .collect();
            dim.with_column(Column::new(cfg.coluna_normalizada.as_str().into(), derivada))?;
        }

        // 3. Join
        let resultado = safe_merge_left(
            &fato,
            &dim,
            &cfg.nome,
            &aux,
            &cfg.coluna_normalizada,
            &cfg.coluna_id,
            &cfg.colunas_repasse,
            &[cfg.coluna_fato.as_str()],
        )?;

        for (de, para) in &resultado.renomeadas {
            info!(dimensao = %cfg.nome, de = %de, para = %para, "Coluna renomeada para evitar colisão");
        }

        let qtd = resultado.nao_casados.height();
        if qtd > 0 {
            warn!(dimensao = %cfg.nome, chaves = qtd, "Chaves sem correspondência na dimensão");
        }

        // No relatório, a chave auxiliar ganha o nome da coluna do fato
        let mut tabela = resultado.nao_casados;
        tabela.rename(&aux, format!("{}_normalizado", cfg.coluna_fato).into())?;

        fato = resultado.fato;
        relatorios.push(RelatorioNaoCasados {
            dimensao: cfg.nome.clone(),
            arquivo: cfg.relatorio_nao_casados.clone(),
            tabela,
        });
    }

    // 4. Remove colunas auxiliares
    for aux in &auxiliares {
        if storage::tem_coluna(&fato, aux) {
            fato = fato.drop(aux)?;
        }
    }

    Ok(Enriquecimento { fato, relatorios })
}

/// Caminhos gravados por [`executar_enriquecimento`].
#[derive(Debug, Clone)]
pub struct ResumoEnriquecimento {
    pub linhas: usize,
    pub parquet: PathBuf,
    pub csv: PathBuf,
    pub relatorios: Vec<PathBuf>,
}

/// Localiza `<arquivo>.parquet` ou, na falta, `<arquivo>.csv`.
fn localizar_dimensao(cfg: &Config, dim: &DimensionConfig) -> Option<PathBuf> {
    ["parquet", "csv"]
        .iter()
        .map(|ext| cfg.caminhos.dimensoes.join(format!("{}.{}", dim.arquivo, ext)))
        .find(|p| p.exists())
}

/// Etapa completa: lê o fato consolidado e as dimensões disponíveis, grava o
/// fato enriquecido (Parquet + CSV) e os relatórios de não-casados.
pub fn executar_enriquecimento(cfg: &Config) -> Result<ResumoEnriquecimento, EtlError> {
    let timer = Instant::now();
    std::fs::create_dir_all(&cfg.caminhos.processed)?;

    // 1. Fato
    let fato_path = cfg.caminho_fato_completo();
    let fato = storage::carregar_tabela(&fato_path)?;
    info!(linhas = fato.height(), path = %fato_path.display(), "Fato carregado");

    // 2. Dimensões disponíveis
    let mut dimensoes = Vec::new();
    for dim_cfg in cfg.dimensoes.todas() {
        match localizar_dimensao(cfg, dim_cfg) {
            Some(path) => dimensoes.push((dim_cfg, storage::carregar_tabela(&path)?)),
            None => warn!(dimensao = %dim_cfg.nome, dir = %cfg.caminhos.dimensoes.display(), "Dimensão não encontrada; ignorada"),
        }
    }

    // 3. Joins
    let Enriquecimento {
        mut fato,
        relatorios,
    } = enriquecer_fato(fato, &dimensoes)?;

    // 4. Saída
    let parquet = cfg
        .caminhos
        .processed
        .join(format!("{}.parquet", cfg.fato.arquivo_enriquecido));
    let csv = cfg
        .caminhos
        .processed
        .join(format!("{}.csv", cfg.fato.arquivo_enriquecido));
    storage::gravar_parquet(&mut fato, &parquet)?;
    storage::gravar_csv_bom(&mut fato, &csv)?;

    let mut caminhos_relatorios = Vec::new();
    for mut rel in relatorios {
        let path = cfg.caminhos.processed.join(&rel.arquivo);
        storage::gravar_csv_bom(&mut rel.tabela, &path)?;
        caminhos_relatorios.push(path);
    }

    info!(
        linhas = fato.height(),
        parquet = %parquet.display(),
        relatorios = caminhos_relatorios.len(),
        elapsed = ?timer.elapsed(),
        "Fato enriquecido salvo"
    );

    Ok(ResumoEnriquecimento {
        linhas: fato.height(),
        parquet,
        csv,
        relatorios: caminhos_relatorios,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{construir_dimensao, origem_de_lista, para_dataframe};
    use crate::models::MetodoChave;

    fn dim_centros() -> DataFrame {
        let cfg = DimensionConfig::centro_distribuicao();
        let dim = construir_dimensao(
            &origem_de_lista(&cfg.valores_padrao),
            &cfg,
            MetodoChave::Sequencial,
            None,
        )
        .unwrap();
        para_dataframe(&dim.registros, &cfg).unwrap()
    }

    #[test]
    fn nao_casado_fica_no_fato_e_aparece_uma_vez() {
        let cfg = DimensionConfig::centro_distribuicao();
        let fato = df!(
            "cod_pedido" => [1, 2, 3, 4],
            "centro_distribuicao" => ["Gold Beach ", "Centro Novo", "Centro Novo", "Tree True"]
        )
        .unwrap();

        let dims = [(&cfg, dim_centros())];
        let out = enriquecer_fato(fato, &dims).unwrap();

        assert_eq!(out.fato.height(), 4);
        let ids = out.fato.column("centro_id").unwrap().str().unwrap().clone();
        assert_eq!(ids.get(0), Some("CDS001"));
        assert_eq!(ids.get(1), None);
        assert_eq!(ids.get(2), None);
        assert_eq!(ids.get(3), Some("CDS005"));

        let rel = &out.relatorios[0];
        assert_eq!(rel.arquivo, "nao_casados_cds.csv");
        assert_eq!(rel.tabela.height(), 1);
        assert!(out.fato.column("__centro_norm").is_err());
        assert!(rel.tabela.column("centro_distribuicao_normalizado").is_ok());
    }

    #[test]
    fn coluna_repassada_que_colide_ganha_sufixo() {
        let fato = df!(
            "chave" => ["pix", "boleto"],
            "forma_pagamento" => ["original-1", "original-2"]
        )
        .unwrap();
        let dim = df!(
            "forma_pagamento_normalizado" => ["pix", "boleto"],
            "formapagto_id" => ["FRM001", "FRM002"],
            "forma_pagamento" => ["Pix", "Boleto"]
        )
        .unwrap();

        let out = safe_merge_left(
            &fato,
            &dim,
            "formapagto",
            "chave",
            "forma_pagamento_normalizado",
            "formapagto_id",
            &["formapagto_id".to_string(), "forma_pagamento".to_string()],
            &[],
        )
        .unwrap();

        let original = out.fato.column("forma_pagamento").unwrap().str().unwrap().clone();
        let da_dim = out.fato.column("forma_pagamento_dim").unwrap().str().unwrap().clone();
        assert_eq!(original.get(0), Some("original-1"));
        assert_eq!(da_dim.get(1), Some("Boleto"));
        assert_eq!(
            out.renomeadas,
            vec![("forma_pagamento".to_string(), "forma_pagamento_dim".to_string())]
        );
        assert!(out.fato.column("forma_pagamento_normalizado").is_err());
    }

    #[test]
    fn reenriquecimento_informa_colunas_substituidas() {
        let fato = df!(
            "chave" => ["pix", "boleto"],
            "forma_pagamento" => ["original-1", "original-2"],
            "formapagto_id" => ["VELHO1", "VELHO2"],
            "forma_pagamento_dim" => ["velho", "velho"]
        )
        .unwrap();
        let dim = df!(
            "forma_pagamento_normalizado" => ["pix", "boleto"],
            "formapagto_id" => ["FRM001", "FRM002"],
            "forma_pagamento" => ["Pix", "Boleto"]
        )
        .unwrap();

        let out = safe_merge_left(
            &fato,
            &dim,
            "formapagto",
            "chave",
            "forma_pagamento_normalizado",
            "formapagto_id",
            &["formapagto_id".to_string(), "forma_pagamento".to_string()],
            &[],
        )
        .unwrap();

        assert_eq!(
            out.substituidas,
            vec!["formapagto_id".to_string(), "forma_pagamento_dim".to_string()]
        );
        let ids = out.fato.column("formapagto_id").unwrap().str().unwrap().clone();
        let da_dim = out.fato.column("forma_pagamento_dim").unwrap().str().unwrap().clone();
        assert_eq!(ids.get(0), Some("FRM001"));
        assert_eq!(da_dim.get(1), Some("Boleto"));
        assert_eq!(out.fato.width(), 4);
    }

    #[test]
    fn coluna_de_juncao_ausente_e_erro_de_lookup() {
        let fato = df!("chave" => ["a"]).unwrap();
        let dim = df!("outra" => ["a"], "x_id" => ["X001"]).unwrap();

        let err = safe_merge_left(&fato, &dim, "x", "chave", "chave_norm", "x_id", &[], &[])
            .unwrap_err();
        assert!(matches!(err, EtlError::ColunaNaoEncontrada { coluna, .. } if coluna == "chave_norm"));
    }

    #[test]
    fn chave_duplicada_na_dimensao_e_fatal() {
        let fato = df!("chave" => ["a", "b"]).unwrap();
        let dim = df!("chave_norm" => ["a", "a"], "x_id" => ["X001", "X002"]).unwrap();

        let err = safe_merge_left(&fato, &dim, "x", "chave", "chave_norm", "x_id", &[], &[])
            .unwrap_err();
        assert!(matches!(err, EtlError::ContagemDivergente { antes: 2, depois: 3, .. }));
    }

    #[test]
    fn ordem_das_linhas_e_preservada() {
        let fato = df!("chave" => ["c", "a", "zz", "b", "a"]).unwrap();
        let dim = df!("chave_norm" => ["a", "b", "c"], "x_id" => ["X1", "X2", "X3"]).unwrap();

        let out = safe_merge_left(&fato, &dim, "x", "chave", "chave_norm", "x_id", &[], &[]).unwrap();
        let chaves = out.fato.column("chave").unwrap().str().unwrap().clone();
        let ids = out.fato.column("x_id").unwrap().str().unwrap().clone();

        let pares: Vec<(Option<&str>, Option<&str>)> = chaves.iter().zip(ids.iter()).collect();
        assert_eq!(
            pares,
            vec![
                (Some("c"), Some("X3")),
                (Some("a"), Some("X1")),
                (Some("zz"), None),
                (Some("b"), Some("X2")),
                (Some("a"), Some("X1")),
            ]
        );
    }
}
