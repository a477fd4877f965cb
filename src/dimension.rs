//! # Construtor de Dimensões
//!
//! ## Visão Geral
//! Deduplica valores de origem pela chave natural normalizada, atribui ids
//! substitutos (sequenciais ou hash) e preserva os ids de uma dimensão
//! anterior, para que painéis de BI que referenciam ids antigos continuem
//! válidos entre execuções.
//!
//! ## Garantias
//! - Uma linha por chave natural distinta.
//! - Ids únicos; ids preservados nunca mudam.
//! - Saída ordenada por chave normalizada e depois por id.
//! - `ativo = true` em todas as linhas.

use md5::{Digest, Md5};
use polars::prelude::*;
use tracing::{info, warn};

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use crate::categorizer::{SEM_CATEGORIA, classificar_categoria};
use crate::errors::EtlError;
use crate::models::{Config, DimensionConfig, MetodoChave};
use crate::storage;

/// Nome da coluna de categoria na dimensão de produto.
pub const COLUNA_CATEGORIA: &str = "categoria";
pub const COLUNA_ATIVO: &str = "ativo";

/// Valor bruto vindo da base ou da lista de origem.
#[derive(Debug, Clone, PartialEq)]
pub struct ValorOrigem {
    pub nome: String,
    pub categoria: Option<String>,
}

impl ValorOrigem {
    pub fn new(nome: impl Into<String>) -> Self {
        Self {
            nome: nome.into(),
            categoria: None,
        }
    }

    pub fn com_categoria(nome: impl Into<String>, categoria: Option<String>) -> Self {
        Self {
            nome: nome.into(),
            categoria,
        }
    }
}

/// Linha da dimensão.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistroDimensao {
    pub id: String,
    /// Texto original (primeira ocorrência).
    pub nome: String,
    /// Chave natural normalizada.
    pub chave: String,
    pub categoria: Option<String>,
    pub ativo: bool,
}

/// Resultado da construção, com contadores para o log.
#[derive(Debug, Clone)]
pub struct DimensaoConstruida {
    pub registros: Vec<RegistroDimensao>,
    pub novos: usize,
    pub preservados: usize,
}

impl DimensaoConstruida {
    /// Linhas com categoria pendente de revisão.
    pub fn pendentes_categoria(&self) -> Vec<&RegistroDimensao> {
        self.registros
            .iter()
            .filter(|r| r.categoria.as_deref().unwrap_or(SEM_CATEGORIA) == SEM_CATEGORIA)
            .collect()
    }
}

struct Entrada {
    nome: String,
    chave: String,
    categoria: Option<String>,
}

/// Constrói a dimensão a partir dos valores de origem.
///
/// # Arguments
///
/// * `origem` - Valores brutos, na ordem em que aparecem na base.
/// * `cfg` - Prefixo, normalização e se a dimensão é categorizada.
/// * `metodo` - Estratégia para os ids que ainda não existem.
/// * `existente` - Dimensão da execução anterior; ids de chaves já vistas são mantidos.
///
/// # Errors
///
/// Retorna `EtlError::ColisaoChave` se um mesmo id acabar associado a duas
/// chaves naturais distintas.
pub fn construir_dimensao(
    origem: &[ValorOrigem],
    cfg: &DimensionConfig,
    metodo: MetodoChave,
    existente: Option<&[RegistroDimensao]>,
) -> Result<DimensaoConstruida, EtlError> {
    // 1. Deduplicação pela chave natural (nome: primeira ocorrência; categoria: última informada)
    let mut entradas: Vec<Entrada> = Vec::new();
    let mut posicao: HashMap<String, usize> = HashMap::new();

    for valor in origem {
        let chave = cfg.normalizacao.aplicar(&valor.nome);
        if chave.is_empty() {
            continue;
        }

        let categoria = valor
            .categoria
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        match posicao.entry(chave.clone()) {
            Entry::Occupied(e) => {
                if categoria.is_some() {
                    entradas[*e.get()].categoria = categoria;
                }
            }
            Entry::Vacant(e) => {
                e.insert(entradas.len());
                entradas.push(Entrada {
                    nome: valor.nome.clone(),
                    chave,
                    categoria,
                });
            }
        }
    }

    // 2. Ids já atribuídos em execuções anteriores
    let anteriores: HashMap<&str, &str> = existente
        .unwrap_or_default()
        .iter()
        .map(|r| (r.chave.as_str(), r.id.as_str()))
        .rev()
        .collect();

    let mut proximo = match metodo {
        MetodoChave::Sequencial => proximo_sequencial(&cfg.prefixo, existente.unwrap_or_default()),
        MetodoChave::Hash => 0,
    };

    // 3. Atribuição de ids
    let mut dono_do_id: HashMap<String, String> = HashMap::new();
    let mut registros = Vec::with_capacity(entradas.len());
    let mut novos = 0;
    let mut preservados = 0;

    for entrada in entradas {
        let id = match anteriores.get(entrada.chave.as_str()) {
            Some(id) => {
                preservados += 1;
                (*id).to_string()
            }
            None => {
                novos += 1;
                match metodo {
                    MetodoChave::Sequencial => {
                        let id = id_sequencial(&cfg.prefixo, proximo);
                        proximo += 1;
                        id
                    }
                    MetodoChave::Hash => id_hash(&cfg.prefixo, &entrada.chave),
                }
            }
        };

        if let Some(outra) = dono_do_id.insert(id.clone(), entrada.chave.clone())
            && outra != entrada.chave
        {
            return Err(EtlError::ColisaoChave {
                id,
                chaves: (outra, entrada.chave),
            });
        }

        let categoria = if cfg.categorizar {
            Some(
                entrada
                    .categoria
                    .unwrap_or_else(|| classificar_categoria(&entrada.nome)),
            )
        } else {
            None
        };

        registros.push(RegistroDimensao {
            id,
            nome: entrada.nome,
            chave: entrada.chave,
            categoria,
            ativo: true,
        });
    }

    // 4. Ordenação final previsível
    registros.sort_by(|a, b| a.chave.cmp(&b.chave).then_with(|| a.id.cmp(&b.id)));

    Ok(DimensaoConstruida {
        registros,
        novos,
        preservados,
    })
}

/// `max(sufixo numérico dos ids existentes com o prefixo) + 1`, ou 1.
pub fn proximo_sequencial(prefixo: &str, existente: &[RegistroDimensao]) -> u64 {
    existente
        .iter()
        .filter_map(|r| r.id.strip_prefix(prefixo))
        .filter(|sufixo| !sufixo.is_empty() && sufixo.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|sufixo| sufixo.parse::<u64>().ok())
        .max()
        .map_or(1, |max| max + 1)
}

pub fn id_sequencial(prefixo: &str, numero: u64) -> String {
    format!("{}{:03}", prefixo, numero)
}

/// Prefixo + 8 primeiros dígitos hexadecimais (maiúsculos) do MD5 da chave.
pub fn id_hash(prefixo: &str, chave: &str) -> String {
    let digest = Md5::digest(chave.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02X}", b)).collect();
    format!("{}{}", prefixo, &hex[..8])
}

/* ========================================================================== */
/* Conversões DataFrame                                                       */
/* ========================================================================== */

/// Valores de origem a partir de uma base tratada.
///
/// A coluna de categoria só é usada se existir na base.
pub fn origem_de_dataframe(
    df: &DataFrame,
    coluna_nome: &str,
    coluna_categoria: Option<&str>,
) -> Result<Vec<ValorOrigem>, EtlError> {
    storage::exigir_coluna(df, coluna_nome, "base de origem")?;
    let nomes = storage::coluna_texto(df, coluna_nome)?;

    let categorias = match coluna_categoria {
        Some(coluna) if storage::tem_coluna(df, coluna) => Some(storage::coluna_texto(df, coluna)?),
        Some(coluna) => {
            warn!(coluna, "Coluna de categoria ausente na base; aplicando regras");
            None
        }
        None => None,
    };

    let valores = nomes
        .into_iter()
        .enumerate()
        .filter_map(|(i, nome)| {
            let categoria = categorias.as_ref().and_then(|c| c[i].clone());
            nome.map(|n| ValorOrigem::com_categoria(n, categoria))
        })
        .collect();

    Ok(valores)
}

pub fn origem_de_lista(valores: &[String]) -> Vec<ValorOrigem> {
    valores.iter().map(ValorOrigem::new).collect()
}

/// Lê uma dimensão gravada anteriormente.
///
/// Sem a coluna de id, a dimensão é ignorada (nada a preservar). Sem a
/// coluna normalizada, a chave é recalculada a partir da coluna de nome.
pub fn registros_de_dataframe(
    df: &DataFrame,
    cfg: &DimensionConfig,
) -> Result<Vec<RegistroDimensao>, EtlError> {
    if !storage::tem_coluna(df, &cfg.coluna_id) {
        warn!(dimensao = %cfg.nome, coluna = %cfg.coluna_id, "Dimensão existente sem coluna de id; ids não serão preservados");
        return Ok(Vec::new());
    }

    let ids = storage::coluna_texto(df, &cfg.coluna_id)?;
    let nomes = if storage::tem_coluna(df, &cfg.coluna_nome) {
        storage::coluna_texto(df, &cfg.coluna_nome)?
    } else {
        vec![None; df.height()]
    };

    let chaves: Vec<Option<String>> = if storage::tem_coluna(df, &cfg.coluna_normalizada) {
        storage::coluna_texto(df, &cfg.coluna_normalizada)?
    } else {
        storage::exigir_coluna(df, &cfg.coluna_nome, "dimensão existente")?;
        nomes
            .iter()
            .map(|n| n.as_deref().map(|n| cfg.normalizacao.aplicar(n)))
            .collect()
    };

    let categorias = if storage::tem_coluna(df, COLUNA_CATEGORIA) {
        storage::coluna_texto(df, COLUNA_CATEGORIA)?
    } else {
        vec![None; df.height()]
    };

    let registros = ids
        .into_iter()
        .zip(chaves)
        .zip(nomes.into_iter().zip(categorias))
        .filter_map(|((id, chave), (nome, categoria))| {
            let (id, chave) = (id?, chave?);
            Some(RegistroDimensao {
                nome: nome.unwrap_or_else(|| chave.clone()),
                id,
                chave,
                categoria,
                ativo: true,
            })
        })
        .collect();

    Ok(registros)
}

/// Monta o DataFrame na ordem de colunas da dimensão.
pub fn para_dataframe(
    registros: &[RegistroDimensao],
    cfg: &DimensionConfig,
) -> Result<DataFrame, EtlError> {
    let ids: Vec<&str> = registros.iter().map(|r| r.id.as_str()).collect();
    let nomes: Vec<&str> = registros.iter().map(|r| r.nome.as_str()).collect();
    let chaves: Vec<&str> = registros.iter().map(|r| r.chave.as_str()).collect();
    let ativos: Vec<bool> = registros.iter().map(|r| r.ativo).collect();

    let mut colunas = vec![
        Column::new(cfg.coluna_id.as_str().into(), ids),
        Column::new(cfg.coluna_nome.as_str().into(), nomes),
        Column::new(cfg.coluna_normalizada.as_str().into(), chaves),
    ];

    if cfg.categorizar {
        let categorias: Vec<Option<&str>> =
            registros.iter().map(|r| r.categoria.as_deref()).collect();
        colunas.push(Column::new(COLUNA_CATEGORIA.into(), categorias));
    }

    colunas.push(Column::new(COLUNA_ATIVO.into(), ativos));

    Ok(DataFrame::new(colunas)?)
}

/* ========================================================================== */
/* Execução                                                                   */
/* ========================================================================== */

/// Parâmetros de uma execução do construtor (equivalentes às flags da CLI).
#[derive(Debug, Clone)]
pub struct ParametrosDimensao {
    /// Base tratada (Parquet/CSV). Sem ela, usa `valores_padrao` da config.
    pub input: Option<PathBuf>,
    /// Coluna com o nome na base; padrão: `coluna_fato` da dimensão.
    pub col_nome: Option<String>,
    /// Coluna de categoria; padrão: `coluna_categoria_origem` da dimensão.
    pub col_categoria: Option<String>,
    /// Dimensão anterior para preservar ids.
    pub existing_dim: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub metodo: MetodoChave,
}

/// Caminhos gravados por [`executar_dimensao`].
#[derive(Debug, Clone)]
pub struct ResumoDimensao {
    pub linhas: usize,
    pub novos: usize,
    pub preservados: usize,
    pub pendentes: usize,
    pub parquet: PathBuf,
    pub csv: PathBuf,
    pub relatorio_pendentes: Option<PathBuf>,
}

/// Carrega a origem, constrói a dimensão e grava Parquet + CSV (e, para
/// dimensões categorizadas, o relatório `<arquivo>_sem_categoria.csv`).
pub fn executar_dimensao(
    cfg: &DimensionConfig,
    params: &ParametrosDimensao,
) -> Result<ResumoDimensao, EtlError> {
    std::fs::create_dir_all(&params.out_dir)?;

    // 1. Origem
    let origem = match &params.input {
        Some(input) => {
            let df = storage::carregar_tabela(input)?;
            let col_nome = params.col_nome.as_deref().unwrap_or(&cfg.coluna_fato);
            let col_categoria = if cfg.categorizar {
                params
                    .col_categoria
                    .as_deref()
                    .or(cfg.coluna_categoria_origem.as_deref())
            } else {
                None
            };
            origem_de_dataframe(&df, col_nome, col_categoria)?
        }
        None if !cfg.valores_padrao.is_empty() => origem_de_lista(&cfg.valores_padrao),
        None => {
            return Err(EtlError::Config(format!(
                "Dimensão '{}' sem base de entrada e sem valores_padrao",
                cfg.nome
            )));
        }
    };

    // 2. Dimensão anterior
    let existente = match &params.existing_dim {
        Some(path) => Some(registros_de_dataframe(&storage::carregar_tabela(path)?, cfg)?),
        None => None,
    };

    // 3. Construção
    let dim = construir_dimensao(&origem, cfg, params.metodo, existente.as_deref())?;
    let mut df = para_dataframe(&dim.registros, cfg)?;

    // 4. Persistência
    let parquet = params.out_dir.join(format!("{}.parquet", cfg.arquivo));
    let csv = params.out_dir.join(format!("{}.csv", cfg.arquivo));
    storage::gravar_parquet(&mut df, &parquet)?;
    storage::gravar_csv_bom(&mut df, &csv)?;

    info!(
        dimensao = %cfg.nome,
        linhas = dim.registros.len(),
        novos = dim.novos,
        preservados = dim.preservados,
        parquet = %parquet.display(),
        "Dimensão salva"
    );

    // 5. Relatório de pendências de categoria
    let mut pendentes = 0;
    let mut relatorio_pendentes = None;
    if cfg.categorizar {
        let lista: Vec<RegistroDimensao> =
            dim.pendentes_categoria().into_iter().cloned().collect();
        pendentes = lista.len();

        let path = params.out_dir.join(format!("{}_sem_categoria.csv", cfg.arquivo));
        gravar_pendentes(&lista, cfg, &path)?;

        if pendentes > 0 {
            warn!(dimensao = %cfg.nome, pendentes, relatorio = %path.display(), "Itens sem categoria; revisar relatório");
        } else {
            info!(dimensao = %cfg.nome, "Todos os itens possuem categoria");
        }
        relatorio_pendentes = Some(path);
    }

    Ok(ResumoDimensao {
        linhas: dim.registros.len(),
        novos: dim.novos,
        preservados: dim.preservados,
        pendentes,
        parquet,
        csv,
        relatorio_pendentes,
    })
}

/// Reconstrói as quatro dimensões da configuração.
///
/// Produto vem do fato consolidado; as demais, das listas `valores_padrao`.
/// Se a dimensão já existir no diretório de saída, seus ids são preservados.
pub fn executar_todas(cfg: &Config, metodo: MetodoChave) -> Result<Vec<ResumoDimensao>, EtlError> {
    let mut resumos = Vec::new();

    for dim in cfg.dimensoes.todas() {
        let anterior = cfg.caminhos.dimensoes.join(format!("{}.parquet", dim.arquivo));
        let input = if dim.valores_padrao.is_empty() {
            Some(cfg.caminho_fato_completo())
        } else {
            None
        };

        let params = ParametrosDimensao {
            input,
            col_nome: None,
            col_categoria: None,
            existing_dim: anterior.exists().then_some(anterior),
            out_dir: cfg.caminhos.dimensoes.clone(),
            metodo,
        };
        resumos.push(executar_dimensao(dim, &params)?);
    }

    Ok(resumos)
}

fn gravar_pendentes(
    pendentes: &[RegistroDimensao],
    cfg: &DimensionConfig,
    path: &Path,
) -> Result<(), EtlError> {
    let mut df = para_dataframe(pendentes, cfg)?;
    storage::gravar_csv_bom(&mut df, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formas(valores: &[&str]) -> Vec<ValorOrigem> {
        valores.iter().map(|v| ValorOrigem::new(*v)).collect()
    }

    #[test]
    fn pix_com_espaco_deduplica() {
        let cfg = DimensionConfig::forma_pagamento();
        let dim = construir_dimensao(
            &formas(&["Pix", "Pix ", "Dinheiro"]),
            &cfg,
            MetodoChave::Sequencial,
            None,
        )
        .unwrap();

        // Saída ordenada pela chave: Dinheiro antes de Pix
        let pares: Vec<(&str, &str)> = dim
            .registros
            .iter()
            .map(|r| (r.id.as_str(), r.nome.as_str()))
            .collect();
        assert_eq!(pares, vec![("FRM002", "Dinheiro"), ("FRM001", "Pix")]);
        assert!(dim.registros.iter().all(|r| r.ativo));
    }

    #[test]
    fn trim_nao_ignora_caixa() {
        let cfg = DimensionConfig::forma_pagamento();
        let dim =
            construir_dimensao(&formas(&["Pix", "PIX"]), &cfg, MetodoChave::Sequencial, None)
                .unwrap();
        assert_eq!(dim.registros.len(), 2);
    }

    #[test]
    fn sequenciais_sem_lacunas() {
        let cfg = DimensionConfig::responsavel_pedido();
        let origem = origem_de_lista(&cfg.valores_padrao);
        let dim = construir_dimensao(&origem, &cfg, MetodoChave::Sequencial, None).unwrap();

        let mut ids: Vec<&str> = dim.registros.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        let esperados: Vec<String> = (1..=25).map(|i| id_sequencial("VEND", i)).collect();
        assert_eq!(ids, esperados.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn preserva_ids_e_continua_do_maximo() {
        let cfg = DimensionConfig::produto();
        let existente = vec![
            RegistroDimensao {
                id: "PROD007".to_string(),
                nome: "Bola de Tênis".to_string(),
                chave: "bola de tenis".to_string(),
                categoria: Some("Brinquedo".to_string()),
                ativo: true,
            },
            RegistroDimensao {
                id: "PROD003".to_string(),
                nome: "Coleira".to_string(),
                chave: "coleira".to_string(),
                categoria: None,
                ativo: true,
            },
        ];

        let dim = construir_dimensao(
            &formas(&["Ração Filhote", "BOLA DE TÊNIS", "Shampoo Neutro"]),
            &cfg,
            MetodoChave::Sequencial,
            Some(&existente),
        )
        .unwrap();

        let por_chave: HashMap<&str, &str> = dim
            .registros
            .iter()
            .map(|r| (r.chave.as_str(), r.id.as_str()))
            .collect();

        assert_eq!(por_chave["bola de tenis"], "PROD007");
        assert_eq!(por_chave["racao filhote"], "PROD008");
        assert_eq!(por_chave["shampoo neutro"], "PROD009");
        assert_eq!(dim.preservados, 1);
        assert_eq!(dim.novos, 2);
    }

    #[test]
    fn hash_deterministico_com_prefixo() {
        assert_eq!(id_hash("PROD", "abc"), "PROD90015098");

        let cfg = DimensionConfig::produto();
        let dim = construir_dimensao(&formas(&["ABC"]), &cfg, MetodoChave::Hash, None).unwrap();
        assert_eq!(dim.registros[0].id, "PROD90015098");
    }

    #[test]
    fn colisao_de_id_e_fatal() {
        let cfg = DimensionConfig::produto();
        let existente = vec![RegistroDimensao {
            id: id_hash("PROD", "bola"),
            nome: "Antiga".to_string(),
            chave: "antiga".to_string(),
            categoria: None,
            ativo: true,
        }];

        let err = construir_dimensao(&formas(&["Antiga", "Bola"]), &cfg, MetodoChave::Hash, Some(&existente))
            .unwrap_err();
        assert!(matches!(err, EtlError::ColisaoChave { .. }));
    }

    #[test]
    fn categoria_da_origem_ultima_vence_senao_regras() {
        let cfg = DimensionConfig::produto();
        let origem = vec![
            ValorOrigem::com_categoria("Bravecto 20kg", Some("Antiga".to_string())),
            ValorOrigem::com_categoria("bravecto  20KG", Some("Medicamento Controlado".to_string())),
            ValorOrigem::com_categoria("Bravecto 40kg", None),
            ValorOrigem::com_categoria("Item Misterioso", Some("  ".to_string())),
        ];
        let dim = construir_dimensao(&origem, &cfg, MetodoChave::Sequencial, None).unwrap();

        let cat = |chave: &str| {
            dim.registros
                .iter()
                .find(|r| r.chave == chave)
                .and_then(|r| r.categoria.clone())
                .unwrap()
        };
        assert_eq!(cat("bravecto 20kg"), "Medicamento Controlado");
        assert_eq!(cat("bravecto 40kg"), "Medicamento");
        assert_eq!(cat("item misterioso"), SEM_CATEGORIA);
        assert_eq!(dim.pendentes_categoria().len(), 1);
    }

    #[test]
    fn nomes_vazios_sao_descartados() {
        let cfg = DimensionConfig::centro_distribuicao();
        let dim = construir_dimensao(&formas(&["", "   ", "Gold Beach"]), &cfg, MetodoChave::Sequencial, None)
            .unwrap();
        assert_eq!(dim.registros.len(), 1);
        assert_eq!(dim.registros[0].id, "CDS001");
    }

    #[test]
    fn proximo_ignora_ids_de_outro_formato() {
        let existente = vec![RegistroDimensao {
            id: "PROD9A3F01BC".to_string(),
            nome: "x".to_string(),
            chave: "x".to_string(),
            categoria: None,
            ativo: true,
        }];
        assert_eq!(proximo_sequencial("PROD", &existente), 1);
    }

    #[test]
    fn dimensao_existente_em_csv_preserva_nome_numerico() {
        let dir = tempfile::tempdir().unwrap();
        let anterior = dir.path().join("dim_centro_distribuicao.csv");
        std::fs::write(
            &anterior,
            "centro_id,centro_distribuicao,centro_distribuicao_normalizado,ativo\nCDS005,007,007,true\n",
        )
        .unwrap();

        let mut cfg = DimensionConfig::centro_distribuicao();
        cfg.valores_padrao = vec!["007".to_string(), "Gold Beach".to_string()];
        let params = ParametrosDimensao {
            input: None,
            col_nome: None,
            col_categoria: None,
            existing_dim: Some(anterior),
            out_dir: dir.path().join("saida"),
            metodo: MetodoChave::Sequencial,
        };

        let resumo = executar_dimensao(&cfg, &params).unwrap();
        assert_eq!(resumo.preservados, 1);
        assert_eq!(resumo.novos, 1);

        let df = storage::carregar_tabela(&resumo.parquet).unwrap();
        let registros = registros_de_dataframe(&df, &cfg).unwrap();
        let por_chave: HashMap<&str, &str> = registros
            .iter()
            .map(|r| (r.chave.as_str(), r.id.as_str()))
            .collect();
        assert_eq!(por_chave["007"], "CDS005");
        assert_eq!(por_chave["Gold Beach"], "CDS006");
    }

    #[test]
    fn dataframe_tem_colunas_da_dimensao() {
        let cfg = DimensionConfig::produto();
        let dim = construir_dimensao(&formas(&["Bola"]), &cfg, MetodoChave::Sequencial, None).unwrap();
        let df = para_dataframe(&dim.registros, &cfg).unwrap();

        let nomes: Vec<String> = df.get_column_names().iter().map(|c| c.to_string()).collect();
        assert_eq!(
            nomes,
            vec!["produto_id", "produto_nome", "produto_nome_normalizado", "categoria", "ativo"]
        );

        let relidos = registros_de_dataframe(&df, &cfg).unwrap();
        assert_eq!(relidos[0].id, "PROD001");
        assert_eq!(relidos[0].chave, "bola");
    }
}
