//! Modelos de Configuração do Pipeline
//!
//! ## Visão Geral
//! Toda localização de arquivo e todo nome de coluna usado pelas etapas vem
//! daqui e é passado explicitamente para cada transformação. Cada dimensão
//! tem sua própria [`DimensionConfig`] tipada, com as colunas de origem e de
//! destino declaradas.
//!
//! ## Boas Práticas
//! - **Encapsulamento**: Validações de integridade ocorrem no momento da carga.
//! - **Defaults**: Um TOML parcial é completado com os valores padrão.

use crate::errors::EtlError;
use crate::normalizer::Normalizacao;
use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Estratégia de geração do identificador substituto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetodoChave {
    /// Prefixo + número sequencial com três dígitos (`PROD001`).
    #[default]
    Sequencial,
    /// Prefixo + 8 primeiros dígitos hexadecimais do MD5 da chave natural.
    Hash,
}

/// Configuração raiz, carregada de `vendas_etl.toml`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub caminhos: Caminhos,
    pub preparacao: Preparacao,
    pub dimensoes: Dimensoes,
    pub fato: FatoConfig,
}

/// Diretórios e arquivos de entrada/saída.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Caminhos {
    /// CSV bruto exportado do sistema de vendas.
    pub raw: PathBuf,
    /// Partições Parquet e fato consolidado/enriquecido.
    pub processed: PathBuf,
    pub dimensoes: PathBuf,
    /// Relatórios de KPI e sanidade.
    pub exports: PathBuf,
    /// Amostra `vendas_sample.{csv,parquet}` para exploração rápida.
    pub sample: PathBuf,
}

impl Default for Caminhos {
    fn default() -> Self {
        Self {
            raw: PathBuf::from("data/raw/vendas.csv"),
            processed: PathBuf::from("data/processed"),
            dimensoes: PathBuf::from("data/dimensoes"),
            exports: PathBuf::from("data/exports"),
            sample: PathBuf::from("data/sample"),
        }
    }
}

/// Codificação do CSV bruto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Latin1,
    Utf8,
}

/// Parâmetros da leitura em blocos do CSV bruto.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Preparacao {
    pub chunk_size: usize,
    pub encoding: Encoding,
    /// Colunas convertidas com `parse_numero`.
    pub colunas_numericas: Vec<String>,
    pub coluna_data: String,
    pub coluna_valor_total: String,
    pub coluna_valor: String,
    pub coluna_quantidade: String,
    /// Linhas sorteadas de cada bloco para a amostra; 0 desliga.
    pub amostra_por_bloco: usize,
}

impl Default for Preparacao {
    fn default() -> Self {
        Self {
            chunk_size: 500_000,
            encoding: Encoding::Latin1,
            colunas_numericas: vec![
                "valor_total_bruto".to_string(),
                "valor".to_string(),
                "quantidade".to_string(),
            ],
            coluna_data: "data".to_string(),
            coluna_valor_total: "valor_total_bruto".to_string(),
            coluna_valor: "valor".to_string(),
            coluna_quantidade: "quantidade".to_string(),
            amostra_por_bloco: 10_000,
        }
    }
}

/// Descrição tipada de uma dimensão: colunas, prefixo e arquivos.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DimensionConfig {
    /// Nome lógico (`produto`, `centro`...), usado em logs e erros.
    pub nome: String,
    /// Prefixo do id substituto (`PROD`, `CDS`, `FRM`, `VEND`).
    pub prefixo: String,
    pub coluna_id: String,
    /// Texto original exibido nos relatórios de BI.
    pub coluna_nome: String,
    /// Chave natural normalizada, usada na junção.
    pub coluna_normalizada: String,
    pub normalizacao: Normalizacao,
    /// Coluna do fato que referencia esta dimensão.
    pub coluna_fato: String,
    /// Colunas da dimensão trazidas para o fato (a de id sempre vem).
    pub colunas_repasse: Vec<String>,
    /// Nome base dos arquivos gerados (`dim_produto` -> `.parquet`/`.csv`).
    pub arquivo: String,
    /// Relatório de linhas do fato sem correspondência.
    pub relatorio_nao_casados: String,
    /// Gera coluna `categoria` (apenas produto).
    #[serde(default)]
    pub categorizar: bool,
    /// Coluna de categoria na base de origem, usada quando existir.
    #[serde(default)]
    pub coluna_categoria_origem: Option<String>,
    /// Lista de origem usada quando nenhuma base é informada.
    #[serde(default)]
    pub valores_padrao: Vec<String>,
}

impl DimensionConfig {
    pub fn produto() -> Self {
        Self {
            nome: "produto".to_string(),
            prefixo: "PROD".to_string(),
            coluna_id: "produto_id".to_string(),
            coluna_nome: "produto_nome".to_string(),
            coluna_normalizada: "produto_nome_normalizado".to_string(),
            normalizacao: Normalizacao::Completa,
            coluna_fato: "produto".to_string(),
            colunas_repasse: vec![
                "produto_id".to_string(),
                "produto_nome".to_string(),
                "categoria".to_string(),
            ],
            arquivo: "dim_produto".to_string(),
            relatorio_nao_casados: "nao_casados_produto.csv".to_string(),
            categorizar: true,
            coluna_categoria_origem: Some("categoriaprod".to_string()),
            valores_padrao: Vec::new(),
        }
    }

    pub fn centro_distribuicao() -> Self {
        Self {
            nome: "centro".to_string(),
            prefixo: "CDS".to_string(),
            coluna_id: "centro_id".to_string(),
            coluna_nome: "centro_distribuicao".to_string(),
            coluna_normalizada: "centro_distribuicao_normalizado".to_string(),
            normalizacao: Normalizacao::Trim,
            coluna_fato: "centro_distribuicao".to_string(),
            colunas_repasse: vec!["centro_id".to_string(), "centro_distribuicao".to_string()],
            arquivo: "dim_centro_distribuicao".to_string(),
            relatorio_nao_casados: "nao_casados_cds.csv".to_string(),
            categorizar: false,
            coluna_categoria_origem: None,
            valores_padrao: lista(&[
                "Gold Beach",
                "Grãos Blue",
                "Papa Léguas",
                "Rapid Pink",
                "Tree True",
            ]),
        }
    }

    pub fn forma_pagamento() -> Self {
        Self {
            nome: "formapagto".to_string(),
            prefixo: "FRM".to_string(),
            coluna_id: "formapagto_id".to_string(),
            coluna_nome: "forma_pagamento".to_string(),
            coluna_normalizada: "forma_pagamento_normalizado".to_string(),
            normalizacao: Normalizacao::Trim,
            coluna_fato: "formapagto".to_string(),
            colunas_repasse: vec!["formapagto_id".to_string(), "forma_pagamento".to_string()],
            arquivo: "dim_formapagto".to_string(),
            relatorio_nao_casados: "nao_casados_formapagto.csv".to_string(),
            categorizar: false,
            coluna_categoria_origem: None,
            valores_padrao: lista(&[
                "Boleto Bancário",
                "Cartão Crédito",
                "Cartão Débito",
                "Dinheiro",
                "Pix",
            ]),
        }
    }

    pub fn responsavel_pedido() -> Self {
        Self {
            nome: "responsavel".to_string(),
            prefixo: "VEND".to_string(),
            coluna_id: "responsavelpedido_id".to_string(),
            coluna_nome: "responsavel_pedido".to_string(),
            coluna_normalizada: "responsavel_pedido_normalizado".to_string(),
            normalizacao: Normalizacao::Trim,
            coluna_fato: "responsavelpedido".to_string(),
            colunas_repasse: vec![
                "responsavelpedido_id".to_string(),
                "responsavel_pedido".to_string(),
            ],
            arquivo: "dim_responsavelpedido".to_string(),
            relatorio_nao_casados: "nao_casados_responsavelpedido.csv".to_string(),
            categorizar: false,
            coluna_categoria_origem: None,
            valores_padrao: lista(&[
                "Adriana",
                "Andressa",
                "Antonio",
                "Beatriz",
                "Carlos",
                "Clarice",
                "Claudio",
                "Cristian",
                "Cristina",
                "Dolores",
                "Julia",
                "Ligia",
                "Lucia",
                "Maria Clara",
                "Maria Linda",
                "Marta",
                "Miriam",
                "Monique",
                "Neide",
                "Silvia",
                "Sonia",
                "Tereza",
                "Vitória",
                "Vivian",
                "Yuri",
            ]),
        }
    }
}

fn lista(valores: &[&str]) -> Vec<String> {
    valores.iter().map(|v| v.to_string()).collect()
}

/// As quatro dimensões do modelo estrela.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Dimensoes {
    pub produto: DimensionConfig,
    pub centro: DimensionConfig,
    pub formapagto: DimensionConfig,
    pub responsavel: DimensionConfig,
}

impl Default for Dimensoes {
    fn default() -> Self {
        Self {
            produto: DimensionConfig::produto(),
            centro: DimensionConfig::centro_distribuicao(),
            formapagto: DimensionConfig::forma_pagamento(),
            responsavel: DimensionConfig::responsavel_pedido(),
        }
    }
}

impl Dimensoes {
    /// Ordem de aplicação no enriquecimento do fato.
    pub fn todas(&self) -> [&DimensionConfig; 4] {
        [&self.produto, &self.centro, &self.formapagto, &self.responsavel]
    }
}

/// Arquivos do fato.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FatoConfig {
    /// Consolidado gerado pela preparação (dentro de `caminhos.processed`).
    pub arquivo_completo: String,
    /// Nome base do fato enriquecido (`.parquet` e `.csv`).
    pub arquivo_enriquecido: String,
    pub coluna_pedido: String,
}

impl Default for FatoConfig {
    fn default() -> Self {
        Self {
            arquivo_completo: "vendas_completo.parquet".to_string(),
            arquivo_enriquecido: "vendas_completo_enriquecido".to_string(),
            coluna_pedido: "cod_pedido".to_string(),
        }
    }
}

impl Config {
    /// Carrega e valida o arquivo de configuração TOML.
    ///
    /// # Erros
    /// Retorna `EtlError::Io` se o arquivo não for encontrado ou
    /// `EtlError::Config` se a estrutura for inválida.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, EtlError> {
        let content = fs::read_to_string(path).map_err(EtlError::Io)?;
        let config: Config = toml::from_str(&content)?;

        config.validate()?;
        Ok(config)
    }

    /// Caminho explícito é obrigatório; sem ele, usa o arquivo padrão se
    /// existir, ou os valores embutidos.
    pub fn resolve(custom_path: Option<&Path>) -> Result<Self, EtlError> {
        match custom_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let padrao = Path::new("vendas_etl.toml");
                if padrao.exists() {
                    Self::load_from_file(padrao)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validação pós-carga (Fail-Fast).
    fn validate(&self) -> Result<(), EtlError> {
        if self.preparacao.chunk_size == 0 {
            return Err(EtlError::Config("chunk_size deve ser maior que zero".to_string()));
        }

        for dim in self.dimensoes.todas() {
            if dim.prefixo.is_empty() {
                return Err(EtlError::Config(format!("'{}' sem prefixo", dim.nome)));
            }
            if dim.coluna_id == dim.coluna_normalizada || dim.coluna_nome == dim.coluna_id {
                return Err(EtlError::Config(format!(
                    "'{}': colunas de id, nome e chave normalizada devem ser distintas",
                    dim.nome
                )));
            }
        }
        Ok(())
    }

    pub fn caminho_fato_completo(&self) -> PathBuf {
        self.caminhos.processed.join(&self.fato.arquivo_completo)
    }
}
