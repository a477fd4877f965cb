//! Classificação de produtos por palavras-chave.
//!
//! Usada quando a base de origem não traz coluna de categoria. As regras são
//! avaliadas na ordem declarada em [`REGRAS`]; a primeira palavra-chave
//! encontrada no nome normalizado decide a categoria.

use crate::normalizer::normalizar_texto;

/// Marcador de produto pendente de revisão manual.
pub const SEM_CATEGORIA: &str = "#";

/// Vocabulário fixo de categorias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Categoria {
    Acessorio,
    Alimentacao,
    BebedourosComedouros,
    Brinquedo,
    Higiene,
    Medicamento,
    Petisco,
}

impl Categoria {
    /// Rótulo gravado na dimensão.
    pub fn rotulo(&self) -> &'static str {
        match self {
            Categoria::Acessorio => "Acessório",
            Categoria::Alimentacao => "Alimentação",
            Categoria::BebedourosComedouros => "Bebedouros e Comedouros",
            Categoria::Brinquedo => "Brinquedo",
            Categoria::Higiene => "Higiene e Limpeza",
            Categoria::Medicamento => "Medicamento",
            Categoria::Petisco => "Petisco",
        }
    }
}

/// Palavras-chave já normalizadas (sem acento, minúsculas).
///
/// Espaços finais em algumas palavras (`"cama "`) evitam casar prefixos de
/// outras palavras ("camarão").
pub const REGRAS: &[(Categoria, &[&str])] = &[
    (
        Categoria::Medicamento,
        &[
            "bravecto",
            "antipulga",
            "vermif",
            "vitamina",
            "suplemento",
            "condroitina",
            "omega",
        ],
    ),
    (
        Categoria::Acessorio,
        &[
            "bandana",
            "cama ",
            "almofada",
            "roupa ",
            "meia",
            "pote ",
            "coleira",
            "peitoral",
            "ninho",
            "arranhador",
        ],
    ),
    (
        Categoria::BebedourosComedouros,
        &["bebedouro", "comedouro", "alimentador", "automatico"],
    ),
    (
        Categoria::Petisco,
        &[
            "biscoito", "petisco", "snack", "sache", "sticks", "bifinho", "cookie",
        ],
    ),
    (
        Categoria::Brinquedo,
        &["bola", "mordedor", "brinquedo", "penas"],
    ),
    (
        Categoria::Higiene,
        &[
            "shampoo",
            "banho",
            "tosa",
            "rasqueadeira",
            "higiene",
            "limpeza",
            "tapete higienico",
        ],
    ),
    (
        Categoria::Alimentacao,
        &["racao", "lata", "pate", "granulado alimentar"],
    ),
];

/// Primeira categoria cuja lista contém uma palavra presente no nome.
pub fn categorizar(nome_produto: &str) -> Option<Categoria> {
    let nome = normalizar_texto(nome_produto);

    REGRAS
        .iter()
        .find(|(_, palavras)| palavras.iter().any(|p| nome.contains(p)))
        .map(|(categoria, _)| *categoria)
}

/// Rótulo da categoria ou [`SEM_CATEGORIA`] quando nenhuma regra casa.
pub fn classificar_categoria(nome_produto: &str) -> String {
    categorizar(nome_produto)
        .map(|c| c.rotulo().to_string())
        .unwrap_or_else(|| SEM_CATEGORIA.to_string())
}
