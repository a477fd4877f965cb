//! # Normalização de Texto e Números
//!
//! Funções puras usadas para formar chaves naturais de junção e para
//! interpretar valores monetários exportados com formatação local.

use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Modo de normalização aplicado à chave natural de uma dimensão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Normalizacao {
    /// Remove acentos, converte para minúsculas e colapsa espaços.
    #[default]
    Completa,
    /// Apenas remove espaços nas extremidades (preserva caixa e acentos).
    Trim,
}

impl Normalizacao {
    pub fn aplicar(&self, valor: &str) -> String {
        match self {
            Normalizacao::Completa => normalizar_texto(valor),
            Normalizacao::Trim => normalizar_trim(valor),
        }
    }
}

/// Remove diacríticos via decomposição NFKD descartando marcas combinantes.
pub fn remover_acentos(valor: &str) -> String {
    valor.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Chave natural completa: sem acentos, minúscula, espaços colapsados.
///
/// `"  Ração   Premium Cães "` vira `"racao premium caes"`.
pub fn normalizar_texto(valor: &str) -> String {
    remover_acentos(valor)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn normalizar_trim(valor: &str) -> String {
    valor.trim().to_string()
}

/// Interpreta um número em formato brasileiro ou internacional.
///
/// Regras de desambiguação:
/// * Com vírgula **e** ponto: o último separador é o decimal
///   (`1.234,56` e `1,234.56`).
/// * Só vírgula: vírgula é decimal (`1234,56`).
/// * Só ponto, em grupos de milhar: pontos são descartados
///   (`1.234.567`, `12.500`).
/// * Só ponto, fora desse padrão: formato internacional (`1234.56`).
///
/// Símbolos de moeda, espaços (inclusive NBSP) e demais caracteres são
/// descartados antes da conversão. Retorna `None` se nada restar ou se o
/// resultado não for um número válido.
pub fn parse_numero(valor: &str) -> Option<f64> {
    let limpo: String = valor
        .replace('\u{00A0}', " ")
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    if limpo.is_empty() {
        return None;
    }

    let tem_virgula = limpo.contains(',');
    let tem_ponto = limpo.contains('.');

    let canonico = match (tem_virgula, tem_ponto) {
        (true, true) if limpo.rfind('.') > limpo.rfind(',') => limpo.replace(',', ""),
        (true, true) => limpo.replace('.', "").replace(',', "."),
        (true, false) => limpo.replace(',', "."),
        (false, true) if pontos_de_milhar(&limpo) => limpo.replace('.', ""),
        _ => limpo,
    };

    canonico.parse::<f64>().ok()
}

/// `1.234.567` ou `12.500`: primeiro grupo com 1 a 3 dígitos (sem ser só
/// zero) e todos os demais com exatamente 3.
fn pontos_de_milhar(valor: &str) -> bool {
    let mut grupos = valor.trim_start_matches('-').split('.');
    let primeiro = grupos.next().unwrap_or_default();

    (1..=3).contains(&primeiro.len())
        && !primeiro.trim_start_matches('0').is_empty()
        && grupos.all(|g| g.len() == 3)
}
