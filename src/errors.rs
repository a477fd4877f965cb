//! # Definição de Erros do Pipeline
//!
//! Este módulo centraliza as falhas possíveis durante a preparação dos dados,
//! a geração das dimensões e o enriquecimento do fato.
//!
//! # Error Handling Strategy
//! - **Tipagem:** Enums para tratamento exaustivo.
//! - **Fail-Fast:** Toda variante aborta a execução; divergências não fatais
//!   (não-casados, produtos sem categoria) viram relatórios, não erros.

use std::path::PathBuf;

/// Enumeração central de falhas do ETL.
#[derive(Debug)]
#[non_exhaustive]
pub enum EtlError {
    /// Falhas no sistema de arquivos (permissão, disco cheio, arquivo inexistente).
    Io(std::io::Error),

    /// Erros originados na engine Polars.
    /// Armazenados como `String` para reduzir acoplamento direto.
    Polars(String),

    /// Falha de leitura do CSV bruto.
    Csv(csv::Error),

    /// Arquivo de configuração ausente, inválido ou inconsistente.
    Config(String),

    /// Coluna exigida não existe na tabela informada.
    ColunaNaoEncontrada { coluna: String, contexto: String },

    /// Extensão de arquivo sem leitor/escritor associado.
    FormatoNaoSuportado(PathBuf),

    /// O join alterou o número de linhas do fato (chaves duplicadas na dimensão).
    ContagemDivergente {
        dimensao: String,
        antes: usize,
        depois: usize,
    },

    /// Duas chaves naturais distintas receberam o mesmo identificador.
    ColisaoChave { id: String, chaves: (String, String) },
}
