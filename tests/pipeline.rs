use polars::prelude::*;
use tempfile::TempDir;

use std::fs;

use vendas_etl::dimension;
use vendas_etl::enricher;
use vendas_etl::models::Encoding;
use vendas_etl::processor;
use vendas_etl::storage;
use vendas_etl::{Config, MetodoChave, analysis};

const BRUTO: &str = "\
cod_pedido;data;produto;categoriaprod;valor;quantidade;valor_total_bruto;centro_distribuicao;formapagto;responsavelpedido
P1;05/01/2024;Bravecto Cães 10kg;;100,00;1;100,00;Gold Beach;Pix;Adriana
P2;20/01/2024;Bola de Tênis;Brinquedo;10,50;2;;Rapid Pink;Dinheiro;Carlos
P3;03/02/2024;Bravecto Cães 10kg;;1.200,00;1;1.200,00;Centro Novo;Pix;Yuri
P4;linha quebrada
P5;10/02/2024;Ração Premium;;50;2;;Tree True;Cheque;Marta
";

fn config_em(dir: &TempDir) -> Config {
    let base = dir.path();
    let raw = base.join("raw").join("vendas.csv");
    fs::create_dir_all(base.join("raw")).unwrap();
    fs::write(&raw, BRUTO).unwrap();

    let mut cfg = Config::default();
    cfg.caminhos.raw = raw;
    cfg.caminhos.processed = base.join("processed");
    cfg.caminhos.dimensoes = base.join("dimensoes");
    cfg.caminhos.exports = base.join("exports");
    cfg.caminhos.sample = base.join("sample");
    cfg.preparacao.chunk_size = 2;
    cfg.preparacao.amostra_por_bloco = 1;
    cfg.preparacao.encoding = Encoding::Utf8;
    cfg
}

fn ids(df: &DataFrame, coluna: &str) -> Vec<Option<String>> {
    storage::coluna_texto(df, coluna).unwrap()
}

#[test]
fn pipeline_completo_gera_fato_enriquecido_e_relatorios() {
    let dir = TempDir::new().unwrap();
    let cfg = config_em(&dir);

    // Preparação
    let prep = processor::preparar_dados(&cfg).unwrap();
    assert_eq!(prep.linhas, 4);
    assert_eq!(prep.descartadas, 1);
    assert_eq!(prep.partes.len(), 2);
    assert!(prep.consolidado.exists());

    let amostra = storage::carregar_tabela(prep.amostra.as_ref().unwrap()).unwrap();
    assert_eq!(amostra.height(), 2);
    assert!(cfg.caminhos.sample.join("vendas_sample.csv").exists());

    let fato = storage::carregar_tabela(&prep.consolidado).unwrap();
    assert_eq!(fato.height(), 4);
    let receita = fato.column("receita").unwrap().f64().unwrap().clone();
    assert_eq!(receita.get(1), Some(21.0));
    assert_eq!(receita.get(2), Some(1200.0));

    // Dimensões
    let resumos = dimension::executar_todas(&cfg, MetodoChave::Sequencial).unwrap();
    assert_eq!(resumos.len(), 4);
    assert_eq!(resumos[0].linhas, 3);
    assert_eq!(resumos[0].pendentes, 0);
    assert_eq!(resumos[1].linhas, 5);

    // Enriquecimento
    let enr = enricher::executar_enriquecimento(&cfg).unwrap();
    assert_eq!(enr.linhas, 4);
    assert!(enr.csv.exists());

    let enriquecido = storage::carregar_tabela(&enr.parquet).unwrap();
    assert_eq!(enriquecido.height(), 4);
    assert_eq!(ids(&enriquecido, "cod_pedido"), ids(&fato, "cod_pedido"));

    let produtos = ids(&enriquecido, "produto_id");
    assert!(produtos.iter().all(Option::is_some));
    assert_eq!(produtos[0], produtos[2]);

    let centros = ids(&enriquecido, "centro_id");
    assert!(centros[2].is_none());
    assert!(storage::tem_coluna(&enriquecido, "centro_distribuicao_dim"));

    // Relatórios de não-casados
    let cds = storage::carregar_tabela(&cfg.caminhos.processed.join("nao_casados_cds.csv")).unwrap();
    assert_eq!(cds.height(), 1);
    assert_eq!(ids(&cds, "centro_distribuicao")[0].as_deref(), Some("Centro Novo"));

    let pagto =
        storage::carregar_tabela(&cfg.caminhos.processed.join("nao_casados_formapagto.csv")).unwrap();
    assert_eq!(pagto.height(), 1);

    let prod =
        storage::carregar_tabela(&cfg.caminhos.processed.join("nao_casados_produto.csv")).unwrap();
    assert_eq!(prod.height(), 0);

    // KPI
    let kpi = analysis::exportar_kpi(&cfg).unwrap();
    assert_eq!(kpi.meses, 2);
    assert_eq!(storage::carregar_tabela(&kpi.kpi).unwrap().height(), 2);
    assert!(kpi.outliers.exists());
    assert!(kpi.receita_zero.exists());
}

#[test]
fn reexecucao_preserva_ids_das_dimensoes() {
    let dir = TempDir::new().unwrap();
    let cfg = config_em(&dir);

    processor::preparar_dados(&cfg).unwrap();
    let primeira = dimension::executar_todas(&cfg, MetodoChave::Sequencial).unwrap();
    let antes = storage::carregar_tabela(&primeira[0].parquet).unwrap();

    let segunda = dimension::executar_todas(&cfg, MetodoChave::Sequencial).unwrap();
    assert_eq!(segunda[0].novos, 0);
    assert_eq!(segunda[0].preservados, 3);

    let depois = storage::carregar_tabela(&segunda[0].parquet).unwrap();
    assert_eq!(ids(&antes, "produto_id"), ids(&depois, "produto_id"));
    assert_eq!(
        ids(&antes, "produto_nome_normalizado"),
        ids(&depois, "produto_nome_normalizado")
    );
}

#[test]
fn dimensao_por_hash_e_deterministica() {
    let dir = TempDir::new().unwrap();
    let cfg = config_em(&dir);
    processor::preparar_dados(&cfg).unwrap();

    let params = dimension::ParametrosDimensao {
        input: Some(cfg.caminho_fato_completo()),
        col_nome: None,
        col_categoria: None,
        existing_dim: None,
        out_dir: dir.path().join("hash"),
        metodo: MetodoChave::Hash,
    };
    let resumo = dimension::executar_dimensao(&cfg.dimensoes.produto, &params).unwrap();
    let df = storage::carregar_tabela(&resumo.parquet).unwrap();

    for (id, chave) in ids(&df, "produto_id")
        .into_iter()
        .zip(ids(&df, "produto_nome_normalizado"))
    {
        let (id, chave) = (id.unwrap(), chave.unwrap());
        assert_eq!(id, dimension::id_hash("PROD", &chave));
        assert_eq!(id.len(), "PROD".len() + 8);
    }
}
