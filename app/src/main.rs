mod config;
mod error;
mod services;
mod state;
mod ui;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use engine::produtos::Ordenacao;
use shared::format::{parse_data_local, parse_decimal};
use shared::models::{juntar_observacoes, Marketplace, ProdutoPayload, VendaPayload};

use config::AppConfig;
use error::ClientError;
use services::api_client::ApiClient;
use services::debounce::{Debouncer, ATRASO_PADRAO};
use services::version::VerificadorVersao;
use state::Store;

#[derive(Parser)]
#[command(name = "controle-estoque", version, about = "Controle de estoque e vendas")]
struct Cli {
    /// URL base do backend (sobrepõe ESTOQUE_API_URL)
    #[arg(long, global = true)]
    api: Option<String>,

    #[command(subcommand)]
    comando: Comando,
}

#[derive(Subcommand)]
enum Comando {
    /// Lista o catálogo de produtos
    Produtos {
        #[arg(long, default_value = "")]
        busca: String,
        /// recente, nome, nome-desc, quantidade ou quantidade-asc
        #[arg(long, default_value = "recente")]
        ordenacao: String,
    },
    /// Mostra um produto
    Produto { id: i64 },
    /// Cadastra um produto
    CriarProduto {
        #[arg(long)]
        titulo: String,
        #[arg(long, default_value = "")]
        descricao: String,
        #[arg(long, default_value_t = 0)]
        quantidade_ml: i64,
        #[arg(long, default_value_t = 0)]
        quantidade_shopee: i64,
        /// Aceita vírgula ou ponto como separador decimal
        #[arg(long)]
        valor_compra: Option<String>,
        #[arg(long)]
        categoria: Option<String>,
        /// Nome de arquivo ou URL já enviado (veja upload-imagem)
        #[arg(long, default_value = "")]
        imagem: String,
        /// Par CHAVE=VALOR; repita a flag para cada especificação
        #[arg(long = "espec", value_name = "CHAVE=VALOR")]
        especificacoes: Vec<String>,
    },
    /// Atualiza um produto (campos omitidos mantêm o valor atual)
    AtualizarProduto {
        id: i64,
        #[arg(long)]
        titulo: Option<String>,
        #[arg(long)]
        descricao: Option<String>,
        #[arg(long)]
        quantidade_ml: Option<i64>,
        #[arg(long)]
        quantidade_shopee: Option<i64>,
        #[arg(long)]
        valor_compra: Option<String>,
        #[arg(long)]
        categoria: Option<String>,
        #[arg(long)]
        imagem: Option<String>,
        /// Quando presente, substitui todas as especificações
        #[arg(long = "espec", value_name = "CHAVE=VALOR")]
        especificacoes: Vec<String>,
    },
    /// Remove um produto (as vendas guardam o título como histórico)
    DeletarProduto { id: i64 },
    /// Envia uma imagem e imprime o nome armazenado
    UploadImagem { arquivo: PathBuf },
    /// Lista as vendas agrupadas por mês
    Vendas {
        #[arg(long, default_value = "")]
        busca: String,
    },
    /// Busca interativa nas vendas (uma consulta por linha)
    Buscar,
    /// Registra uma venda (exige estoque disponível)
    RegistrarVenda {
        #[arg(long)]
        produto_id: i64,
        /// Valor de venda; aceita vírgula ou ponto
        #[arg(long)]
        valor: String,
        /// Data no formato AAAA-MM-DD (padrão: hoje)
        #[arg(long)]
        data: Option<String>,
        /// mercado_livre (ou ml) ou shopee
        #[arg(long)]
        onde: String,
        /// Repita a flag para cada observação
        #[arg(long = "obs")]
        observacoes: Vec<String>,
    },
    /// Atualiza uma venda (campos omitidos mantêm o valor atual)
    AtualizarVenda {
        id: i64,
        #[arg(long)]
        valor: Option<String>,
        #[arg(long)]
        data: Option<String>,
        #[arg(long)]
        onde: Option<String>,
        /// Quando presente, substitui todas as observações
        #[arg(long = "obs")]
        observacoes: Vec<String>,
    },
    /// Remove uma venda (o estoque do produto é restaurado)
    DeletarVenda { id: i64 },
    /// Baixa o catálogo como CSV
    ExportarCsv {
        #[arg(long, default_value = "produtos.csv")]
        saida: PathBuf,
    },
    /// Valida localmente e envia um CSV de produtos
    ImportarCsv { arquivo: PathBuf },
    /// Consulta a versão do backend e avisa se houve atualização
    Versao,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    if let Err(erro) = executar(cli).await {
        match erro.downcast_ref::<ClientError>() {
            Some(cliente) => eprintln!("Erro: {}", cliente.mensagem_usuario()),
            None => eprintln!("Erro: {:#}", erro),
        }
        std::process::exit(1);
    }
}

async fn executar(cli: Cli) -> Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(api) = cli.api {
        config.base_url = api.trim_end_matches('/').to_string();
    }
    let api = ApiClient::new(&config)?;

    match cli.comando {
        Comando::Produtos { busca, ordenacao } => {
            let ordenacao: Ordenacao = ordenacao.parse()?;
            let mut store = Store::new(api);
            store.recarregar_produtos().await?;
            store.estado.definir_busca_produtos(&busca);
            store.estado.definir_ordenacao(ordenacao);
            print!("{}", ui::render_produtos(&store.estado.produtos_filtrados));
        }
        Comando::Produto { id } => {
            let produto = api.obter_produto(id).await?;
            print!("{}", ui::render_produto(&produto));
        }
        Comando::CriarProduto {
            titulo,
            descricao,
            quantidade_ml,
            quantidade_shopee,
            valor_compra,
            categoria,
            imagem,
            especificacoes,
        } => {
            let payload = ProdutoPayload {
                titulo,
                descricao,
                quantidade_mercado_livre: quantidade_ml,
                quantidade_shopee,
                valor_compra: parse_valor_opcional(valor_compra.as_deref())?,
                categoria,
                imagem,
                especificacoes: parse_especificacoes(&especificacoes)?,
            };
            let mut store = Store::new(api);
            let confirmacao = store.criar_produto(&payload).await?;
            imprimir_confirmacao(&confirmacao.mensagem, "Produto criado");
        }
        Comando::AtualizarProduto {
            id,
            titulo,
            descricao,
            quantidade_ml,
            quantidade_shopee,
            valor_compra,
            categoria,
            imagem,
            especificacoes,
        } => {
            let atual = api.obter_produto(id).await?;
            let payload = ProdutoPayload {
                titulo: titulo.unwrap_or(atual.titulo),
                descricao: descricao.or(atual.descricao).unwrap_or_default(),
                quantidade_mercado_livre: quantidade_ml.unwrap_or(atual.quantidade_mercado_livre),
                quantidade_shopee: quantidade_shopee.unwrap_or(atual.quantidade_shopee),
                valor_compra: match valor_compra {
                    Some(bruto) => Some(parse_decimal(&bruto)?),
                    None => atual.valor_compra,
                },
                categoria: categoria.or(atual.categoria),
                imagem: imagem.or(atual.imagem).unwrap_or_default(),
                especificacoes: if especificacoes.is_empty() {
                    atual.especificacoes
                } else {
                    parse_especificacoes(&especificacoes)?
                },
            };
            let mut store = Store::new(api);
            let confirmacao = store.atualizar_produto(id, &payload).await?;
            imprimir_confirmacao(&confirmacao.mensagem, "Produto atualizado");
        }
        Comando::DeletarProduto { id } => {
            let mut store = Store::new(api);
            let confirmacao = store.deletar_produto(id).await?;
            imprimir_confirmacao(&confirmacao.mensagem, "Produto removido");
        }
        Comando::UploadImagem { arquivo } => {
            let resposta = api.upload_imagem(&arquivo).await?;
            println!("{}", resposta.imagem);
        }
        Comando::Vendas { busca } => {
            let mut store = Store::new(api);
            store.recarregar_vendas().await?;
            store.estado.definir_busca_vendas(&busca);
            print!("{}", ui::render_vendas(&store.estado.grupos_mensais()));
        }
        Comando::Buscar => {
            let mut store = Store::new(api);
            store.recarregar_vendas().await?;
            buscar_interativo(store).await?;
        }
        Comando::RegistrarVenda {
            produto_id,
            valor,
            data,
            onde,
            observacoes,
        } => {
            let payload = VendaPayload {
                produto_id,
                valor_venda: parse_decimal(&valor)?,
                data_venda: match data {
                    Some(bruto) => validar_data_venda(&bruto)?,
                    None => data_de_hoje(),
                },
                onde_vendeu: onde.parse::<Marketplace>()?,
                observacoes: juntar_observacoes(&observacoes),
            };
            let mut store = Store::new(api);
            store.recarregar_produtos().await?;
            let confirmacao = store.registrar_venda(&payload).await?;
            imprimir_confirmacao(&confirmacao.mensagem, "Venda registrada");
        }
        Comando::AtualizarVenda {
            id,
            valor,
            data,
            onde,
            observacoes,
        } => {
            let mut store = Store::new(api);
            store.recarregar_vendas().await?;
            let atual = store
                .estado
                .venda(id)
                .ok_or_else(|| anyhow!("Venda {} não encontrada", id))?
                .clone();
            let produto_id = atual.produto_id.ok_or_else(|| {
                anyhow!("Venda {} referencia um produto deletado e não pode ser editada", id)
            })?;

            let payload = VendaPayload {
                produto_id,
                valor_venda: match valor {
                    Some(bruto) => parse_decimal(&bruto)?,
                    None => atual.valor_venda,
                },
                data_venda: match data {
                    Some(bruto) => validar_data_venda(&bruto)?,
                    None => atual.data_venda,
                },
                onde_vendeu: match onde {
                    Some(bruto) => bruto.parse::<Marketplace>()?,
                    None => atual.onde_vendeu,
                },
                observacoes: if observacoes.is_empty() {
                    atual.observacoes
                } else {
                    juntar_observacoes(&observacoes)
                },
            };
            let confirmacao = store.atualizar_venda(id, &payload).await?;
            imprimir_confirmacao(&confirmacao.mensagem, "Venda atualizada");
        }
        Comando::DeletarVenda { id } => {
            let mut store = Store::new(api);
            let confirmacao = store.deletar_venda(id).await?;
            imprimir_confirmacao(&confirmacao.mensagem, "Venda removida");
        }
        Comando::ExportarCsv { saida } => {
            let bytes = api.exportar_csv().await?;
            tokio::fs::write(&saida, &bytes)
                .await
                .with_context(|| format!("gravando {}", saida.display()))?;
            println!("Exportado para {}", saida.display());
        }
        Comando::ImportarCsv { arquivo } => {
            // Valida localmente antes de enviar: erros saem com número de linha.
            let linhas = engine::data::csv::ler_produtos_csv_de_arquivo(&arquivo)?;
            info!(total = linhas.len(), "CSV validado localmente");
            let confirmacao = api.importar_csv(&arquivo).await?;
            imprimir_confirmacao(
                &confirmacao.mensagem,
                &format!("{} produtos importados", linhas.len()),
            );
        }
        Comando::Versao => {
            let versao = api.verificar_versao().await?;
            let verificador = VerificadorVersao::new(config.arquivo_versao.clone());
            let atualizou = verificador.registrar(&versao.app_version)?;
            println!("Versão do backend: {}", versao.app_version);
            if atualizou {
                println!("Nova versão disponível desde a última consulta.");
            }
        }
    }

    Ok(())
}

/// Reads one query per line from stdin, re-rendering the ledger after the
/// input has been quiet for the debounce delay.
async fn buscar_interativo(store: Store) -> Result<()> {
    println!("Digite para filtrar as vendas (linha vazia mostra tudo, Ctrl-D encerra).");

    let estado = Arc::new(Mutex::new(store.estado));
    let mut debouncer = Debouncer::new(ATRASO_PADRAO);
    let mut linhas = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    while let Some(linha) = linhas.next_line().await? {
        let estado = Arc::clone(&estado);
        debouncer.agendar(async move {
            let mut estado = estado.lock().await;
            estado.definir_busca_vendas(linha.trim());
            print!("{}", ui::render_vendas(&estado.grupos_mensais()));
        });
    }

    debouncer.aguardar().await;
    Ok(())
}

fn parse_especificacoes(pares: &[String]) -> Result<BTreeMap<String, String>> {
    let mut mapa = BTreeMap::new();
    for par in pares {
        let (chave, valor) = par
            .split_once('=')
            .ok_or_else(|| anyhow!("Especificação inválida '{}' (esperado CHAVE=VALOR)", par))?;
        let chave = chave.trim();
        let valor = valor.trim();
        if chave.is_empty() || valor.is_empty() {
            return Err(anyhow!("Especificação inválida '{}' (chave e valor são obrigatórios)", par));
        }
        mapa.insert(chave.to_string(), valor.to_string());
    }
    Ok(mapa)
}

fn parse_valor_opcional(bruto: Option<&str>) -> Result<Option<f64>> {
    match bruto {
        Some(bruto) => Ok(Some(parse_decimal(bruto)?)),
        None => Ok(None),
    }
}

/// Rejects a sale date the backend would not parse; a typo would otherwise
/// be stored verbatim and the ledger would group the sale under the current
/// month.
fn validar_data_venda(bruto: &str) -> Result<String> {
    let bruto = bruto.trim();
    if parse_data_local(bruto).is_none() {
        return Err(anyhow!("Data inválida '{}' (esperado AAAA-MM-DD)", bruto));
    }
    Ok(bruto.to_string())
}

fn data_de_hoje() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn imprimir_confirmacao(mensagem: &str, padrao: &str) {
    if mensagem.is_empty() {
        println!("{}", padrao);
    } else {
        println!("{}", mensagem);
    }
}
