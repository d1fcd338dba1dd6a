//! Tipos de dados para requisições e respostas da API do estúdio.
//!
//! As structs espelham os corpos JSON dos endpoints do estúdio e derivam
//! `Serialize`/`Deserialize` conforme a direção do tráfego. A interpretação
//! dos resultados (classificação, roteamento) vive nos módulos de domínio.

use serde::{Deserialize, Serialize};

use crate::grading::Grade;

/// Uma entrada da fila de pendentes retornada por `GET /api/articles/pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingItem {
    /// Identificador estável usado para endereçar o item em chamadas posteriores.
    pub id: String,
    /// Título legível, exibido na saída de progresso e nos logs.
    pub title: String,
    /// Editoria/região opcional à qual o artigo pertence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Corpo da resposta de `GET /api/articles/pending/count`.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingCount {
    pub count: usize,
}

/// Estado do motor de inferência conforme reportado pelo servidor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    Online,
    Offline,
}

/// Corpo da resposta de `GET /api/engine/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineStatusResponse {
    pub status: EngineStatus,
}

/// Corpo da resposta de `POST /api/engine/start`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineStartResponse {
    /// Se um novo processo do motor foi iniciado.
    pub success: bool,
    /// Definido quando o motor já estava no ar; conta como início bem-sucedido.
    #[serde(default)]
    pub already_running: bool,
    /// Detalhe da falha quando nenhum dos campos acima vale.
    #[serde(default)]
    pub error: Option<String>,
}

impl EngineStartResponse {
    /// Verdadeiro quando o motor está utilizável após esta chamada,
    /// tenha sido iniciado agora ou já estivesse rodando.
    pub fn engine_up(&self) -> bool {
        self.success || self.already_running
    }
}

/// Resultado do processamento de um único item, como retornado por
/// `POST /api/articles/{id}/process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOutcome {
    /// Se o pipeline rodou até o fim para este item.
    pub success: bool,
    /// Se o artigo reescrito foi publicado automaticamente.
    #[serde(default)]
    pub published: bool,
    /// Nota de qualidade atribuída pelo pipeline. Apenas informativa;
    /// o roteamento é guiado pelos dois campos acima.
    pub grade: Grade,
    /// Detalhe da falha quando `success` é falso.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessOutcome {
    /// Sintetiza o resultado registrado quando a própria chamada de
    /// processamento falhou (erro de rede, timeout, 5xx remoto) e nenhum
    /// resultado real chegou até nós.
    pub fn transport_failure(message: String) -> Self {
        Self {
            success: false,
            published: false,
            grade: Grade::D,
            error: Some(message),
        }
    }
}

/// Corpo da resposta de `POST /api/articles/process-batch`, em que o
/// servidor percorre a fila por conta própria e reporta apenas totais.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteBatchSummary {
    pub success: bool,
    #[serde(default)]
    pub published: usize,
    #[serde(default)]
    pub held: usize,
}
