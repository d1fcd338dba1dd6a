//! Tipos de erro para o cliente da API do estúdio de conteúdo.
//!
//! Define [`ApiError`] com variantes para erros HTTP, falhas de rede e
//! respostas malformadas. Usa `thiserror` para derivar `Display` e `Error`
//! automaticamente a partir dos atributos `#[error(...)]`.

use thiserror::Error;

/// Erros que podem ocorrer ao interagir com a API do estúdio.
///
/// As variantes cobrem os três cenários mais comuns de falha:
/// - [`Status`](ApiError::Status): o servidor retornou um erro HTTP (4xx/5xx)
/// - [`Network`](ApiError::Network): falha na camada de rede
/// - [`Parse`](ApiError::Parse): a resposta não corresponde ao formato esperado
#[derive(Debug, Error)]
pub enum ApiError {
    /// Erro retornado pela API (ex.: 401 token inválido, 500 erro interno).
    /// Contém o código de status HTTP e a mensagem de erro do corpo da resposta.
    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    /// Encapsula o erro original do `reqwest` via `#[from]`.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// O corpo da resposta não pôde ser decodificado como o tipo esperado.
    /// Contém a descrição do erro de desserialização.
    #[error("failed to parse API response: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display() {
        let err = ApiError::Status {
            status: 401,
            message: "invalid token".into(),
        };
        assert_eq!(err.to_string(), "API error (status 401): invalid token");
    }

    #[test]
    fn parse_display() {
        let err = ApiError::Parse("missing field `grade`".into());
        assert_eq!(
            err.to_string(),
            "failed to parse API response: missing field `grade`"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiError>();
    }
}
