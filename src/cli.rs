//! Interface de linha de comando do copydesk baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (run, watch,
//! status, queue) e flags globais (--config, --verbose).

use clap::{Parser, Subcommand, ValueEnum};

/// Automação de revisão IA para a fila de artigos pendentes do estúdio.
#[derive(Debug, Parser)]
#[command(name = "copydesk", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho para um arquivo de configuração alternativo.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Intervalo de automação aceito pela CLI, restrito ao menu fixo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IntervalArg {
    #[value(name = "5")]
    Min5,
    #[value(name = "10")]
    Min10,
    #[value(name = "15")]
    Min15,
    #[value(name = "30")]
    Min30,
    #[value(name = "60")]
    Min60,
}

impl IntervalArg {
    pub fn minutes(self) -> u32 {
        match self {
            IntervalArg::Min5 => 5,
            IntervalArg::Min10 => 10,
            IntervalArg::Min15 => 15,
            IntervalArg::Min30 => 30,
            IntervalArg::Min60 => 60,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Processa a fila de pendentes uma vez, agora.
    Run {
        /// Delega o lote inteiro ao endpoint de processamento do servidor.
        #[arg(long)]
        remote: bool,
    },

    /// Liga a automação e mantém o processo vivo até Ctrl-C.
    Watch {
        /// Minutos entre execuções agendadas.
        #[arg(long, value_enum)]
        every: Option<IntervalArg>,
    },

    /// Mostra o estado do motor, da fila e da automação.
    Status,

    /// Lista os itens aguardando processamento.
    Queue,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_run_subcommand() {
        let cli = Cli::parse_from(["copydesk", "run"]);
        match cli.command {
            Command::Run { remote } => assert!(!remote),
            _ => panic!("expected Run command"),
        }

        let cli = Cli::parse_from(["copydesk", "run", "--remote"]);
        match cli.command {
            Command::Run { remote } => assert!(remote),
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn cli_parses_watch_with_interval() {
        let cli = Cli::parse_from(["copydesk", "watch", "--every", "15"]);
        match cli.command {
            Command::Watch { every } => {
                assert_eq!(every, Some(IntervalArg::Min15));
                assert_eq!(every.unwrap().minutes(), 15);
            }
            _ => panic!("expected Watch command"),
        }
    }

    #[test]
    fn cli_rejects_off_menu_interval() {
        let result = Cli::try_parse_from(["copydesk", "watch", "--every", "7"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from(["copydesk", "--config", "custom.toml", "--verbose", "status"]);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
        assert!(matches!(cli.command, Command::Status));
    }

    #[test]
    fn interval_arg_covers_the_menu() {
        let minutes: Vec<u32> = [
            IntervalArg::Min5,
            IntervalArg::Min10,
            IntervalArg::Min15,
            IntervalArg::Min30,
            IntervalArg::Min60,
        ]
        .into_iter()
        .map(IntervalArg::minutes)
        .collect();
        assert_eq!(minutes, vec![5, 10, 15, 30, 60]);
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
