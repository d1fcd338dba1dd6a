//! Interface de terminal do copydesk: spinners e saída colorida.
//!
//! Usa as crates `indicatif` para spinners de progresso e `console` para
//! estilização com cores. O [`BatchProgress`] acompanha visualmente a
//! execução de um lote no terminal, lendo os contadores compartilhados
//! sem interferir no processamento.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::gate::GateState;
use crate::queue::{ItemStatus, WorkItem};
use crate::scheduler::AutomationConfig;
use crate::stats::RunStats;

/// Indicador visual de progresso para a execução de um lote no terminal.
///
/// Exibe um spinner animado com o item em andamento e, ao final, o
/// resumo por categoria: publicados (verde), retidos (amarelo) e
/// falhados (vermelho).
#[derive(Clone)]
pub struct BatchProgress {
    // Barra de progresso/spinner do indicatif.
    pb: ProgressBar,
    // Estilo verde para publicações e sucesso.
    green: Style,
    // Estilo vermelho para falhas.
    red: Style,
    // Estilo amarelo para itens retidos.
    yellow: Style,
    // Estilo esmaecido para detalhes secundários.
    dim: Style,
}

impl BatchProgress {
    /// Inicia o spinner e retorna a instância de progresso.
    pub fn start() -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message("loading pending queue...");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            dim: Style::new().dim(),
        }
    }

    /// Atualiza a mensagem do spinner com o item em andamento.
    pub fn observe(&self, stats: &RunStats) {
        if let Some(title) = &stats.current_item {
            let position = (stats.processed + 1).min(stats.total);
            self.pb
                .set_message(format!("processing {position}/{}: {title}", stats.total));
        }
    }

    /// Finaliza o spinner e exibe o resumo do lote.
    pub fn finish(&self, stats: &RunStats) {
        self.pb.finish_and_clear();
        let mark = if stats.failed == 0 {
            self.green.apply_to("✓")
        } else {
            self.yellow.apply_to("!")
        };
        println!(
            "  {mark} {} published, {} held, {} failed ({} items)",
            stats.published, stats.held, stats.failed, stats.total
        );
    }

    /// Finaliza o spinner com uma mensagem de erro.
    pub fn fail(&self, message: &str) {
        self.pb.finish_and_clear();
        println!("  {} batch run failed: {message}", self.red.apply_to("✗"));
    }

    /// Imprime uma linha por item processado, com grau e detalhe de erro.
    pub fn print_report(&self, items: &[WorkItem]) {
        for item in items {
            let mark = match item.status {
                ItemStatus::Success => self.green.apply_to("✓"),
                ItemStatus::Failed => self.red.apply_to("✗"),
                ItemStatus::Pending | ItemStatus::Processing => self.yellow.apply_to("…"),
            };
            let grade = item
                .grade
                .map(|g| {
                    if g.is_auto_publishable() {
                        format!("[{g}]")
                    } else {
                        format!("[{g} {}]", g.describe())
                    }
                })
                .unwrap_or_else(|| "[ ]".to_string());
            let detail = item
                .error
                .as_deref()
                .map(|e| format!(" ({e})"))
                .unwrap_or_default();
            println!(
                "  {mark} {grade} {}{}",
                item.title,
                self.dim.apply_to(detail)
            );
        }
    }
}

/// Imprime o painel de status: motor, fila e automação.
pub fn print_status(engine: GateState, pending: usize, automation: &AutomationConfig) {
    let green = Style::new().green().bold();
    let red = Style::new().red().bold();
    let yellow = Style::new().yellow();

    let engine_text = match engine {
        GateState::Online => green.apply_to("online"),
        GateState::Offline => red.apply_to("offline"),
        GateState::Checking => yellow.apply_to("checking"),
    };
    println!("engine:     {engine_text}");
    println!("pending:    {pending} item(s)");
    if automation.enabled {
        let next = automation
            .next_run_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unscheduled".to_string());
        println!(
            "automation: {} every {} min, next run {next}",
            green.apply_to("enabled"),
            automation.interval_minutes
        );
    } else {
        println!("automation: disabled");
    }
}

/// Lista os itens aguardando processamento.
pub fn print_queue(items: &[WorkItem]) {
    let dim = Style::new().dim();
    if items.is_empty() {
        println!("pending queue is empty");
        return;
    }
    println!("{} item(s) waiting:", items.len());
    for item in items {
        let region = item
            .region
            .as_deref()
            .map(|r| format!(" [{r}]"))
            .unwrap_or_default();
        println!(
            "  {} {}{}",
            dim.apply_to(&item.id),
            item.title,
            dim.apply_to(region)
        );
    }
}
