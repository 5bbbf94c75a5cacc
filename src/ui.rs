//! Interface de terminal do api2convert: spinners e saída colorida.
//!
//! Usa `indicatif` para o spinner e `console` para as cores. O
//! [`JobProgress`] acompanha um job enquanto o serviço o processa.

use std::time::Duration;

use api2convert::{ConvertError, Job, JobStatusCode, Output};
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

/// Indicador visual de progresso de um job no terminal.
///
/// Spinner animado durante a espera e mensagens coloridas para sucesso
/// (verde), falha (vermelho) e status intermediários (amarelo).
pub struct JobProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl JobProgress {
    /// Inicia o spinner com a descrição da operação.
    pub fn start(description: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(description.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Para o spinner e mostra o resumo do job.
    pub fn finish(&self, job: &Job) {
        self.pb.finish_and_clear();
        print_job(job, &self.green, &self.red, &self.yellow);
    }

    /// Para o spinner e mostra o erro.
    pub fn fail(&self, err: &ConvertError) {
        self.pb.finish_and_clear();
        println!("  {} {err}", self.red.apply_to("✗"));
    }
}

/// Imprime um job sem spinner (comandos `status` e `verify-callback`).
pub fn print_job_summary(job: &Job) {
    print_job(
        job,
        &Style::new().green().bold(),
        &Style::new().red().bold(),
        &Style::new().yellow(),
    );
}

fn print_job(job: &Job, green: &Style, red: &Style, yellow: &Style) {
    let code = job.status.code.as_str();
    let (mark, style) = match code.parse::<JobStatusCode>() {
        Ok(JobStatusCode::Completed) => ("✓", green),
        Ok(JobStatusCode::Failed) | Err(_) => ("✗", red),
        Ok(_) => ("…", yellow),
    };

    println!("  {} Job {} is {}", style.apply_to(mark), job.id, style.apply_to(code));
    if let Some(info) = job.status.info.as_deref().filter(|i| !i.is_empty()) {
        println!("    {info}");
    }
    print_outputs(&job.output);
}

/// Lista as saídas com URI e tamanho.
pub fn print_outputs(outputs: &[Output]) {
    for output in outputs {
        let uri = output.uri.as_deref().unwrap_or("-");
        match output.size {
            Some(size) => println!("    {} {uri} ({size} bytes)", output.id),
            None => println!("    {} {uri}", output.id),
        }
    }
}
