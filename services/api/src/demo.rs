use crate::infra::load_session;
use chrono::{Local, NaiveDate};
use clap::Args;
use pim_avaliador::config::AppConfig;
use pim_avaliador::error::AppError;
use pim_avaliador::rubric::{
    Dimension, DimensionStatus, DiscussionMode, EvaluationSession, Identification,
    OralJustification, ScoreBreakdown, ScoreTable, ScoreTableRow, truncate_to,
};
use pim_avaliador::telemetry;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Evaluation snapshot (JSON) to render
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Output PDF path (defaults to APP_REPORT_DIR/PIM_<turma>_<empresa>.pdf)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Print the synthesized parecer after rendering
    #[arg(long)]
    pub(crate) print_narrative: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SummaryArgs {
    /// Evaluation snapshot (JSON) to summarize
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Emit the score table as CSV instead of the text summary
    #[arg(long)]
    pub(crate) csv: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Directory for the sample snapshot and report (defaults to APP_REPORT_DIR)
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
    /// Evaluation date printed on the sample report (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) evaluation_date: Option<NaiveDate>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        snapshot,
        output,
        print_narrative,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let mut session = load_session(&snapshot)?;
    let output = output
        .unwrap_or_else(|| config.report.output_dir.join(session.suggested_file_name()));
    let written = write_report(&mut session, &output)?;

    println!("Report written to {} ({} bytes)", output.display(), written);
    if print_narrative {
        println!("\nParecer resumido\n{}", session.compute_narrative());
    }
    Ok(())
}

pub(crate) fn run_summary(args: SummaryArgs) -> Result<(), AppError> {
    let session = load_session(&args.snapshot)?;

    if args.csv {
        let stdout = io::stdout();
        ScoreTable::from_record(session.record())
            .write_csv(stdout.lock())
            .map_err(io::Error::from)?;
        return Ok(());
    }

    render_summary(&session);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        output_dir,
        evaluation_date,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let output_dir = output_dir.unwrap_or(config.report.output_dir);
    let evaluation_date = evaluation_date.unwrap_or_else(|| Local::now().date_naive());

    println!("PIM evaluation demo");
    let mut session = demo_session(evaluation_date)?;
    render_summary(&session);

    fs::create_dir_all(&output_dir)?;
    let snapshot_path = output_dir.join("avaliacao_demo.json");
    fs::write(&snapshot_path, session.export_snapshot()?)?;
    println!("\nSnapshot written to {}", snapshot_path.display());

    let report_path = output_dir.join(session.suggested_file_name());
    let written = write_report(&mut session, &report_path)?;
    println!("Report written to {} ({} bytes)", report_path.display(), written);

    Ok(())
}

fn write_report(session: &mut EvaluationSession, output: &Path) -> Result<usize, AppError> {
    let bytes = session.render_document()?;
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, &bytes)?;
    info!(path = %output.display(), bytes = bytes.len(), "report written");
    Ok(bytes.len())
}

pub(crate) fn demo_session(evaluation_date: NaiveDate) -> Result<EvaluationSession, AppError> {
    let mut session = EvaluationSession::new();
    session.set_identification(Identification {
        course: "Logística".to_string(),
        class_code: "LG3P01".to_string(),
        pim: "III".to_string(),
        group: "07".to_string(),
        organization: "Transportes Aurora".to_string(),
        professor: "Profa. Helena Duarte".to_string(),
        evaluation_date: Some(evaluation_date),
    });

    let scores = [
        (Dimension::Presentation, 1.0, DimensionStatus::Yes),
        (Dimension::Introduction, 1.0, DimensionStatus::Yes),
        (Dimension::Development, 2.0, DimensionStatus::Partial),
        (Dimension::Discussion, 2.0, DimensionStatus::Partial),
        (Dimension::Conclusion, 0.5, DimensionStatus::No),
        (Dimension::References, 1.0, DimensionStatus::Yes),
    ];
    for (dimension, score, status) in scores {
        session.set_dimension_score(dimension, score)?;
        session.set_dimension_status(dimension, status);
    }

    session.set_dimension_observations(
        Dimension::Development,
        &["Desenvolvimento parcial, com bom conteúdo mas faltam aplicações práticas"],
        None,
    )?;
    session.set_dimension_observations(
        Dimension::Discussion,
        &["Ausência de dados e análise crítica do problema"],
        Some(DiscussionMode::Problem),
    )?;
    session.set_dimension_observations(
        Dimension::Discussion,
        &["Solução pertinente, mas com detalhamento limitado"],
        Some(DiscussionMode::Solution),
    )?;
    session.set_dimension_observations(
        Dimension::Conclusion,
        &["Conclusão genérica sem síntese dos achados"],
        None,
    )?;
    session.set_dimension_comment(
        Dimension::Conclusion,
        "Retomar os objetivos específicos\nIndicar limitações do estudo",
    );
    session.set_oral_score(2.0, OralJustification::Presented)?;
    session.set_selected_recommendations(&["Revisar citações e eliminar fontes inadequadas"])?;
    session.set_additional_comments("Entregar a versão revisada na próxima aula.");

    Ok(session)
}

fn render_summary(session: &EvaluationSession) {
    let record = session.record();
    let identification = &record.identification;
    let breakdown = session.compute_breakdown();

    println!(
        "Turma {} | Grupo {} | {}",
        identification.class_code, identification.group, identification.organization
    );
    if let Some(date) = identification.evaluation_date {
        println!("Avaliação em {}", date.format("%d/%m/%Y"));
    }

    println!("\nDimensões");
    for row in &ScoreTable::from_record(record).rows {
        println!("{}", dimension_line(row));
    }

    println!("\n{}", grades_line(&breakdown, record.oral_justification));

    println!("\nRecomendações");
    for recommendation in session.document_recommendations() {
        println!("- {}", recommendation);
    }
}

/// Scores are truncated to one decimal, matching the report and the parecer.
fn dimension_line(row: &ScoreTableRow) -> String {
    format!(
        "- {:<24} {:>4.1}/{:.1} ({})",
        row.label,
        truncate_to(row.assigned, 1),
        row.max_score,
        row.status
    )
}

fn grades_line(breakdown: &ScoreBreakdown, justification: OralJustification) -> String {
    format!(
        "Nota objetiva: {:.1} | Parte escrita: {:.2} | Parte oral: {:.1} ({}) | Nota final: {:.2}",
        breakdown.objective_display(),
        breakdown.weighted_rounded(),
        truncate_to(breakdown.oral, 1),
        justification.label(),
        breakdown.total_rounded()
    )
}
