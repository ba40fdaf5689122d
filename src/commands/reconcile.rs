use anyhow::{Context, Result};

use stevedore::presentation::cli::{DownArgs, ProjectArgs, UpArgs};
use stevedore::presentation::output::{JsonRenderer, OutputFormat};
use stevedore::presentation::{create_reconcile_use_case, load_graph};
use stevedore::{DesiredState, ExecutionResult, ReconcileOptions};

use super::Session;

pub fn up(session: &Session, args: &UpArgs) -> Result<()> {
    let options = args.options(session.base_options());
    run(session, &args.project, DesiredState::Present, &options)
}

pub fn down(session: &Session, args: &DownArgs) -> Result<()> {
    let options = args.options(session.base_options());
    run(session, &args.project, DesiredState::Absent, &options)
}

fn run(
    session: &Session,
    project: &ProjectArgs,
    desired: DesiredState,
    options: &ReconcileOptions,
) -> Result<()> {
    let graph = load_graph(&project.graph)?;
    let use_case = create_reconcile_use_case(&project.state, session.events)?;
    let result = use_case
        .reconcile(&graph, desired, options)
        .with_context(|| format!("{} failed for project '{}'", desired, graph.project()))?;
    print_result(session, graph.project(), desired, options.dry_run, &result)
}

fn print_result(
    session: &Session,
    project: &str,
    desired: DesiredState,
    dry_run: bool,
    result: &ExecutionResult,
) -> Result<()> {
    match session.format {
        OutputFormat::Json => {
            let json = JsonRenderer
                .render_result(result)
                .context("failed to serialize result")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            print!("{}", session.text.render_result(project, desired, dry_run, result));
        }
    }
    Ok(())
}
