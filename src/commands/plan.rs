use anyhow::{Context, Result};

use stevedore::presentation::cli::PlanArgs;
use stevedore::presentation::output::{JsonRenderer, OutputFormat};
use stevedore::presentation::{create_reconcile_use_case, load_graph};

use super::Session;

pub fn plan(session: &Session, args: &PlanArgs) -> Result<()> {
    let options = args.options(session.base_options());
    let graph = load_graph(&args.project.graph)?;
    let use_case = create_reconcile_use_case(&args.project.state, session.events)?;
    let plan = use_case
        .plan(&graph, &options)
        .with_context(|| format!("plan failed for project '{}'", graph.project()))?;

    match session.format {
        OutputFormat::Json => {
            let json = JsonRenderer
                .render_plan(graph.project(), &plan)
                .context("failed to serialize plan")?;
            println!("{}", json);
        }
        OutputFormat::Text => print!("{}", session.text.render_plan(graph.project(), &plan)),
    }
    Ok(())
}
