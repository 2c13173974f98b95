use crate::lib::{error, parse, plan::Plan};

/// Read and validate the plan stored in `filename`
///
/// Caller should print `errs` whether or not a plan is returned.
pub fn read_plan(filename: &str, errs: &mut error::Record) -> Option<Plan> {
    let contents = match std::fs::read_to_string(filename) {
        Ok(contents) => contents,
        Err(e) => {
            error::Error::new("File not found")
                .with_text(format!("Plan file is '{}'", filename))
                .with_text(e)
                .with_hint("create the file or pass the path of an existing plan")
                .register(errs);
            return None;
        }
    };
    let plan = parse::extract(filename, errs, &contents);
    if let Some(plan) = &plan {
        tracing::debug!(
            workspace = %plan.workspace,
            project = %plan.project,
            months = plan.months.len(),
            "loaded plan from {}",
            filename
        );
    }
    plan
}
