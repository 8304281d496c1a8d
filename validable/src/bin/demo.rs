//! Walkthrough of the validable API.
//!
//! Builds the usual pipelines (plain chaining, named steps, recovery, status
//! checks, reshaped failures) and logs what each one resolves to.

use clap::Parser;
use serde_json::{Value, json};
use validable::{
    FailureHandlers, MatchArms, Step, StepSpec, ValidableResult, create, init_logging,
    reset_failure_transformer, set_failure_transformer, step_fn, sync_step,
};

#[derive(Debug, Parser)]
#[command(name = "validable-demo", about = "Run example validable pipelines")]
struct Args {
    /// Tracing filter directives (overrides VALIDABLE_LOG)
    #[arg(long)]
    log: Option<String>,

    /// Skip the failure transformer section
    #[arg(long)]
    skip_transformer: bool,
}

fn int(value: &Value) -> i64 {
    value.as_i64().unwrap_or_default()
}

fn add_one() -> impl Step {
    sync_step(|v, _| Ok(json!(int(&v) + 1)))
}

fn add_n(n: i64) -> impl Step {
    sync_step(move |v, _| Ok(json!(int(&v) + n)))
}

fn duplicate() -> impl Step {
    sync_step(|v, _| Ok(json!(int(&v) * 2)))
}

fn multiply_n(n: i64) -> impl Step {
    sync_step(move |v, _| Ok(json!(int(&v) * n)))
}

fn fail() -> impl Step {
    step_fn(|_, _| async { Err(json!("error")) })
}

#[tokio::main]
async fn main() -> ValidableResult<()> {
    let args = Args::parse();
    init_logging(args.log.as_deref());

    let base = create(10);

    let incremented = base.chain(add_one());
    tracing::info!(result = %incremented.value().await, "chain");

    let folded = base.mchain(vec![
        StepSpec::new(add_one()),
        StepSpec::new(add_n(5)),
        StepSpec::new(duplicate()),
        StepSpec::new(multiply_n(4)),
        StepSpec::new(sync_step(|v, _| Ok(json!(v == json!(128))))),
    ]);
    tracing::info!(result = %folded.value().await, "mchain");

    let named = base
        .chain_named("incremented", add_one())
        .chain_named("duplicated", duplicate())
        .chain(sync_step(|_, bag| {
            Ok(json!(int(&bag["incremented"]) + int(&bag["duplicated"])))
        }));
    tracing::info!(result = %named.value().await, "named steps");

    let checked = base
        .chain(add_one())
        .match_with(MatchArms::new().on_success(|v, _| json!(v == json!(11))))
        .await;
    tracing::info!(result = %checked, "match");

    let recovered = base
        .chain(fail())
        .chain(multiply_n(10))
        .or_else(sync_step(|_, _| Ok(json!(100))));
    tracing::info!(result = %recovered.value().await, "or_else recovers");

    let untouched = base
        .chain(multiply_n(5))
        .or_else(sync_step(|_, _| Ok(json!(1))));
    tracing::info!(result = %untouched.value().await, "or_else skipped");

    let failed = base.chain(fail());
    tracing::info!(
        valid = failed.is_valid().await,
        invalid = failed.is_invalid().await,
        rendered = %failed.render().await,
        "status"
    );

    base.chain(duplicate())
        .tap(|v, bag| tracing::info!(value = %v, steps = bag.len(), "tap"))?
        .chain(add_one())
        .for_each(|v, _| tracing::info!(value = %v, "for_each"))?
        .await
        .ok();

    if !args.skip_transformer {
        set_failure_transformer(
            FailureHandlers::new()
                .field("code", |e| json!(format!("ERR:{}", e.as_str().unwrap_or_default()))),
        );
        let shaped = base.chain(fail());
        tracing::info!(result = %shaped.value().await, "failure transformer");
        reset_failure_transformer();
    }

    Ok(())
}
