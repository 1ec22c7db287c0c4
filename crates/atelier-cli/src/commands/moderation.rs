//! Status transition and removal handlers.
//!
//! Transitions are validated locally against the collection's workflow
//! before the request leaves the machine, so a forbidden transition or a
//! missing rejection reason fails fast with a validation error.

use std::sync::Arc;

use atelier_api_models::{Moderated, StatusAction};
use atelier_client::{Collection, CollectionApi};
use atelier_console::{ActionDispatcher, ActionTransport, WorkflowConfig};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cli::{ActionArgs, OutputFormat, RemoveArgs};
use crate::commands::catalog::with_collection;
use crate::context::{AppContext, CliError, CliResult};
use crate::output::{Render, render_detail};

pub(crate) async fn handle_action(ctx: &AppContext, args: ActionArgs) -> CliResult<()> {
    let action = StatusAction::parse(&args.action).ok_or_else(|| {
        CliError::validation(format!("unknown action '{}'", args.action))
    })?;

    match args.collection {
        Collection::Courses => {
            run_action(
                CollectionApi::courses(ctx.client.clone()),
                WorkflowConfig::content(),
                &args,
                action,
                ctx.output,
            )
            .await
        }
        Collection::Products => {
            run_action(
                CollectionApi::products(ctx.client.clone()),
                WorkflowConfig::content(),
                &args,
                action,
                ctx.output,
            )
            .await
        }
        Collection::Workshops => {
            run_action(
                CollectionApi::workshops(ctx.client.clone()),
                WorkflowConfig::content(),
                &args,
                action,
                ctx.output,
            )
            .await
        }
        Collection::Returns => {
            run_action(
                CollectionApi::returns(ctx.client.clone()),
                WorkflowConfig::fulfillment(),
                &args,
                action,
                ctx.output,
            )
            .await
        }
        Collection::Payouts => {
            run_action(
                CollectionApi::payouts(ctx.client.clone()),
                WorkflowConfig::fulfillment(),
                &args,
                action,
                ctx.output,
            )
            .await
        }
        Collection::PromoCodes => Err(CliError::validation(
            "promo codes have no status workflow; use `atelier edit` to change activation",
        )),
    }
}

async fn run_action<T>(
    api: CollectionApi<T>,
    workflow: WorkflowConfig,
    args: &ActionArgs,
    action: StatusAction,
    output: OutputFormat,
) -> CliResult<()>
where
    T: Moderated + Render + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    // Fetch first so the workflow check runs against the current status.
    let entity: T = api.fetch_one(&args.id).await?;

    if let Some(rule) = workflow.rule_for(entity.status_label(), action)
        && rule.requires_confirmation
        && !args.yes
    {
        return Err(CliError::validation(format!(
            "'{}' on {} is irreversible from here; re-run with --yes",
            action.as_str(),
            args.id
        )));
    }

    let dispatcher = ActionDispatcher::new(
        Arc::new(api) as Arc<dyn ActionTransport<T>>,
        workflow,
    );
    let updated = dispatcher
        .dispatch(&entity, action, args.reason.clone())
        .await?;

    println!(
        "{}/{} is now {}",
        args.collection,
        args.id,
        updated.status_label()
    );
    render_detail(&updated, output)
}

pub(crate) async fn handle_remove(ctx: &AppContext, args: RemoveArgs) -> CliResult<()> {
    if !args.yes {
        return Err(CliError::validation(format!(
            "removing {}/{} is permanent; re-run with --yes",
            args.collection, args.id
        )));
    }

    with_collection!(args.collection, ctx.client.clone(), |api| {
        run_remove(api, &args.id).await
    })?;
    println!("Deleted {}/{}", args.collection, args.id);
    Ok(())
}

async fn run_remove<T>(api: CollectionApi<T>, id: &str) -> CliResult<()>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    // Deletion is terminal rather than a transition, so the dispatcher
    // gets an empty rule set; only the single-flight slot applies.
    let dispatcher = ActionDispatcher::new(
        Arc::new(api) as Arc<dyn ActionTransport<T>>,
        WorkflowConfig::from_rules(Vec::new()),
    );
    dispatcher.dispatch_delete(id).await?;
    Ok(())
}
