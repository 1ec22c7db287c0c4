//! Read and write handlers for the collection catalog.

use std::fs;

use anyhow::{Context, anyhow};
use atelier_client::{Collection, CollectionApi};
use atelier_console::{CollectionFetcher, ListQuery, StatusFilter};
use serde_json::Value;

use crate::cli::{CreateArgs, EditArgs, ListArgs, OutputFormat, ShowArgs};
use crate::context::{AppContext, CliError, CliResult};
use crate::output::{Render, render_detail, render_page};

/// Run `$body` with `$api` bound to the typed handle for `$collection`.
macro_rules! with_collection {
    ($collection:expr, $client:expr, |$api:ident| $body:expr) => {
        match $collection {
            Collection::Courses => {
                let $api = CollectionApi::courses($client);
                $body
            }
            Collection::Products => {
                let $api = CollectionApi::products($client);
                $body
            }
            Collection::Workshops => {
                let $api = CollectionApi::workshops($client);
                $body
            }
            Collection::PromoCodes => {
                let $api = CollectionApi::promo_codes($client);
                $body
            }
            Collection::Returns => {
                let $api = CollectionApi::returns($client);
                $body
            }
            Collection::Payouts => {
                let $api = CollectionApi::payouts($client);
                $body
            }
        }
    };
}
pub(crate) use with_collection;

pub(crate) async fn handle_list(ctx: &AppContext, args: ListArgs) -> CliResult<()> {
    let query = build_query(&args);
    with_collection!(args.collection, ctx.client.clone(), |api| {
        let page = api.fetch(&query).await?;
        render_page(&page, ctx.output)
    })
}

pub(crate) async fn handle_show(ctx: &AppContext, args: ShowArgs) -> CliResult<()> {
    with_collection!(args.collection, ctx.client.clone(), |api| {
        let entity = api.fetch_one(&args.id).await?;
        render_detail(&entity, ctx.output)
    })
}

pub(crate) async fn handle_create(ctx: &AppContext, args: CreateArgs) -> CliResult<()> {
    let payload = read_payload(&args.file)?;
    with_collection!(args.collection, ctx.client.clone(), |api| {
        let entity = api.create(&payload).await?;
        summarize("Created", args.collection, &entity, ctx.output)
    })
}

pub(crate) async fn handle_edit(ctx: &AppContext, args: EditArgs) -> CliResult<()> {
    let payload = read_payload(&args.file)?;
    with_collection!(args.collection, ctx.client.clone(), |api| {
        let entity = if args.replace {
            api.replace(&args.id, &payload).await?
        } else {
            api.update(&args.id, &payload).await?
        };
        summarize("Updated", args.collection, &entity, ctx.output)
    })
}

fn summarize<T: Render + serde::Serialize + atelier_api_models::Identified>(
    verb: &str,
    collection: Collection,
    entity: &T,
    output: OutputFormat,
) -> CliResult<()> {
    println!("{verb} {collection}/{}", entity.entity_id());
    render_detail(entity, output)
}

fn build_query(args: &ListArgs) -> ListQuery {
    ListQuery {
        page: args.page.max(1),
        page_size: args.limit.max(1),
        search: args.search.clone().unwrap_or_default(),
        status: args
            .status
            .clone()
            .map_or(StatusFilter::All, StatusFilter::Only),
        sort: args.sort.clone(),
    }
}

fn read_payload(path: &std::path::Path) -> CliResult<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .map_err(CliError::failure)?;
    serde_json::from_str(&text)
        .map_err(|err| CliError::failure(anyhow!("payload is not valid JSON: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn context_for(server: &MockServer) -> AppContext {
        AppContext::new(
            server.base_url().parse().expect("mock server URL"),
            None,
            15,
            "trace",
            OutputFormat::Table,
        )
        .expect("context")
    }

    fn course_json(id: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Watercolor Basics",
            "studio_id": "std_1",
            "price_cents": 4900,
            "lesson_count": 12,
            "status": status,
            "updated_at": "2026-08-01T10:00:00Z",
        })
    }

    fn temp_payload(name: &str, contents: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "atelier-cli-test-{}-{name}",
            std::process::id()
        ));
        fs::write(&path, contents).expect("write payload");
        path
    }

    #[tokio::test]
    async fn ls_fetches_with_the_requested_filters() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/admin/courses")
                .query_param("page", "3")
                .query_param("limit", "10")
                .query_param("status", "pending");
            then.status(200).json_body(json!({
                "items": [course_json("crs_21", "pending")],
                "pagination": {"total": 21, "pages": 3},
            }));
        });

        let ctx = context_for(&server);
        handle_list(
            &ctx,
            ListArgs {
                collection: Collection::Courses,
                page: 3,
                limit: 10,
                search: None,
                status: Some("pending".to_string()),
                sort: None,
            },
        )
        .await
        .expect("list should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn show_surfaces_missing_entities_as_failures() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/admin/payouts/ghost");
            then.status(404).json_body(json!({"error": "payout not found"}));
        });

        let ctx = context_for(&server);
        let err = handle_show(
            &ctx,
            ShowArgs {
                collection: Collection::Payouts,
                id: "ghost".to_string(),
            },
        )
        .await
        .expect_err("missing entity should fail");
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn create_posts_the_payload_file() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/admin/courses")
                .json_body(json!({"title": "Watercolor Basics", "price_cents": 4900}));
            then.status(201).json_body(course_json("crs_9", "draft"));
        });

        let ctx = context_for(&server);
        let path = temp_payload(
            "create.json",
            r#"{"title": "Watercolor Basics", "price_cents": 4900}"#,
        );
        handle_create(
            &ctx,
            CreateArgs {
                collection: Collection::Courses,
                file: path.clone(),
            },
        )
        .await
        .expect("create should succeed");
        mock.assert();
        let _ = fs::remove_file(path);
    }

    #[tokio::test]
    async fn edit_patches_unless_replace_is_requested() {
        let server = MockServer::start_async().await;
        let patch = server.mock(|when, then| {
            when.method(httpmock::Method::PATCH)
                .path("/api/admin/courses/crs_1");
            then.status(200).json_body(course_json("crs_1", "draft"));
        });
        let put = server.mock(|when, then| {
            when.method(httpmock::Method::PUT)
                .path("/api/admin/courses/crs_1");
            then.status(200).json_body(course_json("crs_1", "draft"));
        });

        let ctx = context_for(&server);
        let path = temp_payload("edit.json", r#"{"price_cents": 5900}"#);

        handle_edit(
            &ctx,
            EditArgs {
                collection: Collection::Courses,
                id: "crs_1".to_string(),
                file: path.clone(),
                replace: false,
            },
        )
        .await
        .expect("patch should succeed");
        patch.assert();
        put.assert_calls(0);

        handle_edit(
            &ctx,
            EditArgs {
                collection: Collection::Courses,
                id: "crs_1".to_string(),
                file: path.clone(),
                replace: true,
            },
        )
        .await
        .expect("replace should succeed");
        put.assert();
        let _ = fs::remove_file(path);
    }

    #[test]
    fn payload_files_must_hold_valid_json() {
        let path = temp_payload("broken.json", "{not json");
        let err = read_payload(&path).expect_err("invalid JSON should fail");
        assert_eq!(err.exit_code(), 3);
        let _ = fs::remove_file(path);
    }
}
