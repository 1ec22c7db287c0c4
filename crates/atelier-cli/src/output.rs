//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use atelier_api_models::{
    CourseSummary, Payout, ProductSummary, PromoCode, ReturnRequest, WorkshopSummary,
};
use atelier_console::Page;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::context::{CliError, CliResult};

/// Rendering hooks for one entity type, shared by the table and detail views.
pub(crate) trait Render {
    /// Column headers for the list view.
    fn header() -> &'static [&'static str];
    /// One list row, aligned with [`Render::header`].
    fn row(&self) -> Vec<String>;
    /// Label/value pairs for the detail view.
    fn detail(&self) -> Vec<(&'static str, String)>;
}

pub(crate) fn render_page<T: Render + Serialize>(
    page: &Page<T>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let body = json!({
                "items": page.items,
                "pagination": {"total": page.total_items, "pages": page.total_pages},
            });
            let text = serde_json::to_string_pretty(&body)
                .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
            println!("{text}");
        }
        OutputFormat::Table => {
            println!("{}", T::header().join("\t"));
            for item in &page.items {
                println!("{}", item.row().join("\t"));
            }
            println!(
                "{} item(s) across {} page(s)",
                page.total_items, page.total_pages
            );
        }
    }
    Ok(())
}

pub(crate) fn render_detail<T: Render + Serialize>(
    entity: &T,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let text = serde_json::to_string_pretty(entity)
                .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
            println!("{text}");
        }
        OutputFormat::Table => {
            for (label, value) in entity.detail() {
                println!("{label}: {value}");
            }
        }
    }
    Ok(())
}

/// Format a price in the smallest currency unit as dollars.
pub(crate) fn format_cents(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

impl Render for CourseSummary {
    fn header() -> &'static [&'static str] {
        &["ID", "STATUS", "PRICE", "LESSONS", "TITLE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.status.as_str().to_string(),
            format_cents(self.price_cents),
            self.lesson_count.to_string(),
            self.title.clone(),
        ]
    }

    fn detail(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("id", self.id.clone()),
            ("title", self.title.clone()),
            ("studio", self.studio_id.clone()),
            ("status", self.status.as_str().to_string()),
            ("price", format_cents(self.price_cents)),
            ("lessons", self.lesson_count.to_string()),
        ];
        if let Some(reason) = &self.rejection_reason {
            lines.push(("rejection reason", reason.clone()));
        }
        if let Some(submitted) = self.submitted_at {
            lines.push(("submitted", submitted.to_rfc3339()));
        }
        lines.push(("updated", self.updated_at.to_rfc3339()));
        lines
    }
}

impl Render for ProductSummary {
    fn header() -> &'static [&'static str] {
        &["ID", "STATUS", "PRICE", "STOCK", "TITLE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.status.as_str().to_string(),
            format_cents(self.price_cents),
            self.stock.to_string(),
            self.title.clone(),
        ]
    }

    fn detail(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("id", self.id.clone()),
            ("title", self.title.clone()),
            ("studio", self.studio_id.clone()),
            ("status", self.status.as_str().to_string()),
            ("price", format_cents(self.price_cents)),
            ("stock", self.stock.to_string()),
        ];
        if let Some(reason) = &self.rejection_reason {
            lines.push(("rejection reason", reason.clone()));
        }
        lines.push(("updated", self.updated_at.to_rfc3339()));
        lines
    }
}

impl Render for WorkshopSummary {
    fn header() -> &'static [&'static str] {
        &["ID", "STATUS", "STARTS", "SEATS", "TITLE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.status.as_str().to_string(),
            self.starts_at.to_rfc3339(),
            format!("{}/{}", self.seats_taken, self.capacity),
            self.title.clone(),
        ]
    }

    fn detail(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("id", self.id.clone()),
            ("title", self.title.clone()),
            ("studio", self.studio_id.clone()),
            ("status", self.status.as_str().to_string()),
            ("starts", self.starts_at.to_rfc3339()),
            ("seats", format!("{}/{}", self.seats_taken, self.capacity)),
        ];
        if let Some(reason) = &self.rejection_reason {
            lines.push(("rejection reason", reason.clone()));
        }
        lines.push(("updated", self.updated_at.to_rfc3339()));
        lines
    }
}

impl Render for PromoCode {
    fn header() -> &'static [&'static str] {
        &["ID", "STATE", "CODE", "OFF", "USED"]
    }

    fn row(&self) -> Vec<String> {
        let used = self.usage_limit.map_or_else(
            || self.times_used.to_string(),
            |limit| format!("{}/{limit}", self.times_used),
        );
        vec![
            self.id.clone(),
            self.display_state(Utc::now()).as_str().to_string(),
            self.code.clone(),
            format!("{}%", self.percent_off),
            used,
        ]
    }

    fn detail(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("id", self.id.clone()),
            ("code", self.code.clone()),
            (
                "state",
                self.display_state(Utc::now()).as_str().to_string(),
            ),
            ("discount", format!("{}%", self.percent_off)),
            ("starts", self.starts_at.to_rfc3339()),
        ];
        if let Some(ends) = self.ends_at {
            lines.push(("ends", ends.to_rfc3339()));
        }
        if let Some(limit) = self.usage_limit {
            lines.push(("usage", format!("{}/{limit}", self.times_used)));
        } else {
            lines.push(("usage", self.times_used.to_string()));
        }
        lines.push(("updated", self.updated_at.to_rfc3339()));
        lines
    }
}

impl Render for ReturnRequest {
    fn header() -> &'static [&'static str] {
        &["ID", "STATUS", "ORDER", "PRODUCT", "REASON"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.status.as_str().to_string(),
            self.order_id.clone(),
            self.product_id.clone(),
            self.customer_reason.clone(),
        ]
    }

    fn detail(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("id", self.id.clone()),
            ("order", self.order_id.clone()),
            ("product", self.product_id.clone()),
            ("status", self.status.as_str().to_string()),
            ("customer reason", self.customer_reason.clone()),
        ];
        if let Some(reason) = &self.rejection_reason {
            lines.push(("rejection reason", reason.clone()));
        }
        lines.push(("requested", self.requested_at.to_rfc3339()));
        lines
    }
}

impl Render for Payout {
    fn header() -> &'static [&'static str] {
        &["ID", "STATUS", "STUDIO", "AMOUNT", "SCHEDULED"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.status.as_str().to_string(),
            self.studio_id.clone(),
            format_cents(self.amount_cents),
            self.scheduled_for.to_rfc3339(),
        ]
    }

    fn detail(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("id", self.id.clone()),
            ("studio", self.studio_id.clone()),
            ("status", self.status.as_str().to_string()),
            ("amount", format_cents(self.amount_cents)),
            ("scheduled", self.scheduled_for.to_rfc3339()),
        ];
        if let Some(reason) = &self.rejection_reason {
            lines.push(("rejection reason", reason.clone()));
        }
        lines.push(("updated", self.updated_at.to_rfc3339()));
        lines
    }
}
