use crate::{emit_success, OutputMode};
use owo_colors::OwoColorize;
use shopit::draft::StockDraft;
use shopit::ui::{self, banner, section, success, Icons};
use shopit::{Column, Filter, ListQuery, StockFields, StockService, StockType};
use shopit::config::ShopitConfig;

/// Everything a subcommand needs once the store is open
pub struct Context {
    pub service: StockService,
    pub config: ShopitConfig,
    pub output: OutputMode,
}

impl Context {
    /// Accept a full identifier or a bare item id
    pub fn resource(&self, raw: Option<&str>) -> String {
        let collection = self.service.gateway().collection_uri();
        match raw {
            None => collection.to_uri_string(),
            Some(id) if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) => {
                format!("{}/{}", collection, id)
            }
            Some(other) => other.to_string(),
        }
    }
}

pub fn run_version(output_mode: OutputMode) -> anyhow::Result<()> {
    if output_mode.is_human() {
        banner(
            &format!("{}", "ShopIt".bold().style(ui::theme().accent.clone())),
            &format!("Version {}", env!("CARGO_PKG_VERSION").bold())
        );
    } else {
        let data = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
        });
        emit_success(output_mode, "version", data)?;
    }
    Ok(())
}

pub async fn run_add(ctx: &Context, draft: StockDraft) -> anyhow::Result<()> {
    let fields = draft.into_fields(ctx.config.image_policy())?;
    let uri = ctx.service.create(ctx.resource(None), fields).await?;

    if ctx.output.is_human() {
        success(&format!("Stock saved as {}", uri));
    } else {
        emit_success(ctx.output, "add", serde_json::json!({ "uri": uri }))?;
    }
    Ok(())
}

pub async fn run_list(
    ctx: &Context,
    resource: Option<&str>,
    columns: &[String],
    filter: Option<Filter>,
    order: Option<String>,
) -> anyhow::Result<()> {
    let resource = ctx.resource(resource);
    let columns = columns
        .iter()
        .map(|c| c.parse::<Column>())
        .collect::<shopit::Result<Vec<_>>>()?;

    let mut query = ListQuery::all().columns(&columns);
    query.filter = filter;
    query.order = order;
    let rows = ctx.service.list(resource.clone(), query).await?;

    if !ctx.output.is_human() {
        return emit_success(ctx.output, "list", serde_json::json!({
            "resource": resource,
            "rows": rows.to_json(),
        }));
    }

    if rows.is_empty() {
        println!("{} No stock found at {}.", Icons::EMPTY, resource);
    } else {
        ui::header(&format!("{} record(s) at {}", rows.len(), resource));
        println!("{}", ui::stock_table(&rows));
    }
    Ok(())
}

pub struct UpdateArgs {
    pub name: Option<String>,
    pub supplier: Option<String>,
    pub stock_type: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<i64>,
    pub image: Option<String>,
}

impl UpdateArgs {
    fn into_fields(self) -> anyhow::Result<StockFields> {
        let mut fields = StockFields::new();
        if let Some(name) = self.name {
            fields = fields.name(name);
        }
        if let Some(supplier) = self.supplier {
            fields = fields.supplier(supplier);
        }
        if let Some(raw) = self.stock_type {
            fields = fields.stock_type(raw.parse::<StockType>()?);
        }
        if let Some(quantity) = self.quantity {
            fields = fields.quantity(quantity);
        }
        if let Some(price) = self.price {
            fields = fields.price(price);
        }
        if let Some(image) = self.image {
            fields = fields.image(image);
        }
        Ok(fields)
    }
}

pub async fn run_update(ctx: &Context, resource: &str, args: UpdateArgs, filter: Option<Filter>) -> anyhow::Result<()> {
    let resource = ctx.resource(Some(resource));
    let fields = args.into_fields()?;
    if fields.is_empty() {
        ui::warn("Nothing to update, pass at least one field");
    }
    let rows = ctx.service.update(resource.clone(), fields, filter).await?;

    if ctx.output.is_human() {
        if rows == 0 {
            ui::warn(&format!("No stock updated at {}", resource));
        } else {
            success(&format!("Updated {} record(s)", rows));
        }
    } else {
        emit_success(ctx.output, "update", serde_json::json!({ "resource": resource, "updated": rows }))?;
    }
    Ok(())
}

pub async fn run_delete(ctx: &Context, resource: &str, filter: Option<Filter>) -> anyhow::Result<()> {
    let resource = ctx.resource(Some(resource));
    let rows = ctx.service.delete(resource.clone(), filter).await?;

    if ctx.output.is_human() {
        if rows == 0 {
            println!("{} Nothing deleted at {}.", Icons::EMPTY, resource);
        } else {
            success(&format!("Deleted {} record(s)", rows));
        }
    } else {
        emit_success(ctx.output, "delete", serde_json::json!({ "resource": resource, "deleted": rows }))?;
    }
    Ok(())
}

pub async fn run_sell(ctx: &Context, resource: &str) -> anyhow::Result<()> {
    let resource = ctx.resource(Some(resource));
    let Some(outcome) = ctx.service.record_sale(resource.clone()).await? else {
        anyhow::bail!("No stock at {}", resource);
    };

    if !ctx.output.is_human() {
        return emit_success(ctx.output, "sell", serde_json::to_value(outcome)?);
    }

    if outcome.sold {
        success(&format!("{} Sold one unit, {} left", Icons::CART, outcome.quantity));
    } else {
        ui::warn("Out of stock, nothing sold");
    }
    Ok(())
}

pub async fn run_seed(ctx: &Context) -> anyhow::Result<()> {
    let uri = ctx.service.insert_sample().await?;
    if ctx.output.is_human() {
        success(&format!("Inserted sample stock {}", uri));
    } else {
        emit_success(ctx.output, "seed", serde_json::json!({ "uri": uri }))?;
    }
    Ok(())
}

pub async fn run_stats(ctx: &Context) -> anyhow::Result<()> {
    let stats = ctx.service.stats().await?;

    if !ctx.output.is_human() {
        return emit_success(ctx.output, "stats", serde_json::to_value(stats)?);
    }

    section(&format!(" {} Inventory ", Icons::STATS));
    let records = stats.records.to_string();
    let units = stats.units.to_string();
    let value = stats.value.to_string();
    println!(
        "{}",
        ui::stats_table(&[("Records", &records), ("Units in stock", &units), ("Stock value", &value)])
    );
    Ok(())
}

/// Print applied mutations as they are confirmed
pub fn watch_changes(ctx: &Context) {
    if !ctx.output.is_human() {
        return;
    }
    let collection = ctx.service.gateway().collection_uri();
    ctx.service
        .gateway()
        .notifier()
        .subscribe(collection, |event| {
            ui::change(event.kind, &event.resource.to_uri_string());
        });
}
