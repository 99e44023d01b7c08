//! Pipe command handlers.

use tabled::Tabled;

use opnshaper_core::{EntityKind, EntitySummary, Pipe, Shaper};

use crate::cli::{EntityArgs, EntityCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PipeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Bandwidth")]
    bandwidth: String,
    #[tabled(rename = "Mask")]
    mask: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl PipeRow {
    fn new(s: &EntitySummary) -> Self {
        let bandwidth = match (s.column("bandwidth"), s.column("bandwidthMetric")) {
            (Some(value), Some(metric)) => format!("{value} {metric}/s"),
            (Some(value), None) => value,
            _ => "-".into(),
        };
        Self {
            id: s.id.to_string(),
            enabled: output::yes_no(s.enabled),
            bandwidth,
            mask: s.column("mask").unwrap_or_else(|| "-".into()),
            description: s.description.clone(),
        }
    }
}

fn detail(p: &Pipe) -> String {
    [
        format!("Enabled:     {}", p.enabled),
        format!("Bandwidth:   {} {}/s", p.bandwidth.value, p.bandwidth.metric),
        format!("Scheduler:   {}", p.scheduler),
        format!("Mask:        {}", p.mask),
        format!("Queue:       {}", output::sentinel(p.queue)),
        format!("Buckets:     {}", output::sentinel(p.buckets)),
        format!("Delay (ms):  {}", output::sentinel(p.delay)),
        format!(
            "CoDel:       {} (target {}, interval {}, ecn {})",
            p.codel.enabled,
            output::sentinel(p.codel.target),
            output::sentinel(p.codel.interval),
            p.codel.ecn
        ),
        format!(
            "FQ-CoDel:    quantum {}, limit {}, flows {}",
            output::sentinel(p.codel.quantum),
            output::sentinel(p.codel.limit),
            output::sentinel(p.codel.flows)
        ),
        format!("PIE:         {}", p.pie),
        format!("Description: {}", output::or_dash(&p.description)),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    shaper: &Shaper,
    args: EntityArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        EntityCommand::List => {
            let rows = shaper.list_pipes().await?;
            let out = output::render_list(
                &global.output,
                &rows,
                PipeRow::new,
                |s| s.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntityCommand::Get { id } => {
            let id = util::entity_id(&id)?;
            let pipe = shaper.read_pipe(&id).await?;
            let out = output::render_single(&global.output, &pipe, detail, |_| id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntityCommand::Create { from_file } => {
            let pipe: Pipe = util::read_document(&from_file)?;
            let applied = shaper.create_pipe(&pipe).await?;
            util::report_applied(&applied, &format!("pipe {} created", applied.output), global);
            output::print_output(applied.output.as_str(), global.quiet);
            Ok(())
        }

        EntityCommand::Update { id, from_file } => {
            let id = util::entity_id(&id)?;
            let pipe: Pipe = util::read_document(&from_file)?;
            let applied = shaper.update_pipe(&id, &pipe).await?;
            util::report_applied(&applied, &format!("pipe {id} updated"), global);
            Ok(())
        }

        EntityCommand::Delete { id } => {
            util::delete_entity(EntityKind::Pipe, &id, global, |id| async move {
                shaper.delete_pipe(&id).await
            })
            .await
        }
    }
}
