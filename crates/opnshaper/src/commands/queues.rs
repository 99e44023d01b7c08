//! Queue command handlers.

use tabled::Tabled;

use opnshaper_core::{EntityKind, EntitySummary, Queue, Shaper};

use crate::cli::{EntityArgs, EntityCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct QueueRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Pipe")]
    pipe: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl QueueRow {
    fn new(s: &EntitySummary) -> Self {
        Self {
            id: s.id.to_string(),
            enabled: output::yes_no(s.enabled),
            pipe: s.column("pipe").unwrap_or_else(|| "-".into()),
            weight: s.column("weight").unwrap_or_else(|| "-".into()),
            description: s.description.clone(),
        }
    }
}

fn detail(q: &Queue) -> String {
    [
        format!("Enabled:     {}", q.enabled),
        format!("Pipe:        {}", q.pipe),
        format!("Weight:      {}", q.weight),
        format!("Mask:        {}", q.mask),
        format!("Buckets:     {}", output::sentinel(q.buckets)),
        format!(
            "CoDel:       {} (target {}, interval {}, ecn {})",
            q.codel.enabled,
            output::sentinel(q.codel.target),
            output::sentinel(q.codel.interval),
            q.codel.ecn
        ),
        format!("PIE:         {}", q.pie),
        format!("Description: {}", output::or_dash(&q.description)),
    ]
    .join("\n")
}

pub async fn handle(
    shaper: &Shaper,
    args: EntityArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        EntityCommand::List => {
            let rows = shaper.list_queues().await?;
            let out = output::render_list(
                &global.output,
                &rows,
                QueueRow::new,
                |s| s.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntityCommand::Get { id } => {
            let id = util::entity_id(&id)?;
            let queue = shaper.read_queue(&id).await?;
            let out = output::render_single(&global.output, &queue, detail, |_| id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntityCommand::Create { from_file } => {
            let queue: Queue = util::read_document(&from_file)?;
            let applied = shaper.create_queue(&queue).await?;
            util::report_applied(
                &applied,
                &format!("queue {} created on pipe {}", applied.output, queue.pipe),
                global,
            );
            output::print_output(applied.output.as_str(), global.quiet);
            Ok(())
        }

        EntityCommand::Update { id, from_file } => {
            let id = util::entity_id(&id)?;
            let queue: Queue = util::read_document(&from_file)?;
            let applied = shaper.update_queue(&id, &queue).await?;
            util::report_applied(&applied, &format!("queue {id} updated"), global);
            Ok(())
        }

        EntityCommand::Delete { id } => {
            util::delete_entity(EntityKind::Queue, &id, global, |id| async move {
                shaper.delete_queue(&id).await
            })
            .await
        }
    }
}
