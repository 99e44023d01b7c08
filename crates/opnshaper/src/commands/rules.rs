//! Rule command handlers.

use tabled::Tabled;

use opnshaper_core::{EntityKind, EntitySummary, Rule, Shaper, StringSet};

use crate::cli::{EntityArgs, EntityCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Seq")]
    sequence: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Proto")]
    proto: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl RuleRow {
    fn new(s: &EntitySummary) -> Self {
        let col = |name: &str| s.column(name).unwrap_or_else(|| "-".into());
        Self {
            id: s.id.to_string(),
            sequence: col("sequence"),
            enabled: output::yes_no(s.enabled),
            interface: col("interface"),
            proto: col("proto"),
            source: col("source"),
            destination: col("destination"),
            target: col("target"),
            description: s.description.clone(),
        }
    }
}

fn negated(set: &StringSet, not: bool) -> String {
    if not { format!("not {set}") } else { set.to_string() }
}

fn detail(r: &Rule) -> String {
    let interfaces = if r.interface2.is_empty() {
        r.interface.clone()
    } else {
        format!("{}, {}", r.interface, r.interface2)
    };
    let dscp = if r.dscp.is_empty() {
        "any".into()
    } else {
        r.dscp.to_string()
    };
    [
        format!("Enabled:     {}", r.enabled),
        format!("Sequence:    {}", r.sequence),
        format!("Interfaces:  {interfaces}"),
        format!("Protocol:    {}", r.protocol),
        format!("Max length:  {}", output::sentinel(r.max_packet_length)),
        format!(
            "Source:      {} port {}",
            negated(&r.sources, r.source_not),
            r.source_port
        ),
        format!(
            "Destination: {} port {}",
            negated(&r.destinations, r.destination_not),
            r.destination_port
        ),
        format!("DSCP:        {dscp}"),
        format!("Direction:   {}", r.direction),
        format!("Target:      {}", r.target),
        format!("Description: {}", output::or_dash(&r.description)),
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
            let rows = shaper.list_rules().await?;
            let out = output::render_list(
                &global.output,
                &rows,
                RuleRow::new,
                |s| s.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntityCommand::Get { id } => {
            let id = util::entity_id(&id)?;
            let rule = shaper.read_rule(&id).await?;
            let out = output::render_single(&global.output, &rule, detail, |_| id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntityCommand::Create { from_file } => {
            let rule: Rule = util::read_document(&from_file)?;
            let applied = shaper.create_rule(&rule).await?;
            util::report_applied(
                &applied,
                &format!("rule {} created targeting {}", applied.output, rule.target),
                global,
            );
            output::print_output(applied.output.as_str(), global.quiet);
            Ok(())
        }

        EntityCommand::Update { id, from_file } => {
            let id = util::entity_id(&id)?;
            let rule: Rule = util::read_document(&from_file)?;
            let applied = shaper.update_rule(&id, &rule).await?;
            util::report_applied(&applied, &format!("rule {id} updated"), global);
            Ok(())
        }

        EntityCommand::Delete { id } => {
            util::delete_entity(EntityKind::Rule, &id, global, |id| async move {
                shaper.delete_rule(&id).await
            })
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn row_fills_missing_columns_with_dash() {
        let summary = EntitySummary {
            id: "r1".into(),
            enabled: true,
            description: "voip".into(),
            columns: json!({ "sequence": 10, "interface": "wan", "target": "voice queue" })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        };
        let rows: Vec<RuleRow> = std::slice::from_ref(&summary).iter().map(RuleRow::new).collect();

        let row = &rows[0];
        assert_eq!(row.id, "r1");
        assert_eq!(row.sequence, "10");
        assert_eq!(row.enabled, "yes");
        assert_eq!(row.interface, "wan");
        assert_eq!(row.target, "voice queue");
        assert_eq!(row.proto, "-");
        assert_eq!(row.source, "-");
    }
}
