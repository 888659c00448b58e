use std::fs;
use std::io::Write;

use anyhow::{Context, Result};
use tasklist_app::{TaskStore, ViewSession};
use tasklist_core::TaskRecord;
use tasklist_store::TierStatus;

use crate::Command;

/// Execute one subcommand against `store`, writing human output to `out`.
pub async fn run(
    command: Command,
    store: &mut TaskStore,
    session: &mut ViewSession,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Add { label, due } => {
            let record = store.add(&label, due.as_deref())?;
            writeln!(out, "added task {}: {}", record.id, record.label)?;
        }
        Command::Toggle { id } => {
            let record = store.toggle(id)?;
            let state = if record.completed { "done" } else { "open" };
            writeln!(out, "task {id} is now {state}")?;
        }
        Command::Rm { id } => {
            let record = store.remove(id)?;
            writeln!(out, "removed task {id}: {}", record.label)?;
        }
        Command::Rename { id, label } => {
            let record = store.rename(id, &label)?;
            writeln!(out, "renamed task {id}: {}", record.label)?;
        }
        Command::Due { id, date } => {
            let record = store.set_due_date(id, date.as_deref())?;
            match record.due_date {
                Some(due) => writeln!(out, "task {id} due {due}")?,
                None => writeln!(out, "task {id} has no due date")?,
            }
        }
        Command::Ls {
            query,
            filter,
            sort,
        } => {
            if let Some(query) = query {
                session.set_query(query);
            }
            if let Some(filter) = filter {
                session.set_filter(filter).await;
            }
            if let Some(sort) = sort {
                session.set_sort(sort).await;
            }
            let visible = store.view(session.state());
            if visible.is_empty() {
                writeln!(out, "no tasks")?;
            }
            for record in &visible {
                writeln!(out, "{}", format_record(record))?;
            }
        }
        Command::CompleteAll => {
            let total = store.mark_all_complete();
            writeln!(out, "marked all complete ({total} tasks)")?;
        }
        Command::ClearCompleted => {
            let removed = store.clear_completed();
            writeln!(out, "removed {removed} completed tasks")?;
        }
        Command::Import { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let imported = store.import_json(&text)?;
            writeln!(out, "imported {imported} tasks")?;
        }
        Command::Export { file } => {
            let json = store.export_json()?;
            match file {
                Some(path) => {
                    fs::write(&path, format!("{json}\n"))
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    writeln!(out, "exported {} tasks to {}", store.counts().total, path.display())?;
                }
                None => writeln!(out, "{json}")?,
            }
        }
        Command::Status => {
            let counts = store.counts();
            writeln!(out, "local:  {}", describe(&store.storage_status()))?;
            writeln!(out, "remote: {}", describe(&store.api_status()))?;
            writeln!(
                out,
                "tasks:  {} total, {} active, {} completed",
                counts.total, counts.active, counts.completed
            )?;
        }
    }
    Ok(())
}

fn format_record(record: &TaskRecord) -> String {
    let mark = if record.completed { 'x' } else { ' ' };
    let due = record
        .due_date
        .as_deref()
        .map(|due| format!("  (due {due})"))
        .unwrap_or_default();
    format!("[{mark}] {:>3}  {}{due}", record.id, record.label)
}

fn describe(status: &TierStatus) -> String {
    match (&status.error, status.enabled) {
        (_, true) => "ok".to_owned(),
        (Some(error), false) => format!("disabled ({error})"),
        (None, false) => "disabled".to_owned(),
    }
}
